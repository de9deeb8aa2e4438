//! Training summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::metrics::{ClassificationMetrics, Partition};
use crate::pipeline::search::SearchResult;

/// Summary of one training run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
    pub metrics: Vec<(Partition, ClassificationMetrics)>,
    pub step_times: Vec<(String, Duration)>,
}

impl TrainingSummary {
    pub fn new(train_rows: usize, test_rows: usize, n_features: usize) -> Self {
        Self {
            train_rows,
            test_rows,
            n_features,
            ..Default::default()
        }
    }

    pub fn add_metrics(&mut self, partition: Partition, metrics: ClassificationMetrics) {
        self.metrics.push((partition, metrics));
    }

    pub fn add_step_time(&mut self, step: impl Into<String>, elapsed: Duration) {
        self.step_times.push((step.into(), elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.step_times.iter().map(|(_, d)| *d).sum()
    }

    fn print_section(title: &str) {
        println!();
        println!("    {} {}", style("▸").cyan(), style(title).white().bold());
        println!("    {}", style("─".repeat(50)).dim());
        println!();
    }

    fn print_table(table: &Table) {
        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }

    pub fn display(&self, search: &SearchResult) {
        Self::print_section("CROSS-VALIDATION");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Rank").add_attribute(Attribute::Bold),
            Cell::new("PCA").add_attribute(Attribute::Bold),
            Cell::new("K").add_attribute(Attribute::Bold),
            Cell::new("Gamma").add_attribute(Attribute::Bold),
            Cell::new("Kernel").add_attribute(Attribute::Bold),
            Cell::new("Mean").add_attribute(Attribute::Bold),
            Cell::new("Std").add_attribute(Attribute::Bold),
        ]);

        for (i, candidate) in search.candidates.iter().enumerate() {
            let is_best = i == search.best_index;
            let mean = match candidate.mean_score {
                Some(m) => Cell::new(format!("{:.4}", m)).fg(if is_best {
                    Color::Green
                } else {
                    Color::White
                }),
                None => Cell::new("failed").fg(Color::Red),
            };
            let mut rank = Cell::new(candidate.rank);
            if is_best {
                rank = rank.add_attribute(Attribute::Bold).fg(Color::Green);
            }

            table.add_row(vec![
                rank,
                Cell::new(candidate.spec.pca_components),
                Cell::new(candidate.spec.k),
                Cell::new(candidate.spec.gamma),
                Cell::new(candidate.spec.kernel),
                mean,
                Cell::new(
                    candidate
                        .std_score
                        .map(|s| format!("{:.4}", s))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        Self::print_table(&table);

        let failures: Vec<_> = search
            .candidates
            .iter()
            .filter_map(|c| c.error.as_ref().map(|e| (c.spec, e)))
            .collect();
        if !failures.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Failed candidates").yellow(),
                style(format!("({})", failures.len())).dim()
            );
            for (spec, error) in failures {
                println!("        {} {} {}", style("•").dim(), spec, style(error).dim());
            }
        }

        Self::print_section("METRICS");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Dataset").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Precision").add_attribute(Attribute::Bold),
            Cell::new("Recall").add_attribute(Attribute::Bold),
            Cell::new("F1").add_attribute(Attribute::Bold),
            Cell::new("Balanced Acc.").add_attribute(Attribute::Bold),
        ]);

        for (partition, m) in &self.metrics {
            let rows = match partition {
                Partition::Train => self.train_rows,
                Partition::Test => self.test_rows,
            };
            let color = if m.balanced_accuracy >= 0.7 {
                Color::Green
            } else if m.balanced_accuracy >= 0.6 {
                Color::Yellow
            } else {
                Color::Red
            };
            table.add_row(vec![
                Cell::new(partition),
                Cell::new(rows),
                Cell::new(format!("{:.4}", m.precision)),
                Cell::new(format!("{:.4}", m.recall)),
                Cell::new(format!("{:.4}", m.f1_score)),
                Cell::new(format!("{:.4}", m.balanced_accuracy))
                    .fg(color)
                    .add_attribute(Attribute::Bold),
            ]);
        }
        Self::print_table(&table);

        if !self.step_times.is_empty() {
            Self::print_section("TIMING");

            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_header(vec![
                Cell::new("Step").add_attribute(Attribute::Bold),
                Cell::new("Time").add_attribute(Attribute::Bold),
            ]);
            for (step, elapsed) in &self.step_times {
                table.add_row(vec![
                    Cell::new(step),
                    Cell::new(format!("{:.2}s", elapsed.as_secs_f64())),
                ]);
            }
            table.add_row(vec![
                Cell::new("Total").add_attribute(Attribute::Bold),
                Cell::new(format!("{:.2}s", self.total_time().as_secs_f64()))
                    .fg(Color::Cyan)
                    .add_attribute(Attribute::Bold),
            ]);
            Self::print_table(&table);
        }

        println!();
        println!(
            "    {} {} features, best {} = {}",
            style("ℹ").cyan(),
            self.n_features,
            search.scoring,
            style(format!("{:.4}", search.best_score)).green().bold()
        );
    }
}
