//! credit-default: train and evaluate a credit card default classifier
//!
//! Loads the zipped train/test CSVs, grid-searches a
//! preprocess -> PCA -> SelectKBest -> SVC pipeline with stratified
//! cross-validation, saves the best model and writes the metrics file.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use credit_default::cli::Cli;
use credit_default::pipeline::search::GridSearch;
use credit_default::pipeline::{dataset_stats, load_clean_dataset, split_features_target, FeatureTable};
use credit_default::report::{
    append_confusion_matrices, save_model, write_metrics, ClassificationMetrics, ConfusionMatrix,
    MetricsRecord, ModelArtifact, ModelMetadata, Partition, TrainingSummary,
};
use credit_default::utils::{
    finish_loading, loading_spinner, print_banner, print_completion, print_config, print_count,
    print_info, print_step_header, print_step_time, print_success, RunOverview,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let grid = cli.param_grid();
    let search_config = cli.search_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&RunOverview {
        train: &cli.train,
        test: &cli.test,
        model_output: &cli.model_output,
        metrics_output: &cli.metrics_output,
        cv_folds: search_config.cv_folds,
        candidates: grid.len(),
    });

    let mut step_times = Vec::new();

    // Step 1: Load and clean both partitions
    print_step_header(1, "Loading Data");
    let step_start = Instant::now();
    let spinner = loading_spinner(!cli.no_progress);
    let train_df = load_clean_dataset(&cli.train, cli.infer_schema_length)?;
    let test_df = load_clean_dataset(&cli.test, cli.infer_schema_length)?;
    finish_loading(&spinner, train_df.height(), test_df.height());

    for (name, df) in [("Train", &train_df), ("Test", &test_df)] {
        let stats = dataset_stats(df);
        println!("\n    {} {} Statistics:", style("✧").cyan(), name);
        println!("      Rows: {}", stats.rows);
        println!("      Columns: {}", stats.columns);
        println!("      Estimated memory: {:.2} MB", stats.memory_mb);
        if let Some(rate) = stats.default_rate {
            println!("      Default rate: {:.1}%", rate * 100.0);
        }
    }
    let elapsed = step_start.elapsed();
    step_times.push(("Load data", elapsed));
    print_step_time(elapsed);

    // Step 2: Split features from the outcome
    print_step_header(2, "Preparing Features");
    let step_start = Instant::now();
    let (x_train_df, y_train) =
        split_features_target(&train_df).context("Failed to split training data")?;
    let (x_test_df, y_test) = split_features_target(&test_df).context("Failed to split test data")?;

    let train_columns: Vec<String> = x_train_df.get_column_names().iter().map(|c| c.to_string()).collect();
    let test_columns: Vec<String> = x_test_df.get_column_names().iter().map(|c| c.to_string()).collect();
    if train_columns != test_columns {
        anyhow::bail!(
            "Train and test feature columns differ:\n  train: {:?}\n  test:  {:?}",
            train_columns,
            test_columns
        );
    }

    let x_train = FeatureTable::from_frame(&x_train_df).context("Invalid training features")?;
    let x_test = FeatureTable::from_frame(&x_test_df).context("Invalid test features")?;
    print_count("feature columns", x_train.n_columns(), None);
    print_success("Train and test columns match");
    let elapsed = step_start.elapsed();
    step_times.push(("Prepare features", elapsed));
    print_step_time(elapsed);

    // Step 3: Cross-validated grid search
    print_step_header(3, "Grid Search");
    let step_start = Instant::now();
    print_info(&format!(
        "{} candidates x {} folds, scored by balanced accuracy",
        grid.len(),
        search_config.cv_folds
    ));
    let search = GridSearch::new(grid, search_config)
        .fit(&x_train, &y_train)
        .context("Grid search failed")?;
    print_success(&format!(
        "Best: {} (mean CV score {:.4})",
        search.best_spec, search.best_score
    ));
    let elapsed = step_start.elapsed();
    step_times.push(("Grid search", elapsed));
    print_step_time(elapsed);

    // Step 4: Persist the model
    print_step_header(4, "Saving Model");
    let step_start = Instant::now();
    let artifact = ModelArtifact {
        metadata: ModelMetadata::new(x_train.n_rows(), train_columns, &search),
        search,
    };
    save_model(&artifact, &cli.model_output)?;
    print_success(&format!("Model saved to {}", cli.model_output.display()));
    let elapsed = step_start.elapsed();
    step_times.push(("Save model", elapsed));
    print_step_time(elapsed);

    // Step 5: Evaluate both partitions and write the metrics file
    print_step_header(5, "Evaluating");
    let step_start = Instant::now();
    let train_pred = artifact
        .search
        .predict(&x_train)
        .context("Failed to predict training data")?;
    let test_pred = artifact
        .search
        .predict(&x_test)
        .context("Failed to predict test data")?;

    let train_metrics = ClassificationMetrics::compute(&y_train, &train_pred);
    let test_metrics = ClassificationMetrics::compute(&y_test, &test_pred);

    write_metrics(
        &cli.metrics_output,
        &[
            MetricsRecord::metrics(Partition::Train, &train_metrics),
            MetricsRecord::metrics(Partition::Test, &test_metrics),
        ],
    )?;
    append_confusion_matrices(
        &cli.metrics_output,
        &[
            MetricsRecord::confusion(Partition::Train, &ConfusionMatrix::compute(&y_train, &train_pred)),
            MetricsRecord::confusion(Partition::Test, &ConfusionMatrix::compute(&y_test, &test_pred)),
        ],
    )?;
    print_success(&format!("Metrics written to {}", cli.metrics_output.display()));
    let elapsed = step_start.elapsed();
    step_times.push(("Evaluate", elapsed));
    print_step_time(elapsed);

    let mut summary = TrainingSummary::new(x_train.n_rows(), x_test.n_rows(), x_train.n_columns());
    summary.add_metrics(Partition::Train, train_metrics);
    summary.add_metrics(Partition::Test, test_metrics);
    for (step, elapsed) in step_times {
        summary.add_step_time(step, elapsed);
    }
    summary.display(&artifact.search);

    print_completion();

    Ok(())
}
