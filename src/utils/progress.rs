//! Terminal progress for dataset loading and cross-validation

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const LOADING_TEMPLATE: &str = "    {spinner:.yellow} {msg} [{elapsed}]";
const CV_TEMPLATE: &str = "    {prefix:.bold} [{bar:36.green/white}] {pos}/{len} fits ({eta}) {msg}";

/// Spinner shown while the train and test files are read and cleaned
pub fn loading_spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(LOADING_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("◐◓◑◒●");
    let pb = ProgressBar::new_spinner()
        .with_style(style)
        .with_message("Reading and cleaning datasets...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn finish_loading(pb: &ProgressBar, train_rows: usize, test_rows: usize) {
    pb.finish_with_message(format!(
        "✅ Kept {} train and {} test rows",
        train_rows, test_rows
    ));
}

/// Bar counting (candidate, fold) fits. The prefix shows how many fits
/// run at once; a hidden bar still counts so callers never branch on it.
pub fn cv_progress(total_fits: u64, workers: usize, visible: bool) -> ProgressBar {
    let target = if visible {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };
    let style = ProgressStyle::with_template(CV_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let pb = ProgressBar::with_draw_target(Some(total_fits), target).with_style(style);
    pb.set_prefix(format!("CV x{}", workers));
    pb
}

/// Close the cross-validation bar with the candidate tally
pub fn finish_cv_progress(pb: &ProgressBar, n_candidates: usize, n_folds: usize, n_failed: usize) {
    let tally = format!("{} candidates x {} folds", n_candidates, n_folds);
    if n_failed == 0 {
        pb.finish_with_message(format!("✅ {}", tally));
    } else {
        pb.finish_with_message(format!("⚠️  {} ({} failed)", tally, n_failed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_cv_bar_still_counts_fits() {
        let pb = cv_progress(6, 2, false);
        assert_eq!(pb.length(), Some(6));
        assert_eq!(pb.prefix(), "CV x2");

        (0..6).for_each(|_| pb.inc(1));
        finish_cv_progress(&pb, 3, 2, 1);

        assert_eq!(pb.position(), 6);
        assert!(pb.is_finished());
        assert!(pb.message().contains("3 candidates x 2 folds (1 failed)"));
    }

    #[test]
    fn loading_spinner_reports_kept_rows() {
        let pb = loading_spinner(false);
        finish_loading(&pb, 120, 40);
        assert!(pb.message().contains("120 train and 40 test rows"));
    }
}
