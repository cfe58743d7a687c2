use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::Path;
use std::time::Duration;
use weigh_duper::report::{DirectoryReport, Stage};
use weigh_duper::ProgressReporter;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Walk phase: spinner (directory count unknown upfront)
/// - Directory phase: progress bar over the directories found
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Some(old) = self.bar.borrow_mut().replace(pb) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        match self.bar.borrow().as_ref() {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS)
}

impl ProgressReporter for CliReporter {
    fn on_walk_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}"));
        pb.set_message("Looking for listing folders...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_walk_complete(&self, directories: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Found {} listing folders in {:.2}s",
            directories, duration_secs
        );

        let pb = ProgressBar::new(directories as u64);
        pb.set_style(style(
            "  {spinner:.cyan} Pruning [{bar:30.cyan/dim}] {pos}/{len} folders {wide_msg}",
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_directory_start(&self, index: usize, _total: usize, directory: &Path) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(index as u64);
            let name = directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(name);
        }
    }

    fn on_directory_complete(&self, report: &DirectoryReport) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.inc(1);
        }
        if report.failed() > 0 || report.error.is_some() {
            self.println(format!(
                "  \x1b[31m✗\x1b[0m {}: {} failed{}",
                report.directory.display(),
                report.failed(),
                report
                    .error
                    .as_ref()
                    .map(|e| format!(" ({})", e))
                    .unwrap_or_default()
            ));
        } else if report.moved(Stage::Duplicate) + report.moved(Stage::Excess) > 0 {
            self.println(format!(
                "  \x1b[32m✓\x1b[0m {}: {} heavier, {} excess, {} kept",
                report.directory.display(),
                report.moved(Stage::Duplicate),
                report.moved(Stage::Excess),
                report.retained
            ));
        }
    }

    fn on_run_complete(&self, duration_secs: f64) {
        self.finish_bar();
        eprintln!("  \x1b[32m✓\x1b[0m Done in {:.2}s", duration_secs);
    }
}
