use std::path::Path;

use crate::report::DirectoryReport;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif; all methods default to no-ops.
pub trait ProgressReporter {
    fn on_walk_start(&self) {}
    fn on_walk_complete(&self, _directories: usize, _duration_secs: f64) {}
    fn on_directory_start(&self, _index: usize, _total: usize, _directory: &Path) {}
    fn on_directory_complete(&self, _report: &DirectoryReport) {}
    fn on_run_complete(&self, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
