use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::{self, AppConfig};
use crate::error::Error;
use crate::files::collect_pairs;
use crate::group::{group_listings, Listing};
use crate::history::{self, HistoryRecord};
use crate::policy::NormalizationPolicy;
use crate::progress::ProgressReporter;
use crate::prune::{self, PrunePlan};
use crate::report::{DirectoryReport, ItemResult, RunReport, Stage};
use crate::scanner;

pub struct DedupeEngine {
    config: AppConfig,
    policy: NormalizationPolicy,
    dry_run: bool,
}

impl DedupeEngine {
    pub fn new(config: AppConfig) -> Self {
        let policy = config.normalization.to_policy();
        Self {
            config,
            policy,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directories under the configured roots that hold listings.
    pub fn listing_directories(&self) -> Vec<PathBuf> {
        let roots = config::non_overlapping_directories(self.config.root_paths.clone());
        info!("Processing directories: {:?}", roots);
        scanner::find_listing_directories(
            &roots,
            &self.config.overflow_dir_names(),
            &self.config.ignore_patterns,
            &self.config.image_extensions,
        )
    }

    /// Parsed listings directly inside `dir`, in file-name order.
    pub fn listings(&self, dir: &Path) -> Result<Vec<Listing>, Error> {
        let pairs = collect_pairs(
            dir,
            &self.config.image_extensions,
            &self.config.sidecar_extensions,
        )?;
        Ok(pairs
            .into_iter()
            .map(|pair| Listing::new(pair, &self.policy))
            .collect())
    }

    /// Run the full pipeline over every configured root:
    /// 1. Walk the roots for directories holding listings
    /// 2. Per directory, move heavier pack-size variants aside
    /// 3. Per directory, move listings beyond the target count aside
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunReport, Error> {
        if self.config.root_paths.is_empty() {
            return Err(Error::Other("no root paths configured".to_string()));
        }

        let start = Instant::now();
        reporter.on_walk_start();
        let directories = self.listing_directories();
        reporter.on_walk_complete(directories.len(), start.elapsed().as_secs_f64());

        let mut run = RunReport {
            dry_run: self.dry_run,
            ..Default::default()
        };

        let total = directories.len();
        for (index, dir) in directories.iter().enumerate() {
            reporter.on_directory_start(index, total, dir);
            let report = self.process_directory(dir).unwrap_or_else(|err| {
                error!("Error processing {}: {}", dir.display(), err);
                let mut report = DirectoryReport::new(dir);
                report.error = Some(err.to_string());
                report
            });
            reporter.on_directory_complete(&report);
            run.directories.push(report);
        }

        run.duration_secs = start.elapsed().as_secs_f64();
        reporter.on_run_complete(run.duration_secs);
        Ok(run)
    }

    /// Keep-lightest, then keep-target-count, for one directory.
    pub fn process_directory(&self, dir: &Path) -> Result<DirectoryReport, Error> {
        let mut report = DirectoryReport::new(dir);
        let listings = self.listings(dir)?;
        report.listings = listings.len();
        info!("Processing {} ({} listings)", dir.display(), listings.len());

        if listings.is_empty() {
            info!("Nothing to do in {}", dir.display());
            return Ok(report);
        }

        let groups = group_listings(listings);
        report.groups = groups.len();
        let mut records: Vec<HistoryRecord> = Vec::new();

        // Heavier variants of the same product
        let duplicate_dir = dir.join(&self.config.duplicate_dir_name);
        let mut remaining: Vec<Listing> = Vec::new();
        for plan in prune::keep_lightest(groups) {
            if plan.is_noop() {
                remaining.extend(plan.keep);
                continue;
            }
            let (results, record) = prune::apply_plan(&plan, &duplicate_dir, self.dry_run);
            remaining.extend(left_in_place(plan, &results));
            report.items.extend(results);
            records.extend(record);
        }
        info!(
            "Moved {} heavier variants out of {}",
            report.moved(Stage::Duplicate),
            dir.display()
        );

        // Excess beyond the target count
        remaining.sort_by(|a, b| a.pair.image.file_name().cmp(&b.pair.image.file_name()));
        let plan = prune::keep_target_count(remaining, self.config.target_count);
        if plan.is_noop() {
            info!(
                "No pruning needed in {} ({} listings)",
                dir.display(),
                plan.keep.len()
            );
            report.retained = plan.keep.len();
        } else {
            let excess_dir = dir.join(&self.config.excess_dir_name);
            let (results, record) = prune::apply_plan(&plan, &excess_dir, self.dry_run);
            report.retained = left_in_place(plan, &results).len();
            info!(
                "Moved {} excess listings out of {}",
                results.iter().filter(|r| r.is_moved()).count(),
                dir.display()
            );
            report.items.extend(results);
            records.extend(record);
        }

        self.write_history(dir, &records, &mut report);
        debug!(
            "{}: {} retained, {} failed, {} skipped",
            dir.display(),
            report.retained,
            report.failed(),
            report.skipped()
        );
        Ok(report)
    }

    /// Move the lightest variant of every product in `source` into `dest`.
    pub fn collect_lightest(&self, source: &Path, dest: &Path) -> Result<DirectoryReport, Error> {
        let mut report = DirectoryReport::new(source);
        let listings = self.listings(source)?;
        report.listings = listings.len();

        let groups = group_listings(listings);
        report.groups = groups.len();
        info!(
            "Found {} listings in {} products",
            report.listings, report.groups
        );

        let mut records: Vec<HistoryRecord> = Vec::new();
        for plan in prune::collect_lightest(groups) {
            let (results, record) = prune::apply_plan(&plan, dest, self.dry_run);
            report.retained += left_in_place(plan, &results).len();
            report.items.extend(results);
            records.extend(record);
        }
        info!(
            "Collected {} lightest listings into {}",
            report.moved(Stage::Collect),
            dest.display()
        );

        self.write_history(source, &records, &mut report);
        Ok(report)
    }

    fn write_history(&self, dir: &Path, records: &[HistoryRecord], report: &mut DirectoryReport) {
        if self.dry_run || records.is_empty() {
            return;
        }
        let ledger = dir.join(&self.config.history_file_name);
        if let Err(err) = history::append_records(&ledger, records) {
            error!("Could not write history {}: {}", ledger.display(), err);
            report.error = Some(err.to_string());
        }
    }
}

/// Listings of `plan` still in their directory after it was applied.
fn left_in_place(plan: PrunePlan, results: &[ItemResult]) -> Vec<Listing> {
    let moved: HashSet<&Path> = results
        .iter()
        .filter(|r| r.is_moved())
        .map(|r| r.image.as_path())
        .collect();

    let mut left = plan.keep;
    left.extend(plan.skip);
    left.extend(
        plan.relocate
            .into_iter()
            .filter(|l| !moved.contains(l.pair.image.as_path())),
    );
    left
}
