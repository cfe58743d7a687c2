use chrono::Utc;
use std::path::Path;
use tracing::{debug, error};

use crate::files::{move_pair, plan_pair, MovedFile};
use crate::group::Listing;
use crate::history::HistoryRecord;
use crate::report::{ItemOutcome, ItemResult};

use super::PrunePlan;

fn result_for(listing: &Listing, plan: &PrunePlan, outcome: ItemOutcome) -> ItemResult {
    ItemResult {
        image: listing.pair.image.clone(),
        stage: plan.stage,
        key: listing.key.clone(),
        weight: listing.weight(),
        outcome,
    }
}

/// Carry out `plan`, moving every relocated pair into `dest_dir`.
///
/// A failed move is recorded and the next listing is tried; nothing that
/// already moved is undone. Returns the per-item results and, when something
/// actually moved, the history record describing it.
pub fn apply_plan(
    plan: &PrunePlan,
    dest_dir: &Path,
    dry_run: bool,
) -> (Vec<ItemResult>, Option<HistoryRecord>) {
    let mut results = Vec::with_capacity(plan.relocate.len() + plan.skip.len());
    let mut moved_files: Vec<MovedFile> = Vec::new();

    for listing in &plan.relocate {
        if dry_run {
            let files = plan_pair(&listing.pair, dest_dir);
            debug!("[dry-run] {} → {}", listing.pair.image.display(), dest_dir.display());
            results.push(result_for(listing, plan, ItemOutcome::Moved { files, dry_run }));
            continue;
        }

        match move_pair(&listing.pair, dest_dir) {
            Ok(files) => {
                debug!("Moved {} → {}", listing.pair.image.display(), dest_dir.display());
                moved_files.extend(files.iter().cloned());
                results.push(result_for(listing, plan, ItemOutcome::Moved { files, dry_run }));
            }
            Err(err) => {
                error!("Failed to move {}: {}", listing.pair.image.display(), err);
                results.push(result_for(
                    listing,
                    plan,
                    ItemOutcome::Failed {
                        reason: err.to_string(),
                    },
                ));
            }
        }
    }

    let reason = plan
        .skip_reason
        .clone()
        .unwrap_or_else(|| "skipped".to_string());
    for listing in &plan.skip {
        results.push(result_for(
            listing,
            plan,
            ItemOutcome::Skipped {
                reason: reason.clone(),
            },
        ));
    }

    let record = (!moved_files.is_empty()).then(|| HistoryRecord {
        timestamp: Utc::now().to_rfc3339(),
        stage: plan.stage,
        key: plan.key.clone(),
        retained: plan.canonical.clone(),
        moved: moved_files,
    });

    (results, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FilePair;
    use crate::policy::NormalizationPolicy;
    use crate::report::Stage;
    use std::fs;
    use tempfile::tempdir;

    fn listing_on_disk(dir: &Path, stem: &str) -> Listing {
        let image = dir.join(format!("{stem}.jpg"));
        fs::write(&image, stem).unwrap();
        let pair = FilePair {
            stem: stem.to_string(),
            image,
            sidecars: Vec::new(),
        };
        Listing::new(pair, &NormalizationPolicy::strict())
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let mut plan = PrunePlan::new(Stage::Excess);
        plan.relocate.push(listing_on_disk(dir.path(), "a 1kg"));
        let dest = dir.path().join("초과 파일");

        let (results, record) = apply_plan(&plan, &dest, true);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_moved());
        assert!(record.is_none());
        assert!(dir.path().join("a 1kg.jpg").exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_failed_move_does_not_stop_the_rest() {
        let dir = tempdir().unwrap();
        let mut plan = PrunePlan::new(Stage::Duplicate);
        let gone = listing_on_disk(dir.path(), "a 2kg");
        fs::remove_file(&gone.pair.image).unwrap();
        plan.relocate.push(gone);
        plan.relocate.push(listing_on_disk(dir.path(), "a 3kg"));
        let dest = dir.path().join("dupes");

        let (results, record) = apply_plan(&plan, &dest, false);
        assert!(results[0].is_failed());
        assert!(results[1].is_moved());
        assert!(dest.join("a 3kg.jpg").exists());
        assert_eq!(record.unwrap().moved.len(), 1);
    }
}
