//! Pruning policies.
//!
//! Each policy turns listings into a [`PrunePlan`] without touching the
//! filesystem; [`apply::apply_plan`] carries a plan out (or only reports it
//! on a dry run).

pub mod apply;
pub mod lightest;
pub mod target;

use std::path::PathBuf;

use crate::group::Listing;
use crate::report::Stage;

pub use apply::apply_plan;
pub use lightest::{collect_lightest, keep_lightest};
pub use target::keep_target_count;

#[derive(Debug, Clone)]
pub struct PrunePlan {
    pub stage: Stage,
    pub key: Option<String>,
    /// The listing the decision is anchored on, if any.
    pub canonical: Option<PathBuf>,
    /// Stay where they are.
    pub keep: Vec<Listing>,
    /// Move into the stage's destination directory.
    pub relocate: Vec<Listing>,
    /// Left in place and reported as skipped with `skip_reason`.
    pub skip: Vec<Listing>,
    pub skip_reason: Option<String>,
}

impl PrunePlan {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            key: None,
            canonical: None,
            keep: Vec::new(),
            relocate: Vec::new(),
            skip: Vec::new(),
            skip_reason: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.relocate.is_empty() && self.skip.is_empty()
    }
}
