use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::files::MovedFile;
use crate::parse::Weight;

/// Which pruning pass produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Duplicate,
    Excess,
    Collect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemOutcome {
    /// With `dry_run` set, the files were only planned to move.
    Moved { files: Vec<MovedFile>, dry_run: bool },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemResult {
    pub image: PathBuf,
    pub stage: Stage,
    pub key: String,
    pub weight: Weight,
    pub outcome: ItemOutcome,
}

impl ItemResult {
    pub fn is_moved(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Moved { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Skipped { .. })
    }
}

/// Everything that happened to one directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub listings: usize,
    pub groups: usize,
    pub retained: usize,
    pub items: Vec<ItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DirectoryReport {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn moved(&self, stage: Stage) -> usize {
        self.items
            .iter()
            .filter(|i| i.stage == stage && i.is_moved())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.iter().filter(|i| i.is_skipped()).count()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub duration_secs: f64,
    pub directories: Vec<DirectoryReport>,
}

impl RunReport {
    pub fn moved(&self, stage: Stage) -> usize {
        self.directories.iter().map(|d| d.moved(stage)).sum()
    }

    pub fn failed(&self) -> usize {
        self.directories.iter().map(|d| d.failed()).sum()
    }

    pub fn skipped(&self) -> usize {
        self.directories.iter().map(|d| d.skipped()).sum()
    }

    pub fn directory_errors(&self) -> usize {
        self.directories.iter().filter(|d| d.error.is_some()).count()
    }

    pub fn write_json(&self, path: &Path) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
