//! Append-only ledger of what each pruning decision moved, so a run can be
//! inspected and undone.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::Error;
use crate::files::mover::move_file;
use crate::files::MovedFile;
use crate::report::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub stage: Stage,
    #[serde(default)]
    pub key: Option<String>,
    /// The listing the others were judged against.
    #[serde(default)]
    pub retained: Option<PathBuf>,
    pub moved: Vec<MovedFile>,
}

/// One ledger line; `record` is `None` for lines that failed to parse.
#[derive(Debug, Clone)]
pub struct HistoryLine {
    pub raw: String,
    pub record: Option<HistoryRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSelection {
    Last,
    Index(usize),
    All,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub records: usize,
    pub restored: usize,
    pub skipped: usize,
    /// Files that could not be moved back; their records stay in the ledger.
    pub failed: usize,
}

pub fn append_records(ledger: &Path, records: &[HistoryRecord]) -> Result<(), Error> {
    if records.is_empty() {
        return Ok(());
    }
    let mut out = OpenOptions::new().create(true).append(true).open(ledger)?;
    for record in records {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    Ok(())
}

pub fn read_lines(ledger: &Path) -> Result<Vec<HistoryLine>, Error> {
    let reader = BufReader::new(File::open(ledger)?);
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let raw = line?;
        if raw.trim().is_empty() {
            continue;
        }
        let record = match serde_json::from_str::<HistoryRecord>(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Skipping malformed history entry {}: {}", i, err);
                None
            }
        };
        lines.push(HistoryLine { raw, record });
    }
    Ok(lines)
}

/// Parsed records only, in ledger order.
pub fn read_records(ledger: &Path) -> Result<Vec<HistoryRecord>, Error> {
    Ok(read_lines(ledger)?
        .into_iter()
        .filter_map(|l| l.record)
        .collect())
}

/// Move the files of the selected records back where they came from, then
/// drop those records from the ledger. A file that fails to move back is
/// counted and the rest carry on; its record stays in the ledger.
pub fn restore(ledger: &Path, selection: RestoreSelection) -> Result<RestoreSummary, Error> {
    let lines = read_lines(ledger)?;
    let valid: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.record.is_some())
        .map(|(i, _)| i)
        .collect();

    if valid.is_empty() {
        return Err(Error::History(format!(
            "no history records to restore in {}",
            ledger.display()
        )));
    }

    let chosen: Vec<usize> = match selection {
        RestoreSelection::All => valid.clone(),
        RestoreSelection::Last => vec![valid[valid.len() - 1]],
        RestoreSelection::Index(idx) => match valid.get(idx) {
            Some(&line) => vec![line],
            None => {
                return Err(Error::History(format!(
                    "invalid history index {}; valid range is 0..{}",
                    idx,
                    valid.len() - 1
                )))
            }
        },
    };

    let mut summary = RestoreSummary::default();
    let mut kept: Vec<usize> = Vec::new();
    for &line in chosen.iter().rev() {
        let Some(record) = &lines[line].record else {
            continue;
        };
        summary.records += 1;
        let mut record_failed = false;
        for file in record.moved.iter().rev() {
            if !file.to.exists() {
                warn!("{} no longer exists; skipping", file.to.display());
                summary.skipped += 1;
                continue;
            }
            if file.from.exists() {
                warn!("{} is occupied; skipping", file.from.display());
                summary.skipped += 1;
                continue;
            }
            if let Err(err) = restore_file(file) {
                error!(
                    "Could not restore {} → {}: {}",
                    file.to.display(),
                    file.from.display(),
                    err
                );
                summary.failed += 1;
                record_failed = true;
                continue;
            }
            info!("Restored {} → {}", file.to.display(), file.from.display());
            summary.restored += 1;
        }
        if record_failed {
            kept.push(line);
        }
    }

    let remaining: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !chosen.contains(i) || kept.contains(i))
        .map(|(_, l)| l.raw.as_str())
        .collect();
    let content = if remaining.is_empty() {
        String::new()
    } else {
        remaining.join("\n") + "\n"
    };
    fs::write(ledger, content)?;

    Ok(summary)
}

fn restore_file(file: &MovedFile) -> std::io::Result<()> {
    if let Some(parent) = file.from.parent() {
        fs::create_dir_all(parent)?;
    }
    move_file(&file.to, &file.from)
}
