pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod files;
pub mod group;
pub mod history;
pub mod parse;
pub mod policy;
pub mod progress;
pub mod prune;
pub mod report;
pub mod scanner;

pub use config::AppConfig;
pub use engine::DedupeEngine;
pub use error::Error;
pub use policy::NormalizationPolicy;
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{DirectoryReport, ItemOutcome, ItemResult, RunReport};
