use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use weigh_duper::catalog::CatalogFormat;
use weigh_duper::policy::Profile;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "weigh-duper")]
#[command(about = "Keep the lightest pack of every product in crawled listing folders", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./Config.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move heavier variants and excess listings out of every listing folder
    Process(ProcessArgs),
    /// Move the lightest variant of every product into another folder
    Collect(CollectArgs),
    /// Show how listing names are parsed and grouped
    Parse(ParseArgs),
    /// Export a product catalog from listing metadata
    Catalog(CatalogArgs),
    /// Inspect or undo previous moves
    History {
        #[command(subcommand)]
        command: HistoryCmd,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Root directory to process (repeatable; replaces configured roots)
    #[arg(short, long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,
    /// Listings kept per folder after duplicates are removed
    #[arg(short, long)]
    pub target_count: Option<usize>,
    /// Normalization profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
    /// Only report what would be moved
    #[arg(long)]
    pub dry_run: bool,
    /// Write the run report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Folder holding the listings
    #[arg(short, long, value_name = "DIR")]
    pub source: PathBuf,
    /// Folder receiving the lightest variants
    #[arg(short, long, value_name = "DIR")]
    pub dest: PathBuf,
    /// Normalization profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
    /// Only report what would be moved
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Listing names (file stems or file names)
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Normalization profile
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Root directory to export (repeatable; replaces configured roots)
    #[arg(short, long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,
    /// Output file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    #[arg(long, value_enum, default_value = "json")]
    pub format: CatalogFormat,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCmd {
    /// List the move history of a folder
    List {
        /// Folder that was processed
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
    },

    /// Move files from history back where they came from
    Restore {
        /// Folder that was processed
        #[arg(short, long, value_name = "DIR")]
        path: PathBuf,
        /// Restore a specific record index
        #[arg(long, conflicts_with = "all")]
        record: Option<usize>,
        /// Restore all records
        #[arg(long, conflicts_with = "record")]
        all: bool,
    },
}
