mod cli;
mod logging;
mod reporter;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{CatalogArgs, Cli, CollectArgs, Commands, HistoryCmd, ParseArgs, ProcessArgs};
use colored::*;
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::{error, info, warn};
use weigh_duper::catalog;
use weigh_duper::history::{self, RestoreSelection};
use weigh_duper::parse::parse_listing;
use weigh_duper::policy::Profile;
use weigh_duper::report::{DirectoryReport, ItemOutcome, Stage};
use weigh_duper::{AppConfig, DedupeEngine};

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match weigh_duper::config::load_configuration_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let outcome = match args.command {
        Some(Commands::Process(process_args)) => run_process(config, process_args),
        Some(Commands::Collect(collect_args)) => run_collect(config, collect_args),
        Some(Commands::Parse(parse_args)) => run_parse(&config, parse_args),
        Some(Commands::Catalog(catalog_args)) => run_catalog(config, catalog_args),
        Some(Commands::History { command }) => run_history(&config, command),
        Some(Commands::PrintConfig) => toml::to_string_pretty(&config)
            .map(|rendered| println!("{}", rendered))
            .context("Failed to render configuration"),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }

    Ok(())
}

fn paths_to_strings(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect()
}

fn apply_profile(config: &mut AppConfig, profile: Option<Profile>) {
    if let Some(profile) = profile {
        config.normalization.profile = profile;
    }
}

fn run_process(mut config: AppConfig, args: ProcessArgs) -> Result<()> {
    if !args.roots.is_empty() {
        config.root_paths = paths_to_strings(&args.roots);
    }
    if let Some(target) = args.target_count {
        config.target_count = target;
    }
    apply_profile(&mut config, args.profile);

    let engine = DedupeEngine::new(config).with_dry_run(args.dry_run);
    let reporter = CliReporter::new();
    let report = engine.run(&reporter)?;

    println!();
    info!(
        "{} folders processed in {}",
        format!("{}", report.directories.len()).cyan(),
        format!("{:.2}s", report.duration_secs).green(),
    );
    info!(
        "{} heavier variants moved, {} excess listings moved",
        format!("{}", report.moved(Stage::Duplicate)).red(),
        format!("{}", report.moved(Stage::Excess)).red(),
    );
    if report.failed() > 0 || report.directory_errors() > 0 {
        warn!(
            "{} moves failed, {} folders could not be read",
            format!("{}", report.failed()).red(),
            format!("{}", report.directory_errors()).red(),
        );
    }
    if report.skipped() > 0 {
        info!(
            "{} listings skipped (no known weight in their group)",
            format!("{}", report.skipped()).yellow()
        );
    }
    if report.dry_run {
        println!("\n⚠️  Dry-run only; no files were changed.");
    }

    if let Some(path) = args.report {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write report {:?}", path))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

fn run_collect(mut config: AppConfig, args: CollectArgs) -> Result<()> {
    apply_profile(&mut config, args.profile);
    let engine = DedupeEngine::new(config).with_dry_run(args.dry_run);

    let report = engine
        .collect_lightest(&args.source, &args.dest)
        .with_context(|| format!("Failed to collect from {:?}", args.source))?;
    print_items(&report);

    info!(
        "{} listings in {} products, {} collected into {}",
        report.listings,
        report.groups,
        format!("{}", report.moved(Stage::Collect)).green(),
        args.dest.display()
    );
    if args.dry_run {
        println!("\n⚠️  Dry-run only; no files were changed.");
    }
    Ok(())
}

fn print_items(report: &DirectoryReport) {
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Moved { files, dry_run } => {
                let label = if *dry_run { "[dry-run] MOVE" } else { "Moved" };
                for file in files {
                    println!("   📦 {} {} → {}", label, file.from.display(), file.to.display());
                }
            }
            ItemOutcome::Skipped { reason } => {
                println!("   ⏭  {} ({})", item.image.display(), reason);
            }
            ItemOutcome::Failed { reason } => {
                println!("   {} {} ({})", "✗".red(), item.image.display(), reason);
            }
        }
    }
}

fn run_parse(config: &AppConfig, args: ParseArgs) -> Result<()> {
    let mut normalization = config.normalization.clone();
    if let Some(profile) = args.profile {
        normalization.profile = profile;
    }
    let policy = normalization.to_policy();

    for name in &args.names {
        let path = Path::new(name);
        let known_extension = weigh_duper::files::has_extension(path, &config.image_extensions)
            || weigh_duper::files::has_extension(path, &config.sidecar_extensions);
        let stem = if known_extension {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone())
        } else {
            name.clone()
        };

        let parsed = parse_listing(&stem, &policy);
        let mut key = policy.canonical_key(&parsed.base_name);
        if key.is_empty() {
            key = stem.clone();
        }
        let weight = match &parsed.quantity {
            Some(q) if q.multiplier > 1 => format!(
                "{} {} ({} × {})",
                q.value,
                q.unit.base_label(),
                q.value / q.multiplier as f64,
                q.multiplier
            ),
            Some(q) => format!("{} {}", q.value, q.unit.base_label()),
            None => "unknown".to_string(),
        };

        println!("{}", name.bold());
        println!("   weight: {}", weight.green());
        println!("   base:   {}", parsed.base_name);
        println!("   key:    {}", key.cyan());
    }
    Ok(())
}

fn run_catalog(mut config: AppConfig, args: CatalogArgs) -> Result<()> {
    if !args.roots.is_empty() {
        config.root_paths = paths_to_strings(&args.roots);
    }
    if config.root_paths.is_empty() {
        anyhow::bail!("No root paths configured");
    }

    let entries = catalog::build_catalog(&config).context("Failed to build catalog")?;
    catalog::write_catalog(&entries, &args.output, args.format)
        .with_context(|| format!("Failed to write catalog {:?}", args.output))?;
    info!(
        "{} catalog entries written to {}",
        format!("{}", entries.len()).green(),
        args.output.display()
    );
    Ok(())
}

fn run_history(config: &AppConfig, command: HistoryCmd) -> Result<()> {
    match command {
        HistoryCmd::List { path } => {
            let ledger = path.join(&config.history_file_name);
            let records = history::read_records(&ledger)
                .with_context(|| format!("Could not open history file {:?}", ledger))?;

            println!("🗂️  Move History:");
            for (i, rec) in records.iter().enumerate() {
                println!(
                    "[{}] {} {:?}\n     key: {}\n     kept: {}\n     moved: {:?}\n",
                    i,
                    rec.timestamp,
                    rec.stage,
                    rec.key.as_deref().unwrap_or("-"),
                    rec.retained
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    rec.moved.iter().map(|m| &m.from).collect::<Vec<_>>()
                );
            }
        }

        HistoryCmd::Restore { path, record, all } => {
            let ledger = path.join(&config.history_file_name);
            let selection = match (all, record) {
                (true, _) => RestoreSelection::All,
                (false, Some(idx)) => RestoreSelection::Index(idx),
                (false, None) => RestoreSelection::Last,
            };
            let summary = history::restore(&ledger, selection)
                .with_context(|| format!("Failed to restore from {:?}", ledger))?;
            println!(
                "🔄 Restored {} files from {} record(s), {} skipped",
                summary.restored, summary.records, summary.skipped
            );
            if summary.failed > 0 {
                warn!(
                    "{} files could not be restored; their records were kept",
                    format!("{}", summary.failed).red()
                );
            }
        }
    }
    Ok(())
}
