mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use folder_reconcile_core::config::{self, AppConfig};
use folder_reconcile_core::model::{PlanSummary, PrepareStats};
use folder_reconcile_core::{ExecutionOutcome, PlanKind, ResultView, Session, SortColumn};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {:#}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Plan { ref sort, ref csv }) => run_plan(&config, sort, csv.as_deref()),
        Some(Commands::Delete) => run_batches(&config, &[PlanKind::Deletions], args.yes),
        Some(Commands::MoveRenamed) => run_batches(&config, &[PlanKind::RenameMoves], args.yes),
        Some(Commands::MoveNew) => run_batches(&config, &[PlanKind::NewMoves], args.yes),
        Some(Commands::Apply) => run_batches(
            &config,
            &[PlanKind::Deletions, PlanKind::RenameMoves, PlanKind::NewMoves],
            args.yes,
        ),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

/// Config file and environment first, command-line flags on top.
fn load_config(args: &Cli) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_configuration_from(path)
            .with_context(|| format!("reading '{}'", path.display()))?,
        None => config::load_configuration().context("reading Config and RECONCILE_* variables")?,
    };
    if let Some(preserve) = &args.preserve {
        config.preserve_root = Some(preserve.clone());
    }
    if let Some(cleanup) = &args.cleanup {
        config.cleanup_root = Some(cleanup.clone());
    }
    if let Some(backend) = args.hash_backend {
        config.hash.backend = backend;
    }
    Ok(config)
}

fn run_plan(config: &AppConfig, sort: &[SortColumn], csv_path: Option<&Path>) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let reporter = CliReporter::new();
    let mut view = ResultView::new();

    let plan = session.prepare(&reporter, &mut view)?;
    let summary = plan.summary();
    let stats = plan.stats;

    for column in sort {
        view.sort_by(*column);
    }

    print_table(&view);
    print_stats(&stats);
    print_summary(&summary);

    if let Some(path) = csv_path {
        export_csv(&view, path)?;
        info!("{} rows written to '{}'", view.len(), path.display());
    }
    Ok(())
}

/// Prepare, confirm and execute each category in turn, re-preparing after
/// every batch so the next one sees the current filesystem.
fn run_batches(config: &AppConfig, kinds: &[PlanKind], assume_yes: bool) -> Result<()> {
    let mut session = Session::from_config(config)?;
    let reporter = CliReporter::new();
    let mut view = ResultView::new();

    let mut summary = session.prepare(&reporter, &mut view)?.summary();
    print_summary(&summary);

    for &kind in kinds {
        let pending = session.plan().map(|plan| plan.len_of(kind)).unwrap_or(0);
        if pending > 0 && !assume_yes {
            let prompt = format!("Proceed with {} {}?", pending, kind);
            if !prompt_confirm(&prompt, Some(false))? {
                info!("Skipped {}", kind);
                continue;
            }
        }

        let outcome = session.execute(kind, &reporter)?;
        print_outcome(&outcome);

        if let ExecutionOutcome::Completed(_) = outcome {
            summary = session.prepare(&reporter, &mut view)?.summary();
            print_summary(&summary);
        }
    }
    Ok(())
}

fn print_table(view: &ResultView) {
    println!(
        "{:<50}  {:<64}  {}",
        view.heading(SortColumn::Path).bold(),
        view.heading(SortColumn::Digest).bold(),
        view.heading(SortColumn::Action).bold(),
    );
    for row in view.rows() {
        let action = if row.action.starts_with("Delete") {
            row.action.red()
        } else if row.action.starts_with("Move with rename") {
            row.action.yellow()
        } else if row.action.starts_with("Move") {
            row.action.cyan()
        } else {
            row.action.normal()
        };
        println!("{:<50}  {:<64}  {}", row.path, row.digest, action);
    }
}

fn print_stats(stats: &PrepareStats) {
    println!();
    info!(
        "Scan: {}, Hash: {}",
        format!("{:.2}s", stats.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", stats.hash_duration.as_secs_f64()).green(),
    );
    info!(
        "{} preserve files, {} cleanup files",
        format!("{}", stats.preserve_files).cyan(),
        format!("{}", stats.cleanup_files).cyan(),
    );
}

fn print_summary(summary: &PlanSummary) {
    println!();
    info!(
        "Ready to process: {} files to delete, {} files to rename and move, {} new files to move",
        format!("{}", summary.deletions).red(),
        format!("{}", summary.rename_moves).yellow(),
        format!("{}", summary.new_moves).cyan(),
    );
    info!(
        "{} reference files in the preserve folder",
        format!("{}", summary.reference_copies).green(),
    );
    if summary.skipped > 0 {
        warn!(
            "{} cleanup files could not be hashed and were left out",
            format!("{}", summary.skipped).red()
        );
    }
}

fn print_outcome(outcome: &ExecutionOutcome) {
    match outcome.report() {
        Some(report) => {
            for failure in &report.failures {
                error!("{}", failure);
            }
            let message = outcome.message();
            if report.failed() == 0 {
                info!("{}", message.green());
            } else {
                warn!("{}", message.red());
            }
        }
        None => info!("{}", outcome.message()),
    }
}

fn export_csv(view: &ResultView, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating '{}'", path.display()))?;
    for row in view.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            // EOF: no answer is a no
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
