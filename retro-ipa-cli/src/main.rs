//! retro-ipa CLI
//!
//! Converts a folder of cover images into IPA files named after the
//! checksums of their matching DAT entries.

mod cli_types;
mod error;
mod logging;

use std::path::Path;

use clap::Parser;
use clap::error::ErrorKind;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use retro_ipa_lib::{ConvertOptions, JobOutcome, Medium, execute_plan, prepare};

use crate::cli_types::Cli;
use crate::error::CliError;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    logging::init(cli.quiet, cli.verbose);

    let options = cli.convert_options();
    if let Err(e) = run_convert(
        &cli.catalog,
        &cli.input_dir,
        &cli.output_dir,
        &options,
        cli.quiet,
    ) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Plan and run one conversion batch.
///
/// Only setup failures are returned as errors; skipped and failed images are
/// reported and the function still succeeds.
fn run_convert(
    catalog_path: &Path,
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
    quiet: bool,
) -> Result<(), CliError> {
    let (catalog, plan) = prepare(catalog_path, input_dir, output_dir, options)?;

    let medium = match catalog.medium() {
        Medium::Hucard => "HuCard",
        Medium::Cd => "CD",
    };
    log::info!(
        "Catalog: {} ({} games, {} media)",
        catalog.name().if_supports_color(Stdout, |t| t.cyan()),
        catalog.game_count(),
        medium,
    );
    log::info!(
        "Matching by {}: {} to convert, {} skipped",
        options.mode,
        plan.jobs.len(),
        plan.skipped.len(),
    );

    for reason in &plan.skipped {
        log::warn!(
            "  {} {}",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            reason,
        );
    }

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(plan.jobs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb
    };

    let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::runtime(e.to_string()))?;
    let summary = rt.block_on(execute_plan(plan, options, |outcome| {
        pb.suspend(|| report_outcome(outcome));
        pb.inc(1);
    }));
    pb.finish_and_clear();

    log::info!(
        "{} {} written, {} skipped, {} failed",
        "Done:".if_supports_color(Stdout, |t| t.bold()),
        summary.written,
        summary.skipped,
        summary.failed,
    );
    Ok(())
}

fn report_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Written { job, size } => log::info!(
            "  {} {} -> {}.bin ({}x{})",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            job.source_name(),
            job.checksum,
            size.width,
            size.height,
        ),
        JobOutcome::Failed { job, error } => log::error!(
            "  {} {} -> {}.bin: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            job.source_name(),
            job.checksum,
            error,
        ),
    }
}
