//! dupscan - content-based duplicate file finder
//!
//! Walks one or two directory trees concurrently, hashes every regular file
//! and groups paths by digest. With a single root it prints each group of
//! identical files; with a second root it prints the copies in that tree
//! whose content already exists in the first one. Nothing is ever deleted.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::TextReport;

/// Run the application for parsed CLI arguments, printing to stdout.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the current directory
/// cannot be determined, or the scan aborts. Nothing is printed to stdout
/// in that case.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(&cli).context("Invalid configuration")?;
    log::debug!("Configuration: {:?}", config);

    let dir = resolve_root(cli.dir)?;

    let stdout = std::io::stdout();
    run_report(&dir, cli.compare.as_deref(), &config, stdout.lock())
}

/// Scan and write the report for `dir` (and optionally `compare`) to `out`.
///
/// Without `compare`, every duplicate group under `dir` is written. With
/// `compare`, the paths under `compare` whose content exists under `dir`
/// are written.
///
/// # Errors
///
/// Returns an error if the scan aborts or writing fails. The report is only
/// written after the scan completed, so a failed scan writes nothing.
pub fn run_report<W: Write>(
    dir: &Path,
    compare: Option<&Path>,
    config: &Config,
    out: W,
) -> Result<ExitCode> {
    let finder = DuplicateFinder::new(config.coordinator_config());
    let mut report = TextReport::new(out);

    match compare {
        None => {
            let (groups, summary) = finder
                .find_duplicates(dir)
                .with_context(|| format!("Scan of {} failed", dir.display()))?;
            report
                .write_groups(&groups)
                .context("Failed to write report")?;
            log::info!(
                "{} files, {} duplicate groups, {} redundant copies",
                summary.total_files,
                summary.duplicate_groups,
                summary.duplicate_files
            );
        }
        Some(compare) => {
            let (deletable, summary) = finder
                .find_deletable(dir, compare)
                .with_context(|| {
                    format!("Comparison of {} against {} failed", compare.display(), dir.display())
                })?;
            report
                .write_deletable(&deletable)
                .context("Failed to write report")?;
            log::info!(
                "{} files, {} deletable under {}",
                summary.total_files,
                deletable.len(),
                compare.display()
            );
        }
    }

    Ok(ExitCode::Success)
}

/// Resolve the primary root: the given directory or the current directory.
///
/// # Errors
///
/// Returns an error if no directory is given and the current directory
/// cannot be read.
pub fn resolve_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}
