//! Logging setup on top of the `log` facade and `env_logger`.
//!
//! Log records go to stderr so they never mix with the report on stdout.
//! The level comes from, in priority order:
//!
//! 1. The `RUST_LOG` environment variable, if set
//! 2. `--quiet` (errors only) or `-v` / `-vv` (debug / trace)
//! 3. Info level
//!
//! At trace level each line carries the worker thread name
//! (`dupscan-scan-N`, `dupscan-hash-N`), which shows which pool did the work.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupscan::logging::init_logging;
//!
//! init_logging(1, false);
//! log::debug!("visible with -v");
//! ```

use std::env;
use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Install the global logger for the given CLI verbosity.
///
/// A second call is ignored, which keeps tests that run the app repeatedly
/// from panicking.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var_os("RUST_LOG").is_some();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    if from_env {
        log::debug!("Logging configured from RUST_LOG");
    } else {
        log::debug!("Logging initialized at level: {:?}", level);
    }
}

/// Map CLI flags to a level filter. `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let style = buf.default_level_style(record.level());
            let timestamp = buf.timestamp_millis();
            match verbose {
                0 => writeln!(
                    buf,
                    "{timestamp} {style}{:<5}{style:#} {}",
                    record.level(),
                    record.args()
                ),
                1 => writeln!(
                    buf,
                    "{timestamp} {style}{:<5}{style:#} [{}] {}",
                    record.level(),
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                ),
                _ => writeln!(
                    buf,
                    "{timestamp} {style}{:<5}{style:#} [{}] ({}) {}",
                    record.level(),
                    record.module_path().unwrap_or("unknown"),
                    std::thread::current().name().unwrap_or("main"),
                    record.args()
                ),
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        builder.format(move |buf, record| {
            let style = buf.default_level_style(record.level());
            if verbose >= 2 {
                writeln!(
                    buf,
                    "{style}{:<5}{style:#} ({}) {}",
                    record.level(),
                    std::thread::current().name().unwrap_or("main"),
                    record.args()
                )
            } else {
                writeln!(buf, "{style}{:<5}{style:#} {}", record.level(), record.args())
            }
        });
    }
}
