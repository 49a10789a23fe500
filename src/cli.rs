//! Command-line interface definitions for dupscan.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate groups under the current directory
//! dupscan
//!
//! # Report duplicate groups under one directory
//! dupscan --dir ~/Pictures
//!
//! # List copies under ~/Backup that already exist under ~/Pictures
//! dupscan --dir ~/Pictures --compare ~/Backup
//!
//! # Verbose mode for debugging
//! dupscan -v --dir ~/Pictures
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Content-based duplicate file finder.
///
/// Without --compare, prints every group of identical files under --dir.
/// With --compare, prints the files under the compared directory whose
/// content already exists under --dir. Nothing is ever deleted.
#[derive(Debug, Parser)]
#[command(name = "dupscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the scan (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Directory to compare against the root; enables the deletable report
    #[arg(long, value_name = "DIR")]
    pub compare: Option<PathBuf>,

    /// Number of directories listed in parallel (default: 20)
    #[arg(long, value_name = "N")]
    pub scan_threads: Option<usize>,

    /// Number of files hashed in parallel (default: 4)
    #[arg(long, value_name = "N")]
    pub hash_threads: Option<usize>,

    /// Content digest algorithm (default: sha256)
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<HashAlgorithm>,

    /// Read buffer size in bytes used while hashing (default: 65536)
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
