//! Scanner module for directory listing and file hashing.
//!
//! This module provides the two leaf operations of a scan:
//! - Listing the immediate entries of one directory
//! - Content hashing of one regular file (SHA-256 or BLAKE3)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Single-directory listing and entry classification
//! - [`hasher`]: Streaming 256-bit file hashing
//!
//! Neither submodule spawns work on its own. Fan-out, throttling and
//! completion tracking live in [`crate::duplicates::coordinator`].
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{list_directory, DirItem, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! for item in list_directory(Path::new(".")).unwrap() {
//!     if let DirItem::File(path) = item {
//!         let hash = hasher.full_hash(&path).unwrap();
//!         println!("{} {}", dupscan::scanner::hash_to_hex(&hash), path.display());
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{hash_to_hex, hex_to_hash, Hash, HashAlgorithm, Hasher, DEFAULT_BUFFER_SIZE};
pub use walker::{list_directory, DirItem};

/// Errors that can occur while listing a directory.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The directory could not be opened, or one of its entries could not be read.
    #[error("Failed to list directory {path}: {source}")]
    ListDir {
        /// Directory that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A discovered file could not be hashed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The run already failed and its error was reported.
    #[error("Scan aborted after an earlier failure")]
    Aborted,
}

impl ScanError {
    /// Path of the entry that caused the failure, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ListDir { path, .. } => Some(path),
            Self::Hash(e) => Some(e.path()),
            Self::Aborted => None,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened (missing, permission denied, ...).
    #[error("Failed to open {path}: {source}")]
    Open {
        /// File that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file was opened but reading its content failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Path of the file that could not be hashed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }
}
