//! Single-directory listing.
//!
//! # Overview
//!
//! [`list_directory`] reads the immediate entries of one directory and
//! classifies them into regular files and subdirectories. It never recurses:
//! recursion is driven by the coordinator, which dispatches one task per
//! discovered subdirectory so that listings run concurrently.
//!
//! Entries are classified by their own file type. Symbolic links are not
//! followed and, together with devices, sockets and FIFOs, are skipped.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{list_directory, DirItem};
//! use std::path::Path;
//!
//! for item in list_directory(Path::new("/tmp")).unwrap() {
//!     match item {
//!         DirItem::File(path) => println!("file {}", path.display()),
//!         DirItem::Dir(path) => println!("dir  {}", path.display()),
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::ScanError;

/// One entry discovered while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirItem {
    /// A regular file to hash
    File(PathBuf),
    /// A subdirectory to scan
    Dir(PathBuf),
}

impl DirItem {
    /// Path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Dir(p) => p,
        }
    }
}

/// List the immediate entries of `dir`.
///
/// Each returned path is `dir` joined with the entry name. Order follows
/// the operating system's listing order and is not sorted.
///
/// # Errors
///
/// Returns [`ScanError::ListDir`] if the directory cannot be opened or if
/// any entry (or its file type) cannot be read. There is no partial result.
pub fn list_directory(dir: &Path) -> Result<Vec<DirItem>, ScanError> {
    let list_err = |source: std::io::Error| ScanError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut items = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let file_type = entry.file_type().map_err(list_err)?;
        let path = entry.path();

        if file_type.is_file() {
            items.push(DirItem::File(path));
        } else if file_type.is_dir() {
            items.push(DirItem::Dir(path));
        } else {
            log::trace!("Skipping non-regular entry: {}", path.display());
        }
    }

    log::debug!("Listed {}: {} entries", dir.display(), items.len());
    Ok(items)
}
