//! Duplicate groups and primary-root diff analysis.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] is a snapshot of one index entry holding two or more
//! paths. In diff mode, [`deletable_candidates`] picks, from groups that
//! contain at least one path under the primary root, every path outside it:
//! the same content already exists under the primary root, so those copies
//! are redundant. Groups with no primary path are ignored.
//!
//! # Example
//!
//! ```
//! use dupscan::duplicates::{deletable_candidates, DuplicateGroup};
//! use std::path::{Path, PathBuf};
//!
//! let groups = vec![DuplicateGroup::new(
//!     [0u8; 32],
//!     vec![PathBuf::from("/A/x"), PathBuf::from("/B/z")],
//! )];
//!
//! let deletable = deletable_candidates(&groups, Path::new("/A"));
//! assert_eq!(deletable, vec![PathBuf::from("/B/z")]);
//! ```

use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, Hash};

/// Files sharing one content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content digest shared by every path
    pub hash: Hash,
    /// Paths with this content, in hashing completion order unless sorted
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, paths: Vec<PathBuf>) -> Self {
        Self { hash, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Sort paths lexicographically.
    pub fn sort_paths(&mut self) {
        self.paths.sort();
    }

    /// Check if any path of this group lies under `root`.
    #[must_use]
    pub fn has_path_under(&self, root: &Path) -> bool {
        self.paths.iter().any(|p| is_under_root(p, root))
    }

    /// Paths of this group that do not lie under `root`.
    pub fn paths_outside<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.paths.iter().filter(move |p| !is_under_root(p, root))
    }
}

/// Check if `path` lies under `root`, comparing whole components.
///
/// `/data/a/x` is under `/data/a`; `/data/a2/x` is not.
#[must_use]
pub fn is_under_root(path: &Path, root: &Path) -> bool {
    if cfg!(windows) {
        // Windows is case-insensitive.
        let p = PathBuf::from(path.to_string_lossy().to_lowercase());
        let r = PathBuf::from(root.to_string_lossy().to_lowercase());
        p.starts_with(r)
    } else {
        path.starts_with(root)
    }
}

/// Sort groups by digest and the paths inside each group.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    for group in groups.iter_mut() {
        group.sort_paths();
    }
    groups.sort_by(|a, b| a.hash.cmp(&b.hash));
}

/// Paths outside `primary` whose content also exists under `primary`.
///
/// Only groups with at least one path under `primary` contribute. The result
/// is sorted.
#[must_use]
pub fn deletable_candidates(groups: &[DuplicateGroup], primary: &Path) -> Vec<PathBuf> {
    let mut deletable: Vec<PathBuf> = groups
        .iter()
        .filter(|g| g.len() > 1 && g.has_path_under(primary))
        .flat_map(|g| g.paths_outside(primary).cloned())
        .collect();
    deletable.sort();
    deletable
}
