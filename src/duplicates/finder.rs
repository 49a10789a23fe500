//! Run orchestration for single-root reports and two-root diffs.
//!
//! # Overview
//!
//! A run moves through [`RunPhase`]s:
//!
//! ```text
//! Idle → Scanning(primary) → [Scanning(secondary)] → Draining → Reporting → Done
//!                     any error ──────────────────────────────→ Aborted
//! ```
//!
//! Each run gets its own [`DuplicateIndex`] and [`ScanCoordinator`], so
//! concurrent runs (for example in tests) never share state. In two-root
//! mode both roots accumulate into the same index, which is what lets a
//! secondary copy land in the same group as its primary original.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::DuplicateFinder;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (deletable, summary) = finder
//!     .find_deletable(Path::new("/photos"), Path::new("/backup/photos"))
//!     .unwrap();
//! for path in &deletable {
//!     println!("{}", path.display());
//! }
//! println!("{} files hashed", summary.total_files);
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::coordinator::{CoordinatorConfig, ScanCoordinator};
use super::groups::{deletable_candidates, is_under_root, sort_groups, DuplicateGroup};
use super::index::DuplicateIndex;
use crate::scanner::ScanError;

/// Errors that end a run.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A root directory does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A root exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The two roots overlap, so some files would be hashed twice.
    #[error("Directories overlap: {secondary} and {primary}")]
    OverlappingRoots {
        /// Primary root
        primary: PathBuf,
        /// Secondary root
        secondary: PathBuf,
    },

    /// The worker pools could not be started.
    #[error("Failed to start worker pools: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A directory listing or file hash failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Lifecycle of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    /// Nothing dispatched yet
    Idle,
    /// Walking and hashing one root
    Scanning(PathBuf),
    /// Waiting for hash tasks still in flight
    Draining,
    /// Building the report from the quiescent index
    Reporting,
    /// Report produced
    Done,
    /// A fatal error ended the run
    Aborted,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scanning(root) => write!(f, "scanning {}", root.display()),
            Self::Draining => write!(f, "draining"),
            Self::Reporting => write!(f, "reporting"),
            Self::Done => write!(f, "done"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files hashed across all roots
    pub total_files: usize,
    /// Directories listed across all roots
    pub directories_scanned: usize,
    /// Groups of two or more identical files
    pub duplicate_groups: usize,
    /// Redundant copies (group size minus one, summed)
    pub duplicate_files: usize,
}

/// Finds duplicate files by content.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: CoordinatorConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given coordinator configuration.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self { config }
    }

    /// Create a finder with default ceilings and SHA-256.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Scan `root` and return every group of identical files.
    ///
    /// Groups are sorted by digest and paths within a group are sorted.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not an existing directory or if any directory
    /// listing or file hash fails. No groups are returned on failure.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        validate_root(root)?;
        let mut run = Run::start(&self.config)?;

        run.scan(root)?;
        run.drain()?;

        run.advance(RunPhase::Reporting);
        let mut groups = run.index.duplicate_groups();
        sort_groups(&mut groups);
        let summary = summarize(&run.index, &groups, run.directories_scanned);
        run.advance(RunPhase::Done);

        Ok((groups, summary))
    }

    /// Scan `primary` then `secondary` into one index and return the
    /// secondary copies of content present under `primary`.
    ///
    /// Both roots are resolved to their canonical form first, and that form
    /// is used for scanning and for deciding what lies under `primary`, so
    /// reported paths are absolute. `secondary` may contain `primary`; the
    /// primary subtree is then skipped during the secondary scan.
    ///
    /// The result is sorted. Groups lying wholly outside `primary` are not
    /// reported.
    ///
    /// # Errors
    ///
    /// Fails if either root is not an existing directory, if `secondary` is
    /// `primary` or lies inside it, or if any directory listing or file hash
    /// fails.
    pub fn find_deletable(
        &self,
        primary: &Path,
        secondary: &Path,
    ) -> Result<(Vec<PathBuf>, ScanSummary), FinderError> {
        validate_root(primary)?;
        validate_root(secondary)?;
        let primary = canonical_root(primary)?;
        let secondary = canonical_root(secondary)?;
        check_overlap(&primary, &secondary)?;
        let mut run = Run::start(&self.config)?;

        run.scan(&primary)?;
        if is_under_root(&primary, &secondary) {
            run.coordinator.exclude(&primary);
        }
        run.scan(&secondary)?;
        run.drain()?;

        run.advance(RunPhase::Reporting);
        let groups = run.index.duplicate_groups();
        let deletable = deletable_candidates(&groups, &primary);
        let summary = summarize(&run.index, &groups, run.directories_scanned);
        log::info!(
            "{} of {} duplicate groups have copies outside {}",
            groups.iter().filter(|g| g.has_path_under(&primary)).count(),
            groups.len(),
            primary.display()
        );
        run.advance(RunPhase::Done);

        Ok((deletable, summary))
    }
}

/// State of one run in progress.
struct Run {
    phase: RunPhase,
    index: Arc<DuplicateIndex>,
    coordinator: ScanCoordinator,
    directories_scanned: usize,
}

impl Run {
    fn start(config: &CoordinatorConfig) -> Result<Self, FinderError> {
        let index = Arc::new(DuplicateIndex::new());
        let coordinator = ScanCoordinator::new(*config, Arc::clone(&index))?;
        Ok(Self {
            phase: RunPhase::Idle,
            index,
            coordinator,
            directories_scanned: 0,
        })
    }

    fn advance(&mut self, next: RunPhase) {
        log::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Walk `root`, waiting until its scan and hash tasks are done before
    /// the next root starts.
    fn scan(&mut self, root: &Path) -> Result<(), FinderError> {
        self.advance(RunPhase::Scanning(root.to_path_buf()));
        log::info!("Scanning {}", root.display());

        self.coordinator.scan_root(root);
        let stats = match self.coordinator.wait() {
            Ok(stats) => stats,
            Err(e) => return Err(self.abort(e)),
        };
        self.directories_scanned = stats.directories_scanned;

        log::info!(
            "Finished {}: {} directories, {} files hashed so far",
            root.display(),
            stats.directories_scanned,
            stats.files_hashed
        );
        log::debug!(
            "Peak concurrency: {} listings, {} hashes",
            stats.peak_scans,
            stats.peak_hashes
        );
        Ok(())
    }

    fn drain(&mut self) -> Result<(), FinderError> {
        self.advance(RunPhase::Draining);
        match self.coordinator.wait() {
            Ok(_) => Ok(()),
            Err(e) => Err(self.abort(e)),
        }
    }

    fn abort(&mut self, err: ScanError) -> FinderError {
        self.advance(RunPhase::Aborted);
        FinderError::Scan(err)
    }
}

fn validate_root(root: &Path) -> Result<(), FinderError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FinderError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(FinderError::PathNotFound(root.to_path_buf()))
        }
        Err(source) => Err(ScanError::ListDir {
            path: root.to_path_buf(),
            source,
        }
        .into()),
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf, FinderError> {
    fs::canonicalize(root).map_err(|source| {
        FinderError::from(ScanError::ListDir {
            path: root.to_path_buf(),
            source,
        })
    })
}

/// Reject a secondary root equal to or inside the primary root. Both paths
/// must already be canonical.
fn check_overlap(primary: &Path, secondary: &Path) -> Result<(), FinderError> {
    if is_under_root(secondary, primary) {
        return Err(FinderError::OverlappingRoots {
            primary: primary.to_path_buf(),
            secondary: secondary.to_path_buf(),
        });
    }
    Ok(())
}

fn summarize(
    index: &DuplicateIndex,
    groups: &[DuplicateGroup],
    directories_scanned: usize,
) -> ScanSummary {
    ScanSummary {
        total_files: index.file_count(),
        directories_scanned,
        duplicate_groups: groups.len(),
        duplicate_files: groups.iter().map(|g| g.len() - 1).sum(),
    }
}
