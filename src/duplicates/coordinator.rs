//! Bounded, self-terminating scan pipeline.
//!
//! # Overview
//!
//! The [`ScanCoordinator`] fans out one task per discovered directory and one
//! per discovered file. Two dedicated rayon pools bound how many of each run
//! at once (20 directory listings and 4 file hashes by default), so listing
//! and hashing never compete for the same slots. A task waits in its pool's
//! queue until a worker frees.
//!
//! Outstanding work is tracked by two [`TaskGroup`]s. A [`TaskTicket`] is
//! taken when a task is dispatched and released when the task ends, on every
//! exit path. Directory tasks register their children before releasing their
//! own ticket, so once the scan group drains no further hash task can appear
//! and the hash group's count is final. [`ScanCoordinator::wait`] relies on
//! this: it drains scans, then hashes, and confirms both are zero.
//!
//! # Failure
//!
//! Errors are values. The first failing task stores its error in the run's
//! failure slot; from then on tasks that have not started their I/O return
//! immediately and directory tasks stop dispatching children. `wait` returns
//! the stored error once everything drained.
//!
//! # Exclusions
//!
//! A directory passed to [`ScanCoordinator::exclude`] is never descended
//! into by later scans. A diff run uses this to skip the primary tree when
//! the secondary root contains it.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::{CoordinatorConfig, DuplicateIndex, ScanCoordinator};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let index = Arc::new(DuplicateIndex::new());
//! let coordinator = ScanCoordinator::new(CoordinatorConfig::default(), Arc::clone(&index)).unwrap();
//!
//! coordinator.scan_root(Path::new("/srv/photos"));
//! let stats = coordinator.wait().unwrap();
//! println!("{} files hashed, {} groups", stats.files_hashed, index.duplicate_groups().len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use super::index::DuplicateIndex;
use crate::scanner::{hash_to_hex, list_directory, DirItem, Hasher, ScanError};

/// Default ceiling for concurrent directory listings.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 20;

/// Default ceiling for concurrent file hashes.
pub const DEFAULT_HASH_CONCURRENCY: usize = 4;

/// Configuration for a [`ScanCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum directory listings in flight.
    pub scan_concurrency: usize,
    /// Maximum file hashes in flight.
    pub hash_concurrency: usize,
    /// Hasher shared by every hash task.
    pub hasher: Hasher,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            hash_concurrency: DEFAULT_HASH_CONCURRENCY,
            hasher: Hasher::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Set the directory listing ceiling (at least 1).
    #[must_use]
    pub fn with_scan_concurrency(mut self, n: usize) -> Self {
        self.scan_concurrency = n.max(1);
        self
    }

    /// Set the file hashing ceiling (at least 1).
    #[must_use]
    pub fn with_hash_concurrency(mut self, n: usize) -> Self {
        self.hash_concurrency = n.max(1);
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }
}

/// Counter of outstanding tasks of one kind, with a drain signal.
#[derive(Debug)]
pub struct TaskGroup {
    kind: &'static str,
    pending: Mutex<usize>,
    drained: Condvar,
}

impl TaskGroup {
    /// Create an empty group labelled `kind` (used in logs).
    #[must_use]
    pub fn new(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            pending: Mutex::new(0),
            drained: Condvar::new(),
        })
    }

    /// Register one task; the returned ticket completes it when dropped.
    #[must_use]
    pub fn register(self: &Arc<Self>) -> TaskTicket {
        *self.lock() += 1;
        TaskTicket {
            group: Arc::clone(self),
        }
    }

    /// Number of registered tasks that have not completed.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.lock()
    }

    /// Block until the pending count is zero.
    pub fn wait_drained(&self) {
        let mut pending = self.lock();
        while *pending > 0 {
            pending = self
                .drained
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
        log::trace!("All {} tasks drained", self.kind);
    }

    fn complete(&self) {
        let mut pending = self.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof of one registered task. Dropping it marks the task complete.
#[derive(Debug)]
pub struct TaskTicket {
    group: Arc<TaskGroup>,
}

impl Drop for TaskTicket {
    fn drop(&mut self) {
        self.group.complete();
    }
}

/// Counters reported by [`ScanCoordinator::wait`]. Cumulative over all roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Directories listed successfully
    pub directories_scanned: usize,
    /// Files hashed and recorded in the index
    pub files_hashed: usize,
    /// Most directory listings observed running at once
    pub peak_scans: usize,
    /// Most file hashes observed running at once
    pub peak_hashes: usize,
}

/// Gauge of tasks currently doing I/O, remembering the high-water mark.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard { gauge: self }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct InFlightGuard<'a> {
    gauge: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State shared by every task of one run.
struct RunState {
    index: Arc<DuplicateIndex>,
    hasher: Hasher,
    scan_pool: ThreadPool,
    hash_pool: ThreadPool,
    scans: Arc<TaskGroup>,
    hashes: Arc<TaskGroup>,
    failed: AtomicBool,
    failure: Mutex<Option<ScanError>>,
    excluded: Mutex<Vec<PathBuf>>,
    directories_scanned: AtomicUsize,
    files_hashed: AtomicUsize,
    active_scans: InFlight,
    active_hashes: InFlight,
}

impl RunState {
    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Record `err` if it is the first failure of the run.
    fn fail(&self, err: ScanError) {
        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.failed.swap(true, Ordering::SeqCst) {
            log::error!("Aborting scan: {}", err);
            *slot = Some(err);
        } else {
            log::debug!("Suppressed error after abort: {}", err);
        }
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        self.excluded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|excluded| excluded == dir)
    }

    fn take_failure(&self) -> Option<ScanError> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Drives concurrent directory scans and file hashes into one index.
///
/// One coordinator belongs to one run. Several roots can be scanned through
/// it in sequence; they all accumulate into the same index.
///
/// [`ScanCoordinator::wait`] must not be called from inside one of the
/// coordinator's own pools.
pub struct ScanCoordinator {
    state: Arc<RunState>,
}

impl std::fmt::Debug for ScanCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCoordinator")
            .field("pending_scans", &self.state.scans.pending())
            .field("pending_hashes", &self.state.hashes.pending())
            .field("failed", &self.state.is_failed())
            .finish()
    }
}

impl ScanCoordinator {
    /// Build the two worker pools for a run writing into `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if either thread pool cannot be created.
    pub fn new(
        config: CoordinatorConfig,
        index: Arc<DuplicateIndex>,
    ) -> Result<Self, ThreadPoolBuildError> {
        let scan_pool = ThreadPoolBuilder::new()
            .num_threads(config.scan_concurrency.max(1))
            .thread_name(|i| format!("dupscan-scan-{i}"))
            .build()?;
        let hash_pool = ThreadPoolBuilder::new()
            .num_threads(config.hash_concurrency.max(1))
            .thread_name(|i| format!("dupscan-hash-{i}"))
            .build()?;

        log::debug!(
            "Coordinator: {} scan workers, {} hash workers, {}",
            scan_pool.current_num_threads(),
            hash_pool.current_num_threads(),
            config.hasher.algorithm()
        );

        Ok(Self {
            state: Arc::new(RunState {
                index,
                hasher: config.hasher,
                scan_pool,
                hash_pool,
                scans: TaskGroup::new("scan"),
                hashes: TaskGroup::new("hash"),
                failed: AtomicBool::new(false),
                failure: Mutex::new(None),
                excluded: Mutex::new(Vec::new()),
                directories_scanned: AtomicUsize::new(0),
                files_hashed: AtomicUsize::new(0),
                active_scans: InFlight::default(),
                active_hashes: InFlight::default(),
            }),
        })
    }

    /// Dispatch a scan of `root` and everything below it.
    pub fn scan_root(&self, root: &Path) {
        dispatch_scan(&self.state, root.to_path_buf());
    }

    /// Skip `dir` and everything below it in scans dispatched from now on.
    ///
    /// Matching is by exact path, so `dir` must be spelled the way the walk
    /// reaches it (child paths are the parent joined with the entry name).
    pub fn exclude(&self, dir: &Path) {
        log::debug!("Excluding {} from further scans", dir.display());
        self.state
            .excluded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dir.to_path_buf());
    }

    /// Dispatch a hash of the single file at `path`.
    pub fn hash_file(&self, path: &Path) {
        dispatch_hash(&self.state, path.to_path_buf());
    }

    /// Outstanding `(scans, hashes)`.
    #[must_use]
    pub fn pending(&self) -> (usize, usize) {
        (self.state.scans.pending(), self.state.hashes.pending())
    }

    /// Block until every dispatched task of both kinds has completed.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any task. Once a run has failed,
    /// later calls return [`ScanError::Aborted`].
    pub fn wait(&self) -> Result<CoordinatorStats, ScanError> {
        let state = &self.state;
        loop {
            state.scans.wait_drained();
            state.hashes.wait_drained();
            if state.scans.pending() == 0 && state.hashes.pending() == 0 {
                break;
            }
        }

        if state.is_failed() {
            return Err(state.take_failure().unwrap_or(ScanError::Aborted));
        }

        Ok(CoordinatorStats {
            directories_scanned: state.directories_scanned.load(Ordering::SeqCst),
            files_hashed: state.files_hashed.load(Ordering::SeqCst),
            peak_scans: state.active_scans.peak(),
            peak_hashes: state.active_hashes.peak(),
        })
    }
}

fn dispatch_scan(state: &Arc<RunState>, dir: PathBuf) {
    let ticket = state.scans.register();
    let task_state = Arc::clone(state);
    state.scan_pool.spawn(move || {
        let _ticket = ticket;
        run_scan(&task_state, &dir);
    });
}

fn dispatch_hash(state: &Arc<RunState>, path: PathBuf) {
    let ticket = state.hashes.register();
    let task_state = Arc::clone(state);
    state.hash_pool.spawn(move || {
        let _ticket = ticket;
        run_hash(&task_state, path);
    });
}

fn run_scan(state: &Arc<RunState>, dir: &Path) {
    if state.is_failed() {
        return;
    }

    let listed = {
        let _active = state.active_scans.enter();
        list_directory(dir)
    };
    let items = match listed {
        Ok(items) => items,
        Err(e) => {
            state.fail(e);
            return;
        }
    };
    state.directories_scanned.fetch_add(1, Ordering::SeqCst);

    for item in items {
        if state.is_failed() {
            return;
        }
        match item {
            DirItem::File(path) => dispatch_hash(state, path),
            DirItem::Dir(path) if state.is_excluded(&path) => {
                log::trace!("Skipping excluded {}", path.display());
            }
            DirItem::Dir(path) => dispatch_scan(state, path),
        }
    }
}

fn run_hash(state: &RunState, path: PathBuf) {
    if state.is_failed() {
        return;
    }

    let hashed = {
        let _active = state.active_hashes.enter();
        state.hasher.full_hash(&path)
    };
    match hashed {
        Ok(hash) => {
            log::trace!("{} {}", hash_to_hex(&hash), path.display());
            state.index.insert(hash, path);
            state.files_hashed.fetch_add(1, Ordering::SeqCst);
        }
        Err(e) => state.fail(e.into()),
    }
}
