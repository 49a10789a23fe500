//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Concurrent scan coordination with bounded listing and hashing pools
//! - The shared digest → paths index
//! - Duplicate groups and the primary/secondary diff analysis
//! - Run orchestration for both report modes

pub mod coordinator;
pub mod finder;
pub mod groups;
pub mod index;

pub use coordinator::{
    CoordinatorConfig, CoordinatorStats, ScanCoordinator, TaskGroup, TaskTicket,
    DEFAULT_HASH_CONCURRENCY, DEFAULT_SCAN_CONCURRENCY,
};
pub use finder::{DuplicateFinder, FinderError, RunPhase, ScanSummary};
pub use groups::{deletable_candidates, is_under_root, sort_groups, DuplicateGroup};
pub use index::DuplicateIndex;
