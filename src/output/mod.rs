//! Output formatters for scan results.
//!
//! Reports are plain human-readable text written to any [`std::io::Write`]:
//! - Duplicate groups: a `key:<digest>` header followed by indented paths
//! - Deletable candidates: one bare path per line
//!
//! # Example
//!
//! ```no_run
//! use dupscan::duplicates::DuplicateFinder;
//! use dupscan::output::TextReport;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let stdout = std::io::stdout();
//! TextReport::new(stdout.lock()).write_groups(&groups).unwrap();
//! ```

pub mod text;

// Re-export main types
pub use text::TextReport;
