//! Streaming 256-bit file hasher.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing content digests
//! of whole files with a fixed-size read buffer, so memory use does not grow
//! with file size. Two algorithms are available, both producing 32 bytes:
//!
//! - [`HashAlgorithm::Sha256`] (default)
//! - [`HashAlgorithm::Blake3`]
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::{hash_to_hex, HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_algorithm(HashAlgorithm::Blake3);
//! let hash = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fmt::Write as _;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// A 256-bit content digest.
pub type Hash = [u8; 32];

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest accepted read buffer.
const MIN_BUFFER_SIZE: usize = 512;

/// Digest algorithm used for content fingerprints.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// BLAKE3 (256-bit output)
    Blake3,
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Hash accumulator for one file, owned by the task hashing it.
enum Accumulator {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(bytes),
            Self::Blake3(h) => {
                h.update(bytes);
            }
        }
    }

    fn finalize(self) -> Hash {
        match self {
            Self::Sha256(h) => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&h.finalize());
                out
            }
            Self::Blake3(h) => *h.finalize().as_bytes(),
        }
    }
}

/// File content hasher.
///
/// Cheap to copy; each call to [`Hasher::full_hash`] allocates its own
/// buffer and accumulator, so one `Hasher` can be shared by all hashing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a SHA-256 hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read buffer size in bytes (at least 512).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    /// Configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Configured read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Open`] if the file cannot be opened and
    /// [`HashError::Read`] if reading fails part way through.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.hash_reader(file).map_err(|source| HashError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Hash everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> std::io::Result<Hash> {
        let mut acc = Accumulator::new(self.algorithm);
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => acc.update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(acc.finalize())
    }

    /// Hash an in-memory byte slice.
    #[must_use]
    pub fn hash_bytes(&self, bytes: &[u8]) -> Hash {
        let mut acc = Accumulator::new(self.algorithm);
        acc.update(bytes);
        acc.finalize()
    }
}

/// Render a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Parse a 64-character hexadecimal string back into a digest.
///
/// Returns `None` for the wrong length or non-hex characters.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(hash)
}
