//! Plain text report writer.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::duplicates::DuplicateGroup;

/// Writes reports line by line to an underlying writer.
#[derive(Debug)]
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    /// Wrap `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write every group with more than one path.
    ///
    /// ```text
    /// key:2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae
    ///     /A/x
    ///     /A/y
    /// ```
    ///
    /// Returns the number of groups written.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_groups(&mut self, groups: &[DuplicateGroup]) -> io::Result<usize> {
        let mut written = 0;
        for group in groups.iter().filter(|g| g.len() > 1) {
            writeln!(self.out, "key:{}", group.hash_hex())?;
            for path in &group.paths {
                writeln!(self.out, "    {}", path.display())?;
            }
            written += 1;
        }
        self.out.flush()?;
        Ok(written)
    }

    /// Write one deletable candidate per line.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_deletable(&mut self, paths: &[PathBuf]) -> io::Result<usize> {
        for path in paths {
            writeln!(self.out, "{}", path.display())?;
        }
        self.out.flush()?;
        Ok(paths.len())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
