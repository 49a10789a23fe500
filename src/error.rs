//! Process exit codes.

/// Exit codes for the dupscan binary.
///
/// - 0: Success (report printed, even if empty)
/// - 1: General error (the run aborted; nothing was printed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run completed and its report was printed.
    Success = 0,
    /// The run aborted.
    GeneralError = 1,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix used in error messages.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
        }
    }
}
