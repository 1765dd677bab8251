use std::fmt;

/// Machine-readable error codes surfaced by the CLI and by embedding apps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ConfigInvalid,
    SnapshotUnreadable,
    RecordNotFound,
    InvalidTag,
    InvalidPageSize,
    InvalidPasswordPolicy,
    BatchPartialFailure,
    ExportFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ConfigInvalid => "E1002",
            Self::SnapshotUnreadable => "E1003",
            Self::RecordNotFound => "E2001",
            Self::InvalidTag => "E2002",
            Self::InvalidPageSize => "E2003",
            Self::InvalidPasswordPolicy => "E2004",
            Self::BatchPartialFailure => "E3001",
            Self::ExportFailed => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigInvalid => "Config value out of range",
            Self::SnapshotUnreadable => "Record snapshot could not be read",
            Self::RecordNotFound => "Record not found",
            Self::InvalidTag => "Unknown category value",
            Self::InvalidPageSize => "Page size must be positive",
            Self::InvalidPasswordPolicy => "Invalid password policy",
            Self::BatchPartialFailure => "Batch action partially failed",
            Self::ExportFailed => "CSV export failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in ume.toml and retry."),
            Self::ConfigInvalid => {
                Some("Use a page size >= 1 and a password length between 8 and 24.")
            }
            Self::SnapshotUnreadable => Some("Pass a JSON array of records with --file."),
            Self::RecordNotFound => None,
            Self::InvalidTag => Some("Use one of the documented category values."),
            Self::InvalidPageSize => Some("Pass --page-size 1 or greater."),
            Self::InvalidPasswordPolicy => {
                Some("Password length must be between 8 and 24 characters.")
            }
            Self::BatchPartialFailure => {
                Some("Items processed before the failure were kept; retry the failed IDs.")
            }
            Self::ExportFailed => Some("Check the output path and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while configuring a view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// A page size of zero was requested.
    #[error("page size must be at least 1")]
    ZeroPageSize,

    /// A password policy length fell outside the accepted range.
    #[error("password length {length} is outside {min}..={max}")]
    PasswordLength { length: usize, min: usize, max: usize },
}

impl ViewError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ZeroPageSize => ErrorCode::InvalidPageSize,
            Self::PasswordLength { .. } => ErrorCode::InvalidPasswordPolicy,
        }
    }
}

/// Failure reported by a [`RecordActions`](crate::batch::RecordActions) backend
/// for a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("record '{0}' not found")]
    NotFound(String),

    #[error("record '{id}' rejected the change: {reason}")]
    Rejected { id: String, reason: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors raised while writing CSV output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("CSV delimiter {0:?} must be a single ASCII character")]
    Delimiter(char),
}
