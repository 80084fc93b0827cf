use std::fmt;

/// Stable code attached to snapshot-collaborator failures.
pub const SNAPSHOT_FAILED: &str = "SNAPSHOT_FAILED";

/// Machine-readable validation codes, one per rejected query input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    KeywordRequired,
    AuthorRequired,
    TagRequired,
    QueryRequired,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::KeywordRequired => "KEYWORD_REQUIRED",
            ValidationCode::AuthorRequired => "AUTHOR_REQUIRED",
            ValidationCode::TagRequired => "TAG_REQUIRED",
            ValidationCode::QueryRequired => "QUERY_REQUIRED",
        }
    }

    /// Name of the offending caller-facing field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationCode::KeywordRequired => "keyword",
            ValidationCode::AuthorRequired => "author",
            ValidationCode::TagRequired => "tagName",
            ValidationCode::QueryRequired => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Malformed caller input. Carries the code and the field it names,
    /// surfaced to the caller unwrapped.
    Validation {
        code: ValidationCode,
        field: &'static str,
    },
    /// Failure obtaining the post snapshot from the external collaborator.
    Snapshot,
    InvalidState,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Validation { code, field } => {
                write!(f, "{} (field: {})", code.as_str(), field)
            }
            ErrorKind::Snapshot => write!(f, "{}", SNAPSHOT_FAILED),
            ErrorKind::InvalidState => write!(f, "INVALID_STATE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn validation(code: ValidationCode, context: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Validation {
                code,
                field: code.field(),
            },
            context: context.into(),
        }
    }

    pub fn snapshot(context: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Snapshot,
            context: context.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
