use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns `true` when the error was raised while acquiring the underlying
    /// resource (opening a file, running a query), i.e. before any element
    /// was produced.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Open { .. } | ErrorKind::QueryRead { .. }
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn open(path: &Path, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Open {
                path: path.display().to_string(),
                source,
            }
            .into(),
        )
    }

    pub fn read(path: &Path, line: u64, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Read {
                path: path.display().to_string(),
                line,
                source,
            }
            .into(),
        )
    }

    pub fn line_too_long(path: &Path, line: u64, limit: usize) -> Error {
        Error(
            ErrorKind::LineTooLong {
                path: path.display().to_string(),
                line,
                limit,
            }
            .into(),
        )
    }

    pub fn query_read<E>(source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::QueryRead {
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn query_fetch<E>(row: u64, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::QueryFetch {
                row,
                source: Box::new(source),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("failed to open '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read '{path}' at line {line}: {source}")]
    Read {
        path: String,
        line: u64,
        source: std::io::Error,
    },

    #[error("line {line} of '{path}' exceeds {limit} bytes")]
    LineTooLong {
        path: String,
        line: u64,
        limit: usize,
    },

    #[error("failed to execute query: {source}")]
    QueryRead { source: StdErrorBoxed },

    #[error("failed to retrieve row {row}: {source}")]
    QueryFetch { row: u64, source: StdErrorBoxed },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
