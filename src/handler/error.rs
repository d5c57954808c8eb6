//! Static serving failure types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a request could not be answered with file content
#[derive(Debug, Error)]
pub enum ServeError {
    /// Nothing servable at the resolved path (absent, or a directory
    /// without an index file)
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("Error reading file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    /// Classify a failed metadata or read call on `path`
    ///
    /// A file component used as a directory and a path the OS rejects
    /// outright both mean nothing exists there.
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        if matches!(
            source.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput
        ) {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Error code carried in a 500 body
    pub fn code(&self) -> String {
        match self {
            Self::NotFound(_) => format!("{:?}", io::ErrorKind::NotFound),
            Self::Io { source, .. } => error_code(source),
        }
    }
}

/// Name of the I/O error kind, e.g. `PermissionDenied`
fn error_code(err: &io::Error) -> String {
    format!("{:?}", err.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let not_found = ServeError::from_io(
            PathBuf::from("a.html"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(not_found, ServeError::NotFound(_)));

        let through_file = ServeError::from_io(
            PathBuf::from("a.html/b.html"),
            io::Error::from(io::ErrorKind::NotADirectory),
        );
        assert!(matches!(through_file, ServeError::NotFound(_)));
        assert_eq!(through_file.code(), "NotFound");

        let denied = ServeError::from_io(
            PathBuf::from("a.html"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, ServeError::Io { .. }));
        assert_eq!(denied.code(), "PermissionDenied");
    }

    #[test]
    fn test_error_code() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(error_code(&err), "PermissionDenied");
    }
}
