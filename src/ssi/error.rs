//! Include failure types
//!
//! Every variant is rendered into the page as an HTML comment instead of
//! failing the request.

use std::io;
use thiserror::Error;

/// Why an `#include` directive could not be expanded
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("Include file not found: {path}")]
    NotFound { path: String },

    #[error("Error including file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Include cycle detected: {path}")]
    Cycle { path: String },

    #[error("Include depth limit of {limit} exceeded: {path}")]
    DepthExceeded { path: String, limit: usize },
}

impl IncludeError {
    /// Classify a failed read of `path` (as written in the directive)
    pub fn from_io(path: &str, source: io::Error) -> Self {
        if matches!(
            source.kind(),
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput
        ) {
            Self::NotFound {
                path: path.to_string(),
            }
        } else {
            Self::Read {
                path: path.to_string(),
                source,
            }
        }
    }

    /// Inline diagnostic spliced in place of the directive
    pub fn to_comment(&self) -> String {
        format!("<!-- {} -->", self.to_string().replace("--", "- -"))
    }
}
