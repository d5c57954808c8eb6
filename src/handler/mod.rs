//! Request handler module
//!
//! Maps request paths onto the document root and serves the files found
//! there, expanding SSI directives in markup.

pub mod error;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
