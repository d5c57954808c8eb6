//! HTTP protocol layer module
//!
//! Request context, MIME detection and response builders, decoupled from
//! file resolution and SSI processing.

pub mod mime;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::RequestContext;
pub use response::{build_404_response, build_500_response, build_content_response};
