//! MIME type detection module
//!
//! Returns the Content-Type for a file extension and decides whether a file is
//! sent as text, as SSI markup, or as raw bytes.

use std::path::Path;

/// How a file's content is treated before it is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Decoded as text and run through the SSI processor
    Markup,
    /// Decoded as text and sent as is
    Text,
    /// Sent byte for byte
    Binary,
}

/// Lowercased extension of `path`, without the leading dot
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Get MIME Content-Type based on a lowercased file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Markup and text
        Some("html" | "shtml") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",

        // Images
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",

        _ => "application/octet-stream",
    }
}

/// Classify a lowercased file extension
pub fn classify(extension: Option<&str>) -> FileClass {
    match extension {
        Some("html" | "shtml") => FileClass::Markup,
        Some("css" | "js" | "json" | "svg") => FileClass::Text,
        _ => FileClass::Binary,
    }
}
