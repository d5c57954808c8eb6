//! Request context module
//!
//! Immutable per-request information shared by the router and the SSI engine.

use chrono::{DateTime, Local};
use percent_encoding::percent_decode_str;

/// Request URL and arrival time of a single top-level request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request target as received (path and query)
    pub uri: String,
    /// Time the request was accepted
    pub received_at: DateTime<Local>,
}

impl RequestContext {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            received_at: Local::now(),
        }
    }

    /// Path component, everything before the first `?`
    pub fn path(&self) -> &str {
        self.uri.split_once('?').map_or(self.uri.as_str(), |(path, _)| path)
    }

    /// Everything after the first `?`, or an empty string
    pub fn query_string(&self) -> &str {
        self.uri.split_once('?').map_or("", |(_, query)| query)
    }

    /// Percent-decoded path; invalid UTF-8 sequences become U+FFFD
    pub fn decoded_path(&self) -> String {
        percent_decode_str(self.path())
            .decode_utf8_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_query() {
        let ctx = RequestContext::new("/docs/page.shtml?lang=ja&x=1");
        assert_eq!(ctx.path(), "/docs/page.shtml");
        assert_eq!(ctx.query_string(), "lang=ja&x=1");
    }

    #[test]
    fn test_query_keeps_later_question_marks() {
        let ctx = RequestContext::new("/a?b?c");
        assert_eq!(ctx.path(), "/a");
        assert_eq!(ctx.query_string(), "b?c");
    }

    #[test]
    fn test_no_query() {
        let ctx = RequestContext::new("/index.html");
        assert_eq!(ctx.query_string(), "");
        assert_eq!(ctx.path(), "/index.html");
    }

    #[test]
    fn test_decoded_path() {
        let ctx = RequestContext::new("/my%20docs/%E3%81%82.html?q=%20");
        assert_eq!(ctx.decoded_path(), "/my docs/\u{3042}.html");

        let invalid = RequestContext::new("/bad%FF.html");
        assert_eq!(invalid.decoded_path(), "/bad\u{FFFD}.html");
    }
}
