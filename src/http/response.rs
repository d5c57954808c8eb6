//! HTTP response building module
//!
//! Provides builders for the statuses the server produces, decoupled from file
//! resolution.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Build 200 OK response carrying file content
pub fn build_content_response(data: Bytes, content_type: &str) -> Response<Full<Bytes>> {
    let content_length = data.len();

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response naming the resolved path
pub fn build_404_response(path: &str) -> Response<Full<Bytes>> {
    let body = format!(
        "<h1>404 - File Not Found</h1><p>Path: {}</p>",
        escape_html(path)
    );

    Response::builder()
        .status(404)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from("404 Not Found")))
        })
}

/// Build 500 Internal Server Error response carrying an I/O error code
pub fn build_500_response(code: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(format!("Server Error: {code}"))))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            Response::new(Full::new(Bytes::from("Server Error")))
        })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
