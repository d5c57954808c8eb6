//! Static file serving module
//!
//! Resolves request paths under the document root, picks directory index
//! files, and loads content. Markup is expanded through the SSI engine, other
//! text is decoded and sent as is, and everything else is sent byte for byte.

use crate::config::SiteConfig;
use crate::handler::error::ServeError;
use crate::http::mime::{self, FileClass};
use crate::http::{self, RequestContext};
use crate::logger;
use crate::ssi::Expander;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the file addressed by `ctx` from the site's document root
pub async fn serve(ctx: &RequestContext, site: &SiteConfig) -> Response<Full<Bytes>> {
    let root = Path::new(&site.root);
    let requested = map_request_path(root, &ctx.decoded_path());
    let file_path = resolve_index(requested, &site.index_files).await;
    logger::log_debug(&format!("Request: {} -> {}", ctx.uri, file_path.display()));

    match load(ctx, &file_path, root, site.max_include_depth).await {
        Ok((content, content_type)) => http::build_content_response(content, content_type),
        Err(e) => error_response(e),
    }
}

/// 404 for missing files, 500 carrying the I/O error code otherwise
fn error_response(err: ServeError) -> Response<Full<Bytes>> {
    match err {
        ServeError::NotFound(path) => {
            logger::log_debug(&format!("File not found: {}", path.display()));
            http::build_404_response(&path.display().to_string())
        }
        e @ ServeError::Io { .. } => {
            logger::log_error(&e.to_string());
            http::build_500_response(&e.code())
        }
    }
}

/// Map a decoded URL path onto the document root.
///
/// Empty and `.` segments are dropped and `..` removes the previous segment,
/// never climbing above `root`.
pub fn map_request_path(root: &Path, decoded_path: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded_path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
        .into_iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Replace a directory path with its first existing index file.
///
/// A directory without any index file is returned unchanged.
pub async fn resolve_index(path: PathBuf, index_files: &[String]) -> PathBuf {
    if !is_dir(&path).await {
        return path;
    }
    for index_file in index_files {
        let index_path = path.join(index_file);
        if is_file(&index_path).await {
            logger::log_debug(&format!("Directory, serving: {}", index_path.display()));
            return index_path;
        }
    }
    path
}

/// Read `file_path` and prepare its body according to its extension
async fn load(
    ctx: &RequestContext,
    file_path: &Path,
    root: &Path,
    max_include_depth: usize,
) -> Result<(Bytes, &'static str), ServeError> {
    // Advisory only: the read below decides the outcome.
    if is_dir(file_path).await {
        return Err(ServeError::NotFound(file_path.to_path_buf()));
    }

    let data = fs::read(file_path)
        .await
        .map_err(|e| ServeError::from_io(file_path.to_path_buf(), e))?;

    let extension = mime::extension_of(file_path);
    let content_type = mime::get_content_type(extension.as_deref());

    let content = match mime::classify(extension.as_deref()) {
        FileClass::Binary => Bytes::from(data),
        FileClass::Text => Bytes::from(decode_text(data)),
        FileClass::Markup => {
            let text = decode_text(data);
            let expanded = Expander::new(ctx, root, max_include_depth)
                .expand(&text, file_path)
                .await;
            Bytes::from(expanded)
        }
    };

    Ok((content, content_type))
}

/// UTF-8 decode, replacing invalid sequences with U+FFFD
fn decode_text(data: Vec<u8>) -> String {
    String::from_utf8(data)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn site_config(dir: &TempDir) -> SiteConfig {
        SiteConfig {
            root: dir.path().to_str().unwrap().to_string(),
            index_files: vec!["index.shtml".to_string(), "index.html".to_string()],
            max_include_depth: 16,
        }
    }

    fn write(dir: &TempDir, name: &str, content: &[u8]) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std_fs::create_dir_all(parent).unwrap();
        }
        std_fs::write(path, content).unwrap();
    }

    async fn get(dir: &TempDir, uri: &str) -> (u16, String, Bytes) {
        let ctx = RequestContext::new(uri);
        let response = serve(&ctx, &site_config(dir)).await;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("Content-Type")
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body)
    }

    #[test]
    fn test_map_request_path() {
        let root = Path::new("/srv/www");
        assert_eq!(map_request_path(root, "/"), PathBuf::from("/srv/www"));
        assert_eq!(
            map_request_path(root, "/docs/./a.html"),
            PathBuf::from("/srv/www/docs/a.html")
        );
        assert_eq!(
            map_request_path(root, "/docs/../b.html"),
            PathBuf::from("/srv/www/b.html")
        );
        assert_eq!(
            map_request_path(root, "/../../etc/passwd"),
            PathBuf::from("/srv/www/etc/passwd")
        );
        assert_eq!(
            map_request_path(root, "/a//b/"),
            PathBuf::from("/srv/www/a/b")
        );
    }

    #[tokio::test]
    async fn test_directory_prefers_index_shtml() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "docs/index.shtml", br#"shtml:<!--#echo var="DOCUMENT_NAME" -->"#);
        write(&dir, "docs/index.html", b"plain html");

        let (status, content_type, body) = get(&dir, "/docs/").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "text/html; charset=utf-8");
        assert_eq!(&body[..], b"shtml:index.shtml");
    }

    #[tokio::test]
    async fn test_directory_falls_back_to_index_html() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "docs/index.html", br#"<!--#echo var="DOCUMENT_URI" -->"#);

        let (status, _, body) = get(&dir, "/docs?x=1").await;
        assert_eq!(status, 200);
        assert_eq!(&body[..], b"/docs?x=1");
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "empty/readme.txt", b"nothing to index");

        let (status, content_type, body) = get(&dir, "/empty/").await;
        assert_eq!(status, 404);
        assert_eq!(content_type, "text/html; charset=utf-8");
        assert!(String::from_utf8_lossy(&body).contains("404 - File Not Found"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, body) = get(&dir, "/nope.html").await;
        assert_eq!(status, 404);
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("<h1>404 - File Not Found</h1>"));
        assert!(body.contains("nope.html"));
    }

    #[tokio::test]
    async fn test_binary_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0xFF, 0x00];
        png.extend_from_slice(br#"<!--#echo var="DATE_GMT" -->"#);
        png.push(0xFE);
        write(&dir, "img/logo.png", &png);

        let (status, content_type, body) = get(&dir, "/img/logo.png").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "image/png");
        assert_eq!(&body[..], &png[..]);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "data.bin", &[1, 2, 3]);

        let (status, content_type, body) = get(&dir, "/data.bin").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "application/octet-stream");
        assert_eq!(&body[..], &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_text_is_not_processed() {
        let dir = tempfile::tempdir().unwrap();
        let css = br#"/* <!--#echo var="DATE_GMT" --> */ body { color: red; }"#;
        write(&dir, "style.css", css);

        let (status, content_type, body) = get(&dir, "/style.css").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "text/css; charset=utf-8");
        assert_eq!(&body[..], &css[..]);
    }

    #[tokio::test]
    async fn test_markup_includes_from_root() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "blog/post.SHTML",
            br#"<!--#include virtual="/parts/header.html" -->post"#,
        );
        write(&dir, "parts/header.html", br#"<h1><!--#echo var="DOCUMENT_NAME" --></h1>"#);

        let (status, _, body) = get(&dir, "/blog/post.SHTML").await;
        assert_eq!(status, 200);
        assert_eq!(&body[..], b"<h1>header.html</h1>post");
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "my page.html", b"spaced");

        let (status, _, body) = get(&dir, "/my%20page.html").await;
        assert_eq!(status, 200);
        assert_eq!(&body[..], b"spaced");
    }

    #[tokio::test]
    async fn test_file_used_as_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "page.html", b"page");

        let (status, _, body) = get(&dir, "/page.html/extra").await;
        assert_eq!(status, 404);
        assert!(String::from_utf8_lossy(&body).contains("404 - File Not Found"));
    }

    #[tokio::test]
    async fn test_nul_in_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, _) = get(&dir, "/a%00.html").await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_read_failure_is_server_error() {
        let err = ServeError::from_io(
            PathBuf::from("/srv/www/locked.html"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        let response = error_response(err);
        assert_eq!(response.status(), 500);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Server Error: PermissionDenied");
    }

    #[tokio::test]
    async fn test_traversal_stays_in_root() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "inner/index.html", b"inner");
        let ctx = RequestContext::new("/../../inner/");
        let site = SiteConfig {
            root: dir.path().join("inner").to_str().unwrap().to_string(),
            ..site_config(&dir)
        };

        let response = serve(&ctx, &site).await;
        assert_eq!(response.status(), 404);
    }
}
