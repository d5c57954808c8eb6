//! Request dispatch module
//!
//! Entry point for HTTP request processing. Every method is treated as a
//! retrieval of the addressed file.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::RequestContext;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::new(
        req.uri()
            .path_and_query()
            .map_or("/", hyper::http::uri::PathAndQuery::as_str),
    );

    let response = static_files::serve(&ctx, &state.config.site).await;

    if state.config.logging.access_log {
        let entry = access_entry(&req, &ctx, &response, remote_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(
    req: &Request<B>,
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        ctx.path().to_string(),
        ctx.received_at,
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else if version == Version::HTTP_3 {
        "3"
    } else if version == Version::HTTP_09 {
        "0.9"
    } else {
        "1.1"
    }
}
