//! Per-request access logging.
//!
//! The logger wraps a whole service and records one entry per request after
//! the inner service has produced its response. Entries go to an injected
//! [`RequestLogSink`] so callers can redirect them.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{util::BoxCloneService, Service, ServiceBuilder};
use tracing::info;

/// Tracing target of access log lines
pub const ACCESS_LOG_TARGET: &str = "adk_web::access";

/// A completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLogEntry {
    pub method: Method,
    /// Path and query as received
    pub uri: String,
    pub elapsed: Duration,
}

impl fmt::Display for RequestLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.uri, self.elapsed)
    }
}

/// Destination for access log entries. Called concurrently from request tasks.
pub trait RequestLogSink: Send + Sync {
    fn record(&self, entry: &RequestLogEntry);
}

/// Writes each entry as one `info` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RequestLogSink for TracingSink {
    fn record(&self, entry: &RequestLogEntry) {
        info!(target: ACCESS_LOG_TARGET, "{}", entry);
    }
}

/// Decorator that times and records every request passing through it
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn RequestLogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn RequestLogSink>) -> Self {
        Self { sink }
    }

    /// Wrap `inner` so that every request it serves is logged
    pub fn wrap<S>(self, inner: S) -> BoxCloneService<Request, Response, Infallible>
    where
        S: Service<Request, Error = Infallible> + Clone + Send + 'static,
        S::Response: IntoResponse + 'static,
        S::Future: Send + 'static,
    {
        let service = ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(self, log_request))
            .service(inner);
        BoxCloneService::new(service)
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

async fn log_request(
    State(logger): State<RequestLogger>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().to_string();

    let response = next.run(request).await;

    logger.sink.record(&RequestLogEntry {
        method,
        uri,
        elapsed: start.elapsed(),
    });

    response
}

/// Sink that keeps entries in memory
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CaptureSink {
    entries: std::sync::Mutex<Vec<RequestLogEntry>>,
}

#[cfg(test)]
impl CaptureSink {
    pub(crate) fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RequestLogSink for CaptureSink {
    fn record(&self, entry: &RequestLogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
