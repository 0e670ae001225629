use axum::{
    extract::Request,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, trace};

const INDEX_FILE: &str = "index.html";

/// Static Web UI assets rooted at a directory.
///
/// Expects request paths with the mount prefix already removed. A directory
/// is answered with its `index.html` whether or not the path ends in a
/// slash, so no redirects are issued. Pre-compressed `.br` / `.gz` siblings
/// are served when the client accepts them.
#[derive(Clone)]
pub struct StaticAssets {
    serve_dir: ServeDir,
    base_path: PathBuf,
}

impl StaticAssets {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let base_path = path.as_ref().to_path_buf();
        let serve_dir = ServeDir::new(&base_path)
            .append_index_html_on_directories(false)
            .precompressed_br()
            .precompressed_gzip();

        Self {
            serve_dir,
            base_path,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Relative paths made only of plain segments; anything else is left to ServeDir
    fn is_plain_relative(path: &str) -> bool {
        Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
    }

    /// Check if a request path names a directory under the root.
    ///
    /// The path is percent-decoded first, the same way ServeDir reads it.
    async fn is_directory(&self, path: &str) -> bool {
        let relative = match percent_decode_str(path.trim_matches('/')).decode_utf8() {
            Ok(decoded) => decoded,
            Err(_) => return false,
        };
        if relative.is_empty() {
            return true;
        }
        if !Self::is_plain_relative(&relative) {
            return false;
        }
        fs::metadata(self.base_path.join(&*relative))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Point directory requests at their index file
    async fn resolve(&self, uri: &Uri) -> Option<Uri> {
        let path = uri.path();
        if !self.is_directory(path).await {
            return None;
        }

        let index = format!("{}/{}", path.trim_end_matches('/'), INDEX_FILE);
        let rewritten = match uri.query() {
            Some(query) => format!("{}?{}", index, query),
            None => index,
        };
        trace!("Directory request {} served as {}", path, rewritten);
        rewritten.parse().ok()
    }

    /// Handle a request for static files
    pub async fn handle(&self, req: Request) -> Response {
        let (mut parts, body) = req.into_parts();
        if let Some(uri) = self.resolve(&parts.uri).await {
            parts.uri = uri;
        }
        let req = Request::from_parts(parts, body);

        match self.serve_dir.clone().oneshot(req).await {
            Ok(response) => response.into_response(),
            Err(err) => {
                debug!("ServeDir error: {}", err);
                StatusCode::NOT_FOUND.into_response()
            }
        }
    }
}
