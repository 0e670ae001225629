//! Prefix dispatch for the web server.
//!
//! Topology, outermost first:
//! 1. request logger (every request, one entry)
//! 2. trailing-slash normalization
//! 3. `/ui` static assets, GET only, when the Web UI is enabled
//! 4. `/api` routes behind the access policy, when the REST API is enabled
//! 5. 404 for everything else
//!
//! Disabled branches are never mounted.

use crate::config::WebConfig;
use crate::cors::AccessPolicy;
use crate::request_log::{RequestLogSink, RequestLogger, TracingSink};
use crate::services::{ApiRouterConfig, ApiRoutes, ServiceBindings};
use crate::static_files::StaticAssets;
use axum::{
    extract::Request,
    http::{header::ALLOW, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::convert::Infallible;
use std::sync::Arc;
use tower::{util::BoxCloneService, ServiceBuilder};
use tower_http::{normalize_path::NormalizePathLayer, trace::TraceLayer};
use tracing::{debug, info};

pub const UI_PREFIX: &str = "/ui";
pub const API_PREFIX: &str = "/api";

/// Methods routed into the API branch
const API_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
const API_ALLOW: &str = "GET,POST,DELETE,OPTIONS";

/// The assembled server application
pub type WebApp = BoxCloneService<Request, Response, Infallible>;

/// Builds the web application from a resolved configuration
pub struct RouterBuilder {
    config: Arc<WebConfig>,
    bindings: ServiceBindings,
    sink: Arc<dyn RequestLogSink>,
}

impl RouterBuilder {
    pub fn new(config: Arc<WebConfig>, bindings: ServiceBindings) -> Self {
        Self {
            config,
            bindings,
            sink: Arc::new(TracingSink),
        }
    }

    /// Send access log entries somewhere other than the tracing subscriber
    pub fn with_sink(mut self, sink: Arc<dyn RequestLogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Mount the enabled branches and wrap them in the global middleware.
    ///
    /// `routes` is invoked once if the REST API is enabled, and not at all otherwise.
    pub fn build<R: ApiRoutes>(self, routes: R) -> WebApp {
        let mut router = Router::new();

        if self.config.start_webui {
            let assets = StaticAssets::new(self.config.ui_root());
            info!(
                "Web UI enabled at {}/ serving {}",
                UI_PREFIX,
                assets.base_path().display()
            );
            router = router.nest_service(
                UI_PREFIX,
                get(move |req: Request| async move { assets.handle(req).await }),
            );
        }

        if self.config.start_restapi {
            let api_config = ApiRouterConfig {
                bindings: self.bindings,
                policy: AccessPolicy::for_origin(self.config.front_address.clone()),
            };
            info!(
                "REST API enabled at {}/ accepting CORS requests from {}",
                API_PREFIX, self.config.front_address
            );

            let api = routes.register(Router::new(), &api_config);
            let api = ServiceBuilder::new()
                .layer(middleware::from_fn(reject_unrouted_methods))
                .service(api_config.policy.apply(api));
            router = router.nest_service(API_PREFIX, api);
        }

        // Route matching happens inside the router, so normalization has to sit outside it
        let app = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(NormalizePathLayer::trim_trailing_slash())
            .service(router);

        RequestLogger::new(self.sink).wrap(app)
    }
}

/// Answer 405 for methods the API branch does not route
async fn reject_unrouted_methods(request: Request, next: Next) -> Response {
    if API_METHODS.contains(request.method()) {
        return next.run(request).await;
    }

    debug!("Rejecting {} {}", request.method(), request.uri());
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, HeaderValue::from_static(API_ALLOW))],
    )
        .into_response()
}
