//! Cross-origin access policy for the REST API branch.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCEPT, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN, VARY,
        },
        request::Parts,
        HeaderMap, HeaderName, HeaderValue, Method,
    },
    middleware::{self, Next},
    response::Response,
    Router,
};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::cors::{AllowCredentials, Cors, CorsLayer};
use tracing::{trace, warn};

/// Methods a cross-origin caller may use against the API
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::OPTIONS,
    Method::DELETE,
    Method::PUT,
];

/// Request headers accepted on preflight
const ALLOWED_HEADERS: [HeaderName; 4] = [
    ORIGIN,
    ACCEPT,
    CONTENT_TYPE,
    HeaderName::from_static("x-requested-with"),
];

/// Which origins, methods and credential modes the API accepts from a browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    allowed_origins: Vec<String>,
    allowed_methods: Vec<Method>,
    allow_credentials: bool,
}

impl AccessPolicy {
    /// Policy admitting exactly one front-end origin with credentials.
    ///
    /// The origin is taken as given; a value that is not a usable header
    /// simply never matches.
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            allowed_origins: vec![origin.into()],
            allowed_methods: ALLOWED_METHODS.to_vec(),
            allow_credentials: true,
        }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Check whether an `Origin` header value is admitted
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Origins that can be echoed back in `Access-Control-Allow-Origin`
    fn header_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| {
                // A wildcard cannot be combined with an origin list
                if origin == "*" {
                    warn!("Ignoring wildcard CORS origin; credentialed requests need an explicit origin");
                    return None;
                }
                match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("Ignoring CORS origin {:?}: {}", origin, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Lower the policy to a tower-http layer.
    ///
    /// Both `Access-Control-Allow-Origin` and `Access-Control-Allow-Credentials`
    /// are only emitted for an admitted origin.
    pub fn layer(&self) -> CorsLayer {
        let origins = self.header_origins();

        let mut cors = CorsLayer::new()
            .allow_origin(origins.clone())
            .allow_methods(self.allowed_methods.clone())
            .allow_headers(ALLOWED_HEADERS);

        if self.allow_credentials {
            cors = cors.allow_credentials(AllowCredentials::predicate(
                move |origin: &HeaderValue, _parts: &Parts| origins.contains(origin),
            ));
        }

        cors
    }

    /// Put the policy in front of `inner`.
    ///
    /// Only a real preflight (`OPTIONS` carrying both `Origin` and
    /// `Access-Control-Request-Method`) is answered by the policy itself.
    /// Any other `OPTIONS` request reaches `inner`'s routes, with the
    /// origin headers added for an admitted origin.
    pub fn apply(&self, inner: Router) -> Router {
        let policy = CorsDispatch {
            cors: ServiceBuilder::new().layer(self.layer()).service(inner.clone()),
            origins: self.header_origins(),
            allow_credentials: self.allow_credentials,
        };
        inner.layer(middleware::from_fn_with_state(policy, dispatch))
    }
}

/// Is this a CORS preflight rather than an ordinary OPTIONS request
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

#[derive(Clone)]
struct CorsDispatch {
    cors: Cors<Router>,
    origins: Vec<HeaderValue>,
    allow_credentials: bool,
}

async fn dispatch(State(policy): State<CorsDispatch>, request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS || is_preflight(request.method(), request.headers()) {
        return match policy.cors.oneshot(request).await {
            Ok(response) => response,
            Err(err) => match err {},
        };
    }

    trace!("Passing OPTIONS {} through to the API routes", request.uri());
    let origin = request.headers().get(ORIGIN).cloned();
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.append(VARY, HeaderValue::from_static("origin"));
    if let Some(origin) = origin.filter(|o| policy.origins.contains(o)) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        if policy.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }

    response
}
