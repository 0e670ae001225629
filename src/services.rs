//! Collaborator capabilities handed through to the REST API routes.
//!
//! The web layer only holds these and passes them on; it never calls into
//! sessions or artifacts itself.

use crate::cors::AccessPolicy;
use axum::Router;
use std::sync::Arc;

/// Session storage capability
pub trait SessionService: Send + Sync {}

/// Artifact storage capability
pub trait ArtifactService: Send + Sync {}

/// Source of runnable agents
pub trait AgentLoader: Send + Sync {
    /// Names of the agents this loader can provide
    fn list_agents(&self) -> Vec<String>;
}

/// References to the services backing the REST API
#[derive(Clone)]
pub struct ServiceBindings {
    pub session_service: Arc<dyn SessionService>,
    pub agent_loader: Arc<dyn AgentLoader>,
    pub artifact_service: Arc<dyn ArtifactService>,
}

impl ServiceBindings {
    pub fn new(
        session_service: Arc<dyn SessionService>,
        agent_loader: Arc<dyn AgentLoader>,
        artifact_service: Arc<dyn ArtifactService>,
    ) -> Self {
        Self {
            session_service,
            agent_loader,
            artifact_service,
        }
    }

    /// Bindings with no backing services, for running the Web UI alone
    pub fn unbound() -> Self {
        let unbound = Arc::new(Unbound);
        Self::new(unbound.clone(), unbound.clone(), unbound)
    }
}

/// Placeholder capability: no sessions, no artifacts, no agents
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbound;

impl SessionService for Unbound {}

impl ArtifactService for Unbound {}

impl AgentLoader for Unbound {
    fn list_agents(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Everything the API route registration receives
#[derive(Clone)]
pub struct ApiRouterConfig {
    pub bindings: ServiceBindings,
    pub policy: AccessPolicy,
}

/// Registers all routes beneath `/api/`.
///
/// `register` receives an empty router whose paths are relative to the
/// `/api` prefix and returns it populated. It runs once, while the web
/// router is being built.
pub trait ApiRoutes {
    fn register(self, router: Router, config: &ApiRouterConfig) -> Router;
}

impl<F> ApiRoutes for F
where
    F: FnOnce(Router, &ApiRouterConfig) -> Router,
{
    fn register(self, router: Router, config: &ApiRouterConfig) -> Router {
        self(router, config)
    }
}
