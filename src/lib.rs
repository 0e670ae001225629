//! Web front door for ADK agents: the Web UI under `/ui` and the REST API under `/api`.
pub mod config;
pub mod cors;
pub mod request_log;
pub mod router;
pub mod server;
pub mod services;
pub mod static_files;
