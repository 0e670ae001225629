use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format of the process log
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// ADK web server - serves the ADK Web UI under /ui and the ADK REST API under /api
#[derive(Parser, Debug, Clone)]
#[command(name = "adk-web")]
#[command(version, about, long_about = None)]
pub struct WebConfig {
    /// Port to listen on
    #[arg(
        long,
        env = "ADK_WEB_PORT",
        default_value = "8080",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    /// Front address to allow CORS requests from
    #[arg(
        long = "front_address",
        env = "ADK_WEB_FRONT_ADDRESS",
        default_value = "http://localhost:8001"
    )]
    pub front_address: String,

    /// Set to start a rest api endpoint '/api'
    #[arg(
        long = "start_restapi",
        env = "ADK_WEB_START_RESTAPI",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub start_restapi: bool,

    /// Set to start a web ui endpoint '/ui'
    #[arg(
        long = "start_webui",
        env = "ADK_WEB_START_WEBUI",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub start_webui: bool,

    /// Points to a static web ui dist path with the built version of ADK Web UI
    #[arg(long = "webui_path", env = "ADK_WEB_WEBUI_PATH")]
    pub webui_path: Option<PathBuf>,

    /// Log output format
    #[arg(
        long = "log_format",
        env = "ADK_WEB_LOG_FORMAT",
        value_enum,
        default_value = "pretty"
    )]
    pub log_format: LogFormat,
}

impl WebConfig {
    /// Parse the process arguments; malformed flags print usage and exit
    pub fn parse() -> Result<Self> {
        let config = <Self as Parser>::parse();
        Ok(config)
    }

    /// Filesystem root of the Web UI assets. An unset path means the working directory.
    pub fn ui_root(&self) -> PathBuf {
        self.webui_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
