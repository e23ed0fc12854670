//! Command-line and environment configuration.

use crate::insight::{GeminiClient, InsightAdvisor, InsightService, MAX_DIGEST};
use crate::store::Bootstrap;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// emdrad - local backend for the EMDRA school administration dashboard.
///
/// Reads one JSON request per line on stdin and answers on stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "emdrad", version)]
pub struct Args {
    /// Workspace directory to open at startup
    #[arg(long, env = "EMDRA_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, env = "EMDRA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Credential for the text-generation service. Without it insights run
    /// in degraded mode.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub insight_api_key: Option<String>,

    #[arg(long, env = "EMDRA_INSIGHT_MODEL", default_value = "gemini-3-flash-preview")]
    pub insight_model: String,

    #[arg(
        long,
        env = "EMDRA_INSIGHT_ENDPOINT",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub insight_endpoint: String,

    /// How many recent occurrences go into an insight request (1-10)
    #[arg(long, env = "EMDRA_INSIGHT_DIGEST_SIZE", default_value_t = MAX_DIGEST)]
    pub insight_digest_size: usize,

    #[arg(long, env = "EMDRA_INSIGHT_TIMEOUT_SECS", default_value_t = 20)]
    pub insight_timeout_secs: u64,

    /// Name of the admin account seeded into a fresh workspace
    #[arg(long, env = "EMDRA_ADMIN_NAME", default_value = "Direção")]
    pub admin_name: String,

    /// PIN of the admin account seeded into a fresh workspace
    #[arg(long, env = "EMDRA_ADMIN_PIN", default_value = "1500", hide_env_values = true)]
    pub admin_pin: String,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_DIGEST).contains(&self.insight_digest_size) {
            return Err(format!(
                "insight digest size must be between 1 and {}",
                MAX_DIGEST
            ));
        }
        if self.admin_name.trim().is_empty() || self.admin_pin.is_empty() {
            return Err("bootstrap admin name and PIN must not be empty".to_string());
        }
        Ok(())
    }

    pub fn bootstrap(&self) -> Bootstrap {
        Bootstrap {
            admin_name: self.admin_name.trim().to_string(),
            admin_pin: self.admin_pin.clone(),
        }
    }

    pub fn insight_advisor(&self) -> InsightAdvisor {
        let key = self
            .insight_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        let service: Option<Arc<dyn InsightService>> = match key {
            None => None,
            Some(key) => match GeminiClient::new(
                &self.insight_endpoint,
                &self.insight_model,
                key,
                Duration::from_secs(self.insight_timeout_secs),
            ) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "insight client unavailable, running degraded");
                    None
                }
            },
        };
        InsightAdvisor::new(service, self.insight_digest_size)
    }
}
