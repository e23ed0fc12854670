mod auth;
mod backup;
mod calc;
mod catalog;
mod config;
mod db;
mod insight;
mod ipc;
mod model;
mod records;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("emdrad={}", level)));
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}

fn main() {
    let _ = dotenvy::dotenv();
    let args = config::Args::parse();
    init_tracing(&args.log_level);

    if let Err(msg) = args.validate() {
        error!("{}", msg);
        std::process::exit(2);
    }

    let insight = args.insight_advisor();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        insight_configured = insight.has_service(),
        digest_size = args.insight_digest_size,
        "emdrad starting"
    );
    let mut state = ipc::AppState::new(insight, args.bootstrap());
    if let Some(path) = args.workspace.as_deref() {
        if let Err(e) = state.open_workspace(path) {
            warn!(workspace = %path.to_string_lossy(), error = %format!("{e:#}"), "startup workspace not opened");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, exiting");
}
