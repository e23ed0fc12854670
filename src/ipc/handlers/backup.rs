use crate::auth::Access;
use crate::backup;
use crate::ipc::helpers::{guard, required_str, respond, workspace, workspace_mut, write_failed, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{error, info};

fn io_failed(path: &str, e: anyhow::Error) -> HandlerErr {
    error!(error = %format!("{e:#}"), path, "bundle io failed");
    HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": path }))
}

fn export(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let out_path = required_str(&req.params, "outPath")?;
    let ws = workspace(state)?;
    let snapshot = backup::snapshot(ws.kv()).map_err(|e| io_failed(&out_path, e))?;
    let summary = backup::write_bundle(&snapshot, &PathBuf::from(&out_path))
        .map_err(|e| io_failed(&out_path, e))?;
    info!(path = %out_path, sha256 = %summary.sha256, "workspace exported");
    Ok(json!({
        "path": out_path,
        "bundleFormat": summary.bundle_format,
        "counts": summary.counts,
        "sha256": summary.sha256,
    }))
}

/// Replaces the stored collections with the bundle's and keeps the
/// importing admin signed in when the bundle still holds that account.
fn import(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let raw_path = required_str(&req.params, "inPath")?;
    let in_path = PathBuf::from(&raw_path);
    if !in_path.is_file() {
        return Err(HandlerErr::new("bad_params", "bundle file not found")
            .with_details(json!({ "path": raw_path })));
    }
    let snapshot = backup::read_bundle(&in_path).map_err(|e| io_failed(&raw_path, e))?;

    let ws = workspace_mut(state)?;
    backup::restore(ws.kv(), &snapshot).map_err(write_failed)?;
    ws.reload();
    let session = ws.restore_session();
    let restored = session.is_some();
    state.session = session;
    info!(path = %raw_path, session_restored = restored, "workspace imported");
    Ok(json!({
        "bundleFormatDetected": backup::BUNDLE_FORMAT_V1,
        "counts": snapshot.counts(),
        "sessionRestored": restored,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "backup.export" => export(state, req),
        "backup.import" => import(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
