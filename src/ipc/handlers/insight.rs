use crate::auth::Access;
use crate::ipc::helpers::{guard, respond, to_value, workspace, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use tracing::debug;

/// Starts a new analysis over the most recent occurrences. The answer is
/// collected later through `insight.get`.
fn request(state: &AppState) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let occurrences = &workspace(state)?.data.occurrences;
    let seq = state.insight.request(occurrences);
    debug!(seq, "insight requested");
    Ok(json!({
        "seq": seq,
        "snapshot": to_value(&state.insight.snapshot())?,
    }))
}

fn get(state: &AppState) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    to_value(&state.insight.snapshot())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "insight.request" => request(state),
        "insight.get" => get(state),
        _ => return None,
    };
    Some(respond(req, result))
}
