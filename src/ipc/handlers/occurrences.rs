use crate::auth::Access;
use crate::calc;
use crate::ipc::helpers::{
    clock, guard, list_records, mutate, params, remove_record, required_str, respond, to_value,
    workspace, workspace_mut, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Occurrence;
use crate::records::{self, OccurrenceDraft};
use serde_json::{json, Value};
use tracing::info;

/// The reporter defaults to the signed-in user.
fn create(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let user = guard(state, Access::Member)?;
    let clock = clock(req)?;
    let mut draft: OccurrenceDraft = params(req)?;
    if draft.reporter.as_deref().map_or(true, |r| r.trim().is_empty()) {
        draft.reporter = Some(user.name);
    }
    let ws = workspace_mut(state)?;
    let record = mutate::<Occurrence, _>(ws, |occurrences| {
        Ok(Some(records::create(occurrences, draft, &clock)?))
    })?;
    if let Some(o) = &record {
        info!(id = %o.id, kind = o.kind.label(), "occurrence recorded");
    }
    Ok(json!({ "record": to_value(&record)? }))
}

fn history(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Member)?;
    let student = required_str(&req.params, "student")?;
    let ws = workspace(state)?;
    let found = calc::student_history(&ws.data.occurrences, &student);
    Ok(json!({
        "student": student,
        "count": found.len(),
        "occurrences": to_value(&found)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "occurrences.list" => list_records::<Occurrence>(state, Access::Member),
        "occurrences.create" => create(state, req),
        "occurrences.remove" => remove_record::<Occurrence>(state, req, Access::Admin),
        "occurrences.history" => history(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
