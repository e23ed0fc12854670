use crate::auth::Access;
use crate::ipc::helpers::{
    clock, guard, list_records, mutate, params, remove_record, respond, to_value, workspace_mut,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::ParentMeeting;
use crate::records::{self, MeetingDraft};
use serde_json::{json, Value};

/// `scheduledBy` defaults to the signed-in user.
fn create(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let user = guard(state, Access::Management)?;
    let clock = clock(req)?;
    let mut draft: MeetingDraft = params(req)?;
    if draft.scheduled_by.as_deref().map_or(true, |s| s.trim().is_empty()) {
        draft.scheduled_by = Some(user.name);
    }
    let ws = workspace_mut(state)?;
    let record = mutate::<ParentMeeting, _>(ws, |meetings| {
        Ok(Some(records::create(meetings, draft, &clock)?))
    })?;
    Ok(json!({ "record": to_value(&record)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "meetings.list" => list_records::<ParentMeeting>(state, Access::Management),
        "meetings.create" => create(state, req),
        "meetings.remove" => remove_record::<ParentMeeting>(state, req, Access::Admin),
        _ => return None,
    };
    Some(respond(req, result))
}
