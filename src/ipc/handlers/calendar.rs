use crate::auth::Access;
use crate::ipc::helpers::{create_record, list_records, remove_record, respond};
use crate::ipc::types::{AppState, Request};
use crate::model::SchoolEvent;
use crate::records::EventDraft;
use serde_json::Value;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "events.list" => list_records::<SchoolEvent>(state, Access::Member),
        "events.create" => create_record::<EventDraft>(state, req, Access::Admin),
        "events.remove" => remove_record::<SchoolEvent>(state, req, Access::Admin),
        _ => return None,
    };
    Some(respond(req, result))
}
