use crate::auth::Access;
use crate::ipc::helpers::{create_record, list_records, remove_record, respond};
use crate::ipc::types::{AppState, Request};
use crate::model::Document;
use crate::records::DocumentDraft;
use serde_json::Value;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "documents.list" => list_records::<Document>(state, Access::Admin),
        "documents.create" => create_record::<DocumentDraft>(state, req, Access::Admin),
        "documents.remove" => remove_record::<Document>(state, req, Access::Admin),
        _ => return None,
    };
    Some(respond(req, result))
}
