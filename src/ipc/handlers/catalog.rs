use crate::auth::Access;
use crate::catalog;
use crate::ipc::helpers::{guard, respond};
use crate::ipc::types::{AppState, Request};
use serde_json::Value;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "catalog.get" => Some(respond(
            req,
            guard(state, Access::Member).map(|_| catalog::catalog_json()),
        )),
        _ => None,
    }
}
