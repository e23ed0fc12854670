//! Demands (dated to-dos) and goals share the completion toggle.

use crate::auth::Access;
use crate::calc::{self, Period};
use crate::ipc::helpers::{
    clock, create_record, guard, list_records, optional_str, remove_record, respond, to_value,
    toggle_record, workspace, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Demand, Goal};
use crate::records::{DemandDraft, GoalDraft};
use serde_json::{json, Value};

/// `period` narrows the list to a window around `today`; without it every
/// demand is returned.
fn demands_list(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    let Some(raw) = optional_str(&req.params, "period") else {
        return list_records::<Demand>(state, Access::Admin);
    };
    guard(state, Access::Admin)?;
    let period: Period = serde_json::from_value(json!(raw))
        .map_err(|_| HandlerErr::new("bad_params", "period must be day, week or month"))?;
    let today = clock(req)?.today;
    let ws = workspace(state)?;
    let window = calc::range_filter(&ws.data.demands, period, today);
    let stats = calc::demand_stats(&ws.data.demands, period, today);
    Ok(json!({
        "demands": to_value(&window)?,
        "stats": to_value(&stats)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "demands.list" => demands_list(state, req),
        "demands.create" => create_record::<DemandDraft>(state, req, Access::Admin),
        "demands.toggle" => toggle_record::<Demand>(state, req, Access::Admin),
        "demands.remove" => remove_record::<Demand>(state, req, Access::Admin),
        "goals.list" => list_records::<Goal>(state, Access::Admin),
        "goals.create" => create_record::<GoalDraft>(state, req, Access::Admin),
        "goals.toggle" => toggle_record::<Goal>(state, req, Access::Admin),
        "goals.remove" => remove_record::<Goal>(state, req, Access::Admin),
        _ => return None,
    };
    Some(respond(req, result))
}
