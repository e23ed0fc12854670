use crate::auth::Access;
use crate::calc::{self, DashboardInputs, DEFAULT_FEED_LIMIT};
use crate::ipc::helpers::{clock, guard, respond, to_value, workspace, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

/// Attendance denominators are the staff list and the teacher roster.
fn stats(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let today = clock(req)?.today;
    let data = &workspace(state)?.data;
    let inputs = DashboardInputs {
        occurrences: &data.occurrences,
        attendance: &data.attendance,
        demands: &data.demands,
        finances: &data.finances,
        staff_count: data.staff.len(),
        teacher_count: data.teachers.len(),
    };
    to_value(&calc::dashboard(&inputs, today))
}

fn feed(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_FEED_LIMIT);
    let data = &workspace(state)?.data;
    let items = calc::recent_feed(&data.occurrences, &data.meetings, &data.demands, limit);
    Ok(json!({ "items": to_value(&items)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "dashboard.stats" => stats(state, req),
        "dashboard.feed" => feed(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
