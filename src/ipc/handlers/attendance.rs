use crate::auth::Access;
use crate::calc::{self, Period};
use crate::ipc::helpers::{
    clock, create_record, guard, list_records, params, remove_record, respond, to_value,
    workspace, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceRecord;
use crate::records::AttendanceDraft;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbsenteesParams {
    #[serde(default)]
    is_teacher: bool,
    #[serde(default = "default_period")]
    period: Period,
}

fn default_period() -> Period {
    Period::Day
}

fn absentees(state: &AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let p: AbsenteesParams = params(req)?;
    let today = clock(req)?.today;
    let ws = workspace(state)?;
    let found = calc::absentees(&ws.data.attendance, p.is_teacher, p.period, today);
    Ok(json!({
        "isTeacher": p.is_teacher,
        "period": p.period,
        "count": found.len(),
        "attendance": to_value(&found)?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "attendance.list" => list_records::<AttendanceRecord>(state, Access::Admin),
        "attendance.create" => create_record::<AttendanceDraft>(state, req, Access::Admin),
        "attendance.remove" => remove_record::<AttendanceRecord>(state, req, Access::Admin),
        "attendance.absentees" => absentees(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
