use crate::auth::{self, Access, AuthError};
use crate::calc::parse_iso_date;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::User;
use crate::records::{self, Clock, Completable, Draft, ValidationError};
use crate::store::{Roster, Slot, Workspace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<ValidationError> for HandlerErr {
    fn from(e: ValidationError) -> Self {
        HandlerErr::new("validation_failed", e.to_string())
            .with_details(json!({ "field": e.field() }))
    }
}

impl From<AuthError> for HandlerErr {
    fn from(e: AuthError) -> Self {
        HandlerErr::new(e.code(), e.to_string())
    }
}

pub fn write_failed(e: anyhow::Error) -> HandlerErr {
    error!(error = %format!("{e:#}"), "store write failed");
    HandlerErr::new("db_write_failed", format!("{e:#}"))
}

pub fn respond(req: &Request, result: Result<Value, HandlerErr>) -> Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    }
}

pub fn to_value<T: Serialize + ?Sized>(v: &T) -> Result<Value, HandlerErr> {
    serde_json::to_value(v).map_err(|e| HandlerErr::new("encode_failed", e.to_string()))
}

/// `params` decoded as `T`; a missing params object reads as `{}`.
pub fn params<T: DeserializeOwned>(req: &Request) -> Result<T, HandlerErr> {
    let raw = if req.params.is_null() {
        json!({})
    } else {
        req.params.clone()
    };
    serde_json::from_value(raw).map_err(|e| HandlerErr::new("bad_params", e.to_string()))
}

pub fn required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Request clock. `params.today` (YYYY-MM-DD) pins the reference date.
pub fn clock(req: &Request) -> Result<Clock, HandlerErr> {
    let mut clock = Clock::now();
    if let Some(raw) = optional_str(&req.params, "today") {
        clock.today = parse_iso_date(&raw)
            .ok_or_else(|| HandlerErr::new("bad_params", "today must be YYYY-MM-DD"))?;
    }
    Ok(clock)
}

pub fn workspace(state: &AppState) -> Result<&Workspace, HandlerErr> {
    state
        .workspace
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn workspace_mut(state: &mut AppState) -> Result<&mut Workspace, HandlerErr> {
    state
        .workspace
        .as_mut()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

/// Workspace must be open and the session must carry `access`.
pub fn guard(state: &AppState, access: Access) -> Result<User, HandlerErr> {
    workspace(state)?;
    let user = auth::authorize(state.session.as_ref(), access)?;
    Ok(user.clone())
}

/// Runs `f` against one collection and persists it when `f` reports a
/// change. On any failure the collection is put back as it was.
pub fn mutate<T: Slot, R>(
    ws: &mut Workspace,
    f: impl FnOnce(&mut Vec<T>) -> Result<Option<R>, HandlerErr>,
) -> Result<Option<R>, HandlerErr> {
    let before = T::slot(&ws.data).clone();
    let out = match f(T::slot_mut(&mut ws.data)) {
        Ok(out) => out,
        Err(e) => {
            *T::slot_mut(&mut ws.data) = before;
            return Err(e);
        }
    };
    if out.is_some() {
        if let Err(e) = ws.flush::<T>() {
            *T::slot_mut(&mut ws.data) = before;
            return Err(write_failed(e));
        }
    }
    Ok(out)
}

pub fn mutate_roster<R>(
    ws: &mut Workspace,
    roster: Roster,
    f: impl FnOnce(&mut Vec<String>) -> (R, bool),
) -> Result<R, HandlerErr> {
    let before = roster.names(&ws.data).clone();
    let (out, changed) = f(roster.names_mut(&mut ws.data));
    if changed {
        if let Err(e) = ws.flush_roster(roster) {
            *roster.names_mut(&mut ws.data) = before;
            return Err(write_failed(e));
        }
    }
    Ok(out)
}

pub fn list_records<T: Slot>(state: &AppState, access: Access) -> Result<Value, HandlerErr> {
    guard(state, access)?;
    let ws = workspace(state)?;
    let mut out = serde_json::Map::new();
    out.insert(T::PLURAL.to_string(), to_value(T::slot(&ws.data))?);
    Ok(Value::Object(out))
}

pub fn create_record<D>(state: &mut AppState, req: &Request, access: Access) -> Result<Value, HandlerErr>
where
    D: Draft + DeserializeOwned,
    D::Output: Slot,
{
    guard(state, access)?;
    let clock = clock(req)?;
    let draft: D = params(req)?;
    let ws = workspace_mut(state)?;
    let record = mutate::<D::Output, _>(ws, |items| {
        Ok(Some(records::create(items, draft, &clock)?))
    })?;
    Ok(json!({ "record": to_value(&record)? }))
}

pub fn toggle_record<T: Slot + Completable>(
    state: &mut AppState,
    req: &Request,
    access: Access,
) -> Result<Value, HandlerErr> {
    guard(state, access)?;
    let id = required_str(&req.params, "id")?;
    let ws = workspace_mut(state)?;
    let record = mutate::<T, _>(ws, |items| Ok(records::toggle(items, &id)))?;
    Ok(json!({
        "id": id,
        "changed": record.is_some(),
        "record": to_value(&record)?,
    }))
}

pub fn remove_record<T: Slot>(
    state: &mut AppState,
    req: &Request,
    access: Access,
) -> Result<Value, HandlerErr> {
    guard(state, access)?;
    let id = required_str(&req.params, "id")?;
    let ws = workspace_mut(state)?;
    let removed = mutate::<T, _>(ws, |items| Ok(records::remove(items, &id)))?;
    Ok(json!({ "id": id, "changed": removed.is_some() }))
}
