use crate::auth;
use crate::ipc::helpers::{respond, to_value, workspace, write_failed, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::PublicUser;
use serde_json::{json, Value};
use tracing::{info, warn};

fn login(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    // Name and PIN are compared as typed, no trimming.
    let name = req
        .params
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let pin = req
        .params
        .get("pin")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let ws = workspace(state)?;
    let user = match auth::authenticate(&ws.data.users, &name, &pin) {
        Ok(u) => u.clone(),
        Err(e) => {
            warn!(name = %name, "login rejected");
            return Err(e.into());
        }
    };
    ws.save_session(&user).map_err(write_failed)?;
    info!(name = %user.name, role = user.role.label(), "signed in");
    let public = PublicUser::from(&user);
    state.session = Some(user);
    Ok(json!({ "user": to_value(&public)? }))
}

fn logout(state: &mut AppState) -> Result<Value, HandlerErr> {
    workspace(state)?.clear_session().map_err(write_failed)?;
    let was_signed_in = state.session.take().is_some();
    Ok(json!({ "changed": was_signed_in }))
}

fn session(state: &AppState) -> Result<Value, HandlerErr> {
    workspace(state)?;
    let user = state.session.as_ref().map(PublicUser::from);
    Ok(json!({ "user": to_value(&user)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "auth.login" => login(state, req),
        "auth.logout" => logout(state),
        "auth.session" => session(state),
        _ => return None,
    };
    Some(respond(req, result))
}
