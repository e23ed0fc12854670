//! Accounts, name rosters and staff.

use crate::auth::Access;
use crate::ipc::helpers::{
    create_record, guard, list_records, mutate, mutate_roster, optional_str, params,
    remove_record, required_str, respond, to_value, workspace, workspace_mut, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{PublicUser, StaffMember, User};
use crate::records::{self, Clock, StaffDraft, UserDraft};
use crate::store::Roster;
use serde_json::{json, Value};
use tracing::info;

fn users_list(state: &AppState) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let users: Vec<PublicUser> = workspace(state)?
        .data
        .users
        .iter()
        .map(PublicUser::from)
        .collect();
    Ok(json!({ "users": to_value(&users)? }))
}

fn users_create(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let draft: UserDraft = params(req)?;
    let clock = Clock::now();
    let ws = workspace_mut(state)?;
    let user = mutate::<User, _>(ws, |users| Ok(Some(records::create(users, draft, &clock)?)))?;
    let public = user.as_ref().map(PublicUser::from);
    Ok(json!({ "record": to_value(&public)? }))
}

fn users_remove(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let me = guard(state, Access::Admin)?;
    let id = required_str(&req.params, "id")?;
    if id == me.id {
        return Err(HandlerErr::new(
            "forbidden",
            "the signed-in account cannot be removed",
        ));
    }
    remove_record::<User>(state, req, Access::Admin)
}

fn roster_list(state: &AppState, roster: Roster) -> Result<Value, HandlerErr> {
    guard(state, Access::Member)?;
    let names = roster.names(&workspace(state)?.data);
    Ok(match roster {
        Roster::Students => json!({ "students": names }),
        Roster::Teachers => json!({ "teachers": names }),
    })
}

fn roster_add(state: &mut AppState, req: &Request, roster: Roster) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let name = required_str(&req.params, "name")?;
    let ws = workspace_mut(state)?;
    let changed = mutate_roster(ws, roster, |names| {
        let added = records::add_name(names, &name);
        (added, added)
    })?;
    Ok(json!({ "name": name, "changed": changed }))
}

fn roster_bulk_add(
    state: &mut AppState,
    req: &Request,
    roster: Roster,
) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let text = optional_str(&req.params, "text").unwrap_or_default();
    let ws = workspace_mut(state)?;
    let added = mutate_roster(ws, roster, |names| {
        let added = records::bulk_add_names(names, &text);
        (added, added > 0)
    })?;
    info!(roster = roster.key(), added, "bulk roster import");
    Ok(json!({ "added": added }))
}

fn roster_remove(state: &mut AppState, req: &Request, roster: Roster) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let name = required_str(&req.params, "name")?;
    let ws = workspace_mut(state)?;
    let changed = mutate_roster(ws, roster, |names| {
        let removed = records::remove_name(names, &name);
        (removed, removed)
    })?;
    Ok(json!({ "name": name, "changed": changed }))
}

/// One staff member per new line of `text`, with the default role. Names
/// already on staff are skipped.
fn staff_bulk_add(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let text = optional_str(&req.params, "text").unwrap_or_default();
    let clock = Clock::now();
    let ws = workspace_mut(state)?;
    let added = mutate::<StaffMember, _>(ws, |staff| {
        let mut added = Vec::new();
        for name in records::parse_bulk(&text) {
            if staff.iter().any(|s| s.name == name) {
                continue;
            }
            let draft = StaffDraft {
                name: Some(name),
                role: None,
            };
            added.push(records::create(staff, draft, &clock)?);
        }
        Ok(if added.is_empty() { None } else { Some(added) })
    })?
    .unwrap_or_default();
    info!(added = added.len(), "bulk staff import");
    Ok(json!({ "added": added.len(), "records": to_value(&added)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "users.list" => users_list(state),
        "users.create" => users_create(state, req),
        "users.remove" => users_remove(state, req),
        "students.list" => roster_list(state, Roster::Students),
        "students.add" => roster_add(state, req, Roster::Students),
        "students.bulkAdd" => roster_bulk_add(state, req, Roster::Students),
        "students.remove" => roster_remove(state, req, Roster::Students),
        "teachers.list" => roster_list(state, Roster::Teachers),
        "teachers.add" => roster_add(state, req, Roster::Teachers),
        "teachers.bulkAdd" => roster_bulk_add(state, req, Roster::Teachers),
        "teachers.remove" => roster_remove(state, req, Roster::Teachers),
        "staff.list" => list_records::<StaffMember>(state, Access::Admin),
        "staff.add" => create_record::<StaffDraft>(state, req, Access::Admin),
        "staff.bulkAdd" => staff_bulk_add(state, req),
        "staff.remove" => remove_record::<StaffMember>(state, req, Access::Admin),
        _ => return None,
    };
    Some(respond(req, result))
}
