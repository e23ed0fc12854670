use crate::auth::Access;
use crate::calc;
use crate::ipc::helpers::{
    create_record, guard, list_records, remove_record, respond, workspace, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{FinanceCategory, FinanceRecord};
use crate::records::FinanceDraft;
use serde_json::{json, Value};

fn balance(state: &AppState) -> Result<Value, HandlerErr> {
    guard(state, Access::Admin)?;
    let records = &workspace(state)?.data.finances;
    let of = |category: FinanceCategory| {
        let subset: Vec<FinanceRecord> = records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect();
        calc::finance_balance(&subset)
    };
    Ok(json!({
        "balance": calc::finance_balance(records),
        "byCategory": {
            "general": of(FinanceCategory::General),
            "capitalWorks": of(FinanceCategory::CapitalWorks),
        },
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "finance.list" => list_records::<FinanceRecord>(state, Access::Admin),
        "finance.create" => create_record::<FinanceDraft>(state, req, Access::Admin),
        "finance.remove" => remove_record::<FinanceRecord>(state, req, Access::Admin),
        "finance.balance" => balance(state),
        _ => return None,
    };
    Some(respond(req, result))
}
