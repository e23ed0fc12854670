mod test_support;

use serde_json::json;
use test_support::{error_code, open_as_admin, request_err, request_ok, spawn_sidecar, temp_dir};

fn ids(list: &serde_json::Value, field: &str) -> Vec<String> {
    list.get(field)
        .and_then(|v| v.as_array())
        .expect("list")
        .iter()
        .filter_map(|r| r.get("id").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

#[test]
fn occurrences_create_prepend_history_and_remove() {
    let workspace = temp_dir("emdra-occurrences");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "occurrences.create",
        json!({
            "student": "Ana Souza",
            "className": "7º A",
            "type": "Comportamental",
            "reason": "Conversa excessiva",
            "date": "2026-03-02",
        }),
    );
    let first = first.get("record").expect("record").clone();
    assert_eq!(first.get("nature").and_then(|v| v.as_str()), Some("Registro de Ocorrência"));
    assert_eq!(first.get("shift").and_then(|v| v.as_str()), Some("Manhã"));
    assert_eq!(first.get("reporter").and_then(|v| v.as_str()), Some("Direção"));

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "occurrences.create",
        json!({
            "student": "Bruno Lima",
            "type": "Serious",
            "nature": "Warning",
            "reason": "Agressão física",
        }),
    );
    let second = second.get("record").expect("record").clone();
    assert!(
        second.get("createdAt").and_then(|v| v.as_i64())
            > first.get("createdAt").and_then(|v| v.as_i64())
    );

    let list = request_ok(&mut stdin, &mut reader, "3", "occurrences.list", json!({}));
    let order = ids(&list, "occurrences");
    assert_eq!(
        order,
        vec![
            second.get("id").and_then(|v| v.as_str()).expect("id").to_string(),
            first.get("id").and_then(|v| v.as_str()).expect("id").to_string(),
        ]
    );

    let history = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "occurrences.history",
        json!({ "student": "Ana Souza" }),
    );
    assert_eq!(history.get("count").and_then(|v| v.as_u64()), Some(1));

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "occurrences.remove",
        json!({ "id": first.get("id").cloned().expect("id") }),
    );
    assert_eq!(removed.get("changed").and_then(|v| v.as_bool()), Some(true));
    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "occurrences.remove",
        json!({ "id": "does-not-exist" }),
    );
    assert_eq!(missing.get("changed").and_then(|v| v.as_bool()), Some(false));

    let list = request_ok(&mut stdin, &mut reader, "7", "occurrences.list", json!({}));
    assert_eq!(ids(&list, "occurrences").len(), 1);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn validation_failures_name_the_field_and_leave_collections_alone() {
    let workspace = temp_dir("emdra-validation");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);

    let cases = [
        ("occurrences.create", json!({ "reason": "Conversa excessiva", "type": "Comportamental" }), "student"),
        ("occurrences.create", json!({ "student": "Ana", "type": "Pedagógica", "reason": "Agressão física" }), "reason"),
        ("attendance.create", json!({ "personName": "  " }), "personName"),
        ("demands.create", json!({ "title": "Reunião", "date": "02/03/2026" }), "date"),
        ("goals.create", json!({}), "text"),
        ("finance.create", json!({ "type": "Inflow", "amount": -5, "description": "Doação" }), "amount"),
        ("documents.create", json!({ "name": "Regimento" }), "linkOrBase64"),
        ("meetings.create", json!({ "student": "Ana" }), "reason"),
        ("events.create", json!({ "title": "Feriado" }), "date"),
        ("staff.add", json!({ "name": "Rita", "role": "Astronauta" }), "role"),
        ("users.create", json!({ "name": "Sem PIN" }), "pin"),
    ];
    for (i, (method, params, field)) in cases.iter().enumerate() {
        let e = request_err(&mut stdin, &mut reader, &format!("v{}", i), method, params.clone());
        assert_eq!(error_code(&e), "validation_failed", "{}", method);
        assert_eq!(
            e.get("details")
                .and_then(|d| d.get("field"))
                .and_then(|v| v.as_str()),
            Some(*field),
            "{}",
            method
        );
    }

    let list = request_ok(&mut stdin, &mut reader, "l1", "occurrences.list", json!({}));
    assert_eq!(ids(&list, "occurrences").len(), 0);
    let list = request_ok(&mut stdin, &mut reader, "l2", "finance.list", json!({}));
    assert_eq!(ids(&list, "finances").len(), 0);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn demands_and_goals_toggle_in_place() {
    let workspace = temp_dir("emdra-toggle");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);

    let demand = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "demands.create",
        json!({ "title": "Enviar relatório", "date": "2026-03-02" }),
    );
    let id = demand
        .get("record")
        .and_then(|r| r.get("id"))
        .cloned()
        .expect("id");

    let toggled = request_ok(&mut stdin, &mut reader, "2", "demands.toggle", json!({ "id": id }));
    assert_eq!(toggled.get("changed").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        toggled
            .get("record")
            .and_then(|r| r.get("completed"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    let toggled = request_ok(&mut stdin, &mut reader, "3", "demands.toggle", json!({ "id": id }));
    assert_eq!(
        toggled
            .get("record")
            .and_then(|r| r.get("completed"))
            .and_then(|v| v.as_bool()),
        Some(false)
    );
    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "demands.toggle",
        json!({ "id": "nope" }),
    );
    assert_eq!(missing.get("changed").and_then(|v| v.as_bool()), Some(false));

    let windowed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "demands.list",
        json!({ "period": "today", "today": "2026-03-02" }),
    );
    assert_eq!(ids(&windowed, "demands").len(), 1);
    assert_eq!(
        windowed
            .get("stats")
            .and_then(|s| s.get("total"))
            .and_then(|v| v.as_u64()),
        Some(1)
    );
    let elsewhere = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "demands.list",
        json!({ "period": "day", "today": "2026-03-03" }),
    );
    assert_eq!(ids(&elsewhere, "demands").len(), 0);

    let goal = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "goals.create",
        json!({ "text": "Reduzir faltas em 10%" }),
    );
    let goal_id = goal
        .get("record")
        .and_then(|r| r.get("id"))
        .cloned()
        .expect("id");
    let toggled = request_ok(&mut stdin, &mut reader, "8", "goals.toggle", json!({ "id": goal_id }));
    assert_eq!(
        toggled
            .get("record")
            .and_then(|r| r.get("completed"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    let removed = request_ok(&mut stdin, &mut reader, "9", "goals.remove", json!({ "id": goal_id }));
    assert_eq!(removed.get("changed").and_then(|v| v.as_bool()), Some(true));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn records_persist_across_restart() {
    let workspace = temp_dir("emdra-persist");
    {
        let (_child, mut stdin, mut reader) = spawn_sidecar();
        open_as_admin(&mut stdin, &mut reader, &workspace);
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "finance.create",
            json!({ "type": "Inflow", "category": "Obras", "amount": 500, "description": "Verba" }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "events.create",
            json!({ "title": "Conselho de classe", "date": "2026-04-10", "type": "Reunião" }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "3",
            "documents.create",
            json!({ "name": "LDB", "category": "Lei", "linkOrBase64": "https://example.org/ldb" }),
        );
    }

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);
    let finances = request_ok(&mut stdin, &mut reader, "4", "finance.list", json!({}));
    assert_eq!(ids(&finances, "finances").len(), 1);
    let events = request_ok(&mut stdin, &mut reader, "5", "events.list", json!({}));
    assert_eq!(ids(&events, "events").len(), 1);
    let documents = request_ok(&mut stdin, &mut reader, "6", "documents.list", json!({}));
    assert_eq!(ids(&documents, "documents").len(), 1);
    let balance = request_ok(&mut stdin, &mut reader, "7", "finance.balance", json!({}));
    assert_eq!(balance.get("balance").and_then(|v| v.as_f64()), Some(500.0));
    assert_eq!(
        balance
            .get("byCategory")
            .and_then(|c| c.get("capitalWorks"))
            .and_then(|v| v.as_f64()),
        Some(500.0)
    );

    let _ = std::fs::remove_dir_all(workspace);
}
