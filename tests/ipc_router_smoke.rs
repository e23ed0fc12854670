mod test_support;

use serde_json::json;
use test_support::{
    error_code, open_as_admin, request, request_err, send_line, spawn_sidecar, temp_dir,
};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("emdra-router-smoke");
    let bundle_out = workspace.join("smoke-backup.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    open_as_admin(&mut stdin, &mut reader, &workspace);

    let methods = [
        ("health", json!({})),
        ("auth.session", json!({})),
        ("users.list", json!({})),
        ("students.list", json!({})),
        ("teachers.list", json!({})),
        ("staff.list", json!({})),
        ("catalog.get", json!({})),
        ("occurrences.list", json!({})),
        ("occurrences.history", json!({ "student": "Ana" })),
        ("attendance.list", json!({})),
        ("attendance.absentees", json!({ "period": "week" })),
        ("demands.list", json!({})),
        ("goals.list", json!({})),
        ("finance.list", json!({})),
        ("finance.balance", json!({})),
        ("documents.list", json!({})),
        ("meetings.list", json!({})),
        ("events.list", json!({})),
        ("dashboard.stats", json!({})),
        ("dashboard.feed", json!({})),
        ("insight.get", json!({})),
        ("backup.export", json!({ "outPath": bundle_out.to_string_lossy() })),
    ];
    for (i, (method, params)) in methods.iter().enumerate() {
        let resp = request(&mut stdin, &mut reader, &format!("m{}", i), method, params.clone());
        assert_eq!(
            resp.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            resp
        );
    }

    let unknown = request_err(&mut stdin, &mut reader, "u", "classes.list", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    let bad = send_line(&mut stdin, &mut reader, "{not json");
    assert_eq!(bad.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        bad.get("error").and_then(|e| e.get("code")).and_then(|v| v.as_str()),
        Some("bad_json")
    );

    // The loop keeps serving after a bad line.
    let health = request(&mut stdin, &mut reader, "after", "health", json!({}));
    assert_eq!(health.get("ok").and_then(|v| v.as_bool()), Some(true));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn requests_before_workspace_select_fail_cleanly() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let result = health.get("result").expect("result");
    assert!(result.get("workspacePath").map_or(false, |v| v.is_null()));
    assert_eq!(
        result.get("insightConfigured").and_then(|v| v.as_bool()),
        Some(false)
    );

    let e = request_err(&mut stdin, &mut reader, "2", "occurrences.list", json!({}));
    assert_eq!(error_code(&e), "no_workspace");
    let e = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "name": "Direção", "pin": "1500" }),
    );
    assert_eq!(error_code(&e), "no_workspace");
    let e = request_err(&mut stdin, &mut reader, "4", "workspace.select", json!({}));
    assert_eq!(error_code(&e), "bad_params");
}
