mod test_support;

use serde_json::json;
use test_support::{open_as_admin, request_ok, spawn_sidecar, temp_dir};

fn values(list: &serde_json::Value) -> Vec<u64> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|c| c.get("value").and_then(|v| v.as_u64()).expect("value"))
        .collect()
}

#[test]
fn dashboard_stats_reflect_every_collection() {
    let workspace = temp_dir("emdra-dashboard");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);
    let today = "2026-03-02";

    let occurrences = [
        ("Pedagógica", "Registro de Ocorrência", "Falta de material escolar"),
        ("Grave", "Advertência Disciplinar", "Agressão física"),
        ("Grave", "Advertência Disciplinar", "Bullying ou Cyberbullying"),
    ];
    for (i, (kind, nature, reason)) in occurrences.iter().enumerate() {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("o{}", i),
            "occurrences.create",
            json!({ "student": "Ana", "type": kind, "nature": nature, "reason": reason }),
        );
    }

    for (i, title) in ["A", "B", "C"].iter().enumerate() {
        let created = request_ok(
            &mut stdin,
            &mut reader,
            &format!("d{}", i),
            "demands.create",
            json!({ "title": title, "date": today }),
        );
        if i < 2 {
            let id = created
                .get("record")
                .and_then(|r| r.get("id"))
                .cloned()
                .expect("id");
            let _ = request_ok(
                &mut stdin,
                &mut reader,
                &format!("t{}", i),
                "demands.toggle",
                json!({ "id": id }),
            );
        }
    }

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "f1",
        "finance.create",
        json!({ "type": "Inflow", "amount": 500, "description": "Verba PDDE" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "f2",
        "finance.create",
        json!({ "type": "Outflow", "amount": 120, "description": "Material" }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "s1",
        "staff.bulkAdd",
        json!({ "text": "Rita\nJoão\n" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "a1",
        "attendance.create",
        json!({ "personName": "Rita", "date": today }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "a2",
        "attendance.create",
        json!({ "personName": "João", "date": "2026-02-27" }),
    );

    let stats = request_ok(
        &mut stdin,
        &mut reader,
        "stats",
        "dashboard.stats",
        json!({ "today": today }),
    );
    assert_eq!(stats.get("today").and_then(|v| v.as_str()), Some(today));
    assert_eq!(values(stats.get("occurrencesByType").expect("byType")), vec![1, 0, 2]);
    assert_eq!(values(stats.get("occurrencesByNature").expect("byNature")), vec![1, 2]);
    assert_eq!(stats.get("financeBalance").and_then(|v| v.as_f64()), Some(380.0));

    let demands_today = stats
        .get("demands")
        .and_then(|d| d.get("today"))
        .expect("demands.today");
    assert_eq!(demands_today, &json!({ "total": 3, "completed": 2, "percentage": 67 }));

    let staff = stats.get("staff").expect("staff");
    assert_eq!(staff.get("day"), Some(&json!({ "count": 1, "percentage": 50 })));
    assert_eq!(staff.get("week"), Some(&json!({ "count": 2, "percentage": 100 })));
    assert_eq!(staff.get("month"), Some(&json!({ "count": 1, "percentage": 50 })));
    let teachers = stats.get("teachers").expect("teachers");
    assert_eq!(teachers.get("day"), Some(&json!({ "count": 0, "percentage": 0 })));

    let absent = request_ok(
        &mut stdin,
        &mut reader,
        "abs",
        "attendance.absentees",
        json!({ "isTeacher": false, "period": "week", "today": today }),
    );
    assert_eq!(absent.get("count").and_then(|v| v.as_u64()), Some(2));

    let again = request_ok(
        &mut stdin,
        &mut reader,
        "stats2",
        "dashboard.stats",
        json!({ "today": today }),
    );
    assert_eq!(again, stats);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn feed_lists_newest_activity_first() {
    let workspace = temp_dir("emdra-feed");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_as_admin(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "occurrences.create",
        json!({ "student": "Ana", "type": "Comportamental", "reason": "Conversa excessiva" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "meetings.create",
        json!({ "student": "Ana", "guardian": "Maria", "reason": "Comportamento em sala" }),
    );
    for i in 0..4 {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("d{}", i),
            "demands.create",
            json!({ "title": format!("Demanda {}", i) }),
        );
    }

    let feed = request_ok(&mut stdin, &mut reader, "3", "dashboard.feed", json!({}));
    let items = feed.get("items").and_then(|v| v.as_array()).expect("items");
    assert_eq!(items.len(), 5);
    assert_eq!(
        items[0].get("subject").and_then(|v| v.as_str()),
        Some("Demanda 3")
    );
    let stamps: Vec<i64> = items
        .iter()
        .map(|i| i.get("createdAt").and_then(|v| v.as_i64()).expect("createdAt"))
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));

    let all = request_ok(&mut stdin, &mut reader, "4", "dashboard.feed", json!({ "limit": 10 }));
    assert_eq!(
        all.get("items").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(6)
    );

    let _ = std::fs::remove_dir_all(workspace);
}
