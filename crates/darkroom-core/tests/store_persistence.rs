//! On-disk projection round-trip: state written through the store API must
//! survive closing and reopening the database file, the way a dashboard
//! process restart would.

use chrono::{DateTime, TimeZone, Utc};
use darkroom_core::config::TeamConfig;
use darkroom_core::db::{self, editors, history, notify, orders};
use darkroom_core::model::{Editor, Employment, Priority, Role, Status};
use std::collections::{BTreeMap, BTreeSet};
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
}

fn editor(id: &str, name: &str) -> Editor {
    Editor {
        id: id.into(),
        email: format!("{id}@studio.example"),
        name: name.into(),
        role: Role::Editor,
        employment: Employment::Active,
        self_order_approved: false,
        rating: None,
        targets: BTreeMap::new(),
    }
}

#[test]
fn projection_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("projection.db");
    let cfg = TeamConfig::default();

    {
        let mut conn = db::open(&path).expect("open");
        editors::upsert_editor(&conn, &editor("ed-a", "Arun")).expect("seed a");
        editors::upsert_editor(&conn, &editor("ed-b", "Bela")).expect("seed b");
        editors::set_monthly_target(&conn, &cfg, "ed-a", "2026-08", 25).expect("target");

        orders::create_order(
            &mut conn,
            orders::NewOrder {
                id: "ord-1".into(),
                customer: "Lensflare Films".into(),
                telecaller: "meera".into(),
                remark: "album retouch".into(),
                priority: Priority::High,
                sample_image_url: Some("gs://darkroom/samples/ord-1.jpg".into()),
                assigned_editors: BTreeSet::from(["ed-a".to_string(), "ed-b".to_string()]),
            },
            "lead",
            t0(),
        )
        .expect("create");
        orders::save_editor_status(&mut conn, "ord-1", "ed-a", Status::Completed, t0())
            .expect("a completes");

        let order = orders::get_order(&conn, "ord-1")
            .expect("get")
            .expect("present");
        notify::notify_assignees(
            &conn,
            &order,
            "lead",
            "This order is pending for over 3 days",
            notify::Kind::Danger,
            t0(),
        )
        .expect("notify");
    }

    // A fresh connection sees exactly the same projection.
    let conn = db::open(&path).expect("reopen");

    let order = orders::get_order(&conn, "ord-1")
        .expect("get")
        .expect("present");
    assert_eq!(order.status, Status::InProgress);
    assert_eq!(order.priority, Priority::High);
    assert_eq!(
        order.completed_by,
        BTreeSet::from(["ed-a".to_string()])
    );
    assert_eq!(order.created_at, Some(t0()));
    assert!(order.completed_at.is_none());

    let roster = editors::active_editors(&conn).expect("roster");
    assert_eq!(roster.len(), 2);
    let arun = editors::get_editor(&conn, "ed-a")
        .expect("get")
        .expect("present");
    assert_eq!(arun.targets.get("2026-08"), Some(&25));

    let trail = history::list_for_order(&conn, "ord-1").expect("history");
    let actions: Vec<&str> = trail.iter().map(|entry| entry.action.as_str()).collect();
    assert_eq!(actions, vec!["created", "status_changed"]);

    let unread = notify::unread_for(&conn, "ed-b").expect("unread");
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].order_id.as_deref(), Some("ord-1"));
}

#[test]
fn reopening_never_rewrites_existing_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("projection.db");

    {
        let mut conn = db::open(&path).expect("open");
        orders::create_order(
            &mut conn,
            orders::NewOrder {
                id: "ord-1".into(),
                customer: "Acme Weddings".into(),
                telecaller: String::new(),
                remark: String::new(),
                priority: Priority::Normal,
                sample_image_url: None,
                assigned_editors: BTreeSet::from(["ed-a".to_string()]),
            },
            "lead",
            t0(),
        )
        .expect("create");
    }

    // Opening twice more re-runs migrations as no-ops.
    let _ = db::open(&path).expect("second open");
    let conn = db::open(&path).expect("third open");

    let all = orders::list_orders(&conn).expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "ord-1");
}
