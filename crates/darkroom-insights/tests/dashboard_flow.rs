//! End-to-end dashboard flow: seed a projection store, drive the shared
//! order lifecycle through the rollup, and check that every derived view
//! agrees with the persisted state after each published snapshot.

use chrono::{DateTime, Duration, TimeZone, Utc};
use darkroom_core::FixedClock;
use darkroom_core::config::TeamConfig;
use darkroom_core::db::{editors, open_in_memory, orders};
use darkroom_core::model::{Editor, Employment, Priority, Role, Status};
use darkroom_core::watch::SnapshotHub;
use darkroom_insights::{DashboardView, attach, editor_monthly_summary, weekly_trend};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 4, 9, 0, 0).unwrap()
}

fn seed_editor(conn: &rusqlite::Connection, id: &str, name: &str) {
    editors::upsert_editor(
        conn,
        &Editor {
            id: id.into(),
            email: format!("{id}@studio.example"),
            name: name.into(),
            role: Role::Editor,
            employment: Employment::Active,
            self_order_approved: false,
            rating: None,
            targets: BTreeMap::new(),
        },
    )
    .expect("seed editor");
}

#[test]
fn shared_order_lifecycle_reaches_every_view() {
    let mut conn = open_in_memory().expect("open");
    seed_editor(&conn, "ed-a", "Arun");
    seed_editor(&conn, "ed-b", "Bela");

    // Target for August so the progress bar has something to show.
    let cfg = TeamConfig::default();
    editors::set_monthly_target(&conn, &cfg, "ed-a", "2026-08", 10).expect("target");

    let views: Rc<RefCell<Vec<DashboardView>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&views);
    let mut hub = SnapshotHub::new();
    attach(&mut hub, TeamConfig::default(), FixedClock(t0()), move |view| {
        sink.borrow_mut().push(view);
    });

    // A shared order, created five days ago so it shows up overdue.
    let created = t0() - Duration::days(5);
    orders::create_order(
        &mut conn,
        orders::NewOrder {
            id: "ord-shared".into(),
            customer: "Lensflare Films".into(),
            telecaller: "meera".into(),
            remark: String::new(),
            priority: Priority::High,
            sample_image_url: None,
            assigned_editors: BTreeSet::from(["ed-a".to_string(), "ed-b".to_string()]),
        },
        "lead",
        created,
    )
    .expect("create");
    hub.publish_from(&conn).expect("publish");

    {
        let seen = views.borrow();
        let view = seen.last().expect("one view");
        assert_eq!(view.team.total_orders, 1);
        assert_eq!(view.overdue.len(), 1);
        assert_eq!(view.overdue[0].days_old, 5);
        assert!(view.top_performer.is_none());
    }

    // First contributor finishes: order stays open, but the contributor
    // already has completion credit everywhere.
    orders::save_editor_status(&mut conn, "ord-shared", "ed-a", Status::Completed, t0())
        .expect("a completes");
    let snapshot = hub.publish_from(&conn).expect("publish");

    {
        let seen = views.borrow();
        let view = seen.last().expect("two views");
        assert_eq!(view.team.by_status.in_progress, 1);
        assert_eq!(view.team.by_status.completed, 0);

        let arun = &view.editors[0];
        assert_eq!(arun.name, "Arun");
        assert_eq!(arun.workload.completed, 1);
        assert_eq!(arun.workload.open, 0);

        let target = arun.target.expect("target set for August");
        assert_eq!(target.completed, 0, "order was created in July");

        let top = view.top_performer.as_ref();
        assert!(top.is_none(), "July creation does not count for August");
    }

    // The per-editor views over the same snapshot agree.
    let summary = editor_monthly_summary(&snapshot.orders, "ed-a", t0());
    assert_eq!(summary.assigned_total, 1);
    assert_eq!(summary.completed_total, 1);
    assert_eq!(summary.month_assigned, 0);

    let trend = weekly_trend(&snapshot.orders, "ed-b");
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].assigned, 1);
    assert_eq!(trend[0].completed, 0);

    // Second contributor finishes: the order rolls up.
    orders::save_editor_status(&mut conn, "ord-shared", "ed-b", Status::Completed, t0())
        .expect("b completes");
    hub.publish_from(&conn).expect("publish");

    {
        let seen = views.borrow();
        let view = seen.last().expect("three views");
        assert_eq!(view.team.by_status.completed, 1);
        assert!(view.overdue.is_empty(), "completed orders stop aging");
        assert_eq!(view.age_counts.overdue_short, 0);
    }
}

#[test]
fn snapshot_views_survive_an_empty_store() {
    let conn = open_in_memory().expect("open");
    let snapshot = darkroom_core::watch::load_snapshot(&conn).expect("load");

    let view = DashboardView::compute(&snapshot, &TeamConfig::default(), t0());
    assert_eq!(view.team.total_orders, 0);
    assert!(view.editors.is_empty());
    assert!(weekly_trend(&snapshot.orders, "ed-a").is_empty());
}
