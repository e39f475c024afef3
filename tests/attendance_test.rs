//! QR attendance: one record per student per local day.

mod support;

use chrono::Duration;
use mcare::domain::DomainError;
use support::{at, TestApp};

#[tokio::test]
async fn morning_scan_is_truncated_to_the_day_and_cannot_repeat() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.clock.set(at("2025-06-10 08:00:00"));

    let marked = app.attendance().mark("S001").await.unwrap();
    assert_eq!(marked.attendance.date, at("2025-06-10 00:00:00"));
    assert_eq!(marked.attendance.time_in, "08:00:00");
    assert_eq!(marked.user.school_id, "S001");

    app.clock.set(at("2025-06-10 23:59:59"));
    let err = app.attendance().mark("S001").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::AlreadyMarkedToday { ref school_id, ref date } if school_id == "S001" && date == "2025-06-10"
    ));

    assert_eq!(app.attendance().list_for_school_id("S001").await.unwrap().len(), 1);
}

#[tokio::test]
async fn next_day_gets_a_new_record() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.clock.set(at("2025-06-10 23:59:59"));
    app.attendance().mark("S001").await.unwrap();

    app.clock.advance(Duration::seconds(1));
    let marked = app.attendance().mark(" S001 ").await.unwrap();
    assert_eq!(marked.attendance.date, at("2025-06-11 00:00:00"));
    assert_eq!(marked.attendance.time_in, "00:00:00");

    let history = app.attendance().list_for_school_id("S001").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].date > history[1].date, "newest first");
}

#[tokio::test]
async fn unknown_school_id_is_rejected() {
    let app = TestApp::new().await;
    assert!(matches!(
        app.attendance().mark("S404").await.unwrap_err(),
        DomainError::UnknownUser(id) if id == "S404"
    ));
    assert!(matches!(
        app.attendance().list_for_school_id("S404").await.unwrap_err(),
        DomainError::UnknownUser(_)
    ));
}

#[tokio::test]
async fn listing_joins_users_and_survives_deleted_ones() {
    let app = TestApp::new().await;
    app.student("S001").await;
    let gone = app.student("S002").await;
    app.clock.set(at("2025-06-10 07:30:00"));
    app.attendance().mark("S001").await.unwrap();
    app.attendance().mark("S002").await.unwrap();

    app.users().delete_user(&gone.id).await.unwrap();

    let entries = app.attendance().list_all().await.unwrap();
    assert_eq!(entries.len(), 2);
    let orphan = entries
        .iter()
        .find(|e| e.attendance.school_id == "S002")
        .unwrap();
    assert!(orphan.user.is_none());
    let present = entries
        .iter()
        .find(|e| e.attendance.school_id == "S001")
        .unwrap();
    assert_eq!(present.user.as_ref().unwrap().school_id, "S001");
}
