//! Duty scheduling and its notifications.

mod support;

use mcare::application::DeliveryMode;
use mcare::domain::{DomainError, DutyPatch};
use support::{at, day, duty_on, ids, TestApp};

#[tokio::test]
async fn bsn_3a_duty_notifies_both_members_then_rejects_a_second_duty() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;
    let group = app
        .groups()
        .create_group("BSN-3A", &ids(&["S001", "S002"]))
        .await
        .unwrap();

    let scheduled = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();

    assert_eq!(scheduled.duty.day(), day("2025-06-10"));
    assert_eq!(scheduled.delivery.sent, 2);
    assert_eq!(
        app.mail.recipients(),
        vec!["s001@school.test".to_string(), "s002@school.test".to_string()]
    );
    assert!(app.mail.sent()[0]
        .subject
        .starts_with("New Duty Assigned for BSN-3A on Tuesday, June 10, 2025"));

    // a different time of day is still the same calendar day
    let err = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 15:30:00")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateDutyForDay { ref date, .. } if date == "2025-06-10"));
    assert_eq!(app.duties().list_duties(Some(&group.group.id)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stored_date_is_truncated_to_midnight() {
    let app = TestApp::new().await;
    let group = app.groups().create_group("A", &[]).await.unwrap();

    let scheduled = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 17:45:00")))
        .await
        .unwrap();
    assert_eq!(scheduled.duty.date, at("2025-06-10 00:00:00"));

    let fetched = app.duties().get_duty(&scheduled.duty.id).await.unwrap();
    assert_eq!(fetched.date, at("2025-06-10 00:00:00"));
}

#[tokio::test]
async fn different_groups_may_share_a_day() {
    let app = TestApp::new().await;
    let a = app.groups().create_group("A", &[]).await.unwrap();
    let b = app.groups().create_group("B", &[]).await.unwrap();

    app.duties()
        .create_duty(duty_on(&a.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();
    app.duties()
        .create_duty(duty_on(&b.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();
    assert_eq!(app.duties().list_duties(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_duty_validates_group_and_fields() {
    let app = TestApp::new().await;
    let err = app
        .duties()
        .create_duty(duty_on("missing", at("2025-06-10 00:00:00")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownGroup(_)));

    let group = app.groups().create_group("A", &[]).await.unwrap();
    let mut blank = duty_on(&group.group.id, at("2025-06-10 00:00:00"));
    blank.place = "   ".into();
    let err = app.duties().create_duty(blank).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn delivery_failures_do_not_fail_the_duty() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;
    app.mail.reject("s002@school.test");
    let group = app
        .groups()
        .create_group("A", &ids(&["S001", "S002"]))
        .await
        .unwrap();

    let scheduled = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();

    assert_eq!(scheduled.delivery.sent, 1);
    assert_eq!(scheduled.delivery.failed, 1);
    assert!(app.duties().get_duty(&scheduled.duty.id).await.is_ok());
}

#[tokio::test]
async fn batch_mode_sends_one_mail_to_the_whole_group() {
    let app = TestApp::with_delivery(DeliveryMode::Batch).await;
    app.student("S001").await;
    app.student("S002").await;
    let group = app
        .groups()
        .create_group("A", &ids(&["S001", "S002"]))
        .await
        .unwrap();

    app.duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();

    let sent = app.mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.len(), 2);
}

#[tokio::test]
async fn update_merges_fields_and_notifies_current_members() {
    let app = TestApp::new().await;
    app.student("S001").await;
    let group = app.groups().create_group("A", &ids(&["S001"])).await.unwrap();
    let scheduled = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();

    // membership is resolved when the update happens
    app.student("S002").await;
    app.groups().add_members(&group.group.id, &ids(&["S002"])).await.unwrap();
    app.mail.clear();

    let updated = app
        .duties()
        .update_duty(
            &scheduled.duty.id,
            DutyPatch {
                place: Some(" Ward 5 ".into()),
                date: Some(at("2025-06-11 13:00:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.duty.place, "Ward 5");
    assert_eq!(updated.duty.area, "Pediatrics");
    assert_eq!(updated.duty.date, at("2025-06-11 00:00:00"));
    assert_eq!(updated.delivery.sent, 2);
    assert!(app.mail.sent()[0].subject.starts_with("Duty Updated for A on"));
}

#[tokio::test]
async fn update_into_an_occupied_day_is_rejected_by_the_store() {
    let app = TestApp::new().await;
    let group = app.groups().create_group("A", &[]).await.unwrap();
    app.duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();
    let other = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-11 00:00:00")))
        .await
        .unwrap();

    let err = app
        .duties()
        .update_duty(
            &other.duty.id,
            DutyPatch {
                date: Some(at("2025-06-10 00:00:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateDutyForDay { .. }));
}

#[tokio::test]
async fn duties_for_user_follow_their_group() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    let loner = app.student("S002").await;
    let group = app.groups().create_group("A", &ids(&["S001"])).await.unwrap();
    for d in ["2025-06-12 00:00:00", "2025-06-10 00:00:00"] {
        app.duties()
            .create_duty(duty_on(&group.group.id, at(d)))
            .await
            .unwrap();
    }

    let mine = app.duties().duties_for_user(&s001.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine[0].date < mine[1].date);

    assert!(app.duties().duties_for_user(&loner.id).await.unwrap().is_empty());
    assert!(matches!(
        app.duties().duties_for_user("nobody").await.unwrap_err(),
        DomainError::UnknownUser(_)
    ));
}

#[tokio::test]
async fn deleting_a_group_keeps_its_duties() {
    let app = TestApp::new().await;
    let group = app.groups().create_group("A", &[]).await.unwrap();
    let scheduled = app
        .duties()
        .create_duty(duty_on(&group.group.id, at("2025-06-10 00:00:00")))
        .await
        .unwrap();

    app.groups().delete_group(&group.group.id).await.unwrap();
    assert!(app.duties().get_duty(&scheduled.duty.id).await.is_ok());

    app.duties().delete_duty(&scheduled.duty.id).await.unwrap();
    assert!(app.duties().get_duty(&scheduled.duty.id).await.unwrap_err().is_not_found());
}
