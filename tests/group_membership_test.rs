//! Group membership against a migrated SQLite database.

mod support;

use mcare::application::MemberOutcome;
use mcare::domain::DomainError;
use support::{ids, TestApp};

#[tokio::test]
async fn create_group_resolves_school_ids_and_collapses_duplicates() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;

    let details = app
        .groups()
        .create_group("  BSN-3A ", &ids(&["S001", "S002", "S001"]))
        .await
        .unwrap();

    assert_eq!(details.group.name, "BSN-3A");
    assert_eq!(details.members.len(), 2);
    assert_eq!(details.group.member_ids.len(), 2);
}

#[tokio::test]
async fn create_group_rejects_duplicate_name_and_blank_name() {
    let app = TestApp::new().await;
    app.groups().create_group("BSN-3A", &[]).await.unwrap();

    let err = app.groups().create_group("BSN-3A", &[]).await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicateName(name) if name == "BSN-3A"));

    let err = app.groups().create_group("   ", &[]).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn create_group_is_all_or_nothing() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;
    app.groups().create_group("BSN-3A", &ids(&["S001"])).await.unwrap();

    let err = app
        .groups()
        .create_group("BSN-3B", &ids(&["S002", "S404"]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownMember(id) if id == "S404"));

    let err = app
        .groups()
        .create_group("BSN-3B", &ids(&["S002", "S001"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::AlreadyGrouped { ref school_id, ref group } if school_id == "S001" && group == "BSN-3A"
    ));

    // nothing from the failed attempts was written
    assert!(app.groups().list_groups(Some("3B")).await.unwrap().is_empty());
    let s002 = app.repos.users().find_by_school_id("S002").await.unwrap().unwrap();
    assert!(app.groups().group_of(&s002.id).await.unwrap().is_none());
}

#[tokio::test]
async fn add_members_reports_each_item_without_failing_the_batch() {
    let app = TestApp::new().await;
    app.student("S001").await;
    app.student("S002").await;
    app.student("S003").await;
    app.groups().create_group("BSN-3A", &ids(&["S003"])).await.unwrap();
    let target = app.groups().create_group("BSN-3B", &[]).await.unwrap();

    let report = app
        .groups()
        .add_members(&target.group.id, &ids(&["S001", "S999", "S003"]))
        .await
        .unwrap();

    assert_eq!(report.added.len(), 1);
    assert_eq!(report.not_found.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(&report.added[0], MemberOutcome::Added { school_id, .. } if school_id == "S001"));
    assert!(matches!(&report.not_found[0], MemberOutcome::NotFound { school_id } if school_id == "S999"));
    assert!(matches!(
        &report.skipped[0],
        MemberOutcome::Skipped { school_id, group } if school_id == "S003" && group == "BSN-3A"
    ));

    let details = app.groups().get_group(&target.group.id).await.unwrap();
    assert_eq!(details.members.len(), 1);
    assert_eq!(details.members[0].school_id, "S001");
}

#[tokio::test]
async fn adding_a_member_twice_to_the_same_group_is_skipped() {
    let app = TestApp::new().await;
    app.student("S001").await;
    let group = app.groups().create_group("BSN-3A", &ids(&["S001"])).await.unwrap();

    let report = app
        .groups()
        .add_members(&group.group.id, &ids(&["S001"]))
        .await
        .unwrap();
    assert!(report.added.is_empty());
    assert!(matches!(&report.skipped[0], MemberOutcome::Skipped { group, .. } if group == "BSN-3A"));
}

#[tokio::test]
async fn add_members_to_missing_group_fails() {
    let app = TestApp::new().await;
    let err = app
        .groups()
        .add_members("no-such-group", &ids(&["S001"]))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownGroup(_)));
}

#[tokio::test]
async fn a_user_is_in_at_most_one_group_through_any_sequence() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    app.student("S002").await;
    let a = app.groups().create_group("A", &ids(&["S001"])).await.unwrap();
    let b = app.groups().create_group("B", &ids(&["S002"])).await.unwrap();

    app.groups().add_members(&b.group.id, &ids(&["S001"])).await.unwrap();
    app.groups().remove_member(&a.group.id, &s001.id).await.unwrap();
    app.groups().add_members(&b.group.id, &ids(&["S001"])).await.unwrap();
    app.groups().add_members(&a.group.id, &ids(&["S001"])).await.unwrap();

    let holding: Vec<String> = app
        .groups()
        .list_groups(None)
        .await
        .unwrap()
        .into_iter()
        .filter(|g| g.group.member_ids.contains(&s001.id))
        .map(|g| g.group.name)
        .collect();
    assert_eq!(holding, vec!["B".to_string()]);
}

#[tokio::test]
async fn remove_member_requires_membership() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    let group = app.groups().create_group("A", &[]).await.unwrap();

    let err = app
        .groups()
        .remove_member(&group.group.id, &s001.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotAMember { .. }));
}

#[tokio::test]
async fn rename_and_delete_keep_the_name_unique() {
    let app = TestApp::new().await;
    let s001 = app.student("S001").await;
    let a = app.groups().create_group("A", &ids(&["S001"])).await.unwrap();
    app.groups().create_group("B", &[]).await.unwrap();

    let err = app.groups().rename_group(&a.group.id, "B").await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicateName(_)));

    let renamed = app.groups().rename_group(&a.group.id, " A-prime ").await.unwrap();
    assert_eq!(renamed.group.name, "A-prime");
    assert_eq!(renamed.members.len(), 1);

    app.groups().delete_group(&a.group.id).await.unwrap();
    assert!(app.groups().group_of(&s001.id).await.unwrap().is_none());
    let err = app.groups().get_group(&a.group.id).await.unwrap_err();
    assert!(err.is_not_found());
}
