//! Shared fixtures: a migrated in-memory database, a recording mail
//! sender and a settable clock.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use mcare::application::{
    AttendanceRecorder, DeliveryMode, DutyScheduler, Email, GroupMembershipManager,
    NotificationSender, Notifier, NotifyError, ReminderJob, UserService,
};
use mcare::domain::user::{attendance_qr_payload, default_avatar_url};
use mcare::domain::{FixedClock, NewDuty, RepositoryProvider, User, UserRole};
use mcare::infrastructure::crypto::jwt::JwtConfig;
use mcare::infrastructure::crypto::password::hash_password_with_cost;
use mcare::infrastructure::database::migrator::Migrator;
use mcare::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub const BASE_URL: &str = "http://mcare.test";
pub const PASSWORD: &str = "Secret#123";

/// Captures every e-mail; addresses put on the reject list fail.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Email>>,
    reject: Mutex<HashSet<String>>,
}

impl RecordingSender {
    pub fn reject(&self, address: &str) {
        self.reject.lock().unwrap().insert(address.to_string());
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Every address that received a delivered e-mail, sorted.
    pub fn recipients(&self) -> Vec<String> {
        let mut all: Vec<String> = self
            .sent()
            .into_iter()
            .flat_map(|e| e.to.into_iter())
            .collect();
        all.sort();
        all
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let rejected = self.reject.lock().unwrap();
        if let Some(bad) = email.to.iter().find(|to| rejected.contains(to.as_str())) {
            return Err(NotifyError::Transport(format!("550 mailbox {} unavailable", bad)));
        }
        drop(rejected);
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub clock: Arc<FixedClock>,
    pub mail: Arc<RecordingSender>,
    pub notifier: Arc<Notifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_delivery(DeliveryMode::PerMember).await
    }

    pub async fn with_delivery(mode: DeliveryMode) -> Self {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let mail = Arc::new(RecordingSender::default());
        let notifier = Arc::new(Notifier::new(mail.clone(), mode));
        let clock = Arc::new(FixedClock::new(at("2025-06-09 09:00:00")));

        Self {
            db,
            repos,
            clock,
            mail,
            notifier,
        }
    }

    pub fn groups(&self) -> GroupMembershipManager {
        GroupMembershipManager::new(self.repos.clone())
    }

    pub fn duties(&self) -> DutyScheduler {
        DutyScheduler::new(self.repos.clone(), self.notifier.clone())
    }

    pub fn attendance(&self) -> AttendanceRecorder {
        AttendanceRecorder::new(self.repos.clone(), self.clock.clone())
    }

    pub fn reminders(&self) -> ReminderJob {
        ReminderJob::new(self.repos.clone(), self.notifier.clone(), self.clock.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(
            self.repos.clone(),
            jwt_config(),
            4,
            BASE_URL,
            self.notifier.clone(),
        )
    }

    /// Insert a student with e-mail `<school_id>@school.test`.
    pub async fn student(&self, school_id: &str) -> User {
        self.user_with_role(school_id, UserRole::User).await
    }

    pub async fn user_with_role(&self, school_id: &str, role: UserRole) -> User {
        let username = school_id.to_lowercase();
        let now = Utc::now();
        self.repos
            .users()
            .insert(User {
                id: Uuid::new_v4().to_string(),
                school_id: school_id.to_string(),
                username: username.clone(),
                email: format!("{}@school.test", username),
                password_hash: hash_password_with_cost(PASSWORD, 4).unwrap(),
                name: Some(format!("Student {}", school_id)),
                section: Some("3A".into()),
                course: Some("BSN".into()),
                year: Some(3),
                department: None,
                role,
                profile_image: default_avatar_url(&username),
                qr_payload: attendance_qr_payload(BASE_URL, school_id),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap()
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig::new("integration-test-secret", 1)
}

pub fn ids(school_ids: &[&str]) -> Vec<String> {
    school_ids.iter().map(|s| s.to_string()).collect()
}

/// `YYYY-MM-DD HH:MM:SS` as a local wall-clock instant.
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn duty_on(group_id: &str, date: NaiveDateTime) -> NewDuty {
    NewDuty {
        group_id: group_id.to_string(),
        date,
        place: "Main Hospital".into(),
        time_range: "08:00 AM - 10:00 AM".into(),
        clinical_instructor: "Dr. Reyes".into(),
        area: "Pediatrics".into(),
    }
}
