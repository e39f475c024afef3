//! User domain entity

use chrono::{DateTime, Utc};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    /// Full access to groups, duties, attendance and user administration
    Admin,
    /// Clinical instructor; may read any student's duties and attendance
    Professor,
    /// Student
    #[default]
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Professor => "professor",
            Self::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "professor" => Some(Self::Professor),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    /// Roles allowed to read other users' duties and attendance.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Professor)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered person (student, professor or administrator).
///
/// Group membership is not stored here; see
/// [`GroupRepository::find_by_member`](crate::domain::group::GroupRepository::find_by_member).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    /// Institutional identifier, also encoded in the attendance QR
    pub school_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub department: Option<String>,
    pub role: UserRole,
    pub profile_image: String,
    /// Payload of the attendance QR code
    pub qr_payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name used in greetings: the full name when set, else the username.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Avatar assigned at registration.
pub fn default_avatar_url(username: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", username)
}

/// Content of the attendance QR code: the URL a scanner calls to mark
/// the student present.
pub fn attendance_qr_payload(public_base_url: &str, school_id: &str) -> String {
    format!(
        "{}/api/v1/attendance/mark/{}",
        public_base_url.trim_end_matches('/'),
        school_id
    )
}
