//! User management service, application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::application::notifications::Notifier;
use crate::domain::user::{attendance_qr_payload, default_avatar_url};
use crate::domain::{DomainError, DomainResult, Group, RepositoryProvider, User, UserFilter, UserRole};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password_with_cost, verify_password};

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Self-service sign-up data. New accounts always get the `user` role.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub school_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub department: Option<String>,
}

/// Fields a user may change on their own profile. `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub department: Option<String>,
    pub profile_image: Option<String>,
}

/// Administrative edit. Blank strings are ignored like absent ones.
#[derive(Debug, Clone, Default)]
pub struct AdminUserUpdate {
    pub school_id: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    pub role: Option<UserRole>,
}

/// A user and the group they currently belong to.
#[derive(Debug, Clone)]
pub struct UserWithGroup {
    pub user: User,
    pub group: Option<Group>,
}

/// Identity use-cases: registration, login, profile and user administration.
pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    public_base_url: String,
    notifier: Arc<Notifier>,
}

impl UserService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        bcrypt_cost: u32,
        public_base_url: impl Into<String>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            repos,
            jwt_config,
            bcrypt_cost,
            public_base_url: public_base_url.into(),
            notifier,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate user by username/email + password and return a JWT.
    pub async fn login(&self, username_or_email: &str, password: &str) -> DomainResult<AuthResult> {
        let login = username_or_email.trim();
        let user = match self.repos.users().find_by_username(login).await? {
            Some(user) => Some(user),
            None => self.repos.users().find_by_email(&login.to_lowercase()).await?,
        };

        let Some(user) = user else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        info!(user_id = %user.id, username = %user.username, "🔑 User logged in");
        self.issue_token(user)
    }

    fn issue_token(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(&user.id, &user.username, user.role.as_str(), &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a student account, send the welcome e-mail and sign in.
    pub async fn register(&self, registration: Registration) -> DomainResult<AuthResult> {
        let school_id = registration.school_id.trim().to_string();
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_lowercase();

        if school_id.is_empty() || username.is_empty() || email.is_empty() || registration.password.trim().is_empty() {
            return Err(DomainError::Validation("Required fields cannot be empty".into()));
        }
        validate_username(&username)?;
        validate_email(&email)?;
        validate_password_strength(&registration.password)?;

        if self.repos.users().find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }
        if self.repos.users().find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already exists".into()));
        }
        if self.repos.users().find_by_school_id(&school_id).await?.is_some() {
            return Err(DomainError::Conflict("School ID already exists".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            qr_payload: attendance_qr_payload(&self.public_base_url, &school_id),
            profile_image: default_avatar_url(&username),
            school_id,
            username,
            email,
            password_hash: self.hash(&registration.password)?,
            name: non_blank(registration.name),
            section: non_blank(registration.section),
            course: non_blank(registration.course),
            year: registration.year,
            department: non_blank(registration.department),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };
        let user = self.repos.users().insert(user).await?;

        info!(user_id = %user.id, username = %user.username, school_id = %user.school_id, "New user registered");
        self.notifier.welcome(&user).await;

        self.issue_token(user)
    }

    /// Seed the configured administrator when the user table is empty.
    /// Returns `true` when an account was created.
    pub async fn ensure_default_admin(
        &self,
        school_id: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<bool> {
        if self.repos.users().count().await? > 0 {
            return Ok(false);
        }

        let now = Utc::now();
        let admin = User {
            id: Uuid::new_v4().to_string(),
            school_id: school_id.to_string(),
            username: username.to_string(),
            email: email.to_lowercase(),
            password_hash: self.hash(password)?,
            name: Some("Administrator".into()),
            section: None,
            course: None,
            year: None,
            department: None,
            role: UserRole::Admin,
            profile_image: default_avatar_url(username),
            qr_payload: attendance_qr_payload(&self.public_base_url, school_id),
            created_at: now,
            updated_at: now,
        };
        self.repos.users().insert(admin).await?;

        info!(username, "👤 Default admin user created");
        Ok(true)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Get a single user by ID.
    pub async fn get_user(&self, id: &str) -> DomainResult<User> {
        self.repos
            .users()
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    /// The user together with their current group.
    pub async fn get_user_with_group(&self, id: &str) -> DomainResult<UserWithGroup> {
        let user = self.get_user(id).await?;
        let group = self.repos.groups().find_by_member(&user.id).await?;
        Ok(UserWithGroup { user, group })
    }

    /// Users matching `filter`, newest first, each with their group.
    pub async fn list_users(&self, filter: UserFilter) -> DomainResult<Vec<UserWithGroup>> {
        let users = self.repos.users().list(filter).await?;
        let groups = self.repos.groups().list(None).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let group = groups.iter().find(|g| g.has_member(&user.id)).cloned();
                UserWithGroup { user, group }
            })
            .collect())
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Change a user's password. Verifies the current password first.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        validate_password_strength(new_password)?;

        let mut user = self.get_user(user_id).await?;

        let valid = verify_password(current_password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid current password".into()));
        }

        user.password_hash = self.hash(new_password)?;
        user.updated_at = Utc::now();
        let user = self.repos.users().update(user).await?;

        info!(user_id, "Password changed");
        self.notifier.password_changed(&user, user.updated_at).await;
        Ok(())
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> DomainResult<User> {
        let mut user = self.get_user(user_id).await?;

        if let Some(name) = non_blank(update.name) {
            user.name = Some(name);
        }
        if let Some(section) = non_blank(update.section) {
            user.section = Some(section);
        }
        if let Some(course) = non_blank(update.course) {
            user.course = Some(course);
        }
        if let Some(department) = non_blank(update.department) {
            user.department = Some(department);
        }
        if let Some(image) = non_blank(update.profile_image) {
            user.profile_image = image;
        }
        if update.year.is_some() {
            user.year = update.year;
        }

        user.updated_at = Utc::now();
        self.repos.users().update(user).await
    }

    pub async fn update_username(&self, user_id: &str, username: &str) -> DomainResult<User> {
        let username = username.trim();
        validate_username(username)?;

        let mut user = self.get_user(user_id).await?;
        if user.username == username {
            return Ok(user);
        }
        if self.repos.users().find_by_username(username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        user.username = username.to_string();
        user.updated_at = Utc::now();
        let user = self.repos.users().update(user).await?;
        info!(user_id, username, "Username changed");
        Ok(user)
    }

    /// Admin edit. A changed school ID also regenerates the QR payload.
    pub async fn admin_update(&self, id: &str, update: AdminUserUpdate) -> DomainResult<User> {
        let mut user = self.get_user(id).await?;

        if let Some(school_id) = non_blank(update.school_id) {
            if school_id != user.school_id {
                if self.repos.users().find_by_school_id(&school_id).await?.is_some() {
                    return Err(DomainError::Conflict("School ID already exists".into()));
                }
                user.qr_payload = attendance_qr_payload(&self.public_base_url, &school_id);
                user.school_id = school_id;
            }
        }
        if let Some(username) = non_blank(update.username) {
            if username != user.username {
                validate_username(&username)?;
                if self.repos.users().find_by_username(&username).await?.is_some() {
                    return Err(DomainError::Conflict("Username already exists".into()));
                }
                user.username = username;
            }
        }
        if let Some(name) = non_blank(update.name) {
            user.name = Some(name);
        }
        if let Some(section) = non_blank(update.section) {
            user.section = Some(section);
        }
        if let Some(course) = non_blank(update.course) {
            user.course = Some(course);
        }
        if let Some(department) = non_blank(update.department) {
            user.department = Some(department);
        }
        if let Some(role) = update.role {
            user.role = role;
        }

        user.updated_at = Utc::now();
        let user = self.repos.users().update(user).await?;
        info!(user_id = %user.id, "User updated by admin");
        Ok(user)
    }

    /// Delete a user. Group membership goes with it; duties and
    /// attendance records stay.
    pub async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let user = self.get_user(id).await?;
        self.repos.users().delete(&user.id).await?;
        info!(user_id = %user.id, username = %user.username, "User deleted");
        Ok(())
    }

    /// Rebuild the QR payload from the current public base URL.
    pub async fn regenerate_qr(&self, id: &str) -> DomainResult<User> {
        let mut user = self.get_user(id).await?;
        user.qr_payload = attendance_qr_payload(&self.public_base_url, &user.school_id);
        user.updated_at = Utc::now();
        self.repos.users().update(user).await
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password_with_cost(password, self.bcrypt_cost)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn user_not_found(id: &str) -> DomainError {
    DomainError::NotFound {
        entity: "User",
        field: "id",
        value: id.to_string(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.chars().count() < 3 {
        return Err(DomainError::Validation(
            "Username must be at least 3 characters".into(),
        ));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(DomainError::Validation("Username can't have spaces".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::Validation("Enter a valid email address".into()))
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter,
/// a digit and a symbol.
pub fn validate_password_strength(password: &str) -> DomainResult<()> {
    let strong = password.chars().count() >= 8
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if strong {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "Password must be at least 8 characters long and contain an uppercase letter, \
             a lowercase letter, a number and a special character"
                .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_passwords_need_every_character_class() {
        assert!(validate_password_strength("Secret#123").is_ok());
        assert!(validate_password_strength("secret#123").is_err());
        assert!(validate_password_strength("SECRET#123").is_err());
        assert!(validate_password_strength("Secret1234").is_err());
        assert!(validate_password_strength("Secret#abc").is_err());
        assert!(validate_password_strength("Se#1").is_err());
    }

    #[test]
    fn usernames_are_three_chars_without_spaces() {
        assert!(validate_username("ana").is_ok());
        assert!(validate_username("an").is_err());
        assert!(validate_username("ana cruz").is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("ana@school.edu").is_ok());
        assert!(validate_email("ana@school").is_err());
        assert!(validate_email("@school.edu").is_err());
        assert!(validate_email("ana school@x.edu").is_err());
    }

    #[test]
    fn blank_optional_values_collapse_to_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" BSN ".into())), Some("BSN".into()));
        assert_eq!(non_blank(None), None);
    }
}
