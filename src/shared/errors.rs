use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("A group named '{0}' already exists")]
    DuplicateName(String),

    #[error("Group {group_id} already has a duty on {date}")]
    DuplicateDutyForDay { group_id: String, date: String },

    #[error("Attendance for {school_id} already marked on {date}")]
    AlreadyMarkedToday { school_id: String, date: String },

    #[error("User {school_id} already belongs to group '{group}'")]
    AlreadyGrouped { school_id: String, group: String },

    #[error("No user with school ID {0}")]
    UnknownMember(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("User {user_id} is not a member of group {group_id}")]
    NotAMember { group_id: String, user_id: String },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }

    /// Errors that describe a missing entity addressed by the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound { .. } | DomainError::UnknownUser(_) | DomainError::UnknownGroup(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_transient() {
        assert!(DomainError::Storage("pool timed out".into()).is_transient());
        assert!(!DomainError::Validation("bad".into()).is_transient());
        assert!(!DomainError::UnknownGroup("g1".into()).is_transient());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = DomainError::AlreadyGrouped {
            school_id: "S-100".into(),
            group: "Group A".into(),
        };
        assert_eq!(err.to_string(), "User S-100 already belongs to group 'Group A'");

        let err = DomainError::NotFound {
            entity: "Duty",
            field: "id",
            value: "d-1".into(),
        };
        assert_eq!(err.to_string(), "Not found: Duty with id=d-1");
    }
}
