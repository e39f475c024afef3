//! Group domain entity

use chrono::{DateTime, Utc};

/// Named set of students scheduled together.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Member user IDs in join order
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }
}

/// Trim a candidate group name; `None` when nothing is left.
pub fn normalize_group_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_must_not_be_blank() {
        assert_eq!(normalize_group_name("  Group A "), Some("Group A".into()));
        assert_eq!(normalize_group_name("   "), None);
    }
}
