//! Pure data types for git operations.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Everything needed to write one commit. Author and committer are the same
/// identity, so replaying the same events yields the same history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub when: DateTime<FixedOffset>,
}

impl CommitRecord {
    /// Environment that pins both identities and dates for `git commit`.
    pub fn identity_env(&self) -> [(&'static str, String); 6] {
        let date = super::parse::format_git_date(&self.when);
        [
            ("GIT_AUTHOR_NAME", self.author_name.clone()),
            ("GIT_AUTHOR_EMAIL", self.author_email.clone()),
            ("GIT_AUTHOR_DATE", date.clone()),
            ("GIT_COMMITTER_NAME", self.author_name.clone()),
            ("GIT_COMMITTER_EMAIL", self.author_email.clone()),
            ("GIT_COMMITTER_DATE", date),
        ]
    }
}

/// One line of `git log`, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    /// Strict ISO 8601 author date, as printed by `%aI`.
    pub author_date: String,
    pub committer_name: String,
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_env() {
        let record = CommitRecord {
            message: "CreateRole by alice".to_string(),
            author_name: "alice".to_string(),
            author_email: "ledger@example.invalid".to_string(),
            when: DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z").unwrap(),
        };
        let env = record.identity_env();
        assert!(env.contains(&("GIT_AUTHOR_NAME", "alice".to_string())));
        assert!(env.contains(&("GIT_COMMITTER_DATE", "1709296200 +0000".to_string())));
        assert!(env.contains(&(
            "GIT_COMMITTER_EMAIL",
            "ledger@example.invalid".to_string()
        )));
    }

    #[test]
    fn test_commit_record_serialization() {
        let record = CommitRecord {
            message: "DeleteRole by bob".to_string(),
            author_name: "bob".to_string(),
            author_email: "ledger@example.invalid".to_string(),
            when: DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z").unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"authorName\":\"bob\""));
        assert!(json.contains("\"when\":\"2024-03-01T12:30:00"));
    }
}
