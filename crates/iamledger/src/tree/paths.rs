//! Canonical locations inside the audited tree.
//!
//! ```text
//! roles/<roleName>/_inline
//! roles/<roleName>/attachedPolicies/<policyName>
//! policies/<policyName>
//! ```
//!
//! All paths are relative to the working tree root. Nothing here touches the
//! filesystem.

use std::path::PathBuf;

use crate::error::EventError;
use crate::event::ChangeEvent;

pub const ROLES_DIR: &str = "roles";
pub const POLICIES_DIR: &str = "policies";
pub const ATTACHED_POLICIES_DIR: &str = "attachedPolicies";
pub const INLINE_POLICY_FILE: &str = "_inline";

/// Extracts the policy name from a policy ARN: everything after the last `/`.
/// Falls back to the whole input when there is no `/`.
pub fn parse_policy_name(policy_arn: &str) -> &str {
    policy_arn.rsplit('/').next().unwrap_or(policy_arn)
}

pub fn roles_root() -> PathBuf {
    PathBuf::from(ROLES_DIR)
}

pub fn policies_root() -> PathBuf {
    PathBuf::from(POLICIES_DIR)
}

pub fn policy_file(policy_name: &str) -> PathBuf {
    policies_root().join(policy_name)
}

pub fn role_dir(role_name: &str) -> PathBuf {
    roles_root().join(role_name)
}

pub fn inline_policy_file(role_name: &str) -> PathBuf {
    role_dir(role_name).join(INLINE_POLICY_FILE)
}

/// Placeholder written on role creation so git tracks the otherwise empty
/// directory.
pub fn role_placeholder_file(role_name: &str) -> PathBuf {
    role_dir(role_name).join(role_name)
}

pub fn attached_policies_dir(role_name: &str) -> PathBuf {
    role_dir(role_name).join(ATTACHED_POLICIES_DIR)
}

pub fn attached_policy_file(role_name: &str, policy_name: &str) -> PathBuf {
    attached_policies_dir(role_name).join(policy_name)
}

/// Checked accessors over an event's parameters.
pub struct Resolver<'a> {
    event: &'a ChangeEvent,
}

impl<'a> Resolver<'a> {
    pub fn new(event: &'a ChangeEvent) -> Self {
        Self { event }
    }

    pub fn role_name(&self) -> Result<&'a str, EventError> {
        let name = self.required("roleName", &self.event.parameters.role_name)?;
        self.safe_segment("roleName", name)
    }

    /// `policyName` when present, otherwise the last segment of `policyArn`.
    pub fn policy_name(&self) -> Result<&'a str, EventError> {
        let params = &self.event.parameters;
        let name = if params.policy_name.trim().is_empty() {
            parse_policy_name(self.required("policyArn", &params.policy_arn)?)
        } else {
            params.policy_name.trim()
        };
        self.safe_segment("policyName", name)
    }

    pub fn policy_arn(&self) -> Result<&'a str, EventError> {
        self.required("policyArn", &self.event.parameters.policy_arn)
    }

    /// `policyArn` without the presence check; empty when absent.
    pub fn policy_arn_or_empty(&self) -> &'a str {
        self.event.parameters.policy_arn.trim()
    }

    pub fn version_id(&self) -> Result<&'a str, EventError> {
        self.required("versionId", &self.event.parameters.policy_version_id)
    }

    /// The policy document; an empty document is allowed.
    pub fn policy_document(&self) -> &'a str {
        &self.event.parameters.policy_document
    }

    fn required(&self, parameter: &'static str, value: &'a str) -> Result<&'a str, EventError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EventError::MissingParameter {
                event_id: self.event.event_id.clone(),
                kind: self.event.kind.to_string(),
                parameter,
            });
        }
        Ok(value)
    }

    fn safe_segment(&self, field: &'static str, value: &'a str) -> Result<&'a str, EventError> {
        if is_safe_segment(value) {
            Ok(value)
        } else {
            Err(EventError::UnsafeName {
                event_id: self.event.event_id.clone(),
                field,
                value: value.to_string(),
            })
        }
    }
}

/// A name is usable as a single path component.
pub fn is_safe_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, Parameters};
    use chrono::DateTime;
    use std::path::Path;

    fn event(kind: EventKind, parameters: Parameters) -> ChangeEvent {
        ChangeEvent {
            event_id: "evt-1".to_string(),
            kind,
            event_time: DateTime::parse_from_rfc3339("2024-03-01T12:30:00Z").unwrap(),
            actor: "alice".to_string(),
            parameters,
            error_code: String::new(),
        }
    }

    #[test]
    fn test_parse_policy_name() {
        assert_eq!(
            parse_policy_name("arn:aws:iam::111122223333:policy/Foo"),
            "Foo"
        );
        assert_eq!(parse_policy_name("Foo"), "Foo");
        assert_eq!(
            parse_policy_name("arn:aws:iam::111122223333:policy/team/ops/Foo"),
            "Foo"
        );
        assert_eq!(parse_policy_name(""), "");
        assert_eq!(parse_policy_name("trailing/"), "");
    }

    #[test]
    fn test_layout() {
        assert_eq!(policy_file("P"), Path::new("policies/P"));
        assert_eq!(role_dir("r"), Path::new("roles/r"));
        assert_eq!(inline_policy_file("r"), Path::new("roles/r/_inline"));
        assert_eq!(role_placeholder_file("r"), Path::new("roles/r/r"));
        assert_eq!(
            attached_policy_file("r", "P"),
            Path::new("roles/r/attachedPolicies/P")
        );
    }

    #[test]
    fn test_policy_name_prefers_explicit_name() {
        let evt = event(
            EventKind::CreatePolicy,
            Parameters {
                policy_name: "Explicit".to_string(),
                policy_arn: "arn:aws:iam::1:policy/FromArn".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(Resolver::new(&evt).policy_name().unwrap(), "Explicit");
    }

    #[test]
    fn test_policy_name_from_arn() {
        let evt = event(
            EventKind::DeletePolicy,
            Parameters {
                policy_arn: "arn:aws:iam::1:policy/path/FromArn".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(Resolver::new(&evt).policy_name().unwrap(), "FromArn");
    }

    #[test]
    fn test_missing_parameter() {
        let evt = event(EventKind::CreateRole, Parameters::default());
        let err = Resolver::new(&evt).role_name().unwrap_err();
        assert!(matches!(
            err,
            EventError::MissingParameter { parameter: "roleName", .. }
        ));
        assert!(err.to_string().contains("CreateRole"));
    }

    #[test]
    fn test_arn_ending_in_slash_is_unsafe() {
        let evt = event(
            EventKind::DeletePolicy,
            Parameters {
                policy_arn: "arn:aws:iam::1:policy/".to_string(),
                ..Default::default()
            },
        );
        assert!(matches!(
            Resolver::new(&evt).policy_name(),
            Err(EventError::UnsafeName { .. })
        ));
    }

    #[test]
    fn test_traversal_rejected() {
        let evt = event(
            EventKind::CreateRole,
            Parameters {
                role_name: "..".to_string(),
                ..Default::default()
            },
        );
        assert!(matches!(
            Resolver::new(&evt).role_name(),
            Err(EventError::UnsafeName { field: "roleName", .. })
        ));
    }

    #[test]
    fn test_is_safe_segment() {
        assert!(is_safe_segment("deployer"));
        assert!(is_safe_segment("my.role+name@x"));
        assert!(!is_safe_segment(""));
        assert!(!is_safe_segment("."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment("a\\b"));
    }
}
