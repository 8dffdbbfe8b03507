use std::fmt;

/// IAM mutations the ledger knows how to project.
///
/// Anything else lands in [`EventKind::Unsupported`] and is counted as
/// ignored; adding a kind here forces every `match` on it to be revisited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    AttachRolePolicy,
    CreatePolicy,
    CreatePolicyVersion,
    CreateRole,
    DeletePolicy,
    DeleteRole,
    DeleteRolePolicy,
    DetachRolePolicy,
    PutRolePolicy,
    SetDefaultPolicyVersion,
    Unsupported(String),
}

impl EventKind {
    /// All supported kinds, in wire-name order.
    pub const SUPPORTED: [EventKind; 10] = [
        EventKind::AttachRolePolicy,
        EventKind::CreatePolicy,
        EventKind::CreatePolicyVersion,
        EventKind::CreateRole,
        EventKind::DeletePolicy,
        EventKind::DeleteRole,
        EventKind::DeleteRolePolicy,
        EventKind::DetachRolePolicy,
        EventKind::PutRolePolicy,
        EventKind::SetDefaultPolicyVersion,
    ];

    pub fn from_name(name: &str) -> Self {
        match name {
            "AttachRolePolicy" => EventKind::AttachRolePolicy,
            "CreatePolicy" => EventKind::CreatePolicy,
            "CreatePolicyVersion" => EventKind::CreatePolicyVersion,
            "CreateRole" => EventKind::CreateRole,
            "DeletePolicy" => EventKind::DeletePolicy,
            "DeleteRole" => EventKind::DeleteRole,
            "DeleteRolePolicy" => EventKind::DeleteRolePolicy,
            "DetachRolePolicy" => EventKind::DetachRolePolicy,
            "PutRolePolicy" => EventKind::PutRolePolicy,
            "SetDefaultPolicyVersion" => EventKind::SetDefaultPolicyVersion,
            other => EventKind::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::AttachRolePolicy => "AttachRolePolicy",
            EventKind::CreatePolicy => "CreatePolicy",
            EventKind::CreatePolicyVersion => "CreatePolicyVersion",
            EventKind::CreateRole => "CreateRole",
            EventKind::DeletePolicy => "DeletePolicy",
            EventKind::DeleteRole => "DeleteRole",
            EventKind::DeleteRolePolicy => "DeleteRolePolicy",
            EventKind::DetachRolePolicy => "DetachRolePolicy",
            EventKind::PutRolePolicy => "PutRolePolicy",
            EventKind::SetDefaultPolicyVersion => "SetDefaultPolicyVersion",
            EventKind::Unsupported(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, EventKind::Unsupported(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
