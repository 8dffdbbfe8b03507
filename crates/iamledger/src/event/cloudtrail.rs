//! CloudTrail record wire format.
//!
//! Field names match the upstream log exactly; the dispatcher forwards these
//! records to the queue verbatim, so the shape must survive a round trip.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// One raw CloudTrail record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudTrailEvent {
    #[serde(rename = "eventID", default, skip_serializing_if = "String::is_empty")]
    pub event_id: String,

    #[serde(rename = "eventName", default, skip_serializing_if = "String::is_empty")]
    pub event_name: String,

    #[serde(rename = "eventTime", default, skip_serializing_if = "String::is_empty")]
    pub event_time: String,

    #[serde(rename = "eventType", default, skip_serializing_if = "String::is_empty")]
    pub event_type: String,

    /// Set when the API call failed; such records changed nothing.
    #[serde(rename = "errorCode", default, skip_serializing_if = "String::is_empty")]
    pub error_code: String,

    #[serde(rename = "userIdentity", default)]
    pub user_identity: UserIdentity,

    #[serde(
        rename = "requestParameters",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_parameters: Option<RequestParameters>,

    #[serde(
        rename = "responseElements",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_elements: Option<serde_json::Value>,
}

/// Identity that performed the call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "userName", default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arn: String,

    #[serde(rename = "principalId", default, skip_serializing_if = "String::is_empty")]
    pub principal_id: String,

    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub identity_type: String,
}

impl UserIdentity {
    /// Best available display name for the caller.
    pub fn display_name(&self) -> &str {
        [
            self.user_name.as_str(),
            self.arn.as_str(),
            self.principal_id.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("unknown")
    }
}

/// IAM request parameters the auditor cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    #[serde(rename = "policyArn", default, skip_serializing_if = "String::is_empty")]
    pub policy_arn: String,

    #[serde(rename = "policyDocument", default, skip_serializing_if = "String::is_empty")]
    pub policy_document: String,

    #[serde(rename = "policyName", default, skip_serializing_if = "String::is_empty")]
    pub policy_name: String,

    #[serde(rename = "roleName", default, skip_serializing_if = "String::is_empty")]
    pub role_name: String,

    #[serde(rename = "versionId", default, skip_serializing_if = "String::is_empty")]
    pub version_id: String,
}

/// A bulk export object as written by CloudTrail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudTrailExport {
    #[serde(rename = "Records", default)]
    pub records: Vec<CloudTrailEvent>,
}

/// Parses a bulk export (`{"Records": [...]}`).
pub fn parse_export(bytes: &[u8]) -> Result<Vec<CloudTrailEvent>, EventError> {
    let export: CloudTrailExport =
        serde_json::from_slice(bytes).map_err(EventError::InvalidExport)?;
    Ok(export.records)
}

/// Parses a single record, as carried in a queue message body.
pub fn parse_event(body: &str) -> Result<CloudTrailEvent, EventError> {
    serde_json::from_str(body).map_err(EventError::InvalidRecord)
}
