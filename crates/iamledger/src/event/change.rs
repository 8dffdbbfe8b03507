use chrono::{DateTime, FixedOffset};

use super::cloudtrail::CloudTrailEvent;
use super::kind::EventKind;
use crate::error::EventError;

/// Largest number of events a single queue delivery may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// Resource identifiers carried by an event. Unused fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pub role_name: String,
    pub policy_name: String,
    pub policy_arn: String,
    pub policy_document: String,
    pub policy_version_id: String,
}

/// A normalized control-plane mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub event_id: String,
    pub kind: EventKind,
    /// Authoritative time of the change; becomes the commit time.
    pub event_time: DateTime<FixedOffset>,
    pub actor: String,
    pub parameters: Parameters,
    /// Non-empty when the recorded API call failed.
    pub error_code: String,
}

impl ChangeEvent {
    /// Normalizes a raw record. The timestamp must be RFC 3339; there is no
    /// fallback to wall-clock time.
    pub fn from_cloudtrail(raw: &CloudTrailEvent) -> Result<Self, EventError> {
        let event_time = DateTime::parse_from_rfc3339(raw.event_time.trim()).map_err(|e| {
            EventError::InvalidTimestamp {
                event_id: raw.event_id.clone(),
                value: raw.event_time.clone(),
                reason: e.to_string(),
            }
        })?;

        let parameters = raw
            .request_parameters
            .as_ref()
            .map(|p| Parameters {
                role_name: p.role_name.clone(),
                policy_name: p.policy_name.clone(),
                policy_arn: p.policy_arn.clone(),
                policy_document: p.policy_document.clone(),
                policy_version_id: p.version_id.clone(),
            })
            .unwrap_or_default();

        Ok(Self {
            event_id: raw.event_id.clone(),
            kind: EventKind::from_name(&raw.event_name),
            event_time,
            actor: raw.user_identity.display_name().to_string(),
            parameters,
            error_code: raw.error_code.clone(),
        })
    }

    /// Whether the recorded call failed upstream and so changed nothing.
    pub fn is_failed_call(&self) -> bool {
        !self.error_code.trim().is_empty()
    }
}

/// An ordered group of at most [`MAX_BATCH_SIZE`] events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    events: Vec<ChangeEvent>,
}

impl Batch {
    pub fn new(events: Vec<ChangeEvent>) -> Result<Self, EventError> {
        if events.len() > MAX_BATCH_SIZE {
            return Err(EventError::BatchTooLarge {
                len: events.len(),
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(Self { events })
    }

    /// Normalizes raw records, failing on the first malformed one.
    pub fn from_records(records: &[CloudTrailEvent]) -> Result<Self, EventError> {
        let events = records
            .iter()
            .map(ChangeEvent::from_cloudtrail)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(events)
    }

    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a ChangeEvent;
    type IntoIter = std::slice::Iter<'a, ChangeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::cloudtrail::{RequestParameters, UserIdentity};
    use chrono::{TimeZone, Utc};

    fn raw(name: &str, time: &str) -> CloudTrailEvent {
        CloudTrailEvent {
            event_id: format!("id-{name}"),
            event_name: name.to_string(),
            event_time: time.to_string(),
            user_identity: UserIdentity {
                user_name: "alice".to_string(),
                ..Default::default()
            },
            request_parameters: Some(RequestParameters {
                role_name: "deployer".to_string(),
                version_id: "v3".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_cloudtrail_normalizes_fields() {
        let event = ChangeEvent::from_cloudtrail(&raw("CreateRole", "2024-03-01T12:30:00Z")).unwrap();
        assert_eq!(event.kind, EventKind::CreateRole);
        assert_eq!(event.actor, "alice");
        assert_eq!(event.parameters.role_name, "deployer");
        assert_eq!(event.parameters.policy_version_id, "v3");
        assert_eq!(
            event.event_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );
        assert!(!event.is_failed_call());
    }

    #[test]
    fn test_offset_is_preserved() {
        let event =
            ChangeEvent::from_cloudtrail(&raw("CreateRole", "2024-03-01T14:30:00+02:00")).unwrap();
        assert_eq!(event.event_time.offset().local_minus_utc(), 7200);
        assert_eq!(event.event_time.timestamp(), 1_709_296_200);
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let result = ChangeEvent::from_cloudtrail(&raw("CreateRole", "yesterday"));
        assert!(matches!(
            result,
            Err(EventError::InvalidTimestamp { ref event_id, .. }) if event_id == "id-CreateRole"
        ));
    }

    #[test]
    fn test_missing_timestamp_is_fatal() {
        let result = ChangeEvent::from_cloudtrail(&raw("ListRoles", ""));
        assert!(matches!(result, Err(EventError::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_missing_parameters_default_to_empty() {
        let mut record = raw("DeleteRole", "2024-03-01T12:30:00Z");
        record.request_parameters = None;
        let event = ChangeEvent::from_cloudtrail(&record).unwrap();
        assert_eq!(event.parameters, Parameters::default());
    }

    #[test]
    fn test_failed_call_detected() {
        let mut record = raw("DeleteRole", "2024-03-01T12:30:00Z");
        record.error_code = "AccessDenied".to_string();
        let event = ChangeEvent::from_cloudtrail(&record).unwrap();
        assert!(event.is_failed_call());
    }

    #[test]
    fn test_batch_rejects_oversize() {
        let records: Vec<_> = (0..11)
            .map(|_| raw("CreateRole", "2024-03-01T12:30:00Z"))
            .collect();
        let result = Batch::from_records(&records);
        assert!(matches!(
            result,
            Err(EventError::BatchTooLarge { len: 11, max: 10 })
        ));
    }

    #[test]
    fn test_batch_preserves_order() {
        let records = vec![
            raw("CreateRole", "2024-03-01T12:30:00Z"),
            raw("PutRolePolicy", "2024-03-01T12:31:00Z"),
        ];
        let batch = Batch::from_records(&records).unwrap();
        let kinds: Vec<_> = batch.into_iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds, vec![EventKind::CreateRole, EventKind::PutRolePolicy]);
    }
}
