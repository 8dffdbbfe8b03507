use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::event::{parse_event, Batch, CloudTrailEvent};

/// One outgoing queue entry: a single CloudTrail record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// The record's `eventID`.
    pub id: String,
    /// The record, serialized as JSON.
    pub body: String,
    pub delay_seconds: u32,
}

impl QueueMessage {
    pub fn from_event(
        event: &CloudTrailEvent,
        delay_seconds: u32,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: event.event_id.clone(),
            body: serde_json::to_string(event)?,
            delay_seconds,
        })
    }
}

/// Per-entry result of one send call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOutcome {
    pub successful: u32,
    pub failed: u32,
}

/// A delivered message as the consumer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredMessage {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub body: String,
}

/// The payload of one consumer invocation: `{"Records": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueDelivery {
    #[serde(rename = "Records", default)]
    pub records: Vec<DeliveredMessage>,
}

impl QueueDelivery {
    pub fn parse(bytes: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(bytes).map_err(EventError::InvalidDelivery)
    }

    pub fn from_messages(messages: &[QueueMessage]) -> Self {
        Self {
            records: messages
                .iter()
                .map(|m| DeliveredMessage {
                    message_id: m.id.clone(),
                    body: m.body.clone(),
                })
                .collect(),
        }
    }

    /// Decodes every body, in delivery order, into a batch.
    pub fn to_batch(&self) -> Result<Batch, EventError> {
        let records = self
            .records
            .iter()
            .map(|m| parse_event(&m.body))
            .collect::<Result<Vec<_>, _>>()?;
        Batch::from_records(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> CloudTrailEvent {
        CloudTrailEvent {
            event_id: id.to_string(),
            event_name: name.to_string(),
            event_time: "2024-03-01T12:30:00Z".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_message_from_event() {
        let message = QueueMessage::from_event(&record("e-1", "CreateRole"), 10).unwrap();
        assert_eq!(message.id, "e-1");
        assert_eq!(message.delay_seconds, 10);
        assert!(message.body.contains("\"eventName\":\"CreateRole\""));
    }

    #[test]
    fn test_delivery_to_batch_keeps_order() {
        let messages = vec![
            QueueMessage::from_event(&record("e-1", "CreateRole"), 0).unwrap(),
            QueueMessage::from_event(&record("e-2", "DeleteRole"), 0).unwrap(),
        ];
        let json = serde_json::to_vec(&QueueDelivery::from_messages(&messages)).unwrap();
        assert!(String::from_utf8_lossy(&json).contains("\"messageId\":\"e-1\""));

        let batch = QueueDelivery::parse(&json).unwrap().to_batch().unwrap();
        let ids: Vec<_> = batch.iter().map(|e| e.event_id.as_str()).collect();
        assert_eq!(ids, vec!["e-1", "e-2"]);
    }

    #[test]
    fn test_delivery_rejects_bad_body() {
        let delivery = QueueDelivery {
            records: vec![DeliveredMessage {
                message_id: "m".to_string(),
                body: "not json".to_string(),
            }],
        };
        assert!(matches!(
            delivery.to_batch(),
            Err(EventError::InvalidRecord(_))
        ));
        assert!(matches!(
            QueueDelivery::parse(b"{\"Records\": 3}"),
            Err(EventError::InvalidDelivery(_))
        ));
    }
}
