#![allow(dead_code)]

use iamledger::event::cloudtrail::{RequestParameters, UserIdentity};
use iamledger::queue::DeliveredMessage;
use iamledger::{CloudTrailEvent, QueueDelivery};

pub const ACCOUNT_POLICY_PREFIX: &str = "arn:aws:iam::111122223333:policy/";

/// Builds CloudTrail records with sensible defaults.
pub struct RecordBuilder {
    record: CloudTrailEvent,
    params: RequestParameters,
}

impl RecordBuilder {
    pub fn new(event_name: &str) -> Self {
        Self {
            record: CloudTrailEvent {
                event_id: format!("evt-{}", event_name.to_lowercase()),
                event_name: event_name.to_string(),
                event_time: "2024-03-01T12:00:00Z".to_string(),
                event_type: "AwsApiCall".to_string(),
                user_identity: UserIdentity {
                    user_name: "alice".to_string(),
                    identity_type: "IAMUser".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            params: RequestParameters::default(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.record.event_id = id.to_string();
        self
    }

    pub fn at(mut self, time: &str) -> Self {
        self.record.event_time = time.to_string();
        self
    }

    pub fn by(mut self, user: &str) -> Self {
        self.record.user_identity.user_name = user.to_string();
        self
    }

    pub fn failed(mut self, code: &str) -> Self {
        self.record.error_code = code.to_string();
        self
    }

    pub fn role(mut self, name: &str) -> Self {
        self.params.role_name = name.to_string();
        self
    }

    /// Sets both the policy name and an account-scoped ARN for it.
    pub fn policy(mut self, name: &str) -> Self {
        self.params.policy_name = name.to_string();
        self.params.policy_arn = format!("{ACCOUNT_POLICY_PREFIX}{name}");
        self
    }

    pub fn policy_arn(mut self, arn: &str) -> Self {
        self.params.policy_arn = arn.to_string();
        self
    }

    pub fn document(mut self, document: &str) -> Self {
        self.params.policy_document = document.to_string();
        self
    }

    pub fn version(mut self, version_id: &str) -> Self {
        self.params.version_id = version_id.to_string();
        self
    }

    pub fn build(mut self) -> CloudTrailEvent {
        if self.params != RequestParameters::default() {
            self.record.request_parameters = Some(self.params);
        }
        self.record
    }
}

/// `{"Records": [...]}` as CloudTrail writes it.
pub fn export_json(records: &[CloudTrailEvent]) -> String {
    serde_json::to_string(&serde_json::json!({ "Records": records })).unwrap()
}

/// A queue delivery carrying `records` in order, one message each.
pub fn delivery(records: &[CloudTrailEvent]) -> QueueDelivery {
    QueueDelivery {
        records: records
            .iter()
            .map(|r| DeliveredMessage {
                message_id: r.event_id.clone(),
                body: serde_json::to_string(r).unwrap(),
            })
            .collect(),
    }
}

/// `count` distinct CreateRole records, one minute apart.
pub fn create_roles(count: usize) -> Vec<CloudTrailEvent> {
    (0..count)
        .map(|i| {
            RecordBuilder::new("CreateRole")
                .id(&format!("evt-{i:03}"))
                .at(&format!("2024-03-01T{:02}:{:02}:00Z", 10 + i / 60, i % 60))
                .role(&format!("role-{i:03}"))
                .build()
        })
        .collect()
}
