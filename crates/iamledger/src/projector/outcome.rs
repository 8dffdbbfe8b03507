use serde::Serialize;

/// Counts for one projected batch. Serialized as the audit response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub accepted: u32,
    pub ignored: u32,
    /// Accepted events whose effect created or changed content.
    pub added: u32,
    /// Accepted events whose effect deleted content.
    pub removed: u32,
}

impl BatchResult {
    pub(crate) fn record_accepted(&mut self, removal: bool) {
        self.accepted += 1;
        if removal {
            self.removed += 1;
        } else {
            self.added += 1;
        }
    }

    pub(crate) fn record_ignored(&mut self) {
        self.ignored += 1;
    }

    pub fn total(&self) -> u32 {
        self.accepted + self.ignored
    }
}
