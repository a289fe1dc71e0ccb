use chrono::{DateTime, Utc};
use serde::Serialize;

/// One answered exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Record an exchange stamped with the current time.
    pub fn now(query: impl Into<String>, response: impl Into<String>) -> Self {
        HistoryRecord {
            query: query.into(),
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}
