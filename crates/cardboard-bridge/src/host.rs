//! Events pushed from the native side into the page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cardboard_common::BridgeError;

/// An event dispatched by the host on its own initiative. Unrecognized
/// event types decode to `Unknown` so a newer host never breaks an older
/// front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum HostEvent {
    /// Rows answering an earlier `db_query`, matched by correlation id.
    DbResponse {
        request_id: String,
        rows: Vec<Value>,
    },
    /// Host runtime status change (starting, ready, shutting_down).
    Status { state: String },
    #[serde(other)]
    Unknown,
}

impl HostEvent {
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw).map_err(|e| BridgeError::Decode(e.to_string()))
    }
}
