use serde::{Deserialize, Serialize};
use serde_json::Value;

use cardboard_cards::Card;
use cardboard_common::ErrorReport;
use cardboard_telemetry::LogEntry;
use cardboard_windows::WindowStateReport;

/// A call from the UI to the native side, keyed by operation name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fn", content = "args", rename_all = "snake_case")]
pub enum BridgeCommand {
    /// Liveness probe.
    Ping,
    /// Fetch the card registry.
    ListCards,
    /// Persist a structured log entry.
    LogEntry(LogEntry),
    /// Mirror a floating-window state change to the backend logger.
    WindowStateChange(WindowStateReport),
    /// Run a query against the embedded database.
    DbQuery { sql: String, params: Vec<Value> },
}

impl BridgeCommand {
    /// The operation name, as it appears on the wire and in timeout errors.
    pub fn operation(&self) -> &'static str {
        match self {
            BridgeCommand::Ping => "ping",
            BridgeCommand::ListCards => "list_cards",
            BridgeCommand::LogEntry(_) => "log_entry",
            BridgeCommand::WindowStateChange(_) => "window_state_change",
            BridgeCommand::DbQuery { .. } => "db_query",
        }
    }
}

/// Answer to a `BridgeCommand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "data", rename_all = "snake_case")]
pub enum BridgeResponse {
    Pong,
    Cards(Vec<Card>),
    /// The command was handled and had nothing to return.
    Ack,
    Rows(Vec<Value>),
    Error(ErrorReport),
}
