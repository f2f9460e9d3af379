//! Transport seam and the timeout-wrapping `Bridge`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use cardboard_common::{BridgeError, ErrorReport};
use cardboard_telemetry::LogEntry;
use cardboard_windows::WindowStateReport;

use crate::command::{BridgeCommand, BridgeResponse};

/// Fixed timeout for every bridge call. Expired calls are abandoned, not
/// cancelled; the native side may still complete them.
pub const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Carries commands to the native side. Implementations do not time out
/// themselves; `Bridge` handles that uniformly.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, command: BridgeCommand) -> Result<BridgeResponse, BridgeError>;
}

pub struct Bridge {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Bridge {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Call the native side, synthesizing `BridgeError::Timeout` if no
    /// answer arrives in time.
    pub async fn call(&self, command: BridgeCommand) -> Result<BridgeResponse, BridgeError> {
        let operation = command.operation();
        match tokio::time::timeout(self.timeout, self.transport.call(command)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

/// In-process transport for tests and the demo binary. Answers everything
/// locally and records what it was asked to persist.
#[derive(Default)]
pub struct LoopbackTransport {
    log_entries: Mutex<Vec<LogEntry>>,
    state_reports: Mutex<Vec<WindowStateReport>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.log_entries.lock().unwrap().clone()
    }

    pub fn state_reports(&self) -> Vec<WindowStateReport> {
        self.state_reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn call(&self, command: BridgeCommand) -> Result<BridgeResponse, BridgeError> {
        match command {
            BridgeCommand::Ping => Ok(BridgeResponse::Pong),
            BridgeCommand::ListCards => {
                Ok(BridgeResponse::Cards(cardboard_cards::registry().to_vec()))
            }
            BridgeCommand::LogEntry(entry) => {
                self.log_entries.lock().unwrap().push(entry);
                Ok(BridgeResponse::Ack)
            }
            BridgeCommand::WindowStateChange(report) => {
                info!(
                    "Window State Change | ID: {} | Title: '{}' | State: {} | Time: {}",
                    report.window_id,
                    report.title,
                    report.state.describe(),
                    report.timestamp
                );
                self.state_reports.lock().unwrap().push(report);
                Ok(BridgeResponse::Ack)
            }
            BridgeCommand::DbQuery { .. } => Ok(BridgeResponse::Error(ErrorReport::not_found(
                "no database behind the loopback transport",
            ))),
        }
    }
}
