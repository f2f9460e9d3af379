//! Fire-and-forget adapters that feed telemetry into the bridge.
//!
//! Both sinks spawn the call and move on: a lost log line or state report
//! is cosmetic, and the UI thread must never wait on the backend.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use cardboard_telemetry::{LogEntry, LogSink};
use cardboard_windows::{StateSink, WindowStateReport};

use crate::command::BridgeCommand;
use crate::transport::Bridge;

/// `LogSink` that forwards entries over the bridge.
pub struct BridgeLogSink {
    bridge: Arc<Bridge>,
    handle: Handle,
}

impl BridgeLogSink {
    /// Must be constructed inside a tokio runtime.
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            handle: Handle::current(),
        }
    }
}

impl LogSink for BridgeLogSink {
    fn write(&self, entry: &LogEntry) {
        let bridge = self.bridge.clone();
        let entry = entry.clone();
        self.handle.spawn(async move {
            if let Err(e) = bridge.call(BridgeCommand::LogEntry(entry)).await {
                debug!("log entry not delivered: {e}");
            }
        });
    }
}

/// `StateSink` that mirrors window state changes to the backend.
pub struct BridgeStateSink {
    bridge: Arc<Bridge>,
    handle: Handle,
}

impl BridgeStateSink {
    /// Must be constructed inside a tokio runtime.
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            handle: Handle::current(),
        }
    }
}

impl StateSink for BridgeStateSink {
    fn window_state(&self, report: &WindowStateReport) {
        let bridge = self.bridge.clone();
        let report = report.clone();
        self.handle.spawn(async move {
            if let Err(e) = bridge
                .call(BridgeCommand::WindowStateChange(report))
                .await
            {
                debug!("window state report not delivered: {e}");
            }
        });
    }
}
