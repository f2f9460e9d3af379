//! The typed backend bridge.
//!
//! UI code never dispatches backend calls by bare function name; every call
//! is a `BridgeCommand` variant with a typed payload, and every answer is a
//! `BridgeResponse`. Events pushed from the native side arrive as
//! `HostEvent`s. All calls share a fixed timeout and cannot be cancelled
//! once in flight.

pub mod command;
pub mod host;
pub mod sinks;
pub mod transport;

pub use command::{BridgeCommand, BridgeResponse};
pub use host::HostEvent;
pub use sinks::{BridgeLogSink, BridgeStateSink};
pub use transport::{Bridge, LoopbackTransport, Transport, CALL_TIMEOUT};
