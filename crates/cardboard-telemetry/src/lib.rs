//! Structured logging and error reporting.
//!
//! Everything here is an explicitly constructed instance: the app builds one
//! `Logger` and one `ErrorReporter` at boot and passes them where needed.
//! There are no ambient globals.

pub mod logger;
pub mod redact;
pub mod reporter;

pub use logger::{ConsoleSink, LogEntry, LogLevel, LogSink, Logger, MemorySink};
pub use redact::{Redactor, REDACTED_MARKER, TRUNCATED_MARKER};
pub use reporter::{install_panic_hook, ErrorReporter};
