//! Subsystem wiring.
//!
//! Everything is constructed here and passed down explicitly; no globals.
//! Must run inside a tokio runtime because the bridge sinks capture the
//! current runtime handle.

use std::sync::Arc;
use std::time::Duration;

use cardboard_bridge::{Bridge, BridgeLogSink, BridgeStateSink, LoopbackTransport};
use cardboard_common::EventBus;
use cardboard_config::CardboardConfig;
use cardboard_telemetry::{ConsoleSink, ErrorReporter, LogLevel, Logger, Redactor};
use cardboard_windows::{HeadlessFactory, PanelLayout, WindowCoordinator};

/// All wired subsystems for one application instance.
pub struct AppContext {
    pub bus: Arc<EventBus>,
    pub logger: Logger,
    pub reporter: Arc<ErrorReporter>,
    pub bridge: Arc<Bridge>,
    pub coordinator: WindowCoordinator,
    pub panels: PanelLayout,
}

impl AppContext {
    pub fn new(config: &CardboardConfig) -> Self {
        let bus = Arc::new(EventBus::new(config.events.history_capacity));

        let bridge = Arc::new(
            Bridge::new(Arc::new(LoopbackTransport::new()))
                .with_timeout(Duration::from_secs(config.bridge.timeout_secs)),
        );

        let redactor = Redactor::new(
            config.telemetry.redact_keys.iter().cloned(),
            config.telemetry.max_depth,
        );
        let mut logger = Logger::new(redactor)
            .with_min_level(parse_level(&config.logging.level))
            .with_sink(BridgeLogSink::new(bridge.clone()));
        if config.logging.console {
            logger = logger.with_sink(ConsoleSink);
        }

        let reporter = Arc::new(ErrorReporter::new());

        let coordinator = WindowCoordinator::new(
            Box::new(HeadlessFactory::default()),
            bus.clone(),
            Box::new(BridgeStateSink::new(bridge.clone())),
        );

        let mut panels = PanelLayout::new();
        if config.panels.start_top_collapsed {
            panels.toggle_top();
        }
        if config.panels.start_bottom_collapsed {
            panels.toggle_bottom();
        }
        // Startup state is not a transition; nothing to reflow yet.
        panels.transition_ended();

        Self {
            bus,
            logger,
            reporter,
            bridge,
            coordinator,
            panels,
        }
    }
}

fn parse_level(level: &str) -> LogLevel {
    match level {
        "debug" => LogLevel::Debug,
        "warn" => LogLevel::Warn,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}
