//! Config schema. Every field has a serde default so partial TOML files
//! deserialize cleanly.

use serde::{Deserialize, Serialize};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardboardConfig {
    pub panels: PanelsConfig,
    pub events: EventsConfig,
    pub telemetry: TelemetryConfig,
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
    pub cards: CardsConfig,
}

/// Initial state of the collapsible panels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsConfig {
    pub start_top_collapsed: bool,
    pub start_bottom_collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Maximum bus events retained in history.
    pub history_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Keys whose values are redacted in log fields (case-insensitive).
    pub redact_keys: Vec<String>,
    /// Nesting depth beyond which log fields are truncated.
    pub max_depth: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            redact_keys: vec![
                "password".into(),
                "secret".into(),
                "token".into(),
                "api_key".into(),
                "authorization".into(),
            ],
            max_depth: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Seconds before an unanswered bridge call times out.
    pub timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level for the structured logger: debug, info, warn, error.
    pub level: String,
    /// Also mirror entries to the console via tracing.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    /// Card ids opened automatically at startup.
    pub auto_open: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = CardboardConfig::default();
        assert_eq!(config.events.history_capacity, 100);
        assert_eq!(config.bridge.timeout_secs, 30);
        assert_eq!(config.telemetry.max_depth, 8);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.console);
        assert!(!config.panels.start_top_collapsed);
        assert!(config.cards.auto_open.is_empty());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: CardboardConfig = toml::from_str(
            r#"
[bridge]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.bridge.timeout_secs, 5);
        assert_eq!(config.events.history_capacity, 100);
    }

    #[test]
    fn empty_toml_is_the_default_config() {
        let config: CardboardConfig = toml::from_str("").unwrap();
        assert_eq!(config, CardboardConfig::default());
    }
}
