//! Configuration validation. Collects every problem before failing so the
//! user can fix them all at once.

use cardboard_common::ConfigError;

use crate::schema::CardboardConfig;

pub fn validate(config: &CardboardConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(
        &mut errors,
        "events.history_capacity",
        config.events.history_capacity,
        1,
        10_000,
    );
    validate_range(
        &mut errors,
        "telemetry.max_depth",
        config.telemetry.max_depth,
        1,
        64,
    );
    validate_range(
        &mut errors,
        "bridge.timeout_secs",
        config.bridge.timeout_secs as usize,
        1,
        300,
    );

    if !matches!(
        config.logging.level.as_str(),
        "debug" | "info" | "warn" | "error"
    ) {
        errors.push(format!(
            "logging.level must be one of debug/info/warn/error, got '{}'",
            config.logging.level
        ));
    }

    for key in &config.telemetry.redact_keys {
        if key.trim().is_empty() {
            errors.push("telemetry.redact_keys contains an empty key".to_string());
        }
    }

    for id in &config.cards.auto_open {
        if id.trim().is_empty() {
            errors.push("cards.auto_open contains an empty card id".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: usize, min: usize, max: usize) {
    if value < min || value > max {
        errors.push(format!("{name} must be between {min} and {max}, got {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CardboardConfig;

    #[test]
    fn default_passes() {
        assert!(validate(&CardboardConfig::default()).is_ok());
    }

    #[test]
    fn zero_history_capacity_fails() {
        let mut config = CardboardConfig::default();
        config.events.history_capacity = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("events.history_capacity"));
    }

    #[test]
    fn bogus_log_level_fails() {
        let mut config = CardboardConfig::default();
        config.logging.level = "loud".into();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn excessive_timeout_fails() {
        let mut config = CardboardConfig::default();
        config.bridge.timeout_secs = 3600;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn empty_redact_key_fails() {
        let mut config = CardboardConfig::default();
        config.telemetry.redact_keys.push("  ".into());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = CardboardConfig::default();
        config.events.history_capacity = 0;
        config.logging.level = "loud".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("events.history_capacity"));
        assert!(err.contains("logging.level"));
    }
}
