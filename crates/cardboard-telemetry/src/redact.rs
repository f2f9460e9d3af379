//! Recursive redaction of sensitive keys in structured log fields.

use serde_json::Value;

/// Replaces the value of any key on the redact list.
pub const REDACTED_MARKER: &str = "[REDACTED]";
/// Replaces whole subtrees nested deeper than the configured max depth.
pub const TRUNCATED_MARKER: &str = "[TRUNCATED]";

#[derive(Debug, Clone)]
pub struct Redactor {
    /// Lowercased key names; matching is case-insensitive.
    keys: Vec<String>,
    max_depth: usize,
}

impl Redactor {
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>, max_depth: usize) -> Self {
        Self {
            keys: keys.into_iter().map(|k| k.into().to_lowercase()).collect(),
            max_depth,
        }
    }

    /// Keys redacted when no configuration is supplied.
    pub fn default_keys() -> Vec<String> {
        ["password", "secret", "token", "api_key", "authorization"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.keys.iter().any(|k| k == &key)
    }

    /// Return a copy of `value` with sensitive keys replaced by
    /// `REDACTED_MARKER` at every nesting level, and containers nested
    /// beyond `max_depth` replaced wholesale by `TRUNCATED_MARKER`.
    pub fn redact(&self, value: &Value) -> Value {
        self.walk(value, 0)
    }

    fn walk(&self, value: &Value, depth: usize) -> Value {
        match value {
            Value::Object(_) | Value::Array(_) if depth >= self.max_depth => {
                Value::String(TRUNCATED_MARKER.to_string())
            }
            Value::Object(map) => {
                let redacted = map
                    .iter()
                    .map(|(key, v)| {
                        let v = if self.is_sensitive(key) {
                            Value::String(REDACTED_MARKER.to_string())
                        } else {
                            self.walk(v, depth + 1)
                        };
                        (key.clone(), v)
                    })
                    .collect();
                Value::Object(redacted)
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.walk(v, depth + 1)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(Self::default_keys(), 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_configured_key_at_top_level() {
        let redactor = Redactor::new(["password"], 8);
        let out = redactor.redact(&json!({ "user": "alice", "password": "hunter2" }));
        assert_eq!(out["user"], "alice");
        assert_eq!(out["password"], REDACTED_MARKER);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let redactor = Redactor::new(["Token"], 8);
        let out = redactor.redact(&json!({ "TOKEN": "abc", "token": "def", "ToKeN": "ghi" }));
        assert_eq!(out["TOKEN"], REDACTED_MARKER);
        assert_eq!(out["token"], REDACTED_MARKER);
        assert_eq!(out["ToKeN"], REDACTED_MARKER);
    }

    #[test]
    fn redacts_at_every_nesting_depth() {
        let redactor = Redactor::new(["secret"], 8);
        let out = redactor.redact(&json!({
            "a": { "b": { "secret": "deep", "keep": 1 } },
            "secret": "shallow"
        }));
        assert_eq!(out["secret"], REDACTED_MARKER);
        assert_eq!(out["a"]["b"]["secret"], REDACTED_MARKER);
        assert_eq!(out["a"]["b"]["keep"], 1);
    }

    #[test]
    fn traverses_arrays() {
        let redactor = Redactor::new(["api_key"], 8);
        let out = redactor.redact(&json!([{ "api_key": "k1" }, { "api_key": "k2" }]));
        assert_eq!(out[0]["api_key"], REDACTED_MARKER);
        assert_eq!(out[1]["api_key"], REDACTED_MARKER);
    }

    #[test]
    fn truncates_beyond_max_depth() {
        let redactor = Redactor::new(["secret"], 2);
        let out = redactor.redact(&json!({
            "l1": { "l2": { "too": "deep" } },
            "flat": true
        }));
        // The object at depth 2 is replaced wholesale.
        assert_eq!(out["l1"]["l2"], TRUNCATED_MARKER);
        assert_eq!(out["flat"], true);
    }

    #[test]
    fn scalars_beyond_max_depth_survive() {
        let redactor = Redactor::new(["secret"], 2);
        let out = redactor.redact(&json!({ "l1": { "leaf": 42 } }));
        assert_eq!(out["l1"]["leaf"], 42);
    }

    #[test]
    fn default_redactor_covers_common_keys() {
        let redactor = Redactor::default();
        let out = redactor.redact(&json!({
            "password": "x",
            "authorization": "Bearer y",
            "plain": "z"
        }));
        assert_eq!(out["password"], REDACTED_MARKER);
        assert_eq!(out["authorization"], REDACTED_MARKER);
        assert_eq!(out["plain"], "z");
    }
}
