pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Short hex id used to correlate a bridge call with its log lines.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}
