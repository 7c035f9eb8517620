//! Prefixed id construction and wall-clock helpers.

pub fn new_trip_id() -> String {
    format!("trip-{}", uuid::Uuid::new_v4())
}

pub fn new_node_id() -> String {
    format!("node-{}", uuid::Uuid::new_v4())
}

pub fn new_changeset_id() -> String {
    format!("cs-{}", uuid::Uuid::new_v4())
}

pub fn new_revision_id() -> String {
    format!("rev-{}", uuid::Uuid::new_v4())
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
