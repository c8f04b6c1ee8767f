use chrono::Utc;
use uuid::Uuid;

/// key: cloud-identity -> opaque record ids
pub trait IdProvider: Send + Sync {
    fn new_id(&self) -> String;
}

/// key: cloud-clock -> creation timestamps in epoch millis
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn new_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
