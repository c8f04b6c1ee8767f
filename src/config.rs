use once_cell::sync::Lazy;

/// Secret used for JWT verification. Must be set, and not blank, via the `JWT_SECRET` env variable.
pub static JWT_SECRET: Lazy<String> = Lazy::new(|| {
    std::env::var("JWT_SECRET")
        .ok()
        .filter(|secret| !secret.trim().is_empty())
        .expect("JWT_SECRET must be set")
});

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on. Defaults to `3000`.
pub static BIND_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("BIND_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000)
});

/// System record key holding when the last admin upgrade digest went out.
pub const CLOUD_NOTIFY_ADMIN_INFO: &str = "cloud_notify_admin_info";

pub const DEFAULT_CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS: i64 = 30;

/// Upper bound for the cool-off window, ten years.
pub const MAX_CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS: i64 = 3_650;

/// key: notify-admin-config -> days between admin upgrade digests
pub static CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS: Lazy<i64> = Lazy::new(|| {
    parse_cool_off_days(std::env::var("CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS").ok().as_deref())
});

fn parse_cool_off_days(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|value| (1..=MAX_CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS).contains(value))
        .unwrap_or(DEFAULT_CLOUD_NOTIFY_ADMIN_COOL_OFF_DAYS)
}
