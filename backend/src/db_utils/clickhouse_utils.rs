//! Shared ClickHouse client, configured from the environment.

use std::sync::OnceLock;

use tracing::info;

static CLIENT: OnceLock<clickhouse::Client> = OnceLock::new();

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

/// The process-wide client. Read-only from the listing engine's side, so one
/// connection pool is shared by every view.
pub fn get_clickhouse_client() -> clickhouse::Client {
    CLIENT
        .get_or_init(|| {
            clickhouse::Client::default()
                .with_url(env_or("CLICKHOUSE_URL", "http://localhost:8123"))
                .with_user(env_or("CLICKHOUSE_USER", "directory"))
                .with_password(env_or("CLICKHOUSE_PASSWORD", "directory"))
                .with_database(env_or("CLICKHOUSE_DATABASE", "directory"))
        })
        .clone()
}
