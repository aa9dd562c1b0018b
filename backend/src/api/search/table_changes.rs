//! Change notifications for live-updating listings.
//!
//! The store has no push channel, so changes are detected by polling a cheap
//! fingerprint of the table and emitting one notification per difference.

use std::time::Duration;

use futures::Stream;
use tracing::warn;

use crate::{api::search::search_sql::sql_identifier, db_utils::clickhouse_utils::get_clickhouse_client};

/// (row count, highest identity key)
pub type TableFingerprint = (u64, u64);

async fn table_fingerprint(table: &str, id_column: &str) -> anyhow::Result<TableFingerprint> {
    let sql = format!(
        "SELECT count(), max({}) FROM {}",
        sql_identifier(id_column)?,
        sql_identifier(table)?,
    );
    let client = get_clickhouse_client();
    let rows = client.query(&sql).fetch_all::<(u64, u64)>().await?;
    Ok(rows.first().copied().unwrap_or((0, 0)))
}

/// Records `next` and reports whether it differs from the previous fingerprint.
/// The first observation is a baseline, not a change.
pub fn fingerprint_changed(last: &mut Option<TableFingerprint>, next: TableFingerprint) -> bool {
    let changed = last.is_some_and(|previous| previous != next);
    *last = Some(next);
    changed
}

pub fn poll_table_changes(table: String, id_column: String, period: Duration) -> impl Stream<Item = ()> + Send + 'static {
    // the interval is created on first poll so the stream can be built outside a runtime
    let state = (None::<tokio::time::Interval>, None::<TableFingerprint>, table, id_column);
    futures::stream::unfold(state, move |(interval, mut last, table, id_column)| async move {
        let mut interval = interval.unwrap_or_else(|| tokio::time::interval(period));
        loop {
            interval.tick().await;
            match table_fingerprint(&table, &id_column).await {
                Ok(next) => {
                    if fingerprint_changed(&mut last, next) {
                        return Some(((), (Some(interval), last, table, id_column)));
                    }
                }
                Err(e) => warn!("polling {table} for changes failed: {e:#}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fingerprint_is_a_baseline() {
        let mut last = None;
        assert!(!fingerprint_changed(&mut last, (3, 9)));
        assert!(!fingerprint_changed(&mut last, (3, 9)));
        assert!(fingerprint_changed(&mut last, (4, 10)));
        assert!(fingerprint_changed(&mut last, (3, 10)));
        assert_eq!(last, Some((3, 10)));
    }
}
