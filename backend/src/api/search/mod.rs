//! Listing query service: count and page fetch against ClickHouse.

use common::{search_query::QueryDescriptor, search_result::ResultPage};
use tracing::debug;

mod search_for_results;
pub use search_for_results::{DirectoryRecord, parse_record, search_for_results};

mod search_for_results_hit_count;
pub use search_for_results_hit_count::search_for_results_hit_count;

mod table_changes;
pub use table_changes::{TableFingerprint, fingerprint_changed, poll_table_changes};

pub mod search_sql;

/// Rows of the requested page plus the total match count, fetched concurrently.
pub async fn count_and_fetch(query: QueryDescriptor) -> anyhow::Result<ResultPage<DirectoryRecord>> {
    let (rows, total_count) = futures::try_join!(
        search_for_results(&query),
        search_for_results_hit_count(&query),
    )?;
    debug!("{}: page {} -> {} rows of {}", query.table, query.page_index, rows.len(), total_count);
    Ok(ResultPage::new(rows, total_count))
}
