use common::search_query::QueryDescriptor;
use crate::{api::search::search_sql::build_count_statement, db_utils::clickhouse_utils::get_clickhouse_client};

/// Number of records matching the descriptor's predicates, regardless of page.
pub async fn search_for_results_hit_count(query: &QueryDescriptor) -> anyhow::Result<u64> {
    let statement = build_count_statement(query)?;
    let client = get_clickhouse_client();
    let response = statement.into_query(&client).fetch_all::<u64>().await?;
    Ok(response.first().copied().unwrap_or(0))
}
