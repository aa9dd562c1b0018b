//! Row fetch for one listing page.

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::search_query::QueryDescriptor;
use crate::{api::search::search_sql::build_select_statement, db_utils::clickhouse_utils::get_clickhouse_client};

/// One listing row: the identity key plus every display column, as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub id: u64,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl DirectoryRecord {
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Values of an array column; empty when the column is missing or not an array.
    pub fn field_list(&self, name: &str) -> Vec<&str> {
        match self.fields.get(name) {
            Some(serde_json::Value::Array(items)) => items.iter().filter_map(|v| v.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

pub fn parse_record(id: u64, row_json: &str) -> anyhow::Result<DirectoryRecord> {
    let value: serde_json::Value = serde_json::from_str(row_json)?;
    let serde_json::Value::Object(fields) = value else {
        anyhow::bail!("row {id} is not a JSON object: {row_json}");
    };
    Ok(DirectoryRecord { id, fields })
}

pub async fn search_for_results(query: &QueryDescriptor) -> anyhow::Result<Vec<DirectoryRecord>> {
    let statement = build_select_statement(query)?;
    debug!("listing rows sql: {}", statement.sql);
    let client = get_clickhouse_client();
    let rows = statement.into_query(&client).fetch_all::<(u64, String)>().await?;
    rows.into_iter().map(|(id, row_json)| parse_record(id, &row_json)).collect()
}
