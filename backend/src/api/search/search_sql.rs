//! SQL builder helpers for listing queries.
//!
//! User supplied text never lands in the SQL text itself: search terms and
//! facet values are `?` placeholders bound through the client, and identifiers
//! (table, column names) are checked against a strict character set.

use common::search_query::QueryDescriptor;

/// A value bound to one `?` placeholder, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlStatement {
    pub fn into_query(self, client: &clickhouse::Client) -> clickhouse::query::Query {
        let mut query = client.query(&self.sql);
        for param in self.params {
            query = match param {
                SqlParam::Text(text) => query.bind(text),
                SqlParam::TextList(list) => query.bind(list),
            };
        }
        query
    }
}

pub fn sql_identifier(name: &str) -> anyhow::Result<&str> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !valid_start || !valid_rest {
        anyhow::bail!("invalid SQL identifier: {name:?}");
    }
    Ok(name)
}

/// Empty string when the descriptor carries no predicates.
pub fn build_sql_where_clause(query: &QueryDescriptor) -> anyhow::Result<(String, Vec<SqlParam>)> {
    let mut terms = Vec::new();
    let mut params = Vec::new();

    if let Some(text) = &query.text_predicate {
        let mut matches = Vec::new();
        for field in &text.fields {
            // toString keeps array-typed text columns (integration lists etc.) searchable
            matches.push(format!("positionCaseInsensitiveUTF8(toString({}), ?) > 0", sql_identifier(field)?));
            params.push(SqlParam::Text(text.term.clone()));
        }
        if !matches.is_empty() {
            terms.push(format!("({})", matches.join(" OR ")));
        }
    }

    for overlap in &query.overlap_predicates {
        terms.push(format!("hasAny({}, ?)", sql_identifier(&overlap.field)?));
        params.push(SqlParam::TextList(overlap.values.iter().cloned().collect()));
    }

    if terms.is_empty() {
        return Ok((String::new(), params));
    }
    let clause = format!("WHERE {}", terms.join("
        AND "));
    Ok((clause, params))
}

pub fn build_select_statement(query: &QueryDescriptor) -> anyhow::Result<SqlStatement> {
    let table = sql_identifier(&query.table)?;
    let order_column = sql_identifier(&query.order.column)?;
    let direction = if query.order.ascending { "ASC" } else { "DESC" };
    let mut columns = Vec::new();
    for column in &query.columns {
        columns.push(sql_identifier(column)?);
    }
    if columns.is_empty() {
        columns.push(order_column);
    }
    let columns = columns.join(", ");
    let (sql_where_clause, params) = build_sql_where_clause(query)?;
    let limit = query.limit();
    let offset = query.offset();

    let sql = format!(
        "
    SELECT {order_column} AS row_id,
        formatRowNoNewline('JSONEachRow', {columns}) AS row_json
    FROM {table}
    {sql_where_clause}
    ORDER BY {order_column} {direction}
    LIMIT {limit} OFFSET {offset}
    ",
    );
    Ok(SqlStatement { sql, params })
}

pub fn build_count_statement(query: &QueryDescriptor) -> anyhow::Result<SqlStatement> {
    let table = sql_identifier(&query.table)?;
    let (sql_where_clause, params) = build_sql_where_clause(query)?;
    let sql = format!(
        "
    SELECT count() AS total_count
    FROM {table}
    {sql_where_clause}
    ",
    );
    Ok(SqlStatement { sql, params })
}
