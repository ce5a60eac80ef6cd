//! Running Cypher and catalog queries.

use anyhow::Result;
use neo4rs::{Query, Row};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use appgraph_core::AppGraphResult;
use appgraph_db::{DbPool, DbResult, QueryTable};

use super::catalog::CatalogQuery;
use crate::target::{GraphBreakdown, GraphCounts, GraphTarget};
use crate::GraphClient;

/// Totals plus per-label and per-type counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStatistics {
    pub nodes: usize,
    pub relationships: usize,
    pub labels: Vec<(String, usize)>,
    pub relationship_types: Vec<(String, usize)>,
}

/// Count nodes per label and relationships per type.
pub async fn graph_statistics<T: GraphTarget + ?Sized>(target: &T) -> AppGraphResult<GraphStatistics> {
    let GraphCounts { nodes, relationships } = target.counts().await?;
    let GraphBreakdown { labels, relationships: relationship_types } = target.breakdown().await?;
    Ok(GraphStatistics {
        nodes,
        relationships,
        labels,
        relationship_types,
    })
}

/// Run a catalog query's Cypher. Each row becomes a JSON object keyed by the
/// query's RETURN aliases.
pub async fn run_catalog_query(client: &GraphClient, query: &CatalogQuery) -> Result<Vec<Value>> {
    raw_query(client, query.cypher).await
}

/// Run a catalog query's SQL against the relational source, if it has one.
pub fn run_catalog_sql(db: &DbPool, query: &CatalogQuery) -> DbResult<Option<QueryTable>> {
    match query.sql {
        Some(sql) => appgraph_db::queries::raw::raw_query(db, sql).map(Some),
        None => Ok(None),
    }
}

/// Execute arbitrary Cypher.
///
/// neo4rs rows cannot list their own fields, so columns are read from the
/// query's final RETURN clause. When none can be found each row is an empty
/// object.
pub async fn raw_query(client: &GraphClient, cypher: &str) -> Result<Vec<Value>> {
    let columns = return_columns(cypher);
    let rows = client.query(Query::new(cypher.to_string())).await?;
    Ok(rows_to_json(&rows, &columns))
}

fn rows_to_json(rows: &[Row], columns: &[String]) -> Vec<Value> {
    if columns.is_empty() && !rows.is_empty() {
        warn!(
            rows = rows.len(),
            "No RETURN columns found; alias returned values (RETURN x AS name) to see them"
        );
    }
    rows.iter().map(|row| row_to_json(row, columns)).collect()
}

fn row_to_json(row: &Row, columns: &[String]) -> Value {
    let map: Map<String, Value> = columns
        .iter()
        .map(|col| (col.clone(), field_value(row, col)))
        .collect();
    Value::Object(map)
}

/// Decode one field, trying the types the catalog returns. Integers are
/// tried before floats so counts stay integral.
fn field_value(row: &Row, column: &str) -> Value {
    match row.get::<Option<i64>>(column) {
        Ok(None) => return Value::Null,
        Ok(Some(i)) => return Value::from(i),
        Err(_) => {}
    }
    if let Ok(f) = row.get::<f64>(column) {
        return Value::from(f);
    }
    if let Ok(b) = row.get::<bool>(column) {
        return Value::from(b);
    }
    if let Ok(s) = row.get::<String>(column) {
        return Value::from(s);
    }
    if let Ok(list) = row.get::<Vec<String>>(column) {
        return Value::from(list);
    }
    if let Ok(list) = row.get::<Vec<i64>>(column) {
        return Value::from(list);
    }
    row.get::<Value>(column).unwrap_or(Value::Null)
}

/// Column names produced by the last RETURN clause of `cypher`: the alias
/// after `AS` when present, otherwise the expression itself.
pub fn return_columns(cypher: &str) -> Vec<String> {
    // ASCII uppercasing keeps byte offsets aligned with the original.
    let upper = cypher.to_ascii_uppercase();
    let Some(start) = find_keyword(&upper, "RETURN").last().copied() else {
        return Vec::new();
    };
    let body_start = start + "RETURN".len();

    let end = ["ORDER BY", "SKIP", "LIMIT", "UNION"]
        .iter()
        .flat_map(|kw| find_keyword(&upper, kw))
        .filter(|pos| *pos > body_start)
        .min()
        .unwrap_or(cypher.len());

    let mut body = cypher[body_start..end].trim();
    if upper[body_start..end].trim_start().starts_with("DISTINCT ") {
        body = body["DISTINCT".len()..].trim_start();
    }

    split_top_level(body)
        .into_iter()
        .map(|item| {
            let item_upper = item.to_ascii_uppercase();
            let name = match find_keyword(&item_upper, "AS").last() {
                Some(pos) => item[pos + 2..].trim(),
                None => item.trim(),
            };
            name.trim_matches('`').to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Byte offsets of `keyword` in `upper` where it stands as a whole word.
fn find_keyword(upper: &str, keyword: &str) -> Vec<usize> {
    let bytes = upper.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    upper
        .match_indices(keyword)
        .map(|(pos, _)| pos)
        .filter(|&pos| {
            let before = pos == 0 || !is_word(bytes[pos - 1]);
            let after = pos + keyword.len() >= bytes.len() || !is_word(bytes[pos + keyword.len()]);
            before && after
        })
        .collect()
}

/// Split on commas outside parentheses, brackets, braces and quotes.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                items.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&body[start..]);
    items
}
