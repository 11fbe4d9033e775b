//! テーブル API（/rest/v1）を使う TableProvider 実装
//!
//! Select / Filter をクエリ文字列に変換する部分は純粋関数にしてテストする。

use super::client::RestClient;
use crate::domain::TableName;
use crate::error::Error;
use crate::ports::outbound::{Filter, Select, TableProvider};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

pub struct RestTables {
    client: Arc<RestClient>,
}

impl RestTables {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    fn table_url(&self, table: TableName) -> String {
        self.client.url(&format!("/rest/v1/{}", table))
    }
}

/// フィルタ値の文字列表現（文字列はそのまま、それ以外は JSON 表記）
fn encode_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq(col, v) => (col.clone(), format!("eq.{}", encode_value(v))),
        Filter::NotNull(col) => (col.clone(), "not.is.null".to_string()),
    }
}

pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(filter_param).collect()
}

/// SELECT のクエリパラメータ（select / フィルタ / order / limit の順）
pub fn select_params(query: &Select) -> Vec<(String, String)> {
    let columns: String = query.columns.chars().filter(|c| !c.is_whitespace()).collect();
    let mut params = vec![("select".to_string(), columns)];
    params.extend(filter_params(&query.filters));
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(n) = query.limit {
        params.push(("limit".to_string(), n.to_string()));
    }
    params
}

/// Content-Range（例: "0-9/42", "*/0"）から総数を取り出す
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

/// return=representation の応答（配列）から先頭行を取り出す
fn first_row(v: Value, table: TableName) -> Result<Value, Error> {
    match v {
        Value::Array(mut rows) if !rows.is_empty() => Ok(rows.remove(0)),
        Value::Array(_) => Err(Error::not_found(format!("no matching row in {}", table))),
        Value::Object(_) => Ok(v),
        _ => Err(Error::json(format!("unexpected response from {}", table))),
    }
}

impl TableProvider for RestTables {
    fn select(&self, query: &Select) -> Result<Vec<Value>, Error> {
        let builder = self
            .client
            .request(Method::GET, &self.table_url(query.table))
            .query(&select_params(query));
        match self.client.send_json(builder)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            _ => Err(Error::json(format!("unexpected response from {}", query.table))),
        }
    }

    fn count(&self, table: TableName, filters: &[Filter]) -> Result<u64, Error> {
        let mut params = vec![("select".to_string(), "id".to_string())];
        params.extend(filter_params(filters));
        let builder = self
            .client
            .request(Method::HEAD, &self.table_url(table))
            .header("Prefer", "count=exact")
            .query(&params);
        let response = self.client.send(builder)?;
        response
            .headers()
            .get("content-range")
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| Error::json(format!("no count in response from {}", table)))
    }

    fn insert(&self, table: TableName, row: &Value) -> Result<Value, Error> {
        let builder = self
            .client
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        first_row(self.client.send_json(builder)?, table)
    }

    fn update(&self, table: TableName, filters: &[Filter], patch: &Value) -> Result<Value, Error> {
        let builder = self
            .client
            .request(Method::PATCH, &self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&filter_params(filters))
            .json(patch);
        first_row(self.client.send_json(builder)?, table)
    }

    fn delete(&self, table: TableName, filters: &[Filter]) -> Result<(), Error> {
        let builder = self
            .client
            .request(Method::DELETE, &self.table_url(table))
            .query(&filter_params(filters));
        self.client.send(builder)?;
        Ok(())
    }

    fn upsert(&self, table: TableName, row: &Value) -> Result<(), Error> {
        let builder = self
            .client
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row);
        self.client.send(builder)?;
        Ok(())
    }
}
