//! テーブル CRUD Outbound ポート
//!
//! クエリビルダ風の `Select` と、行を serde_json::Value で受け渡す trait。
//! 行単位の書き込みはそれぞれ独立しており、テーブルをまたぐトランザクションはない。

use crate::domain::TableName;
use crate::error::Error;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 行の絞り込み条件
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// column = value
    Eq(String, Value),
    /// column IS NOT NULL
    NotNull(String),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::Eq(column.to_string(), value.into())
    }

    pub fn not_null(column: &str) -> Self {
        Self::NotNull(column.to_string())
    }

    /// 1 行がこの条件を満たすか（メモリ上の実装・テスト用）
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Self::Eq(col, v) => row.get(col) == Some(v),
            Self::NotNull(col) => row.get(col).map(|v| !v.is_null()).unwrap_or(false),
        }
    }
}

/// 並び順 1 キー分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// SELECT の組み立て
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: TableName,
    /// カンマ区切りの列（"*" で全列）
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn from(table: TableName) -> Self {
        Self {
            table,
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::not_null(column));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// テーブル問い合わせプロバイダ（Outbound ポート）
///
/// 実装は `common::adapter::RestTables`（ホスト型バックエンド）や `InMemoryBackend`（テスト用）。
pub trait TableProvider: Send + Sync {
    fn select(&self, query: &Select) -> Result<Vec<Value>, Error>;

    /// 条件に合う行数（exact count）
    fn count(&self, table: TableName, filters: &[Filter]) -> Result<u64, Error>;

    /// 1 行挿入し、挿入後の行を返す
    fn insert(&self, table: TableName, row: &Value) -> Result<Value, Error>;

    /// 条件に合う行を更新し、更新後の行を返す（該当なしは NotFound）
    fn update(&self, table: TableName, filters: &[Filter], patch: &Value) -> Result<Value, Error>;

    fn delete(&self, table: TableName, filters: &[Filter]) -> Result<(), Error>;

    /// 主キー（id）で挿入または更新
    fn upsert(&self, table: TableName, row: &Value) -> Result<(), Error>;
}

/// select の結果を型付きで受け取る
pub fn select_as<T: DeserializeOwned>(
    tables: &dyn TableProvider,
    query: &Select,
) -> Result<Vec<T>, Error> {
    tables
        .select(query)?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(Error::from))
        .collect()
}

/// 1 行だけ取得する（0 行なら NotFound）
pub fn select_single<T: DeserializeOwned>(
    tables: &dyn TableProvider,
    query: &Select,
) -> Result<T, Error> {
    let mut rows = select_as::<T>(tables, &query.clone().limit(1))?;
    if rows.is_empty() {
        return Err(Error::not_found(format!("no row in {}", query.table)));
    }
    Ok(rows.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_parts() {
        let q = Select::from(TableName::POSTS)
            .columns("id, title")
            .not_null("lat")
            .eq("id", "p1")
            .order_desc("visited_at")
            .order_desc("created_at")
            .limit(10);
        assert_eq!(q.columns, "id, title");
        assert_eq!(q.filters.len(), 2);
        assert_eq!(q.order.len(), 2);
        assert!(!q.order[0].ascending);
        assert_eq!(q.limit, Some(10));
    }

    #[test]
    fn test_filter_matches() {
        let row = json!({"id": "p1", "lat": null, "lng": 23.7});
        assert!(Filter::eq("id", "p1").matches(&row));
        assert!(!Filter::eq("id", "p2").matches(&row));
        assert!(!Filter::not_null("lat").matches(&row));
        assert!(Filter::not_null("lng").matches(&row));
        assert!(!Filter::not_null("missing").matches(&row));
    }
}
