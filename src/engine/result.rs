//! Values, rows and the per-call query result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic value type for bound parameters and fetched columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Real(v) => Some(*v as i64),
            SqlValue::Text(v) => v.parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Integer(v) => serde_json::Value::Number((*v).into()),
            SqlValue::Real(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Text(v) => serde_json::Value::String(v.clone()),
            SqlValue::Blob(v) => serde_json::Value::String(String::from_utf8_lossy(v).into_owned()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Real(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            SqlValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// How fetched rows are shaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Objects keyed by column name.
    #[default]
    Assoc,
    /// Arrays in column order.
    Num,
}

/// One fetched row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.values.get(index)
    }

    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    pub fn to_json(&self, mode: FetchMode) -> serde_json::Value {
        match mode {
            FetchMode::Assoc => serde_json::Value::Object(
                self.columns
                    .iter()
                    .cloned()
                    .zip(self.values.iter().map(SqlValue::to_json))
                    .collect(),
            ),
            FetchMode::Num => {
                serde_json::Value::Array(self.values.iter().map(SqlValue::to_json).collect())
            }
        }
    }
}

/// The statement category of a MySQL query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
    Set,
    Transaction,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Replace => "REPLACE",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
            QueryType::Create => "CREATE",
            QueryType::Alter => "ALTER",
            QueryType::Drop => "DROP",
            QueryType::Set => "SET",
            QueryType::Transaction => "TRANSACTION",
        };
        f.write_str(name)
    }
}

/// What a query returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnValue {
    Rows(Vec<serde_json::Value>),
    AffectedRows(u64),
    Bool(bool),
}

impl Default for ReturnValue {
    fn default() -> Self {
        ReturnValue::AffectedRows(0)
    }
}

/// A statement sent to SQLite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl ExecutedStatement {
    pub fn new(sql: impl Into<String>, params: &[SqlValue]) -> Self {
        Self {
            sql: sql.into(),
            params: params.to_vec(),
        }
    }
}

impl fmt::Display for ExecutedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

/// Everything known about one `Driver::query` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    /// The MySQL statement as given.
    pub query: String,
    pub query_type: Option<QueryType>,
    pub table_name: Option<String>,
    /// SQLite statements in execution order, catalog writes included.
    pub executed: Vec<ExecutedStatement>,
    pub return_value: ReturnValue,
    pub last_insert_id: Option<i64>,
    pub has_seen_calc_found_rows: bool,
    pub has_seen_found_rows: bool,
    pub error: Option<String>,
}

impl QueryResult {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Fetched rows, empty for anything but a successful SELECT.
    pub fn rows(&self) -> &[serde_json::Value] {
        match &self.return_value {
            ReturnValue::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn affected_rows(&self) -> Option<u64> {
        match self.return_value {
            ReturnValue::AffectedRows(count) => Some(count),
            _ => None,
        }
    }

    /// Turn this into a failed result whose message lists the MySQL query
    /// and every SQLite statement attempted for it.
    pub(crate) fn fail(mut self, error: &crate::error::Error) -> Self {
        let mut message = format!("{}\n\nMySQL query:\n{}\n\nSQLite queries:", error, self.query);
        for statement in &self.executed {
            message.push('\n');
            message.push_str(&statement.to_string());
        }
        self.error = Some(message);
        self.return_value = ReturnValue::Bool(false);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sql_value_from() {
        assert_eq!(SqlValue::from(42i32), SqlValue::Integer(42));
        assert_eq!(SqlValue::from(true), SqlValue::Integer(1));
        assert_eq!(SqlValue::from("a"), SqlValue::Text("a".into()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }

    #[test]
    fn test_row_fetch_modes() {
        let row = Row::new(
            vec!["id".into(), "name".into()],
            vec![SqlValue::Integer(1), SqlValue::Text("a".into())],
        );
        assert_eq!(row.to_json(FetchMode::Assoc), serde_json::json!({"id": 1, "name": "a"}));
        assert_eq!(row.to_json(FetchMode::Num), serde_json::json!([1, "a"]));
        assert_eq!(row.get("name"), Some(&SqlValue::Text("a".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_failure_message_lists_statements() {
        let mut result = QueryResult::new("DELETE FROM t");
        result
            .executed
            .push(ExecutedStatement::new("DELETE FROM \"t\"", &[]));
        result
            .executed
            .push(ExecutedStatement::new("SELECT ?", &[SqlValue::from("it's")]));
        let failed = result.fail(&crate::error::Error::unsupported("x"));
        let message = failed.error.as_deref().unwrap();
        assert!(message.starts_with("Unsupported: x"));
        assert!(message.contains("MySQL query:\nDELETE FROM t"));
        assert!(message.contains("DELETE FROM \"t\"\nSELECT ? ['it''s']"));
        assert_eq!(failed.return_value, ReturnValue::Bool(false));
    }
}
