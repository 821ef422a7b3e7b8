//! The SQLite seam the driver executes through.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Row as _, TypeInfo, ValueRef};
use tokio::runtime::Runtime;

use super::result::{Row, SqlValue};
use crate::error::{Result, StorageError};

/// Executes SQLite statements. Errors carry the SQLite result code so the
/// driver can retry busy databases.
pub trait Storage {
    /// Run one statement with positional `?` parameters. Statements that
    /// return no rows yield an empty vector.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> std::result::Result<Vec<Row>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> std::result::Result<Vec<Row>, StorageError> {
        (**self).execute(sql, params)
    }
}

/// A single SQLite connection driven by a private current-thread runtime.
pub struct SqliteStorage {
    connection: SqliteConnection,
    runtime: Runtime,
}

impl SqliteStorage {
    /// Open the database file at `path`, creating it when missing.
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let options = if path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(StorageError::from)?
        } else {
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        }
        .disable_statement_logging();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let connection = runtime
            .block_on(options.connect())
            .map_err(StorageError::from)?;
        Ok(Self { connection, runtime })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

impl Storage for SqliteStorage {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> std::result::Result<Vec<Row>, StorageError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlValue::Null => query.bind(None::<i64>),
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Real(v) => query.bind(*v),
                SqlValue::Text(v) => query.bind(v.as_str()),
                SqlValue::Blob(v) => query.bind(v.as_slice()),
            };
        }

        let connection = &mut self.connection;
        let rows = self.runtime.block_on(query.fetch_all(connection))?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

/// Decode by the storage class SQLite reports for each value.
fn decode_row(row: &SqliteRow) -> Row {
    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        columns.push(column.name().to_string());
        let type_name = match row.try_get_raw(i) {
            Ok(raw) if raw.is_null() => "NULL".to_string(),
            Ok(raw) => raw.type_info().name().to_string(),
            Err(_) => "NULL".to_string(),
        };
        let value = match type_name.as_str() {
            "NULL" => SqlValue::Null,
            "INTEGER" | "BOOLEAN" => row
                .try_get_unchecked::<i64, _>(i)
                .map(SqlValue::Integer)
                .unwrap_or(SqlValue::Null),
            "REAL" => row
                .try_get_unchecked::<f64, _>(i)
                .map(SqlValue::Real)
                .unwrap_or(SqlValue::Null),
            "BLOB" => row
                .try_get_unchecked::<Vec<u8>, _>(i)
                .map(SqlValue::Blob)
                .unwrap_or(SqlValue::Null),
            _ => row
                .try_get_unchecked::<String, _>(i)
                .map(SqlValue::Text)
                .unwrap_or(SqlValue::Null),
        };
        values.push(value);
    }

    Row::new(columns, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_storage_classes() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        let rows = storage
            .execute(
                "SELECT ? AS i, ? AS r, ? AS t, ? AS n, x'0102' AS b",
                &[SqlValue::Integer(7), SqlValue::Real(1.5), "x".into(), SqlValue::Null],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), &["i", "r", "t", "n", "b"]);
        assert_eq!(
            rows[0].values(),
            &[
                SqlValue::Integer(7),
                SqlValue::Real(1.5),
                SqlValue::Text("x".into()),
                SqlValue::Null,
                SqlValue::Blob(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn test_error_codes() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        let err = storage.execute("SELECT * FROM missing", &[]).unwrap_err();
        assert_eq!(err.code, Some(1));
        assert!(err.message.contains("no such table"));
        assert!(!err.is_busy());
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let path = path.to_str().unwrap();
        {
            let mut storage = SqliteStorage::open(path).unwrap();
            storage.execute("CREATE TABLE t (a)", &[]).unwrap();
            storage.execute("INSERT INTO t VALUES (?)", &["kept".into()]).unwrap();
        }
        let mut storage = SqliteStorage::open(path).unwrap();
        let rows = storage.execute("SELECT a FROM t", &[]).unwrap();
        assert_eq!(rows[0].get("a"), Some(&SqlValue::Text("kept".into())));
    }
}
