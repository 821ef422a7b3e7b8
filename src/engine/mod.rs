//! The driver: runs MySQL statements against SQLite.
//!
//! [`Driver::query`] parses one MySQL statement, plans the SQLite statements
//! that implement it, executes them inside the call's own transaction level
//! and keeps the emulated `information_schema` in step with every DDL
//! change. Nested `START TRANSACTION`s map to SQLite savepoints.
//!
//! ```
//! use mysqlite::config::Config;
//! use mysqlite::engine::Driver;
//!
//! let mut driver = Driver::open(Config::default()).unwrap();
//! driver.query("CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(20))").unwrap();
//! let inserted = driver.query("INSERT INTO t (name) VALUES ('a'), ('b')").unwrap();
//! assert_eq!(inserted.affected_rows(), Some(2));
//! let selected = driver.query("SELECT name FROM t ORDER BY id DESC LIMIT 1").unwrap();
//! assert_eq!(selected.rows()[0]["name"], "b");
//! ```

mod observer;
mod result;
mod statements;
mod storage;

pub use observer::{QueryObserver, TransactionCommand};
pub use result::{
    ExecutedStatement, FetchMode, QueryResult, QueryType, ReturnValue, Row, SqlValue,
};
pub use storage::{SqliteStorage, Storage};

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::parser;
use crate::schema::{SchemaBuilder, TableContext};
use crate::transpiler::factory::identifier;
use crate::transpiler::{ToSql, Translator, index_name};
use statements::CatalogChange;

/// Journal modes accepted from configuration.
const JOURNAL_MODES: [&str; 6] = ["DELETE", "TRUNCATE", "PERSIST", "MEMORY", "WAL", "OFF"];

static BEGIN: LazyLock<Regex> = LazyLock::new(|| transaction_pattern(r"(START\s+TRANSACTION|BEGIN(\s+WORK)?)"));
static COMMIT: LazyLock<Regex> = LazyLock::new(|| transaction_pattern(r"COMMIT(\s+WORK)?"));
static ROLLBACK: LazyLock<Regex> = LazyLock::new(|| transaction_pattern(r"ROLLBACK(\s+WORK)?"));

fn transaction_pattern(keywords: &str) -> Regex {
    Regex::new(&format!(r"(?i)^\s*{}\s*;?\s*$", keywords)).expect("valid transaction regex")
}

/// The transaction command a statement consists of, if any.
fn transaction_command(sql: &str) -> Option<TransactionCommand> {
    if BEGIN.is_match(sql) {
        Some(TransactionCommand::Begin)
    } else if COMMIT.is_match(sql) {
        Some(TransactionCommand::Commit)
    } else if ROLLBACK.is_match(sql) {
        Some(TransactionCommand::Rollback)
    } else {
        None
    }
}

/// Execute one statement, retrying for as long as SQLite reports the
/// database busy or locked.
pub fn execute_with_retry<S: Storage + ?Sized>(
    storage: &mut S,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Row>> {
    debug!(sql, params = params.len(), "executing");
    let mut attempts = 0u64;
    loop {
        match storage.execute(sql, params) {
            Ok(rows) => return Ok(rows),
            Err(err) if err.is_busy() => {
                attempts += 1;
                debug!(attempts, error = %err, "database busy, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Runs MySQL statements on a [`Storage`].
pub struct Driver<S: Storage = SqliteStorage> {
    grammar: Arc<Grammar>,
    storage: S,
    config: Config,
    transaction_level: usize,
    observers: Vec<Box<dyn QueryObserver>>,
}

impl Driver<SqliteStorage> {
    /// Open the database named by `config.database.path`.
    pub fn open(config: Config) -> Result<Self> {
        let storage = SqliteStorage::open(&config.database.path)?;
        Self::new(storage, config)
    }
}

impl<S: Storage> Driver<S> {
    pub fn new(storage: S, config: Config) -> Result<Self> {
        Self::with_grammar(Arc::new(Grammar::mysql()), storage, config)
    }

    /// Share an already built grammar between drivers.
    pub fn with_grammar(grammar: Arc<Grammar>, storage: S, config: Config) -> Result<Self> {
        let mut driver = Self {
            grammar,
            storage,
            config,
            transaction_level: 0,
            observers: Vec::new(),
        };
        driver.setup()?;
        Ok(driver)
    }

    fn setup(&mut self) -> Result<()> {
        execute_with_retry(&mut self.storage, "PRAGMA foreign_keys = ON", &[])?;
        execute_with_retry(&mut self.storage, "PRAGMA encoding = 'UTF-8'", &[])?;
        if let Some(mode) = &self.config.database.journal_mode {
            let mode = mode.to_uppercase();
            if JOURNAL_MODES.contains(&mode.as_str()) {
                execute_with_retry(&mut self.storage, &format!("PRAGMA journal_mode = {}", mode), &[])?;
            } else {
                warn!(journal_mode = %mode, "ignoring unknown journal mode");
            }
        }

        let storage = &mut self.storage;
        SchemaBuilder::new(&self.config.database.name, |sql: &str, params: &[SqlValue]| {
            execute_with_retry(storage, sql, params).map(drop)
        })
        .ensure_tables()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Number of open transaction levels.
    pub fn transaction_level(&self) -> usize {
        self.transaction_level
    }

    pub fn add_observer(&mut self, observer: impl QueryObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run one MySQL statement.
    ///
    /// Failures roll back everything the call did. With `debug` off they are
    /// reported through [`QueryResult::error`] instead of `Err`.
    #[instrument(skip(self))]
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut result = QueryResult::new(sql);

        if let Some(command) = transaction_command(sql) {
            result.query_type = Some(QueryType::Transaction);
            let outcome = match command {
                TransactionCommand::Begin => self.begin_transaction(),
                TransactionCommand::Commit => self.commit(),
                TransactionCommand::Rollback => self.rollback(),
            };
            return match outcome {
                Ok(success) => {
                    result.return_value = ReturnValue::Bool(success);
                    Ok(result)
                }
                Err(err) => self.failed(result, err, false),
            };
        }

        if let Err(err) = self.begin_transaction() {
            return self.failed(result, err, false);
        }
        if let Err(err) = self.execute_query(&mut result) {
            return self.failed(result, err, true);
        }
        if let Err(err) = self.commit() {
            return self.failed(result, err, true);
        }

        for observer in &mut self.observers {
            observer.translated_query_executed(&result);
        }
        Ok(result)
    }

    fn failed(&mut self, result: QueryResult, error: Error, opened: bool) -> Result<QueryResult> {
        if opened {
            if let Err(rollback) = self.rollback() {
                warn!(error = %rollback, "rollback failed");
            }
        }
        warn!(error = %error, query = %result.query, "query failed");
        if self.config.debug {
            return Err(error);
        }
        Ok(result.fail(&error))
    }

    fn execute_query(&mut self, result: &mut QueryResult) -> Result<()> {
        let grammar = Arc::clone(&self.grammar);
        let tree = parser::parse(&grammar, &result.query)?;
        let database_name = self.config.database.name.clone();
        let mut translator = Translator::new(&database_name);
        let plan = statements::plan(&mut translator, &tree)?;

        result.query_type = Some(plan.query_type);
        result.table_name = plan.table.clone();
        result.has_seen_calc_found_rows = translator.has_seen_calc_found_rows();
        result.has_seen_found_rows = translator.has_seen_found_rows();

        if let Some(table) = &plan.if_not_exists {
            let existing = self.run(
                result,
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
                &[table.as_str().into()],
            )?;
            if !existing.is_empty() {
                debug!(table, "table exists, skipping CREATE TABLE");
                return Ok(());
            }
        }

        let mut rows = Vec::new();
        for step in &plan.steps {
            for statement in &step.statements {
                rows = self.run(result, statement, &[])?;
            }
            if let Some(change) = &step.catalog {
                self.apply_catalog(result, &database_name, change)?;
            }
        }

        result.return_value = match plan.query_type {
            QueryType::Select => ReturnValue::Rows(
                rows.iter()
                    .map(|row| row.to_json(self.config.fetch_mode))
                    .collect(),
            ),
            QueryType::Insert | QueryType::Replace => {
                let changes = self.changes(result)?;
                result.last_insert_id = self.scalar(result, "SELECT last_insert_rowid()")?;
                ReturnValue::AffectedRows(changes)
            }
            QueryType::Update | QueryType::Delete => ReturnValue::AffectedRows(self.changes(result)?),
            _ => ReturnValue::AffectedRows(0),
        };
        Ok(())
    }

    /// Execute and record a statement.
    fn run(&mut self, result: &mut QueryResult, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        result.executed.push(ExecutedStatement::new(sql, params));
        execute_with_retry(&mut self.storage, sql, params)
    }

    fn scalar(&mut self, result: &mut QueryResult, sql: &str) -> Result<Option<i64>> {
        let rows = self.run(result, sql, &[])?;
        Ok(rows
            .first()
            .and_then(|row| row.get_index(0))
            .and_then(SqlValue::as_i64))
    }

    fn changes(&mut self, result: &mut QueryResult) -> Result<u64> {
        let changes = self.scalar(result, "SELECT changes()")?.unwrap_or(0);
        Ok(u64::try_from(changes).unwrap_or(0))
    }

    fn apply_catalog(
        &mut self,
        result: &mut QueryResult,
        database_name: &str,
        change: &CatalogChange<'_>,
    ) -> Result<()> {
        let context = match change {
            CatalogChange::AddColumn { table, .. } => self.table_context(result, database_name, table)?,
            _ => TableContext::default(),
        };
        let storage = &mut self.storage;
        let executed = &mut result.executed;
        let mut builder = SchemaBuilder::new(database_name, |sql: &str, params: &[SqlValue]| {
            executed.push(ExecutedStatement::new(sql, params));
            execute_with_retry(storage, sql, params).map(drop)
        });
        let outcome = match change {
            CatalogChange::CreateTable(create) => builder.create_table(create),
            CatalogChange::AddColumn { table, column } => builder.add_column(table, column, &context),
            CatalogChange::DropColumn { table, column } => builder.drop_column(table, column),
            CatalogChange::AddIndex { table, index } => builder.add_index(table, index),
            CatalogChange::DropIndex { table, index } => builder.drop_index(table, index),
            CatalogChange::RenameTable { from, to } => builder.rename_table(from, to),
            CatalogChange::RenameColumn { table, from, to } => builder.rename_column(table, from, to),
            CatalogChange::DropTable { table } => builder.drop_table(table),
        };
        outcome?;
        if let CatalogChange::RenameTable { from, to } = change {
            self.rename_indexes(result, from, to)?;
        }
        Ok(())
    }

    /// Charset defaults a table was created with, as recorded in the catalog.
    fn table_context(&mut self, result: &mut QueryResult, database_name: &str, table: &str) -> Result<TableContext> {
        let rows = self.run(
            result,
            "SELECT table_collation FROM _mysql_information_schema_tables \
             WHERE table_schema = ? AND table_name = ?",
            &[database_name.into(), table.into()],
        )?;
        let collation = rows
            .first()
            .and_then(|row| row.get_index(0))
            .and_then(SqlValue::as_str)
            .map(str::to_string);
        Ok(TableContext::with_collation(collation))
    }

    /// SQLite keeps index names across `RENAME TO`. Recreate every index
    /// under the new table prefix.
    fn rename_indexes(&mut self, result: &mut QueryResult, from: &str, to: &str) -> Result<()> {
        let prefix = index_name(from, "");
        let indexes = self.run(
            result,
            "SELECT name, sql FROM sqlite_master \
             WHERE type = 'index' AND tbl_name = ? AND sql IS NOT NULL ORDER BY name",
            &[to.into()],
        )?;
        for row in &indexes {
            let (Some(name), Some(sql)) = (
                row.get_index(0).and_then(SqlValue::as_str),
                row.get_index(1).and_then(SqlValue::as_str),
            ) else {
                continue;
            };
            let Some(index) = name.strip_prefix(&prefix) else {
                continue;
            };
            let old = identifier(name).to_sql();
            let new = identifier(&index_name(to, index)).to_sql();
            debug!(from = %old, to = %new, "renaming index");
            self.run(result, &format!("DROP INDEX {}", old), &[])?;
            self.run(result, &sql.replacen(&old, &new, 1), &[])?;
        }
        Ok(())
    }

    /// Open a transaction, or a savepoint when one is already open.
    pub fn begin_transaction(&mut self) -> Result<bool> {
        let depth = self.transaction_level;
        let sql = if depth == 0 {
            "BEGIN".to_string()
        } else {
            format!("SAVEPOINT LEVEL{}", depth)
        };
        self.transaction_statement(TransactionCommand::Begin, depth, &sql)?;
        self.transaction_level += 1;
        Ok(true)
    }

    /// Commit the innermost level. Returns `false` when none is open.
    pub fn commit(&mut self) -> Result<bool> {
        let Some(depth) = self.transaction_level.checked_sub(1) else {
            return Ok(false);
        };
        let sql = if depth == 0 {
            "COMMIT".to_string()
        } else {
            format!("RELEASE SAVEPOINT LEVEL{}", depth)
        };
        self.transaction_statement(TransactionCommand::Commit, depth, &sql)?;
        self.transaction_level = depth;
        Ok(true)
    }

    /// Roll back the innermost level. Returns `false` when none is open.
    /// The level is closed even if SQLite rejects the rollback.
    pub fn rollback(&mut self) -> Result<bool> {
        let Some(depth) = self.transaction_level.checked_sub(1) else {
            return Ok(false);
        };
        let sql = if depth == 0 {
            "ROLLBACK".to_string()
        } else {
            format!("ROLLBACK TO SAVEPOINT LEVEL{}", depth)
        };
        self.transaction_level = depth;
        self.transaction_statement(TransactionCommand::Rollback, depth, &sql)?;
        Ok(true)
    }

    fn transaction_statement(&mut self, command: TransactionCommand, depth: usize, sql: &str) -> Result<()> {
        let outcome = execute_with_retry(&mut self.storage, sql, &[]);
        let success = outcome.is_ok();
        info!(%command, depth, success, "transaction");
        for observer in &mut self.observers {
            observer.transaction_command(command, depth, success);
        }
        outcome.map(drop)
    }
}
