//! Driver behaviour observed through a recording storage.

use mysqlite::engine::{Driver, QueryType, ReturnValue, Row, SqlValue, Storage};
use mysqlite::error::StorageError;
use mysqlite::prelude::Config;
use pretty_assertions::assert_eq;

/// Records every statement. Answers `changes()` with 2 and
/// `last_insert_rowid()` with 7.
#[derive(Default)]
struct Recording {
    log: Vec<(String, Vec<SqlValue>)>,
}

impl Recording {
    fn statements(&self) -> Vec<&str> {
        self.log.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

impl Storage for Recording {
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.log.push((sql.to_string(), params.to_vec()));
        let scalar = |value: i64| vec![Row::new(vec!["v".into()], vec![SqlValue::Integer(value)])];
        Ok(match sql {
            "SELECT changes()" => scalar(2),
            "SELECT last_insert_rowid()" => scalar(7),
            _ => Vec::new(),
        })
    }
}

fn driver() -> Driver<Recording> {
    let mut driver = Driver::new(Recording::default(), Config::default()).unwrap();
    driver.storage_mut().log.clear();
    driver
}

fn executed(driver: &mut Driver<Recording>, sql: &str) -> Vec<String> {
    let result = driver.query(sql).unwrap();
    assert!(result.is_success(), "{:?}", result.error);
    result.executed.into_iter().map(|statement| statement.sql).collect()
}

#[test]
fn test_select_is_translated_and_wrapped() {
    let mut driver = driver();
    let sql = executed(&mut driver, "SELECT `ID`, post_title FROM wp_posts WHERE post_status = 'publish' LIMIT 5");
    assert_eq!(
        sql,
        vec![r#"SELECT "ID", "post_title" FROM "wp_posts" WHERE "post_status" = 'publish' LIMIT 5"#]
    );
    assert_eq!(driver.storage().statements().first(), Some(&"BEGIN"));
    assert_eq!(driver.storage().statements().last(), Some(&"COMMIT"));
}

#[test]
fn test_insert_reports_changes_and_id() {
    let mut driver = driver();
    let result = driver
        .query("INSERT INTO wp_options (option_name, option_value) VALUES ('home', 'x'), ('siteurl', 'y')")
        .unwrap();
    assert_eq!(result.query_type, Some(QueryType::Insert));
    assert_eq!(result.table_name.as_deref(), Some("wp_options"));
    assert_eq!(result.return_value, ReturnValue::AffectedRows(2));
    assert_eq!(result.last_insert_id, Some(7));
    let sql: Vec<&str> = result.executed.iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(
        sql,
        vec![
            r#"INSERT INTO "wp_options" ("option_name", "option_value") VALUES ('home', 'x'), ('siteurl', 'y')"#,
            "SELECT changes()",
            "SELECT last_insert_rowid()",
        ]
    );
}

#[test]
fn test_limited_update_uses_rowid_subquery() {
    let mut driver = driver();
    let sql = executed(&mut driver, "UPDATE t SET c=1 ORDER BY c LIMIT 1");
    assert_eq!(
        sql,
        vec![
            r#"UPDATE "t" SET "c" = 1 WHERE rowid IN (SELECT rowid FROM "t" ORDER BY "c" ASC LIMIT 1)"#,
            "SELECT changes()",
        ]
    );
}

#[test]
fn test_create_table_writes_catalog() {
    let mut driver = driver();
    let result = driver
        .query("CREATE TABLE wp_terms (term_id bigint(20) unsigned NOT NULL auto_increment, name varchar(200) NOT NULL default '', PRIMARY KEY (term_id), KEY name (name(191))) ENGINE=InnoDB")
        .unwrap();
    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.return_value, ReturnValue::AffectedRows(0));

    let sql: Vec<&str> = result.executed.iter().map(|s| s.sql.as_str()).collect();
    assert_eq!(
        sql[0],
        r#"CREATE TABLE "wp_terms" ("term_id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, "name" TEXT NOT NULL DEFAULT '')"#
    );
    assert_eq!(sql[1], r#"CREATE INDEX "wp_terms__name" ON "wp_terms" ("name")"#);
    assert!(sql.iter().any(|s| s.starts_with("INSERT INTO _mysql_information_schema_tables")));
    assert_eq!(
        sql.iter()
            .filter(|s| s.starts_with("INSERT INTO _mysql_information_schema_columns"))
            .count(),
        2
    );

    let table_row = result
        .executed
        .iter()
        .find(|s| s.sql.starts_with("INSERT INTO _mysql_information_schema_tables"))
        .unwrap();
    assert!(table_row.params.contains(&SqlValue::from("wp_terms")));
    assert!(table_row.params.contains(&SqlValue::from("InnoDB")));
}

#[test]
fn test_alter_table_runs_each_action() {
    let mut driver = driver();
    let result = driver.query("ALTER TABLE t ADD a INT, ADD b TEXT, DROP c").unwrap();
    assert!(result.is_success(), "{:?}", result.error);
    let alters: Vec<&str> = result
        .executed
        .iter()
        .map(|s| s.sql.as_str())
        .filter(|sql| sql.starts_with("ALTER TABLE"))
        .collect();
    assert_eq!(
        alters,
        vec![
            r#"ALTER TABLE "t" ADD COLUMN "a" INTEGER"#,
            r#"ALTER TABLE "t" ADD COLUMN "b" TEXT"#,
            r#"ALTER TABLE "t" DROP COLUMN "c""#,
        ]
    );
}

#[test]
fn test_unsupported_type_executes_nothing() {
    let mut driver = driver();
    let result = driver.query("CREATE TABLE t (doc JSON)").unwrap();
    assert!(!result.is_success());
    assert_eq!(result.return_value, ReturnValue::Bool(false));
    assert!(result.executed.is_empty());
    assert_eq!(driver.storage().statements(), vec!["BEGIN", "ROLLBACK"]);
    assert_eq!(driver.transaction_level(), 0);
}

#[test]
fn test_set_executes_nothing() {
    let mut driver = driver();
    let result = driver.query("SET NAMES utf8mb4").unwrap();
    assert_eq!(result.query_type, Some(QueryType::Set));
    assert!(result.executed.is_empty());
    assert_eq!(result.return_value, ReturnValue::AffectedRows(0));
}

#[test]
fn test_explicit_transactions_nest() {
    let mut driver = driver();
    assert_eq!(driver.query("START TRANSACTION").unwrap().return_value, ReturnValue::Bool(true));
    driver.query("DELETE FROM t WHERE a = 1").unwrap();
    assert_eq!(driver.query("rollback").unwrap().return_value, ReturnValue::Bool(true));
    assert_eq!(driver.query("COMMIT").unwrap().return_value, ReturnValue::Bool(false));

    assert_eq!(
        driver.storage().statements(),
        vec![
            "BEGIN",
            "SAVEPOINT LEVEL1",
            r#"DELETE FROM "t" WHERE "a" = 1"#,
            "SELECT changes()",
            "RELEASE SAVEPOINT LEVEL1",
            "ROLLBACK",
        ]
    );
}

#[test]
fn test_parse_errors_are_reported() {
    let mut driver = driver();
    let result = driver.query("SELEKT 1").unwrap();
    let error = result.error.unwrap();
    assert!(error.contains("MySQL query:\nSELEKT 1"), "{}", error);

    let mut debug = Driver::new(
        Recording::default(),
        Config {
            debug: true,
            ..Config::default()
        },
    )
    .unwrap();
    assert!(debug.query("SELEKT 1").is_err());
}

#[test]
fn test_translation_is_deterministic() {
    let statements = [
        "SELECT `ID`, post_title FROM wp_posts WHERE post_status = 'publish' ORDER BY post_date DESC LIMIT 5",
        "INSERT INTO wp_options (option_name, option_value) VALUES ('home', 'x') ON DUPLICATE KEY UPDATE option_value = VALUES(option_value)",
        "UPDATE t SET c = c + 1 ORDER BY c LIMIT 2",
        "DELETE FROM t WHERE a = 1",
        "CREATE TABLE wp_terms (term_id bigint(20) unsigned NOT NULL auto_increment, slug varchar(200) NOT NULL default '', PRIMARY KEY (term_id), KEY slug (slug(191)))",
        "ALTER TABLE t ADD a INT, ADD INDEX ka (a), RENAME TO u",
        "DROP TABLE wp_terms, u",
    ];
    let mut driver = driver();
    for sql in statements {
        let first = driver.query(sql).unwrap();
        let second = driver.query(sql).unwrap();
        assert!(first.is_success(), "{:?}", first.error);
        assert_eq!(first.executed, second.executed, "{}", sql);
    }
}
