//! End-to-end runs against a real SQLite database.

use mysqlite::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn driver() -> Driver {
    Driver::open(Config::default()).unwrap()
}

fn run(driver: &mut Driver, sql: &str) -> QueryResult {
    let result = driver.query(sql).unwrap();
    assert!(result.is_success(), "{}", result.error.unwrap_or_default());
    result
}

fn rows(driver: &mut Driver, sql: &str) -> Vec<Value> {
    run(driver, sql).rows().to_vec()
}

fn seed(driver: &mut Driver) {
    run(driver, "CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, c INT NOT NULL)");
    run(driver, "INSERT INTO t (c) VALUES (3), (1), (2), (5), (4)");
}

#[test]
fn test_insert_and_select() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE wp_options (option_id bigint(20) unsigned NOT NULL auto_increment, option_name varchar(191) NOT NULL default '', option_value longtext NOT NULL, PRIMARY KEY (option_id), UNIQUE KEY option_name (option_name))");

    let inserted = run(&mut driver, "INSERT INTO wp_options (option_name, option_value) VALUES ('home', 'http://localhost'), ('blogname', 'It''s mine')");
    assert_eq!(inserted.affected_rows(), Some(2));
    assert_eq!(inserted.last_insert_id, Some(2));

    let ignored = run(&mut driver, "INSERT IGNORE INTO wp_options (option_name, option_value) VALUES ('home', 'other')");
    assert_eq!(ignored.affected_rows(), Some(0));

    assert_eq!(
        rows(&mut driver, "SELECT option_name AS name, option_value AS val FROM `wp_options` ORDER BY option_id"),
        vec![
            json!({"name": "home", "val": "http://localhost"}),
            json!({"name": "blogname", "val": "It's mine"}),
        ]
    );
}

#[test]
fn test_limited_update_matches_mysql() {
    let mut driver = driver();
    seed(&mut driver);

    let updated = run(&mut driver, "UPDATE t SET c = 10 ORDER BY c LIMIT 2");
    assert_eq!(updated.affected_rows(), Some(2));
    assert_eq!(
        rows(&mut driver, "SELECT c FROM t ORDER BY id"),
        vec![json!({"c": 3}), json!({"c": 10}), json!({"c": 10}), json!({"c": 5}), json!({"c": 4})]
    );
}

#[test]
fn test_limited_delete_matches_mysql() {
    let mut driver = driver();
    seed(&mut driver);

    let deleted = run(&mut driver, "DELETE FROM t WHERE c > 1 ORDER BY c DESC LIMIT 2");
    assert_eq!(deleted.affected_rows(), Some(2));
    assert_eq!(
        rows(&mut driver, "SELECT c FROM t ORDER BY c"),
        vec![json!({"c": 1}), json!({"c": 2}), json!({"c": 3})]
    );
}

#[test]
fn test_catalog_follows_create_table() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE wp_terms (
        term_id bigint(20) unsigned NOT NULL auto_increment,
        name varchar(200) NOT NULL default '',
        slug varchar(200) NOT NULL default '',
        term_group bigint(10) NOT NULL default 0,
        PRIMARY KEY  (term_id),
        KEY slug (slug(191)),
        KEY name (name(191))
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_520_ci");

    assert_eq!(
        rows(&mut driver, "SELECT engine AS eng, table_collation AS coll FROM _mysql_information_schema_tables WHERE table_name = 'wp_terms'"),
        vec![json!({"eng": "InnoDB", "coll": "utf8mb4_unicode_520_ci"})]
    );
    assert_eq!(
        rows(&mut driver, "SELECT column_name AS name, ordinal_position AS position, column_key AS k FROM _mysql_information_schema_columns WHERE table_name = 'wp_terms' ORDER BY ordinal_position"),
        vec![
            json!({"name": "term_id", "position": 1, "k": "PRI"}),
            json!({"name": "name", "position": 2, "k": "MUL"}),
            json!({"name": "slug", "position": 3, "k": "MUL"}),
            json!({"name": "term_group", "position": 4, "k": ""}),
        ]
    );
    assert_eq!(
        rows(&mut driver, "SELECT index_name AS idx, column_name AS col, sub_part AS part FROM _mysql_information_schema_statistics WHERE table_name = 'wp_terms' ORDER BY index_name, seq_in_index"),
        vec![
            json!({"idx": "PRIMARY", "col": "term_id", "part": null}),
            json!({"idx": "name", "col": "name", "part": 191}),
            json!({"idx": "slug", "col": "slug", "part": 191}),
        ]
    );
    assert_eq!(
        rows(&mut driver, "SELECT name AS name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'wp_terms' AND name LIKE 'wp_terms__%' ORDER BY name"),
        vec![json!({"name": "wp_terms__name"}), json!({"name": "wp_terms__slug"})]
    );
}

#[test]
fn test_create_table_if_not_exists() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE IF NOT EXISTS t (a INT)");
    let again = run(&mut driver, "CREATE TABLE IF NOT EXISTS t (a INT, b INT)");
    assert_eq!(again.executed.len(), 1);
    assert_eq!(
        rows(&mut driver, "SELECT COUNT(*) AS n FROM _mysql_information_schema_columns WHERE table_name = 't'"),
        vec![json!({"n": 1})]
    );
}

#[test]
fn test_alter_table_keeps_catalog_in_step() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE t (id INT, c INT)");

    let altered = run(&mut driver, "ALTER TABLE t ADD a INT, ADD b TEXT, DROP c");
    let alters: Vec<&str> = altered
        .executed
        .iter()
        .map(|statement| statement.sql.as_str())
        .filter(|sql| sql.starts_with("ALTER TABLE"))
        .collect();
    assert_eq!(alters.len(), 3);

    assert_eq!(
        rows(&mut driver, "SELECT column_name AS name, ordinal_position AS position FROM _mysql_information_schema_columns WHERE table_name = 't' ORDER BY ordinal_position"),
        vec![
            json!({"name": "id", "position": 1}),
            json!({"name": "a", "position": 2}),
            json!({"name": "b", "position": 3}),
        ]
    );

    run(&mut driver, "ALTER TABLE t ADD INDEX ab (a, b), RENAME TO u");
    assert_eq!(
        rows(&mut driver, "SELECT table_name AS t, index_name AS i, column_name AS c FROM _mysql_information_schema_statistics ORDER BY seq_in_index"),
        vec![
            json!({"t": "u", "i": "ab", "c": "a"}),
            json!({"t": "u", "i": "ab", "c": "b"}),
        ]
    );
    run(&mut driver, "INSERT INTO u (id, a, b) VALUES (1, 2, 'x')");
}

#[test]
fn test_drop_table_clears_catalog() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE t (id INT PRIMARY KEY, k VARCHAR(10), KEY k (k))");
    run(&mut driver, "DROP TABLE t");
    for catalog in [
        "_mysql_information_schema_tables",
        "_mysql_information_schema_columns",
        "_mysql_information_schema_statistics",
        "_mysql_data_types_cache",
    ] {
        let sql = format!("SELECT COUNT(*) AS n FROM {}", catalog);
        assert_eq!(rows(&mut driver, &sql), vec![json!({"n": 0})], "{}", catalog);
    }
}

#[test]
fn test_failed_statement_is_all_or_nothing() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE a (id INT)");

    let result = driver.query("DROP TABLE a, missing").unwrap();
    assert!(!result.is_success());
    assert_eq!(result.return_value, ReturnValue::Bool(false));
    assert_eq!(driver.transaction_level(), 0);

    assert_eq!(
        rows(&mut driver, "SELECT COUNT(*) AS n FROM sqlite_master WHERE name = 'a'"),
        vec![json!({"n": 1})]
    );
    assert_eq!(
        rows(&mut driver, "SELECT COUNT(*) AS n FROM _mysql_information_schema_tables WHERE table_name = 'a'"),
        vec![json!({"n": 1})]
    );
}

#[test]
fn test_unsupported_type_creates_nothing() {
    let mut driver = driver();
    let result = driver.query("CREATE TABLE t (doc JSON)").unwrap();
    assert!(!result.is_success());
    assert!(result.executed.is_empty());
    assert_eq!(
        rows(&mut driver, "SELECT COUNT(*) AS n FROM sqlite_master WHERE name = 't'"),
        vec![json!({"n": 0})]
    );
}

#[test]
fn test_transactions() {
    let mut driver = driver();
    seed(&mut driver);

    run(&mut driver, "START TRANSACTION");
    run(&mut driver, "DELETE FROM t");
    run(&mut driver, "BEGIN");
    run(&mut driver, "INSERT INTO t (c) VALUES (9)");
    assert_eq!(driver.transaction_level(), 2);
    run(&mut driver, "ROLLBACK");
    assert_eq!(rows(&mut driver, "SELECT COUNT(*) AS n FROM t"), vec![json!({"n": 0})]);
    run(&mut driver, "ROLLBACK");
    assert_eq!(driver.transaction_level(), 0);
    assert_eq!(rows(&mut driver, "SELECT COUNT(*) AS n FROM t"), vec![json!({"n": 5})]);

    run(&mut driver, "START TRANSACTION");
    run(&mut driver, "DELETE FROM t WHERE c = 1");
    run(&mut driver, "COMMIT");
    assert_eq!(rows(&mut driver, "SELECT COUNT(*) AS n FROM t"), vec![json!({"n": 4})]);
}

#[test]
fn test_session_variables_read_as_null() {
    let mut driver = driver();
    let rows = rows(&mut driver, "SELECT @@sql_mode AS mode");
    assert_eq!(rows, vec![json!({"mode": null})]);
}

#[test]
fn test_numeric_fetch_mode() {
    let config = Config {
        fetch_mode: FetchMode::Num,
        ..Config::default()
    };
    let mut driver = Driver::open(config).unwrap();
    seed(&mut driver);
    assert_eq!(
        rows(&mut driver, "SELECT id, c FROM t WHERE c >= 4 ORDER BY c"),
        vec![json!([5, 4]), json!([4, 5])]
    );
}

#[test]
fn test_file_database_is_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.sqlite");
    let mut config = Config::default();
    config.database.path = path.to_string_lossy().into_owned();
    config.database.journal_mode = Some("wal".to_string());

    {
        let mut driver = Driver::open(config.clone()).unwrap();
        seed(&mut driver);
    }

    let mut driver = Driver::open(config).unwrap();
    assert_eq!(rows(&mut driver, "SELECT COUNT(*) AS n FROM t"), vec![json!({"n": 5})]);
    assert_eq!(
        rows(&mut driver, "SELECT COUNT(*) AS n FROM _mysql_information_schema_tables"),
        vec![json!({"n": 1})]
    );
}

#[test]
fn test_column_type_survives_index_of_same_name() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE wp_postmeta (meta_id bigint(20) unsigned NOT NULL auto_increment, post_id bigint(20) unsigned NOT NULL default '0', PRIMARY KEY (meta_id), KEY post_id (post_id))");
    run(&mut driver, "ALTER TABLE wp_postmeta DROP INDEX post_id");
    assert_eq!(
        rows(&mut driver, "SELECT mysql_type AS t FROM _mysql_data_types_cache WHERE column_or_index = 'post_id'"),
        vec![json!({"t": "bigint(20) unsigned"})]
    );
}

#[test]
fn test_rename_table_moves_indexes() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE t (a INT, b INT, KEY k (a), UNIQUE KEY ub (b))");
    run(&mut driver, "ALTER TABLE t RENAME TO u");
    assert_eq!(
        rows(&mut driver, "SELECT name AS name FROM sqlite_master WHERE type = 'index' AND sql IS NOT NULL ORDER BY name"),
        vec![json!({"name": "u__k"}), json!({"name": "u__ub"})]
    );

    run(&mut driver, "INSERT INTO u (a, b) VALUES (1, 1)");
    let duplicate = driver.query("INSERT INTO u (a, b) VALUES (2, 1)").unwrap();
    assert!(!duplicate.is_success());

    run(&mut driver, "ALTER TABLE u DROP INDEX k");
    run(&mut driver, "CREATE TABLE t (a INT, KEY k (a))");
    assert_eq!(
        rows(&mut driver, "SELECT name AS name FROM sqlite_master WHERE type = 'index' AND sql IS NOT NULL ORDER BY name"),
        vec![json!({"name": "t__k"}), json!({"name": "u__ub"})]
    );
}

#[test]
fn test_added_column_follows_table_charset() {
    let mut driver = driver();
    run(&mut driver, "CREATE TABLE t (id INT) DEFAULT CHARSET=latin1");
    run(&mut driver, "ALTER TABLE t ADD c VARCHAR(10)");
    assert_eq!(
        rows(&mut driver, "SELECT collation_name AS coll, character_octet_length AS octets FROM _mysql_information_schema_columns WHERE column_name = 'c'"),
        vec![json!({"coll": "latin1_general_ci", "octets": 10})]
    );
}

#[test]
fn test_substrings_match_mysql_at_edges() {
    let mut driver = driver();
    assert_eq!(
        rows(&mut driver, "SELECT RIGHT('abc', 0) AS r0, RIGHT('abc', -1) AS rn, RIGHT('abc', 2) AS r2, SUBSTRING('abc', 0) AS s0, SUBSTRING('abc', 2) AS s2, SUBSTRING('abc', 0, 2) AS s02, SUBSTRING('abc', 2, -1) AS sn, MID('abc', -2) AS m"),
        vec![json!({"r0": "", "rn": "", "r2": "bc", "s0": "", "s2": "bc", "s02": "", "sn": "", "m": "bc"})]
    );
}
