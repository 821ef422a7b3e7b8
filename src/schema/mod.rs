//! Emulated MySQL `information_schema`.
//!
//! SQLite keeps no record of MySQL-only metadata such as engines, charsets
//! or the original column types, so every successful DDL statement is
//! mirrored into catalog tables under the `_mysql_information_schema_`
//! prefix. The [`SchemaBuilder`] derives the rows from the parse tree and
//! hands each statement to a caller-supplied query callback; it never
//! touches storage itself.

mod column;
mod index;

pub use column::{ColumnInfo, ColumnKey, TableContext, bytes_per_char, data_type_name};
pub use index::{IndexDefinition, IndexKind, KeyPart};

use crate::ast::Node;
use crate::engine::SqlValue;
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule};
use crate::transpiler::last_identifier;

/// Prefix reserved for catalog tables.
pub const CATALOG_PREFIX: &str = "_mysql_information_schema_";
pub const TABLES_TABLE: &str = "_mysql_information_schema_tables";
pub const COLUMNS_TABLE: &str = "_mysql_information_schema_columns";
pub const STATISTICS_TABLE: &str = "_mysql_information_schema_statistics";
/// Original MySQL column types, keyed by table. Indexes are not cached:
/// they share a namespace with columns and would shadow them.
pub const DATA_TYPES_CACHE_TABLE: &str = "_mysql_data_types_cache";

const CREATE_CATALOG: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS _mysql_information_schema_tables (
        TABLE_CATALOG TEXT NOT NULL DEFAULT 'def',
        TABLE_SCHEMA TEXT NOT NULL,
        TABLE_NAME TEXT NOT NULL,
        TABLE_TYPE TEXT NOT NULL,
        ENGINE TEXT NOT NULL,
        VERSION INTEGER NOT NULL DEFAULT 10,
        ROW_FORMAT TEXT NOT NULL,
        TABLE_ROWS INTEGER NOT NULL DEFAULT 0,
        AVG_ROW_LENGTH INTEGER NOT NULL DEFAULT 0,
        DATA_LENGTH INTEGER NOT NULL DEFAULT 0,
        MAX_DATA_LENGTH INTEGER NOT NULL DEFAULT 0,
        INDEX_LENGTH INTEGER NOT NULL DEFAULT 0,
        DATA_FREE INTEGER NOT NULL DEFAULT 0,
        AUTO_INCREMENT INTEGER,
        CREATE_TIME TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UPDATE_TIME TEXT,
        CHECK_TIME TEXT,
        TABLE_COLLATION TEXT NOT NULL,
        CHECKSUM INTEGER,
        CREATE_OPTIONS TEXT,
        TABLE_COMMENT TEXT NOT NULL DEFAULT ''
    ) STRICT",
    "CREATE TABLE IF NOT EXISTS _mysql_information_schema_columns (
        TABLE_CATALOG TEXT NOT NULL DEFAULT 'def',
        TABLE_SCHEMA TEXT NOT NULL,
        TABLE_NAME TEXT NOT NULL,
        COLUMN_NAME TEXT NOT NULL,
        ORDINAL_POSITION INTEGER NOT NULL,
        COLUMN_DEFAULT TEXT,
        IS_NULLABLE TEXT NOT NULL,
        DATA_TYPE TEXT NOT NULL,
        CHARACTER_MAXIMUM_LENGTH INTEGER,
        CHARACTER_OCTET_LENGTH INTEGER,
        NUMERIC_PRECISION INTEGER,
        NUMERIC_SCALE INTEGER,
        DATETIME_PRECISION INTEGER,
        CHARACTER_SET_NAME TEXT,
        COLLATION_NAME TEXT,
        COLUMN_TYPE TEXT NOT NULL,
        COLUMN_KEY TEXT NOT NULL DEFAULT '',
        EXTRA TEXT NOT NULL DEFAULT '',
        PRIVILEGES TEXT NOT NULL,
        COLUMN_COMMENT TEXT NOT NULL DEFAULT '',
        GENERATION_EXPRESSION TEXT NOT NULL DEFAULT '',
        SRS_ID INTEGER
    ) STRICT",
    "CREATE TABLE IF NOT EXISTS _mysql_information_schema_statistics (
        TABLE_CATALOG TEXT NOT NULL DEFAULT 'def',
        TABLE_SCHEMA TEXT NOT NULL,
        TABLE_NAME TEXT NOT NULL,
        NON_UNIQUE INTEGER NOT NULL,
        INDEX_SCHEMA TEXT NOT NULL,
        INDEX_NAME TEXT NOT NULL,
        SEQ_IN_INDEX INTEGER NOT NULL,
        COLUMN_NAME TEXT,
        COLLATION TEXT,
        CARDINALITY INTEGER,
        SUB_PART INTEGER,
        PACKED TEXT,
        NULLABLE TEXT NOT NULL,
        INDEX_TYPE TEXT NOT NULL,
        COMMENT TEXT NOT NULL DEFAULT '',
        INDEX_COMMENT TEXT NOT NULL DEFAULT '',
        IS_VISIBLE TEXT NOT NULL DEFAULT 'YES',
        EXPRESSION TEXT
    ) STRICT",
    "CREATE TABLE IF NOT EXISTS _mysql_data_types_cache (
        \"table\" TEXT NOT NULL,
        column_or_index TEXT NOT NULL,
        mysql_type TEXT NOT NULL,
        PRIMARY KEY(\"table\", column_or_index)
    ) STRICT",
];

const CACHE_INSERT: &str =
    "INSERT OR REPLACE INTO _mysql_data_types_cache (\"table\", column_or_index, mysql_type) VALUES (?, ?, ?)";

const NEXT_ORDINAL: &str = "(SELECT COALESCE(MAX(ordinal_position), 0) + 1 \
     FROM _mysql_information_schema_columns WHERE table_schema = ? AND table_name = ?)";

const INSERT_INDEX_PART: &str = "INSERT INTO _mysql_information_schema_statistics \
     (table_schema, table_name, non_unique, index_schema, index_name, seq_in_index, column_name, \
     collation, cardinality, sub_part, packed, nullable, index_type, comment, index_comment, \
     is_visible, expression) \
     SELECT c.table_schema, c.table_name, ?, c.table_schema, ?, ?, c.column_name, \
     CASE WHEN t.index_type = 'FULLTEXT' THEN NULL WHEN ? THEN 'D' ELSE 'A' END, \
     0, \
     CASE WHEN ? IS NOT NULL THEN MIN(?, COALESCE(c.character_maximum_length, ?)) \
     WHEN t.index_type = 'SPATIAL' THEN 32 END, \
     NULL, \
     CASE WHEN c.is_nullable = 'YES' THEN 'YES' ELSE '' END, \
     t.index_type, '', ?, 'YES', NULL \
     FROM _mysql_information_schema_columns AS c, \
     (SELECT COALESCE(?, CASE WHEN (SELECT data_type FROM _mysql_information_schema_columns \
     WHERE table_schema = ? AND table_name = ? AND column_name = ?) \
     IN ('geometry', 'geometrycollection', 'point', 'multipoint', 'linestring', \
     'multilinestring', 'polygon', 'multipolygon') THEN 'SPATIAL' ELSE 'BTREE' END) AS index_type) AS t \
     WHERE c.table_schema = ? AND c.table_name = ? AND c.column_name = ?";

const PROMOTE_COLUMN_KEY: &str = "UPDATE _mysql_information_schema_columns SET column_key = \
     CASE WHEN column_key = 'PRI' OR ? = 'PRI' THEN 'PRI' \
     WHEN column_key = 'UNI' OR ? = 'UNI' THEN 'UNI' \
     ELSE 'MUL' END \
     WHERE table_schema = ? AND table_name = ? AND column_name = ?";

/// Keys of the columns an index led, recomputed from the remaining
/// indexes. Primary key columns keep `PRI`.
const RECOMPUTE_COLUMN_KEYS: &str = "UPDATE _mysql_information_schema_columns SET column_key = (\
     SELECT CASE WHEN COUNT(*) = 0 THEN '' \
     WHEN MAX(s.index_name = 'PRIMARY') = 1 THEN 'PRI' \
     WHEN MIN(s.non_unique) = 0 THEN 'UNI' \
     ELSE 'MUL' END \
     FROM _mysql_information_schema_statistics AS s \
     WHERE s.table_schema = _mysql_information_schema_columns.table_schema \
     AND s.table_name = _mysql_information_schema_columns.table_name \
     AND s.column_name = _mysql_information_schema_columns.column_name \
     AND s.seq_in_index = 1 AND s.index_name <> ?) \
     WHERE table_schema = ? AND table_name = ? AND column_key <> 'PRI' \
     AND column_name IN (SELECT column_name FROM _mysql_information_schema_statistics \
     WHERE table_schema = ? AND table_name = ? AND index_name = ? AND seq_in_index = 1)";

/// Close the `seq_in_index` gap a dropped column leaves in each index
/// it belonged to.
const RENUMBER_INDEX_PARTS: &str = "UPDATE _mysql_information_schema_statistics \
     SET seq_in_index = seq_in_index - 1 \
     WHERE table_schema = ? AND table_name = ? AND seq_in_index > (\
     SELECT s.seq_in_index FROM _mysql_information_schema_statistics AS s \
     WHERE s.table_schema = _mysql_information_schema_statistics.table_schema \
     AND s.table_name = _mysql_information_schema_statistics.table_name \
     AND s.index_name = _mysql_information_schema_statistics.index_name \
     AND s.column_name = ?)";

/// Writes catalog rows through a query callback.
pub struct SchemaBuilder<'a, F> {
    database_name: &'a str,
    query: F,
}

impl<'a, F> SchemaBuilder<'a, F>
where
    F: FnMut(&str, &[SqlValue]) -> Result<()>,
{
    /// `database_name` is reported as `TABLE_SCHEMA`.
    pub fn new(database_name: &'a str, query: F) -> Self {
        Self {
            database_name,
            query,
        }
    }

    /// Create the catalog tables when missing.
    pub fn ensure_tables(&mut self) -> Result<()> {
        for statement in CREATE_CATALOG {
            self.execute(statement, &[])?;
        }
        Ok(())
    }

    /// Record a `createTable` node. Temporary tables and `CREATE TABLE ... AS`
    /// without column definitions are not recorded.
    pub fn create_table(&mut self, create_table: &Node) -> Result<()> {
        if create_table.has_keyword(Keyword::Temporary) {
            return Ok(());
        }
        let Some(elements) = create_table.child_node(Rule::TableElementList) else {
            return Ok(());
        };
        let table = create_table
            .child_node(Rule::TableName)
            .and_then(last_identifier)
            .ok_or_else(|| Error::unsupported("CREATE TABLE without a name"))?;
        let context = TableContext::from_create_table(create_table);
        let schema = self.database_name;

        let engine = table_engine(create_table);
        let row_format = if engine == "MyISAM" { "FIXED" } else { "DYNAMIC" };
        let mut table_row: Vec<(&str, SqlValue)> = vec![
            ("table_schema", schema.into()),
            ("table_name", table.as_str().into()),
            ("table_type", "BASE TABLE".into()),
            ("engine", engine.as_str().into()),
            ("row_format", row_format.into()),
            ("table_collation", context.table_collation().into()),
        ];
        if let Some(auto_increment) = table_option(create_table, Keyword::AutoIncrement) {
            table_row.push(("auto_increment", auto_increment.parse::<i64>().ok().into()));
        }
        if let Some(comment) = table_option(create_table, Keyword::Comment) {
            table_row.push(("table_comment", comment.into()));
        }
        self.insert(TABLES_TABLE, &table_row)?;

        let mut columns = Vec::new();
        for definition in elements
            .child_nodes(Rule::TableElement)
            .filter_map(|element| element.child_node(Rule::ColumnDefinition))
        {
            let info = ColumnInfo::from_definition(definition, &context)?;
            let position = columns.len() as i64 + 1;
            self.insert(COLUMNS_TABLE, &info.row(schema, &table, position))?;
            columns.push(info);
        }

        let indexes = IndexDefinition::from_table_elements(elements);
        for index in &indexes {
            let rows = index.rows(schema, &table, |name| {
                columns.iter().find(|column| column.name.eq_ignore_ascii_case(name))
            });
            for row in rows {
                self.insert(STATISTICS_TABLE, &row)?;
            }
        }

        for column in &columns {
            self.cache(&table, &column.name, &column.column_type)?;
        }
        Ok(())
    }

    /// Append a column after the existing ones. `context` carries the
    /// table's default charset and collation.
    pub fn add_column(&mut self, table: &str, definition: &Node, context: &TableContext) -> Result<()> {
        let info = ColumnInfo::from_definition(definition, context)?;
        let schema = self.database_name;

        let mut names = Vec::new();
        let mut placeholders = Vec::new();
        let mut params = Vec::new();
        for (name, value) in info.row(schema, table, 0) {
            names.push(name);
            if name == "ordinal_position" {
                placeholders.push(NEXT_ORDINAL);
                params.push(schema.into());
                params.push(table.into());
            } else {
                placeholders.push("?");
                params.push(value);
            }
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            COLUMNS_TABLE,
            names.join(", "),
            placeholders.join(", ")
        );
        self.execute(&sql, &params)?;
        self.cache(table, &info.name, &info.column_type)
    }

    /// Remove a column and its index parts, closing the ordinal and
    /// `seq_in_index` gaps.
    pub fn drop_column(&mut self, table: &str, column: &str) -> Result<()> {
        let schema: SqlValue = self.database_name.into();
        let table_value: SqlValue = table.into();
        let column_value: SqlValue = column.into();

        self.execute(
            "UPDATE _mysql_information_schema_columns SET ordinal_position = ordinal_position - 1 \
             WHERE table_schema = ? AND table_name = ? AND ordinal_position > (\
             SELECT ordinal_position FROM _mysql_information_schema_columns \
             WHERE table_schema = ? AND table_name = ? AND column_name = ?)",
            &[
                schema.clone(),
                table_value.clone(),
                schema.clone(),
                table_value.clone(),
                column_value.clone(),
            ],
        )?;
        self.execute(
            RENUMBER_INDEX_PARTS,
            &[schema.clone(), table_value.clone(), column_value.clone()],
        )?;
        for catalog in [COLUMNS_TABLE, STATISTICS_TABLE] {
            self.execute(
                &format!(
                    "DELETE FROM {} WHERE table_schema = ? AND table_name = ? AND column_name = ?",
                    catalog
                ),
                &[schema.clone(), table_value.clone(), column_value.clone()],
            )?;
        }
        self.uncache(table, column)
    }

    /// Record an index added to an existing table.
    pub fn add_index(&mut self, table: &str, index: &IndexDefinition<'_>) -> Result<()> {
        let schema = self.database_name;
        let leading = index
            .parts
            .first()
            .map(|part| part.column.as_str())
            .ok_or_else(|| Error::unsupported("index without key parts"))?;
        let non_unique = i64::from(!index.is_unique());

        for (position, part) in index.parts.iter().enumerate() {
            let length: SqlValue = part.length.into();
            self.execute(
                INSERT_INDEX_PART,
                &[
                    non_unique.into(),
                    index.name.as_str().into(),
                    (position as i64 + 1).into(),
                    part.descending.into(),
                    length.clone(),
                    length.clone(),
                    length,
                    index.comment.as_str().into(),
                    index.explicit_index_type().into(),
                    schema.into(),
                    table.into(),
                    leading.into(),
                    schema.into(),
                    table.into(),
                    part.column.as_str().into(),
                ],
            )?;
        }

        let key = match index.kind {
            IndexKind::Primary => ColumnKey::Primary,
            IndexKind::Unique => ColumnKey::Unique,
            _ => ColumnKey::Multiple,
        };
        let promoted = if key == ColumnKey::Primary { index.parts.len() } else { 1 };
        for part in index.parts.iter().take(promoted) {
            self.execute(
                PROMOTE_COLUMN_KEY,
                &[
                    key.as_str().into(),
                    key.as_str().into(),
                    schema.into(),
                    table.into(),
                    part.column.as_str().into(),
                ],
            )?;
        }
        Ok(())
    }

    /// Remove an index and recompute the keys of the columns it led.
    pub fn drop_index(&mut self, table: &str, index: &str) -> Result<()> {
        let schema: SqlValue = self.database_name.into();
        let table_value: SqlValue = table.into();
        let index_value: SqlValue = index.into();

        self.execute(
            RECOMPUTE_COLUMN_KEYS,
            &[
                index_value.clone(),
                schema.clone(),
                table_value.clone(),
                schema.clone(),
                table_value.clone(),
                index_value.clone(),
            ],
        )?;
        self.execute(
            "DELETE FROM _mysql_information_schema_statistics \
             WHERE table_schema = ? AND table_name = ? AND index_name = ?",
            &[schema, table_value, index_value],
        )
    }

    pub fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
        for catalog in [TABLES_TABLE, COLUMNS_TABLE, STATISTICS_TABLE] {
            self.execute(
                &format!(
                    "UPDATE {} SET table_name = ? WHERE table_schema = ? AND table_name = ?",
                    catalog
                ),
                &[to.into(), self.database_name.into(), from.into()],
            )?;
        }
        self.execute(
            "UPDATE _mysql_data_types_cache SET \"table\" = ? WHERE \"table\" = ?",
            &[to.into(), from.into()],
        )
    }

    pub fn rename_column(&mut self, table: &str, from: &str, to: &str) -> Result<()> {
        for catalog in [COLUMNS_TABLE, STATISTICS_TABLE] {
            self.execute(
                &format!(
                    "UPDATE {} SET column_name = ? \
                     WHERE table_schema = ? AND table_name = ? AND column_name = ?",
                    catalog
                ),
                &[to.into(), self.database_name.into(), table.into(), from.into()],
            )?;
        }
        self.execute(
            "UPDATE _mysql_data_types_cache SET column_or_index = ? \
             WHERE \"table\" = ? AND column_or_index = ?",
            &[to.into(), table.into(), from.into()],
        )
    }

    /// Forget every catalog row of a table.
    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        for catalog in [TABLES_TABLE, COLUMNS_TABLE, STATISTICS_TABLE] {
            self.execute(
                &format!("DELETE FROM {} WHERE table_schema = ? AND table_name = ?", catalog),
                &[self.database_name.into(), table.into()],
            )?;
        }
        self.execute(
            "DELETE FROM _mysql_data_types_cache WHERE \"table\" = ?",
            &[table.into()],
        )
    }

    fn insert(&mut self, catalog: &str, row: &[(&str, SqlValue)]) -> Result<()> {
        let names: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        let params: Vec<SqlValue> = row.iter().map(|(_, value)| value.clone()).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            catalog,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        );
        self.execute(&sql, &params)
    }

    fn cache(&mut self, table: &str, column_or_index: &str, mysql_type: &str) -> Result<()> {
        self.execute(
            CACHE_INSERT,
            &[table.into(), column_or_index.into(), mysql_type.into()],
        )
    }

    fn uncache(&mut self, table: &str, column_or_index: &str) -> Result<()> {
        self.execute(
            "DELETE FROM _mysql_data_types_cache WHERE \"table\" = ? AND column_or_index = ?",
            &[table.into(), column_or_index.into()],
        )
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<()> {
        (self.query)(sql, params)
    }
}

/// `ENGINE`, with InnoDB and MyISAM in their canonical spelling.
fn table_engine(create_table: &Node) -> String {
    let engine = create_table
        .child_node(Rule::CreateTableOptions)
        .into_iter()
        .flat_map(|options| options.child_nodes(Rule::CreateTableOption))
        .find_map(|option| option.child_node(Rule::EngineRef))
        .map(Node::text);
    match engine {
        None => "InnoDB".to_string(),
        Some(engine) if engine.eq_ignore_ascii_case("innodb") => "InnoDB".to_string(),
        Some(engine) if engine.eq_ignore_ascii_case("myisam") => "MyISAM".to_string(),
        Some(engine) => engine,
    }
}

/// The value of a `KEYWORD [=] value` table option.
fn table_option(create_table: &Node, keyword: Keyword) -> Option<String> {
    let option = create_table
        .child_node(Rule::CreateTableOptions)?
        .child_nodes(Rule::CreateTableOption)
        .find(|option| option.has_keyword(keyword))?;
    match option.child_node(Rule::TextStringLiteral) {
        Some(text) => Some(text.text()),
        None => option
            .all_child_tokens()
            .find(|token| token.kind.is_number())
            .map(|token| token.value.clone()),
    }
}
