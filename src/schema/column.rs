//! Column metadata derived from a `columnDefinition` node.

use std::collections::HashMap;

use crate::ast::{Node, Token, TokenKind};
use crate::engine::SqlValue;
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule};
use crate::transpiler::identifier_text;

use super::index::{IndexDefinition, IndexKind};

pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_COLLATION: &str = "utf8mb4_general_ci";
const NATIONAL_CHARSET: &str = "utf8";
const PRIVILEGES: &str = "select,insert,update,references";

pub const SPATIAL_TYPES: &[&str] = &[
    "geometry",
    "geometrycollection",
    "point",
    "multipoint",
    "linestring",
    "multilinestring",
    "polygon",
    "multipolygon",
];

/// `COLUMN_KEY`, ordered by precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnKey {
    #[default]
    None,
    Multiple,
    Unique,
    Primary,
}

impl ColumnKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKey::None => "",
            ColumnKey::Multiple => "MUL",
            ColumnKey::Unique => "UNI",
            ColumnKey::Primary => "PRI",
        }
    }
}

/// Table-level facts a column row depends on.
#[derive(Debug, Clone, Default)]
pub struct TableContext {
    primary_key: Vec<String>,
    charset: Option<String>,
    collation: Option<String>,
    keys: HashMap<String, ColumnKey>,
}

impl TableContext {
    /// Collect standalone key constraints and default charset/collation
    /// from a `createTable` node.
    pub fn from_create_table(create_table: &Node) -> Self {
        let mut context = Self::default();

        if let Some(elements) = create_table.child_node(Rule::TableElementList) {
            for constraint in elements
                .child_nodes(Rule::TableElement)
                .filter_map(|element| element.child_node(Rule::TableConstraintDef))
            {
                context.add_constraint(constraint);
            }
        }

        for option in create_table
            .child_node(Rule::CreateTableOptions)
            .into_iter()
            .flat_map(|options| options.child_nodes(Rule::CreateTableOption))
        {
            if let Some(charset) = option.child_node(Rule::CharsetName) {
                context.charset = Some(charset.text().to_lowercase());
            }
            if let Some(collation) = option.child_node(Rule::CollationName) {
                context.collation = Some(collation.text().to_lowercase());
            }
        }
        context
    }

    /// Defaults of an existing table, known by its collation alone.
    pub fn with_collation(collation: Option<String>) -> Self {
        Self {
            collation,
            ..Self::default()
        }
    }

    fn add_constraint(&mut self, constraint: &Node) {
        let columns = key_columns(constraint);
        let kind = IndexDefinition::constraint_kind(constraint);
        if kind == Some(IndexKind::Primary) {
            for column in &columns {
                self.primary_key.push(column.to_lowercase());
                self.promote(column, ColumnKey::Primary);
            }
            return;
        }
        let key = match kind {
            Some(IndexKind::Unique) => ColumnKey::Unique,
            Some(_) => ColumnKey::Multiple,
            None if constraint.has_keyword(Keyword::Foreign) => ColumnKey::Multiple,
            None => return,
        };
        if let Some(first) = columns.first() {
            self.promote(first, key);
        }
    }

    fn promote(&mut self, column: &str, key: ColumnKey) {
        let entry = self.keys.entry(column.to_lowercase()).or_default();
        *entry = (*entry).max(key);
    }

    fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.contains(&column.to_lowercase())
    }

    fn key(&self, column: &str) -> ColumnKey {
        self.keys.get(&column.to_lowercase()).copied().unwrap_or_default()
    }

    /// The `TABLE_COLLATION` value.
    pub fn table_collation(&self) -> String {
        match (&self.collation, &self.charset) {
            (Some(collation), _) => collation.clone(),
            (None, Some(charset)) => format!("{}_general_ci", charset),
            (None, None) => DEFAULT_COLLATION.to_string(),
        }
    }
}

fn key_columns(constraint: &Node) -> Vec<String> {
    constraint
        .child_node(Rule::KeyList)
        .into_iter()
        .flat_map(|keys| keys.child_nodes(Rule::KeyPart))
        .filter_map(|part| part.child_node(Rule::Identifier))
        .map(identifier_text)
        .collect()
}

/// One `_mysql_information_schema_columns` row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub default: Option<String>,
    pub nullable: bool,
    pub data_type: &'static str,
    pub column_type: String,
    pub char_length: Option<i64>,
    pub octet_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    pub datetime_precision: Option<i64>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub key: ColumnKey,
    pub extra: String,
    pub comment: String,
    pub generation_expression: String,
}

impl ColumnInfo {
    /// Describe a `columnDefinition` node.
    pub fn from_definition(column: &Node, context: &TableContext) -> Result<Self> {
        let name = column
            .child_node(Rule::Identifier)
            .map(identifier_text)
            .ok_or_else(|| Error::unsupported("column definition without a name"))?;
        let field = column
            .child_node(Rule::FieldDefinition)
            .ok_or_else(|| Error::unsupported("column definition without a type"))?;
        let data_type_node = field
            .child_node(Rule::DataType)
            .ok_or_else(|| Error::unsupported("column definition without a type"))?;

        let data_type = data_type_name(data_type_node)?;
        let is_serial = data_type_node.has_keyword(Keyword::Serial);
        let (charset, collation) = charset_and_collation(data_type_node, field, data_type, context);
        let (char_length, octet_length) =
            lengths(data_type_node, data_type, charset.as_deref());
        let (numeric_precision, numeric_scale) = numeric_attributes(data_type_node, data_type);

        let inline_key = field
            .child_nodes(Rule::ColumnAttribute)
            .map(|attribute| match attribute.first_child_token().and_then(Token::keyword) {
                Some(Keyword::Primary | Keyword::Key) => ColumnKey::Primary,
                Some(Keyword::Unique) => ColumnKey::Unique,
                _ => ColumnKey::None,
            })
            .max()
            .unwrap_or_default();
        let serial_key = if is_serial { ColumnKey::Unique } else { ColumnKey::None };
        let key = inline_key.max(serial_key).max(context.key(&name));

        let not_null = attribute(field, Keyword::Not).is_some();
        let nullable = !(not_null
            || is_serial
            || inline_key == ColumnKey::Primary
            || context.is_primary_key(&name));

        Ok(Self {
            default: column_default(field),
            nullable,
            data_type,
            column_type: column_type(data_type_node, data_type),
            char_length,
            octet_length,
            numeric_precision,
            numeric_scale,
            datetime_precision: datetime_precision(data_type_node, data_type),
            charset,
            collation,
            key,
            extra: extra(field, is_serial),
            comment: attribute(field, Keyword::Comment)
                .and_then(|comment| comment.child_node(Rule::TextStringLiteral))
                .map(Node::text)
                .unwrap_or_default(),
            generation_expression: field
                .child_node(Rule::GeneratedColumn)
                .and_then(|generated| generated.child_node(Rule::ExprWithParentheses))
                .map(unparenthesized_source)
                .unwrap_or_default(),
            name,
        })
    }

    pub fn is_spatial(&self) -> bool {
        SPATIAL_TYPES.contains(&self.data_type)
    }

    /// Column/value pairs for the catalog insert.
    pub fn row(&self, schema: &str, table: &str, position: i64) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("table_schema", schema.into()),
            ("table_name", table.into()),
            ("column_name", self.name.as_str().into()),
            ("ordinal_position", position.into()),
            ("column_default", self.default.clone().into()),
            ("is_nullable", if self.nullable { "YES" } else { "NO" }.into()),
            ("data_type", self.data_type.into()),
            ("character_maximum_length", self.char_length.into()),
            ("character_octet_length", self.octet_length.into()),
            ("numeric_precision", self.numeric_precision.into()),
            ("numeric_scale", self.numeric_scale.into()),
            ("datetime_precision", self.datetime_precision.into()),
            ("character_set_name", self.charset.clone().into()),
            ("collation_name", self.collation.clone().into()),
            ("column_type", self.column_type.as_str().into()),
            ("column_key", self.key.as_str().into()),
            ("extra", self.extra.as_str().into()),
            ("privileges", PRIVILEGES.into()),
            ("column_comment", self.comment.as_str().into()),
            ("generation_expression", self.generation_expression.as_str().into()),
            ("srs_id", SqlValue::Null),
        ]
    }
}

/// First attribute of `field` led by `keyword`.
fn attribute(field: &Node, keyword: Keyword) -> Option<&Node> {
    field
        .child_nodes(Rule::ColumnAttribute)
        .find(|attribute| attribute.first_child_token().is_some_and(|token| token.is_keyword(keyword)))
}

fn type_keywords(data_type: &Node) -> Vec<Keyword> {
    data_type.all_child_tokens().filter_map(Token::keyword).collect()
}

/// The lowercase `DATA_TYPE` name.
pub fn data_type_name(data_type: &Node) -> Result<&'static str> {
    let keywords = type_keywords(data_type);
    let Some(&first) = keywords.first() else {
        return Err(Error::unsupported("data type without a name"));
    };
    let has = |keyword: Keyword| keywords.contains(&keyword);

    let name = match first {
        Keyword::Tinyint | Keyword::Bool | Keyword::Boolean => "tinyint",
        Keyword::Smallint => "smallint",
        Keyword::Mediumint => "mediumint",
        Keyword::Int | Keyword::Integer => "int",
        Keyword::Bigint | Keyword::Serial => "bigint",
        Keyword::Float => "float",
        Keyword::Double | Keyword::Real => "double",
        Keyword::Decimal | Keyword::Numeric | Keyword::Fixed | Keyword::Dec => "decimal",
        Keyword::Bit => "bit",
        Keyword::Binary => "binary",
        Keyword::Varbinary => "varbinary",
        Keyword::Year => "year",
        Keyword::Date => "date",
        Keyword::Time => "time",
        Keyword::Timestamp => "timestamp",
        Keyword::Datetime => "datetime",
        Keyword::Tinyblob => "tinyblob",
        Keyword::Blob => "blob",
        Keyword::Mediumblob => "mediumblob",
        Keyword::Longblob => "longblob",
        Keyword::Tinytext => "tinytext",
        Keyword::Text => "text",
        Keyword::Mediumtext => "mediumtext",
        Keyword::Longtext => "longtext",
        Keyword::Enum => "enum",
        Keyword::Set => "set",
        Keyword::Json => "json",
        Keyword::Geometry => "geometry",
        Keyword::Geometrycollection | Keyword::Geomcollection => "geometrycollection",
        Keyword::Point => "point",
        Keyword::Multipoint => "multipoint",
        Keyword::Linestring => "linestring",
        Keyword::Multilinestring => "multilinestring",
        Keyword::Polygon => "polygon",
        Keyword::Multipolygon => "multipolygon",
        Keyword::Long if has(Keyword::Varbinary) => "mediumblob",
        Keyword::Long => "mediumtext",
        Keyword::Varchar | Keyword::Nvarchar => "varchar",
        Keyword::Char | Keyword::Character | Keyword::Nchar | Keyword::National => {
            if has(Keyword::Varchar) || has(Keyword::Varying) {
                "varchar"
            } else {
                "char"
            }
        }
        other => return Err(Error::unsupported(format!("data type {}", other))),
    };
    Ok(name)
}

/// The single number inside a `( n )` node.
fn single_number(node: &Node) -> Option<i64> {
    node.all_child_tokens()
        .find(|token| token.kind.is_number())
        .and_then(|token| token.value.parse().ok())
}

fn precision_pair(data_type: &Node) -> Option<(i64, i64)> {
    let precision = data_type.child_node(Rule::Precision)?;
    let mut numbers = precision
        .all_child_tokens()
        .filter(|token| token.kind.is_number())
        .filter_map(|token| token.value.parse().ok());
    Some((numbers.next()?, numbers.next()?))
}

fn field_length(data_type: &Node) -> Option<i64> {
    data_type.child_node(Rule::FieldLength).and_then(single_number)
}

fn has_field_option(data_type: &Node, keyword: Keyword) -> bool {
    data_type
        .child_node(Rule::FieldOptions)
        .is_some_and(|options| options.has_keyword(keyword))
}

/// The full `COLUMN_TYPE`, e.g. `bigint(20) unsigned` or `enum('a','b')`.
fn column_type(data_type: &Node, name: &str) -> String {
    let mut full = name.to_string();

    if let Some(list) = data_type.child_node(Rule::StringList) {
        let members: Vec<String> = list
            .child_nodes(Rule::TextStringLiteral)
            .map(|member| format!("'{}'", member.text().replace('\'', "''")))
            .collect();
        full.push_str(&format!("({})", members.join(",")));
    }

    let length = field_length(data_type);
    let precision = precision_pair(data_type);
    if let Some(length) = length {
        if matches!(name, "decimal" | "float" | "double") {
            full.push_str(&format!("({},0)", length));
        } else {
            full.push_str(&format!("({})", length));
        }
    }
    if let Some((precision, scale)) = precision {
        full.push_str(&format!("({},{})", precision, scale));
    }
    if let Some(fraction) = data_type.child_node(Rule::TypeDatetimePrecision).and_then(single_number) {
        full.push_str(&format!("({})", fraction));
    }
    if data_type.has_keyword(Keyword::Bool) || data_type.has_keyword(Keyword::Boolean) {
        full.push_str("(1)");
    }
    if length.is_none() && precision.is_none() {
        match name {
            "decimal" => full.push_str("(10,0)"),
            "char" | "bit" | "binary" => full.push_str("(1)"),
            _ => {}
        }
    }
    if has_field_option(data_type, Keyword::Unsigned) || data_type.has_keyword(Keyword::Serial) {
        full.push_str(" unsigned");
    }
    if has_field_option(data_type, Keyword::Zerofill) {
        full.push_str(" zerofill");
    }
    full
}

fn is_character_type(name: &str) -> bool {
    matches!(
        name,
        "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set"
    )
}

fn charset_and_collation(
    data_type: &Node,
    field: &Node,
    name: &str,
    context: &TableContext,
) -> (Option<String>, Option<String>) {
    if !is_character_type(name) {
        return (None, None);
    }

    let mut charset = None;
    let mut binary = false;
    if let Some(clause) = data_type.child_node(Rule::CharsetWithOptBinary) {
        if let Some(charset_name) = clause.child_node(Rule::CharsetName) {
            charset = Some(charset_name.text().to_lowercase());
        } else if clause.has_keyword(Keyword::Ascii) {
            charset = Some("latin1".to_string());
        } else if clause.has_keyword(Keyword::Unicode) {
            charset = Some("ucs2".to_string());
        }
        binary = clause.has_keyword(Keyword::Binary);
    }
    let mut collation = attribute(field, Keyword::Collate)
        .and_then(|collate| collate.child_node(Rule::CollationName))
        .map(|collation| collation.text().to_lowercase());

    let national = matches!(
        type_keywords(data_type).first(),
        Some(Keyword::National | Keyword::Nchar | Keyword::Nvarchar)
    );
    if charset.is_none() && collation.is_none() {
        if national {
            charset = Some(NATIONAL_CHARSET.to_string());
        } else {
            charset = context.charset.clone();
            collation = context.collation.clone();
        }
    }
    if charset.is_none() && collation.is_none() {
        charset = Some(DEFAULT_CHARSET.to_string());
        collation = Some(DEFAULT_COLLATION.to_string());
    }

    match (charset, collation) {
        (Some(charset), None) => {
            let suffix = if binary { "_bin" } else { "_general_ci" };
            let collation = format!("{}{}", charset, suffix);
            (Some(charset), Some(collation))
        }
        (None, Some(collation)) => {
            let charset = collation.split('_').next().unwrap_or(&collation).to_string();
            (Some(charset), Some(collation))
        }
        pair => pair,
    }
}

pub fn bytes_per_char(charset: Option<&str>) -> i64 {
    match charset {
        Some("utf8mb4") => 4,
        Some("utf8" | "utf8mb3") => 3,
        Some("ucs2") => 2,
        _ => 1,
    }
}

fn lengths(data_type: &Node, name: &str, charset: Option<&str>) -> (Option<i64>, Option<i64>) {
    let fixed = match name {
        "tinytext" | "tinyblob" => Some(255),
        "text" | "blob" => Some(65_535),
        "mediumtext" | "mediumblob" => Some(16_777_215),
        "longtext" | "longblob" => Some(4_294_967_295),
        _ => None,
    };
    if fixed.is_some() {
        return (fixed, fixed);
    }

    match name {
        "char" | "varchar" => {
            let length = field_length(data_type).unwrap_or(1);
            (Some(length), Some(length * bytes_per_char(charset)))
        }
        "binary" | "varbinary" => {
            let length = field_length(data_type).unwrap_or(1);
            (Some(length), Some(length))
        }
        "enum" | "set" => {
            let longest = data_type
                .child_node(Rule::StringList)
                .into_iter()
                .flat_map(|list| list.child_nodes(Rule::TextStringLiteral))
                .map(|member| member.text().chars().count() as i64)
                .max()
                .unwrap_or(0);
            (Some(longest), Some(longest * bytes_per_char(charset)))
        }
        _ => (None, None),
    }
}

fn numeric_attributes(data_type: &Node, name: &str) -> (Option<i64>, Option<i64>) {
    let precision = precision_pair(data_type);
    match name {
        "tinyint" => (Some(3), Some(0)),
        "smallint" => (Some(5), Some(0)),
        "mediumint" => (Some(7), Some(0)),
        "int" => (Some(10), Some(0)),
        "bigint" => {
            let unsigned = has_field_option(data_type, Keyword::Unsigned)
                || data_type.has_keyword(Keyword::Serial);
            (Some(if unsigned { 20 } else { 19 }), Some(0))
        }
        "bit" => (Some(field_length(data_type).unwrap_or(1)), None),
        "float" => match precision {
            Some((precision, scale)) => (Some(precision), Some(scale)),
            None => (Some(field_length(data_type).unwrap_or(12)), None),
        },
        "double" => match precision {
            Some((precision, scale)) => (Some(precision), Some(scale)),
            None => (Some(field_length(data_type).unwrap_or(22)), None),
        },
        "decimal" => match precision {
            Some((precision, scale)) => (Some(precision), Some(scale)),
            None => (Some(field_length(data_type).unwrap_or(10)), Some(0)),
        },
        _ => (None, None),
    }
}

fn datetime_precision(data_type: &Node, name: &str) -> Option<i64> {
    if !matches!(name, "time" | "datetime" | "timestamp") {
        return None;
    }
    Some(
        data_type
            .child_node(Rule::TypeDatetimePrecision)
            .and_then(single_number)
            .unwrap_or(0),
    )
}

/// The `DEFAULT` value node of a field, if any.
fn default_value(field: &Node) -> Option<&Node> {
    attribute(field, Keyword::Default).and_then(Node::first_child_node)
}

fn column_default(field: &Node) -> Option<String> {
    let value = default_value(field)?;
    match value.rule {
        Rule::RuntimeFunctionCall => Some(now_function_text(value)),
        Rule::ExprWithParentheses => Some(unparenthesized_source(value)),
        _ if value.descendant_node(Rule::NullLiteral).is_some() => None,
        _ => match value.descendant_node(Rule::BoolLiteral) {
            Some(boolean) => Some(if boolean.has_keyword(Keyword::True) { "1" } else { "0" }.to_string()),
            None => Some(value.text()),
        },
    }
}

/// `NOW()`, `CURRENT_TIMESTAMP(6)` and friends as MySQL reports them.
fn now_function_text(call: &Node) -> String {
    let name = match call.first_child_token().and_then(Token::keyword) {
        Some(Keyword::CurrentDate) => "curdate()",
        Some(Keyword::CurrentTime) => "curtime()",
        Some(Keyword::UtcTimestamp) => "utc_timestamp()",
        _ => "CURRENT_TIMESTAMP",
    };
    match call
        .child_node(Rule::UdfExprList)
        .and_then(|list| list.descendant_token(TokenKind::IntNumber))
    {
        Some(precision) if name == "CURRENT_TIMESTAMP" => format!("{}({})", name, precision.value),
        _ => name.to_string(),
    }
}

fn extra(field: &Node, is_serial: bool) -> String {
    if is_serial || attribute(field, Keyword::AutoIncrement).is_some() {
        return "auto_increment".to_string();
    }
    if let Some(generated) = field.child_node(Rule::GeneratedColumn) {
        return if generated.has_keyword(Keyword::Stored) {
            "STORED GENERATED"
        } else {
            "VIRTUAL GENERATED"
        }
        .to_string();
    }

    let generated_default = default_value(field)
        .is_some_and(|value| matches!(value.rule, Rule::RuntimeFunctionCall | Rule::ExprWithParentheses));
    let on_update = attribute(field, Keyword::On).is_some();
    match (generated_default, on_update) {
        (true, true) => "DEFAULT_GENERATED on update CURRENT_TIMESTAMP".to_string(),
        (true, false) => "DEFAULT_GENERATED".to_string(),
        (false, true) => "on update CURRENT_TIMESTAMP".to_string(),
        (false, false) => String::new(),
    }
}

/// Source text of an expression, roughly as written.
fn source_text(node: &Node) -> String {
    let mut text = String::new();
    let mut previous: Option<&str> = None;
    for token in node.tokens() {
        let value = token.value.as_str();
        let joined = previous.is_none_or(|previous| previous == "(")
            || matches!(value, "(" | ")" | ",");
        if !joined {
            text.push(' ');
        }
        text.push_str(value);
        previous = Some(value);
    }
    text
}

/// Source text of an `exprWithParentheses` without the outer parentheses.
fn unparenthesized_source(node: &Node) -> String {
    node.all_child_nodes().next().map(source_text).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn columns(sql: &str) -> Vec<ColumnInfo> {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, sql).unwrap();
        let create = tree.descendant_node(Rule::CreateTable).unwrap();
        let context = TableContext::from_create_table(create);
        create
            .descendant_nodes(Rule::ColumnDefinition)
            .into_iter()
            .map(|column| ColumnInfo::from_definition(column, &context).unwrap())
            .collect()
    }

    fn column(definition: &str) -> ColumnInfo {
        columns(&format!("CREATE TABLE t (c {definition})")).remove(0)
    }

    #[test]
    fn test_data_and_column_types() {
        let cases = [
            ("bigint(20) unsigned", "bigint", "bigint(20) unsigned"),
            ("int", "int", "int"),
            ("boolean", "tinyint", "tinyint(1)"),
            ("decimal", "decimal", "decimal(10,0)"),
            ("numeric(8)", "decimal", "decimal(8,0)"),
            ("decimal(10,2) zerofill", "decimal", "decimal(10,2) zerofill"),
            ("double precision", "double", "double"),
            ("real(7,3)", "double", "double(7,3)"),
            ("char", "char", "char(1)"),
            ("national char(10)", "char", "char(10)"),
            ("nchar varchar(10)", "varchar", "varchar(10)"),
            ("character varying(5)", "varchar", "varchar(5)"),
            ("long varbinary", "mediumblob", "mediumblob"),
            ("long varchar", "mediumtext", "mediumtext"),
            ("bit", "bit", "bit(1)"),
            ("datetime(6)", "datetime", "datetime(6)"),
            ("enum('a','it''s')", "enum", "enum('a','it''s')"),
            ("serial", "bigint", "bigint unsigned"),
        ];
        for (definition, data_type, column_type) in cases {
            let info = column(definition);
            assert_eq!(info.data_type, data_type, "{definition}");
            assert_eq!(info.column_type, column_type, "{definition}");
        }
    }

    #[test]
    fn test_charset_and_lengths() {
        let varchar = column("varchar(255)");
        assert_eq!(varchar.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(varchar.collation.as_deref(), Some("utf8mb4_general_ci"));
        assert_eq!((varchar.char_length, varchar.octet_length), (Some(255), Some(1020)));

        let national = column("nvarchar(10)");
        assert_eq!(national.charset.as_deref(), Some("utf8"));
        assert_eq!(national.octet_length, Some(30));

        let latin = column("char(4) CHARACTER SET latin1 BINARY");
        assert_eq!(latin.collation.as_deref(), Some("latin1_bin"));
        assert_eq!(latin.octet_length, Some(4));

        let collated = column("text COLLATE utf8mb4_unicode_ci");
        assert_eq!(collated.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(collated.collation.as_deref(), Some("utf8mb4_unicode_ci"));
        assert_eq!(collated.char_length, Some(65_535));

        let number = column("int");
        assert_eq!((number.charset, number.char_length), (None, None));

        let binary = column("varbinary(16)");
        assert_eq!((binary.char_length, binary.octet_length), (Some(16), Some(16)));
    }

    #[test]
    fn test_table_defaults_apply_to_columns() {
        let info = columns("CREATE TABLE t (a varchar(10)) DEFAULT CHARSET=latin1");
        assert_eq!(info[0].charset.as_deref(), Some("latin1"));
        assert_eq!(info[0].collation.as_deref(), Some("latin1_general_ci"));
        assert_eq!(info[0].octet_length, Some(10));
    }

    #[test]
    fn test_recorded_collation_applies_to_added_columns() {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, "ALTER TABLE t ADD c varchar(10)").unwrap();
        let definition = tree.descendant_node(Rule::ColumnDefinition).unwrap();
        let context = TableContext::with_collation(Some("latin1_swedish_ci".to_string()));
        let info = ColumnInfo::from_definition(definition, &context).unwrap();
        assert_eq!(info.charset.as_deref(), Some("latin1"));
        assert_eq!(info.collation.as_deref(), Some("latin1_swedish_ci"));
        assert_eq!(info.octet_length, Some(10));

        let info = ColumnInfo::from_definition(definition, &TableContext::with_collation(None)).unwrap();
        assert_eq!(info.collation.as_deref(), Some("utf8mb4_general_ci"));
    }

    #[test]
    fn test_numeric_attributes() {
        assert_eq!(column("tinyint(1)").numeric_precision, Some(3));
        assert_eq!(column("bigint").numeric_precision, Some(19));
        assert_eq!(column("bigint unsigned").numeric_precision, Some(20));
        let float = column("float");
        assert_eq!((float.numeric_precision, float.numeric_scale), (Some(12), None));
        let decimal = column("decimal(12,4)");
        assert_eq!((decimal.numeric_precision, decimal.numeric_scale), (Some(12), Some(4)));
        let bit = column("bit(8)");
        assert_eq!((bit.numeric_precision, bit.numeric_scale), (Some(8), None));
        assert_eq!(column("timestamp").datetime_precision, Some(0));
        assert_eq!(column("varchar(1)").numeric_precision, None);
    }

    #[test]
    fn test_nullability_and_keys() {
        let info = columns(
            "CREATE TABLE t (
                id bigint NOT NULL AUTO_INCREMENT,
                a int,
                b int UNIQUE,
                c varchar(10),
                d int,
                PRIMARY KEY (id),
                KEY c_index (c, d),
                UNIQUE KEY d_unique (d)
            )",
        );
        let summary: Vec<(&str, bool, &str)> = info
            .iter()
            .map(|column| (column.name.as_str(), column.nullable, column.key.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("id", false, "PRI"),
                ("a", true, ""),
                ("b", true, "UNI"),
                ("c", true, "MUL"),
                ("d", true, "UNI"),
            ]
        );
        assert_eq!(info[0].extra, "auto_increment");

        let inline = column("int PRIMARY KEY");
        assert!(!inline.nullable);
        assert_eq!(inline.key, ColumnKey::Primary);
    }

    #[test]
    fn test_defaults_and_extra() {
        let text = column("varchar(10) NOT NULL DEFAULT 'it''s'");
        assert_eq!(text.default.as_deref(), Some("it's"));
        assert_eq!(text.extra, "");

        assert_eq!(column("int DEFAULT NULL").default, None);
        assert_eq!(column("int DEFAULT -1").default.as_deref(), Some("-1"));
        assert_eq!(column("tinyint DEFAULT TRUE").default.as_deref(), Some("1"));

        let updated = column("timestamp DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP");
        assert_eq!(updated.default.as_deref(), Some("CURRENT_TIMESTAMP"));
        assert_eq!(updated.extra, "DEFAULT_GENERATED on update CURRENT_TIMESTAMP");

        let precise = column("datetime(6) DEFAULT NOW(6)");
        assert_eq!(precise.default.as_deref(), Some("CURRENT_TIMESTAMP(6)"));
        assert_eq!(precise.extra, "DEFAULT_GENERATED");

        let generated = column("int GENERATED ALWAYS AS (a + 1) STORED COMMENT 'sum'");
        assert_eq!(generated.extra, "STORED GENERATED");
        assert_eq!(generated.generation_expression, "a + 1");
        assert_eq!(generated.comment, "sum");
    }
}
