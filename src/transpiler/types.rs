//! MySQL data types to SQLite storage classes.

use super::expression::Expression;
use super::factory::raw;
use crate::ast::{Node, Token};
use crate::error::{Error, Result};
use crate::grammar::Keyword;

/// The MySQL integer family (`BOOL` and `BIT` excluded).
pub const INTEGER_TYPES: &[Keyword] = &[
    Keyword::Tinyint,
    Keyword::Smallint,
    Keyword::Mediumint,
    Keyword::Int,
    Keyword::Integer,
    Keyword::Bigint,
];

/// The keyword that decides the mapping. `NATIONAL`, `NCHAR` and `LONG`
/// prefixes defer to the keyword that follows them.
pub fn type_keyword(data_type: &Node) -> Option<Keyword> {
    let mut keywords = data_type.all_child_tokens().filter_map(Token::keyword);
    let first = keywords.next()?;
    match first {
        Keyword::National | Keyword::Nchar | Keyword::Long => Some(keywords.next().unwrap_or(first)),
        _ => Some(first),
    }
}

pub fn is_integer_type(data_type: &Node) -> bool {
    type_keyword(data_type).is_some_and(|keyword| INTEGER_TYPES.contains(&keyword))
}

/// Translate a `dataType` node into an SQLite column type.
pub fn translate_data_type(data_type: &Node) -> Result<Expression> {
    let keyword = type_keyword(data_type)
        .ok_or_else(|| Error::unsupported("data type without a name"))?;

    let sqlite_type = match keyword {
        Keyword::Serial => {
            return Ok(Expression::from_iter([
                raw("INTEGER"),
                raw("NOT"),
                raw("NULL"),
                raw("PRIMARY"),
                raw("KEY"),
                raw("AUTOINCREMENT"),
                raw("UNIQUE"),
            ]));
        }
        Keyword::Set | Keyword::Json => {
            return Err(Error::unsupported(format!("data type {}", keyword)));
        }
        kw if INTEGER_TYPES.contains(&kw) => "INTEGER",
        Keyword::Bool | Keyword::Boolean | Keyword::Bit | Keyword::Binary => "INTEGER",
        Keyword::Float
        | Keyword::Double
        | Keyword::Real
        | Keyword::Decimal
        | Keyword::Numeric
        | Keyword::Fixed
        | Keyword::Dec => "REAL",
        Keyword::Varbinary
        | Keyword::Tinyblob
        | Keyword::Blob
        | Keyword::Mediumblob
        | Keyword::Longblob => "BLOB",
        Keyword::Char
        | Keyword::Character
        | Keyword::Varchar
        | Keyword::Nvarchar
        | Keyword::Varying
        | Keyword::Long
        | Keyword::Nchar
        | Keyword::Tinytext
        | Keyword::Text
        | Keyword::Mediumtext
        | Keyword::Longtext
        | Keyword::Enum
        | Keyword::Date
        | Keyword::Time
        | Keyword::Datetime
        | Keyword::Timestamp
        | Keyword::Year
        | Keyword::Geometry
        | Keyword::Point
        | Keyword::Linestring
        | Keyword::Polygon
        | Keyword::Multipoint
        | Keyword::Multilinestring
        | Keyword::Multipolygon
        | Keyword::Geometrycollection
        | Keyword::Geomcollection => "TEXT",
        other => return Err(Error::unsupported(format!("data type {}", other))),
    };
    Ok(raw(sqlite_type).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Grammar, Rule};
    use crate::parser::parse;
    use crate::transpiler::builder::ToSql;

    fn column_type(definition: &str) -> Result<String> {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, &format!("CREATE TABLE t (c {definition})")).unwrap();
        let data_type = tree.descendant_node(Rule::DataType).unwrap();
        translate_data_type(data_type).map(|expression| expression.to_sql())
    }

    #[test]
    fn test_storage_classes() {
        let cases = [
            ("bigint(20) unsigned", "INTEGER"),
            ("tinyint(1)", "INTEGER"),
            ("boolean", "INTEGER"),
            ("bit(8)", "INTEGER"),
            ("decimal(10,2)", "REAL"),
            ("double precision", "REAL"),
            ("varchar(255)", "TEXT"),
            ("national char(10)", "TEXT"),
            ("nchar varchar(10)", "TEXT"),
            ("long varchar", "TEXT"),
            ("long varbinary", "BLOB"),
            ("longtext", "TEXT"),
            ("enum('a','b')", "TEXT"),
            ("datetime(6)", "TEXT"),
            ("year", "TEXT"),
            ("point", "TEXT"),
            ("varbinary(16)", "BLOB"),
            ("mediumblob", "BLOB"),
        ];
        for (mysql, sqlite) in cases {
            assert_eq!(column_type(mysql).unwrap(), sqlite, "{mysql}");
        }
    }

    #[test]
    fn test_serial_expands() {
        assert_eq!(
            column_type("serial").unwrap(),
            "INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT UNIQUE"
        );
    }

    #[test]
    fn test_unsupported_types() {
        assert!(matches!(column_type("set('a','b')"), Err(Error::Unsupported(_))));
        assert!(matches!(column_type("json"), Err(Error::Unsupported(_))));
    }
}
