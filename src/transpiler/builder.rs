//! Query builder: renders an [`Expression`] as SQLite SQL text.
//!
//! Elements are separated by one space, except that nothing is inserted
//! after `(`, before `)` or `,`, around `.`, or between a function name and
//! its argument list.

use super::expression::{Element, Expression, SqliteToken, SqliteTokenKind};
use super::factory;

/// Render to SQL text.
pub trait ToSql {
    fn to_sql(&self) -> String;
}

impl ToSql for SqliteToken {
    fn to_sql(&self) -> String {
        match self.kind() {
            SqliteTokenKind::Identifier => format!("\"{}\"", self.text().replace('"', "\"\"")),
            SqliteTokenKind::Raw | SqliteTokenKind::Value | SqliteTokenKind::Operator => {
                self.text().to_string()
            }
        }
    }
}

impl ToSql for Expression {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        let mut previous: Option<Glue> = None;

        for element in self.elements() {
            let (text, current) = match element {
                Element::Token(token) => (token.to_sql(), Glue::of(token)),
                Element::Group(inner) => (format!("({})", inner.to_sql()), Glue::Group),
            };
            if let Some(previous) = previous {
                if needs_space(previous, current) {
                    sql.push(' ');
                }
            }
            sql.push_str(&text);
            previous = Some(current);
        }
        sql
    }
}

/// How an element attaches to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glue {
    Open,
    Close,
    Comma,
    Dot,
    Function,
    Group,
    Word,
}

impl Glue {
    fn of(token: &SqliteToken) -> Self {
        if token.kind() == SqliteTokenKind::Identifier || token.kind() == SqliteTokenKind::Value {
            return Glue::Word;
        }
        match token.text() {
            "(" => Glue::Open,
            ")" => Glue::Close,
            "," => Glue::Comma,
            "." => Glue::Dot,
            name if token.kind() == SqliteTokenKind::Raw && factory::is_function(name) => {
                Glue::Function
            }
            _ => Glue::Word,
        }
    }
}

fn needs_space(previous: Glue, current: Glue) -> bool {
    match (previous, current) {
        (Glue::Open | Glue::Dot, _) => false,
        (_, Glue::Close | Glue::Comma | Glue::Dot) => false,
        (Glue::Function, Glue::Open | Glue::Group) => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::factory::{identifier, integer, operator, raw, value};

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(identifier("wp_posts").to_sql(), r#""wp_posts""#);
        assert_eq!(identifier(r#"we"ird"#).to_sql(), r#""we""ird""#);
    }

    #[test]
    fn test_spacing() {
        let columns = Expression::from_iter([
            identifier("id"),
            raw("INTEGER"),
            raw("PRIMARY"),
            raw("KEY"),
            raw("AUTOINCREMENT"),
        ]);
        let create = Expression::from_iter([raw("CREATE"), raw("TABLE"), identifier("t")])
            .then(Expression::group(columns));
        assert_eq!(
            create.to_sql(),
            r#"CREATE TABLE "t" ("id" INTEGER PRIMARY KEY AUTOINCREMENT)"#
        );

        let count = Expression::from_iter([raw("COUNT"), raw("("), raw("*"), raw(")")]);
        assert_eq!(count.to_sql(), "COUNT(*)");

        let list = Expression::from_iter([
            raw("SELECT"),
            identifier("t"),
            raw("."),
            identifier("a"),
            raw(","),
            value("x"),
            raw("AS"),
            identifier("b"),
        ]);
        assert_eq!(list.to_sql(), r#"SELECT "t"."a", 'x' AS "b""#);
    }

    #[test]
    fn test_groups_render_parenthesized() {
        let mut expression = Expression::from(operator("NOT").unwrap());
        expression.push_group(Expression::from_iter([
            identifier("a"),
            operator("=").unwrap(),
            integer(1),
        ]));
        assert_eq!(expression.to_sql(), r#"NOT ("a" = 1)"#);
    }
}
