//! MySQL built-in functions in terms of SQLite functions and operators.

use super::expression::Expression;
use super::factory::{self, function, identifier, raw, value};
use super::{identifier_text, last_identifier, Translator};
use crate::ast::{Node, Token};
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule};

/// Reported by `VERSION()`.
pub const MYSQL_VERSION: &str = "8.0.38";

/// Functions whose MySQL and SQLite forms agree.
const PASSTHROUGH: &[&str] = &[
    "ABS", "ACOS", "ASIN", "ATAN", "ATAN2", "COS", "DEGREES", "EXP", "FLOOR", "PI", "RADIANS",
    "ROUND", "SIGN", "SIN", "SQRT", "TAN", "TRIM", "LTRIM", "RTRIM", "LOWER", "UPPER", "REPLACE",
    "INSTR", "HEX", "CHAR", "COALESCE", "IFNULL", "NULLIF", "DATE", "TIME", "LN", "LOG", "LOG2",
    "LOG10", "POWER", "CEIL",
];

/// `DATE_FORMAT` specifiers with a `STRFTIME` equivalent.
const DATE_FORMAT_SPECIFIERS: &[(char, &str)] = &[
    ('d', "%d"),
    ('e', "%d"),
    ('H', "%H"),
    ('k', "%H"),
    ('i', "%M"),
    ('j', "%j"),
    ('m', "%m"),
    ('c', "%m"),
    ('s', "%S"),
    ('S', "%S"),
    ('T', "%H:%M:%S"),
    ('Y', "%Y"),
    ('X', "%Y"),
    ('x', "%Y"),
    ('w', "%w"),
    ('U', "%W"),
    ('u', "%W"),
    ('V', "%W"),
    ('v', "%W"),
    ('%', "%%"),
];

impl Translator<'_> {
    pub(super) fn translate_function_call(&mut self, node: &Node) -> Result<Expression> {
        let name = function_name(node);
        let nodes = argument_nodes(node);
        match name.as_str() {
            "CAST" => return self.translate_cast(node),
            "CONVERT" => {
                let operand = node
                    .first_child_node()
                    .ok_or_else(|| Error::unsupported("CONVERT without an operand"))?;
                let operand = self.translate_required(operand)?;
                return match node.child_node(Rule::CastType) {
                    Some(cast_type) => cast_to(operand, cast_type),
                    None => Ok(operand),
                };
            }
            "EXTRACT" => {
                let unit = node
                    .child_node(Rule::IntervalTimeStamp)
                    .and_then(Node::first_child_token)
                    .and_then(Token::keyword)
                    .ok_or_else(|| Error::unsupported("EXTRACT without a unit"))?;
                let operand = node
                    .all_child_nodes()
                    .find(|child| child.rule != Rule::IntervalTimeStamp)
                    .ok_or_else(|| Error::unsupported("EXTRACT without an operand"))?;
                let operand = self.translate_required(operand)?;
                return date_part(unit.as_str(), operand);
            }
            "DATE_FORMAT" => return self.translate_date_format(&nodes),
            "DATE_ADD" | "ADDDATE" | "DATE_SUB" | "SUBDATE" => {
                return self.translate_date_add(&name, &nodes);
            }
            "VALUES" => {
                let [column] = nodes.as_slice() else {
                    return Err(arity(&name, "1", nodes.len()));
                };
                let column = match column.rule {
                    Rule::ColumnRef => last_identifier(column),
                    _ => None,
                }
                .ok_or_else(|| Error::unsupported("VALUES() of an expression"))?;
                return Ok(Expression::from_iter([raw("excluded"), raw("."), identifier(&column)]));
            }
            "DATABASE" | "SCHEMA" => return Ok(value(self.database_name()).into()),
            "FOUND_ROWS" => {
                self.has_seen_found_rows = true;
                return Err(Error::unsupported("FOUND_ROWS()"));
            }
            _ => {}
        }

        let args = nodes
            .iter()
            .map(|argument| self.translate_required(argument))
            .collect::<Result<Vec<_>>>()?;
        translate_function(&name, args)
    }

    fn translate_cast(&mut self, node: &Node) -> Result<Expression> {
        let operand = node
            .first_child_node()
            .ok_or_else(|| Error::unsupported("CAST without an operand"))?;
        let cast_type = node
            .child_node(Rule::CastType)
            .ok_or_else(|| Error::unsupported("CAST without a type"))?;
        let operand = self.translate_required(operand)?;
        cast_to(operand, cast_type)
    }

    fn translate_date_format(&mut self, nodes: &[&Node]) -> Result<Expression> {
        let [date, format] = nodes else {
            return Err(arity("DATE_FORMAT", "2", nodes.len()));
        };
        let format = match format.rule {
            Rule::Literal => format.descendant_node(Rule::TextStringLiteral),
            _ => None,
        }
        .ok_or_else(|| Error::unsupported("DATE_FORMAT with a non-literal format"))?;

        let format = strftime_format(&format.text())?;
        let date = self.translate_required(date)?;
        function("STRFTIME", vec![value(&format).into(), date])
    }

    fn translate_date_add(&mut self, name: &str, nodes: &[&Node]) -> Result<Expression> {
        let [date, amount] = nodes else {
            return Err(arity(name, "2", nodes.len()));
        };
        let subtract = matches!(name, "DATE_SUB" | "SUBDATE");
        let date = self.translate_required(date)?;
        if amount.rule == Rule::Interval {
            return self.date_arithmetic(date, subtract, amount);
        }
        if matches!(name, "ADDDATE" | "SUBDATE") {
            let days = self.translate_required(amount)?;
            return date_modifier(date, subtract, days, Keyword::Day);
        }
        Err(Error::unsupported(format!("{} without INTERVAL", name)))
    }

    /// `date ± INTERVAL amount unit`.
    pub(super) fn date_arithmetic(&mut self, date: Expression, subtract: bool, interval: &Node) -> Result<Expression> {
        let amount = interval
            .first_child_node()
            .filter(|child| child.rule != Rule::IntervalTimeStamp)
            .ok_or_else(|| Error::unsupported("INTERVAL without an amount"))?;
        let unit = interval
            .child_node(Rule::IntervalTimeStamp)
            .and_then(Node::first_child_token)
            .and_then(Token::keyword)
            .ok_or_else(|| Error::unsupported("INTERVAL without a unit"))?;
        let amount = self.translate_required(amount)?;
        date_modifier(date, subtract, amount, unit)
    }

    pub(super) fn translate_sum_expr(&mut self, node: &Node) -> Result<Expression> {
        let name = function_name(node);
        if node.has_child_node(Rule::OrderClause) {
            return Err(Error::unsupported(format!("ORDER BY inside {}", name)));
        }
        let distinct = node.has_keyword(Keyword::Distinct);

        let mut argument = Expression::new();
        if distinct {
            argument.push(raw("DISTINCT"));
        }
        if node.has_symbol(crate::grammar::Symbol::Star) {
            argument.push(raw("*"));
        } else {
            let list = node
                .child_node(Rule::ExprList)
                .ok_or_else(|| Error::unsupported(format!("{} without arguments", name)))?;
            let exprs: Vec<&Node> = list.all_child_nodes().collect();
            match exprs.as_slice() {
                [single] => argument.append(self.translate_required(single)?),
                several if name == "GROUP_CONCAT" => {
                    let mut parts = Vec::with_capacity(several.len());
                    for expr in several {
                        parts.push(self.translate_required(expr)?);
                    }
                    argument.push_group(concatenation(parts));
                }
                _ => return Err(Error::unsupported(format!("{} with several arguments", name))),
            }
        }

        let mut args = vec![argument];
        if let Some(separator) = node.child_node(Rule::TextStringLiteral) {
            let separator = separator.text();
            if separator != "," {
                if distinct {
                    return Err(Error::unsupported(
                        "GROUP_CONCAT(DISTINCT ...) with a custom separator",
                    ));
                }
                args.push(value(&separator).into());
            }
        }
        function(&name, args)
    }
}

/// Uppercased function name of a call node.
fn function_name(node: &Node) -> String {
    match node.first_child() {
        Some(crate::ast::Child::Token(token)) => token.value.to_ascii_uppercase(),
        Some(crate::ast::Child::Node(name)) => identifier_text(name).to_ascii_uppercase(),
        None => String::new(),
    }
}

/// The argument expressions of a call, in order.
fn argument_nodes(node: &Node) -> Vec<&Node> {
    node.child_node(Rule::UdfExprList)
        .map(|list| {
            list.child_nodes(Rule::UdfExpr)
                .filter_map(Node::first_child_node)
                .collect()
        })
        .unwrap_or_default()
}

fn arity(name: &str, expected: &str, given: usize) -> Error {
    Error::invalid_token(format!(
        "Function {} expects {} arguments, {} given",
        name, expected, given
    ))
}

fn take<const N: usize>(name: &str, args: Vec<Expression>) -> Result<[Expression; N]> {
    let given = args.len();
    args.try_into()
        .map_err(|_| arity(name, &N.to_string(), given))
}

/// MySQL yields an empty string where SQLite would count from the other
/// end of the string.
fn empty_when(guard: Expression, otherwise: Expression) -> Expression {
    Expression::from_iter([raw("CASE"), raw("WHEN")])
        .then(guard)
        .with(raw("THEN"))
        .with(value(""))
        .with(raw("ELSE"))
        .then(otherwise)
        .with(raw("END"))
}

fn translate_function(name: &str, args: Vec<Expression>) -> Result<Expression> {
    match name {
        "ATAN" if args.len() == 2 => function("ATAN2", args),
        "LOG" if args.len() == 1 => function("LN", args),
        _ if PASSTHROUGH.contains(&name) => function(name, args),
        "CEILING" => function("CEIL", args),
        "POW" => function("POWER", args),
        "ASCII" => function("UNICODE", args),
        "CHAR_LENGTH" | "CHARACTER_LENGTH" => function("LENGTH", args),
        "LCASE" => function("LOWER", args),
        "UCASE" => function("UPPER", args),
        "IF" => function("IIF", args),
        "GREATEST" | "LEAST" => {
            if args.len() < 2 {
                return Err(arity(name, "at least 2", args.len()));
            }
            function(if name == "GREATEST" { "MAX" } else { "MIN" }, args)
        }
        "TIMESTAMP" if args.len() == 1 => function("DATETIME", args),
        "LAST_INSERT_ID" if args.is_empty() => function("LAST_INSERT_ROWID", args),
        "LAST_INSERT_ID" => Err(Error::unsupported("LAST_INSERT_ID(expr)")),

        "COT" => {
            let [x] = take::<1>(name, args)?;
            let tangent = function("TAN", vec![x])?;
            Ok(Expression::group(
                Expression::from_iter([factory::integer(1), raw("/")]).then(tangent),
            ))
        }
        "LEFT" => {
            let [text, length] = take::<2>(name, args)?;
            function("SUBSTR", vec![text, factory::integer(1).into(), length])
        }
        "RIGHT" => {
            let [text, length] = take::<2>(name, args)?;
            let start = Expression::from(raw("-")).then(Expression::group(length.clone()));
            let guard = Expression::group(length).with(raw("<")).with(factory::integer(1));
            Ok(empty_when(guard, function("SUBSTR", vec![text, start])?))
        }
        "SUBSTRING" | "SUBSTR" | "MID" if args.len() == 2 => {
            let [text, start] = take::<2>(name, args)?;
            let guard = Expression::group(start.clone()).with(raw("=")).with(factory::integer(0));
            Ok(empty_when(guard, function("SUBSTR", vec![text, start])?))
        }
        "SUBSTRING" | "SUBSTR" | "MID" => {
            let [text, start, length] = take::<3>(name, args)?;
            let guard = Expression::group(start.clone())
                .with(raw("="))
                .with(factory::integer(0))
                .with(raw("OR"))
                .then(Expression::group(length.clone()))
                .with(raw("<"))
                .with(factory::integer(1));
            Ok(empty_when(guard, function("SUBSTR", vec![text, start, length])?))
        }
        "LOCATE" | "POSITION" if args.len() == 2 => {
            let [needle, haystack] = take::<2>(name, args)?;
            function("INSTR", vec![haystack, needle])
        }
        "LOCATE" => {
            let [needle, haystack, start] = take::<3>(name, args)?;
            let found = function(
                "INSTR",
                vec![function("SUBSTR", vec![haystack, start.clone()])?, needle],
            )?;
            Ok(Expression::from(raw("CASE"))
                .with(raw("WHEN"))
                .then(found.clone())
                .with(raw(">"))
                .with(factory::integer(0))
                .with(raw("THEN"))
                .then(found)
                .with(raw("+"))
                .then(start)
                .with(raw("-"))
                .with(factory::integer(1))
                .with(raw("ELSE"))
                .with(factory::integer(0))
                .with(raw("END")))
        }
        "CONCAT" => {
            if args.is_empty() {
                return Err(arity(name, "at least 1", 0));
            }
            Ok(Expression::group(concatenation(args)))
        }
        "MOD" => {
            let [a, b] = take::<2>(name, args)?;
            Ok(Expression::group(a.with(raw("%")).then(b)))
        }
        "LENGTH" | "OCTET_LENGTH" => {
            let [text] = take::<1>(name, args)?;
            function("LENGTH", vec![cast(text, "BLOB")?])
        }
        "REPEAT" => {
            let [text, count] = take::<2>(name, args)?;
            repeat(text, count)
        }
        "SPACE" => {
            let [count] = take::<1>(name, args)?;
            repeat(value(" ").into(), count)
        }
        "ISNULL" => {
            let [x] = take::<1>(name, args)?;
            Ok(Expression::group(x.with(raw("IS")).with(raw("NULL"))))
        }
        "RAND" if args.is_empty() => {
            let random = function("ABS", vec![function("RANDOM", vec![])?])?;
            let scaled = Expression::group(random.with(raw("%")).with(factory::integer(1_000_000)));
            Ok(Expression::group(scaled.with(raw("/")).with(factory::number("1000000.0")?)))
        }
        "RAND" => Err(Error::unsupported("RAND(seed)")),

        "DATEDIFF" => {
            let [a, b] = take::<2>(name, args)?;
            let day = |d: Expression| function("JULIANDAY", vec![function("DATE", vec![d])?]);
            let difference = day(a)?.with(raw("-")).then(day(b)?);
            cast(difference, "INTEGER")
        }
        "DAY" | "DAYOFMONTH" | "DAYOFYEAR" | "HOUR" | "MINUTE" | "MONTH" | "SECOND" | "YEAR"
        | "DAYOFWEEK" | "WEEKDAY" | "QUARTER" | "WEEK" | "MICROSECOND" => {
            let [date] = take::<1>(name, args)?;
            date_part(name, date)
        }
        "NOW" | "CURRENT_TIMESTAMP" | "SYSDATE" | "UTC_TIMESTAMP" | "LOCALTIME"
        | "LOCALTIMESTAMP" => Ok(raw("CURRENT_TIMESTAMP").into()),
        "CURDATE" | "CURRENT_DATE" => Ok(raw("CURRENT_DATE").into()),
        "CURTIME" | "CURRENT_TIME" => Ok(raw("CURRENT_TIME").into()),
        "UNIX_TIMESTAMP" => {
            let date = match args.len() {
                0 => value("now").into(),
                _ => {
                    let [date] = take::<1>(name, args)?;
                    date
                }
            };
            strftime_integer("%s", date)
        }
        "FROM_UNIXTIME" => {
            let [seconds] = take::<1>(name, args)?;
            function("DATETIME", vec![seconds, value("unixepoch").into()])
        }
        "VERSION" => Ok(value(MYSQL_VERSION).into()),
        _ => Err(Error::unsupported(format!("function {}", name))),
    }
}

/// `CAST(x AS type)` for a MySQL cast type.
fn cast_to(operand: Expression, cast_type: &Node) -> Result<Expression> {
    let keyword = cast_type
        .first_child_token()
        .and_then(Token::keyword)
        .ok_or_else(|| Error::unsupported("cast without a type"))?;
    match keyword {
        Keyword::Signed | Keyword::Unsigned | Keyword::Int | Keyword::Integer | Keyword::Year => {
            cast(operand, "INTEGER")
        }
        Keyword::Char | Keyword::Nchar => cast(operand, "TEXT"),
        Keyword::Decimal | Keyword::Double | Keyword::Float | Keyword::Real => {
            cast(operand, "REAL")
        }
        Keyword::Binary => cast(operand, "BLOB"),
        Keyword::Date => function("DATE", vec![operand]),
        Keyword::Datetime => function("DATETIME", vec![operand]),
        Keyword::Time => function("TIME", vec![operand]),
        other => Err(Error::unsupported(format!("CAST to {}", other))),
    }
}

fn cast(operand: Expression, sqlite_type: &'static str) -> Result<Expression> {
    function("CAST", vec![operand.with(raw("AS")).with(raw(sqlite_type))])
}

fn strftime_integer(specifier: &str, date: Expression) -> Result<Expression> {
    cast(function("STRFTIME", vec![value(specifier).into(), date])?, "INTEGER")
}

/// A date part as an integer; `name` is a function or `EXTRACT` unit.
fn date_part(name: &str, date: Expression) -> Result<Expression> {
    let specifier = match name {
        "DAY" | "DAYOFMONTH" => "%d",
        "DAYOFYEAR" => "%j",
        "HOUR" => "%H",
        "MINUTE" => "%M",
        "MONTH" => "%m",
        "SECOND" => "%S",
        "YEAR" => "%Y",
        "DAYOFWEEK" => {
            let weekday = strftime_integer("%w", date)?;
            return Ok(Expression::group(weekday.with(raw("+")).with(factory::integer(1))));
        }
        "WEEKDAY" => {
            let weekday = strftime_integer("%w", date)?;
            let shifted = Expression::group(weekday.with(raw("+")).with(factory::integer(6)));
            return Ok(Expression::group(shifted.with(raw("%")).with(factory::integer(7))));
        }
        "QUARTER" => {
            let month = strftime_integer("%m", date)?;
            let shifted = Expression::group(month.with(raw("+")).with(factory::integer(2)));
            return Ok(Expression::group(shifted.with(raw("/")).with(factory::integer(3))));
        }
        other => return Err(Error::unsupported(format!("date part {}", other))),
    };
    strftime_integer(specifier, date)
}

/// `DATETIME(date, '±' || amount || ' <unit>s')`.
fn date_modifier(date: Expression, subtract: bool, amount: Expression, unit: Keyword) -> Result<Expression> {
    let (amount, unit) = match unit {
        Keyword::Second => (amount, " seconds"),
        Keyword::Minute => (amount, " minutes"),
        Keyword::Hour => (amount, " hours"),
        Keyword::Day => (amount, " days"),
        Keyword::Month => (amount, " months"),
        Keyword::Year => (amount, " years"),
        Keyword::Week => (
            Expression::group(amount.with(raw("*")).with(factory::integer(7))),
            " days",
        ),
        Keyword::Quarter => (
            Expression::group(amount.with(raw("*")).with(factory::integer(3))),
            " months",
        ),
        other => return Err(Error::unsupported(format!("INTERVAL unit {}", other))),
    };
    let modifier = Expression::from(value(if subtract { "-" } else { "+" }))
        .with(raw("||"))
        .then(amount)
        .with(raw("||"))
        .with(value(unit));
    function("DATETIME", vec![date, modifier])
}

/// `REPLACE(HEX(ZEROBLOB(count)), '00', text)`.
fn repeat(text: Expression, count: Expression) -> Result<Expression> {
    let zeros = function("HEX", vec![function("ZEROBLOB", vec![count])?])?;
    function("REPLACE", vec![zeros, value("00").into(), text])
}

fn concatenation(parts: Vec<Expression>) -> Expression {
    let mut expression = Expression::new();
    for (index, part) in parts.into_iter().enumerate() {
        if index > 0 {
            expression.push(raw("||"));
        }
        expression.append(part);
    }
    expression
}

/// Rewrite a `DATE_FORMAT` pattern for `STRFTIME`.
fn strftime_format(format: &str) -> Result<String> {
    let mut output = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }
        let Some(specifier) = chars.next() else {
            output.push_str("%%");
            break;
        };
        let (_, replacement) = DATE_FORMAT_SPECIFIERS
            .iter()
            .find(|(mysql, _)| *mysql == specifier)
            .ok_or_else(|| Error::unsupported(format!("DATE_FORMAT specifier %{}", specifier)))?;
        output.push_str(replacement);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::super::tests::translate;
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn sql(input: &str) -> String {
        translate(input).unwrap()
    }

    fn unsupported(input: &str) -> bool {
        matches!(translate(input), Err(Error::Unsupported(_)))
    }

    #[test]
    fn test_passthrough_and_renames() {
        assert_eq!(
            sql("SELECT ABS(a), CEILING(b), LCASE(c), IFNULL(d, 0)"),
            r#"SELECT ABS("a"), CEIL("b"), LOWER("c"), IFNULL("d", 0)"#
        );
        assert_eq!(sql("SELECT IF(a, 1, 2)"), r#"SELECT IIF("a", 1, 2)"#);
        assert_eq!(sql("SELECT LOG(a), LOG(2, a)"), r#"SELECT LN("a"), LOG(2, "a")"#);
        assert_eq!(sql("SELECT GREATEST(a, b)"), r#"SELECT MAX("a", "b")"#);
        assert_eq!(sql("SELECT LAST_INSERT_ID()"), "SELECT LAST_INSERT_ROWID()");
    }

    #[test]
    fn test_substrings_at_position_zero_are_empty() {
        assert_eq!(
            sql("SELECT MID(a, 1)"),
            r#"SELECT CASE WHEN (1) = 0 THEN '' ELSE SUBSTR("a", 1) END"#
        );
        assert_eq!(
            sql("SELECT SUBSTRING(a FROM 2 FOR 3)"),
            r#"SELECT CASE WHEN (2) = 0 OR (3) < 1 THEN '' ELSE SUBSTR("a", 2, 3) END"#
        );
    }

    #[test]
    fn test_composed_string_functions() {
        assert_eq!(sql("SELECT CONCAT(a, 'x')"), r#"SELECT ("a" || 'x')"#);
        assert_eq!(sql("SELECT LEFT(a, 2)"), r#"SELECT SUBSTR("a", 1, 2)"#);
        assert_eq!(
            sql("SELECT RIGHT(a, 2)"),
            r#"SELECT CASE WHEN (2) < 1 THEN '' ELSE SUBSTR("a", - (2)) END"#
        );
        assert_eq!(sql("SELECT LOCATE('b', a)"), r#"SELECT INSTR("a", 'b')"#);
        assert_eq!(sql("SELECT POSITION('b' IN a)"), r#"SELECT INSTR("a", 'b')"#);
        assert_eq!(
            sql("SELECT LOCATE('b', a, 3)"),
            concat!(
                r#"SELECT CASE WHEN INSTR(SUBSTR("a", 3), 'b') > 0 "#,
                r#"THEN INSTR(SUBSTR("a", 3), 'b') + 3 - 1 ELSE 0 END"#
            )
        );
        assert_eq!(sql("SELECT LENGTH(a)"), r#"SELECT LENGTH(CAST("a" AS BLOB))"#);
        assert_eq!(
            sql("SELECT REPEAT('ab', 3)"),
            "SELECT REPLACE(HEX(ZEROBLOB(3)), '00', 'ab')"
        );
        assert_eq!(sql("SELECT ISNULL(a), MOD(a, 2)"), r#"SELECT ("a" IS NULL), ("a" % 2)"#);
        assert_eq!(sql("SELECT COT(a)"), r#"SELECT (1 / TAN("a"))"#);
    }

    #[test]
    fn test_cast() {
        assert_eq!(
            sql("SELECT CAST(a AS UNSIGNED), CAST(a AS CHAR(10)), CAST(a AS DATE)"),
            r#"SELECT CAST("a" AS INTEGER), CAST("a" AS TEXT), DATE("a")"#
        );
        assert_eq!(sql("SELECT CONVERT(a, SIGNED)"), r#"SELECT CAST("a" AS INTEGER)"#);
        assert_eq!(sql("SELECT CONVERT(a USING utf8mb4)"), r#"SELECT "a""#);
        assert!(unsupported("SELECT CAST(a AS JSON)"));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            sql("SELECT DATE_FORMAT(d, '%Y-%m-%d %H:%i:%s')"),
            r#"SELECT STRFTIME('%Y-%m-%d %H:%M:%S', "d")"#
        );
        assert!(unsupported("SELECT DATE_FORMAT(d, '%a')"));
        assert!(unsupported("SELECT DATE_FORMAT(d, f)"));
        assert_eq!(
            sql("SELECT YEAR(d), DAYOFWEEK(d)"),
            concat!(
                r#"SELECT CAST(STRFTIME('%Y', "d") AS INTEGER), "#,
                r#"(CAST(STRFTIME('%w', "d") AS INTEGER) + 1)"#
            )
        );
        assert_eq!(
            sql("SELECT EXTRACT(MONTH FROM d)"),
            r#"SELECT CAST(STRFTIME('%m', "d") AS INTEGER)"#
        );
        assert_eq!(
            sql("SELECT DATE_ADD(d, INTERVAL 2 WEEK)"),
            r#"SELECT DATETIME("d", '+' || (2 * 7) || ' days')"#
        );
        assert_eq!(
            sql("SELECT DATE_SUB(NOW(), INTERVAL 1 HOUR)"),
            r#"SELECT DATETIME(CURRENT_TIMESTAMP, '-' || 1 || ' hours')"#
        );
        assert_eq!(
            sql("SELECT ADDDATE(d, 3)"),
            r#"SELECT DATETIME("d", '+' || 3 || ' days')"#
        );
        assert_eq!(
            sql("SELECT NOW(), CURRENT_TIMESTAMP, CURDATE(), UTC_TIMESTAMP()"),
            "SELECT CURRENT_TIMESTAMP, CURRENT_TIMESTAMP, CURRENT_DATE, CURRENT_TIMESTAMP"
        );
        assert_eq!(
            sql("SELECT UNIX_TIMESTAMP()"),
            "SELECT CAST(STRFTIME('%s', 'now') AS INTEGER)"
        );
        assert_eq!(
            sql("SELECT DATEDIFF(a, b)"),
            r#"SELECT CAST(JULIANDAY(DATE("a")) - JULIANDAY(DATE("b")) AS INTEGER)"#
        );
        assert!(unsupported("SELECT DATE_ADD(d, INTERVAL 1 MICROSECOND)"));
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(
            sql("SELECT COUNT(*), COUNT(DISTINCT a), SUM(b)"),
            r#"SELECT COUNT(*), COUNT(DISTINCT "a"), SUM("b")"#
        );
        assert_eq!(
            sql("SELECT GROUP_CONCAT(DISTINCT a SEPARATOR ',')"),
            r#"SELECT GROUP_CONCAT(DISTINCT "a")"#
        );
        assert_eq!(
            sql("SELECT GROUP_CONCAT(a SEPARATOR '; ')"),
            r#"SELECT GROUP_CONCAT("a", '; ')"#
        );
        assert!(unsupported("SELECT GROUP_CONCAT(a ORDER BY a)"));
    }

    #[test]
    fn test_session_functions() {
        assert_eq!(sql("SELECT DATABASE(), VERSION()"), "SELECT 'wp', '8.0.38'");
        assert_eq!(
            sql("SELECT RAND()"),
            "SELECT ((ABS(RANDOM()) % 1000000) / 1000000.0)"
        );

        let grammar = Grammar::mysql();
        let tree = parse(&grammar, "SELECT FOUND_ROWS()").unwrap();
        let mut translator = Translator::new("wp");
        assert!(matches!(
            translator.translate_to_sql(&tree),
            Err(Error::Unsupported(_))
        ));
        assert!(translator.has_seen_found_rows());
    }

    #[test]
    fn test_unknown_functions() {
        assert!(unsupported("SELECT MD5(a)"));
        assert!(unsupported("SELECT CONCAT_WS(',', a, b)"));
        assert!(matches!(
            translate("SELECT LEFT(a)"),
            Err(Error::InvalidToken(_))
        ));
    }
}
