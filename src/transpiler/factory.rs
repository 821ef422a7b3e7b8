//! Token factory: the only way to create output tokens.
//!
//! Raw tokens take `&'static str`, so text that came from a statement can
//! reach the output only through [`identifier`] (quoted at render time) or
//! [`value`] (escaped here).

use super::expression::{Expression, SqliteToken, SqliteTokenKind};
use crate::error::{Error, Result};

/// Keywords and symbols accepted by [`operator`].
const OPERATORS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "LIKE",
    "IS", "NULL", "AS", "ON", "JOIN", "LEFT", "RIGHT", "INNER", "OUTER", "ORDER", "BY", "GROUP",
    "HAVING", "LIMIT", "OFFSET", "UNION", "ALL", "DISTINCT", "CASE", "WHEN", "THEN", "ELSE",
    "END", "BETWEEN", "EXISTS", "ASC", "DESC", "SET", "VALUES", "INTO", "CREATE", "TABLE",
    "ALTER", "DROP", "INDEX", "PRIMARY", "KEY", "UNIQUE", "DEFAULT", "(", ")", ",", ".", ";",
    "+", "-", "*", "/", "%", "=", "<>", "!=", "<", "<=", ">", ">=", "||", "&", "|", "<<", ">>",
    "~",
];

/// SQLite function arity: `(name, minimum, maximum)`; `None` means unbounded.
const FUNCTIONS: &[(&str, usize, Option<usize>)] = &[
    ("ABS", 1, Some(1)),
    ("ACOS", 1, Some(1)),
    ("ASIN", 1, Some(1)),
    ("ATAN", 1, Some(1)),
    ("ATAN2", 2, Some(2)),
    ("AVG", 1, Some(1)),
    ("CAST", 1, Some(1)),
    ("CEIL", 1, Some(1)),
    ("CHANGES", 0, Some(0)),
    ("CHAR", 1, None),
    ("COALESCE", 2, None),
    ("COS", 1, Some(1)),
    ("COUNT", 1, Some(1)),
    ("DATE", 1, None),
    ("DATETIME", 1, None),
    ("DEGREES", 1, Some(1)),
    ("EXP", 1, Some(1)),
    ("FLOOR", 1, Some(1)),
    ("GROUP_CONCAT", 1, Some(2)),
    ("HEX", 1, Some(1)),
    ("IFNULL", 2, Some(2)),
    ("IIF", 3, Some(3)),
    ("INSTR", 2, Some(2)),
    ("JULIANDAY", 1, None),
    ("LAST_INSERT_ROWID", 0, Some(0)),
    ("LENGTH", 1, Some(1)),
    ("LN", 1, Some(1)),
    ("LOG", 1, Some(2)),
    ("LOG10", 1, Some(1)),
    ("LOG2", 1, Some(1)),
    ("LOWER", 1, Some(1)),
    ("LTRIM", 1, Some(2)),
    ("MAX", 1, None),
    ("MIN", 1, None),
    ("NULLIF", 2, Some(2)),
    ("PI", 0, Some(0)),
    ("POWER", 2, Some(2)),
    ("QUOTE", 1, Some(1)),
    ("RADIANS", 1, Some(1)),
    ("RANDOM", 0, Some(0)),
    ("REPLACE", 3, Some(3)),
    ("ROUND", 1, Some(2)),
    ("RTRIM", 1, Some(2)),
    ("SIGN", 1, Some(1)),
    ("SIN", 1, Some(1)),
    ("SQRT", 1, Some(1)),
    ("STRFTIME", 2, None),
    ("SUBSTR", 2, Some(3)),
    ("SUM", 1, Some(1)),
    ("TAN", 1, Some(1)),
    ("TIME", 1, None),
    ("TOTAL", 1, Some(1)),
    ("TRIM", 1, Some(2)),
    ("UNICODE", 1, Some(1)),
    ("UPPER", 1, Some(1)),
    ("ZEROBLOB", 1, Some(1)),
];

/// Fixed SQL text.
pub fn raw(text: &'static str) -> SqliteToken {
    SqliteToken::new(SqliteTokenKind::Raw, text)
}

pub fn identifier(name: &str) -> SqliteToken {
    SqliteToken::new(SqliteTokenKind::Identifier, name)
}

/// A string literal: quotes and backslashes doubled, NUL bytes stripped.
pub fn value(text: &str) -> SqliteToken {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('\'');
    for c in text.chars() {
        match c {
            '\'' => escaped.push_str("''"),
            '\\' => escaped.push_str("\\\\"),
            '\0' => {}
            other => escaped.push(other),
        }
    }
    escaped.push('\'');
    SqliteToken::new(SqliteTokenKind::Value, escaped)
}

/// A numeric literal. Accepts decimal integers, decimals, exponents and `0x` hex.
pub fn number(text: &str) -> Result<SqliteToken> {
    if is_number(text) {
        Ok(SqliteToken::new(SqliteTokenKind::Value, text))
    } else {
        Err(Error::invalid_token(format!("Invalid number: {}", text)))
    }
}

pub fn integer(n: i64) -> SqliteToken {
    SqliteToken::new(SqliteTokenKind::Value, n.to_string())
}

pub fn boolean(b: bool) -> SqliteToken {
    SqliteToken::new(SqliteTokenKind::Value, if b { "1" } else { "0" })
}

pub fn null() -> SqliteToken {
    SqliteToken::new(SqliteTokenKind::Value, "NULL")
}

/// A keyword or symbol from the allow-list. Keywords are uppercased.
pub fn operator(text: &str) -> Result<SqliteToken> {
    let upper = text.to_ascii_uppercase();
    match OPERATORS.iter().find(|op| **op == upper) {
        Some(op) => Ok(SqliteToken::new(SqliteTokenKind::Operator, *op)),
        None => Err(Error::invalid_token(format!(
            "Invalid SQLite operator or keyword: {}",
            text
        ))),
    }
}

/// `NAME(arg, arg, ...)` after checking the name and arity.
pub fn function(name: &str, args: Vec<Expression>) -> Result<Expression> {
    let upper = name.to_ascii_uppercase();
    let Some(&(canonical, min, max)) = FUNCTIONS.iter().find(|(n, _, _)| *n == upper) else {
        return Err(Error::invalid_token(format!("Unknown SQLite function: {}", name)));
    };
    if args.len() < min || max.is_some_and(|max| args.len() > max) {
        let expected = match max {
            Some(max) if max == min => format!("{}", min),
            Some(max) => format!("between {} and {}", min, max),
            None => format!("at least {}", min),
        };
        return Err(Error::invalid_token(format!(
            "Function {} expects {} arguments, {} given",
            canonical,
            expected,
            args.len()
        )));
    }

    let mut expression = Expression::from(raw(canonical)).with(raw("("));
    for (index, arg) in args.into_iter().enumerate() {
        if index > 0 {
            expression.push(raw(","));
        }
        expression.append(arg);
    }
    expression.push(raw(")"));
    Ok(expression)
}

/// Whether a raw token names a registered function. The builder glues
/// such names to their opening parenthesis.
pub fn is_function(name: &str) -> bool {
    FUNCTIONS.iter().any(|(n, _, _)| *n == name)
}

fn is_number(text: &str) -> bool {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());

    let mantissa_ok = digits(int_part)
        && frac_part.map_or(true, digits)
        && !(int_part.is_empty() && frac_part.map_or(true, str::is_empty));
    let exponent_ok = exponent.map_or(true, |exp| {
        let unsigned = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        !unsigned.is_empty() && digits(unsigned)
    });
    mantissa_ok && exponent_ok
}
