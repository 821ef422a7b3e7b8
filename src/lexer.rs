//! MySQL tokenizer using nom.
//!
//! Splits a statement into [`Token`]s, skipping whitespace and comments.
//! Words are classified against the [`Grammar`] keyword table. The token
//! stream always ends with an EOF token.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of},
    combinator::{opt, peek, recognize, value},
    multi::many0,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::ast::{Token, TokenKind};
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Symbol};

/// Tokenize a complete statement.
pub fn tokenize(grammar: &Grammar, sql: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = sql;

    loop {
        if let Ok((remaining, _)) = skip_trivia(rest) {
            rest = remaining;
        }
        let position = sql.len() - rest.len();
        if rest.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", position));
            return Ok(tokens);
        }

        match lex_token(grammar, rest) {
            Ok((remaining, (kind, text))) => {
                tokens.push(Token::new(kind, text, position));
                rest = remaining;
            }
            Err(_) => {
                let snippet: String = rest.chars().take(16).collect();
                return Err(Error::parse(
                    position,
                    format!("Unexpected input near '{}'", snippet),
                ));
            }
        }
    }
}

/// Whitespace, `-- ` and `#` line comments, and `/* */` block comments.
fn skip_trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), line_comment),
            value((), block_comment),
        ))),
    )(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    alt((
        preceded(tag("#"), not_line_ending),
        // MySQL requires whitespace (or end of input) after the double dash.
        preceded(
            pair(
                tag("--"),
                alt((value((), peek(one_of(" \t\r\n"))), value((), end_of_input))),
            ),
            not_line_ending,
        ),
    ))(input)
}

fn end_of_input(input: &str) -> IResult<&str, &str> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Eof,
        )))
    }
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn lex_token<'a>(grammar: &Grammar, input: &'a str) -> IResult<&'a str, (TokenKind, &'a str)> {
    match input.chars().next() {
        Some('`') => quoted('`', TokenKind::BackTickQuotedId, input),
        Some('\'') => quoted('\'', TokenKind::SingleQuotedText, input),
        Some('"') => quoted('"', TokenKind::DoubleQuotedText, input),
        Some('?') => Ok((&input[1..], (TokenKind::ParamMarker, &input[..1]))),
        Some('@') if !input.starts_with("@@") => user_variable(input),
        Some(c) if c.is_ascii_digit() => number(input).or_else(|_| word(grammar, input)),
        Some(c) if is_word_char(c) => word(grammar, input),
        _ => symbol(input),
    }
}

/// A quoted run ending at the first unescaped, undoubled closing quote.
fn quoted(quote: char, kind: TokenKind, input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (body, _) = char(quote)(input)?;
    let backslash_escapes = quote != '`';
    let mut chars = body.char_indices();
    while let Some((index, c)) = chars.next() {
        if c == '\\' && backslash_escapes {
            chars.next();
        } else if c == quote {
            if body[index + 1..].starts_with(quote) {
                chars.next();
            } else {
                let end = 1 + index + 1;
                return Ok((&input[end..], (kind, &input[..end])));
            }
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn number(input: &str) -> IResult<&str, (TokenKind, &str)> {
    if let Ok((rest, text)) = hex_number(input) {
        return Ok((rest, (TokenKind::HexNumber, text)));
    }
    if let Ok((rest, text)) = float_number(input) {
        return Ok((rest, (TokenKind::FloatNumber, text)));
    }
    if let Ok((rest, text)) = decimal_number(input) {
        return Ok((rest, (TokenKind::DecimalNumber, text)));
    }
    let (rest, text) = terminated(digit1, not_word_char)(input)?;
    Ok((rest, (TokenKind::IntNumber, text)))
}

fn hex_number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(
            alt((tag("0x"), tag("0X"))),
            take_while1(|c: char| c.is_ascii_hexdigit()),
        )),
        not_word_char,
    )(input)
}

fn float_number(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit0)),
            one_of("eE"),
            opt(one_of("+-")),
            digit1,
        ))),
        not_word_char,
    )(input)
}

fn decimal_number(input: &str) -> IResult<&str, &str> {
    terminated(recognize(tuple((digit1, char('.'), digit0))), not_word_char)(input)
}

/// Succeeds without consuming when the next char cannot continue a word.
fn not_word_char(input: &str) -> IResult<&str, ()> {
    match input.chars().next() {
        Some(c) if is_word_char(c) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
        _ => Ok((input, ())),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn word<'a>(grammar: &Grammar, input: &'a str) -> IResult<&'a str, (TokenKind, &'a str)> {
    let (rest, text) = take_while1(is_word_char)(input)?;
    let kind = match grammar.keyword(text) {
        Some(keyword) => TokenKind::Keyword(keyword),
        None => TokenKind::Identifier,
    };
    Ok((rest, (kind, text)))
}

/// `@name` or `` @`quoted` `` user variables.
fn user_variable(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (body, _) = char('@')(input)?;
    let rest = if body.starts_with('`') {
        quoted('`', TokenKind::UserVariable, body)?.0
    } else {
        take_while1(is_word_char)(body)?.0
    };
    Ok((rest, (TokenKind::UserVariable, &input[..input.len() - rest.len()])))
}

fn symbol(input: &str) -> IResult<&str, (TokenKind, &str)> {
    for symbol in Symbol::ALL {
        let text = symbol.as_str();
        if input.starts_with(text) {
            return Ok((&input[text.len()..], (TokenKind::Symbol(*symbol), &input[..text.len()])));
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Tag,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Keyword;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        let grammar = Grammar::mysql();
        tokenize(&grammar, sql)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn values(sql: &str) -> Vec<String> {
        let grammar = Grammar::mysql();
        tokenize(&grammar, sql)
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            kinds("SELECT a FROM `t`"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::From),
                TokenKind::BackTickQuotedId,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select Auto_Increment"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::AutoIncrement),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 1.5 2. 1e10 1.5E-3 0xFF"),
            vec![
                TokenKind::IntNumber,
                TokenKind::DecimalNumber,
                TokenKind::DecimalNumber,
                TokenKind::FloatNumber,
                TokenKind::FloatNumber,
                TokenKind::HexNumber,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            values(r#"'it''s' 'a\'b' "x""y""#),
            vec!["'it''s'", r"'a\'b'", r#""x""y""#, ""]
        );
    }

    #[test]
    fn test_multi_char_operators() {
        assert_eq!(
            values("a<=>b<>c!=d<=e>=f||g&&h"),
            vec!["a", "<=>", "b", "<>", "c", "!=", "d", "<=", "e", ">=", "f", "||", "g", "&&", "h", ""]
        );
    }

    #[test]
    fn test_variables_and_placeholders() {
        assert_eq!(
            kinds("@@sql_mode @x ?"),
            vec![
                TokenKind::Symbol(Symbol::AtAt),
                TokenKind::Identifier,
                TokenKind::UserVariable,
                TokenKind::ParamMarker,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            values("SELECT 1 -- trailing\n# hash\n/* block */ , 2"),
            vec!["SELECT", "1", ",", "2", ""]
        );
    }

    #[test]
    fn test_double_dash_needs_space() {
        assert_eq!(values("1--1"), vec!["1", "-", "-", "1", ""]);
    }

    #[test]
    fn test_positions() {
        let grammar = Grammar::mysql();
        let tokens = tokenize(&grammar, "SELECT  a").unwrap();
        assert_eq!(tokens[1].position, 8);
        assert_eq!(tokens[2].position, 9);
    }

    #[test]
    fn test_unterminated_string() {
        let grammar = Grammar::mysql();
        let err = tokenize(&grammar, "SELECT 'abc").unwrap_err();
        assert!(matches!(err, Error::Parse { position: 7, .. }));
    }

    #[test]
    fn test_identifier_starting_with_digit_prefix() {
        assert_eq!(kinds("1abc"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }
}
