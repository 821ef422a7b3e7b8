//! SQLite output IR.
//!
//! An [`Expression`] is a flat list of [`SqliteToken`]s and explicit
//! parenthesized groups. Tokens can only be created through
//! [`factory`](super::factory), which is where quoting and escaping happen.

/// The four kinds of output token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteTokenKind {
    /// Fixed SQL text chosen by the translator.
    Raw,
    /// A name; rendered double-quoted.
    Identifier,
    /// An already-escaped literal.
    Value,
    /// A keyword or symbol from the operator allow-list.
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteToken {
    kind: SqliteTokenKind,
    text: String,
}

impl SqliteToken {
    pub(super) fn new(kind: SqliteTokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> SqliteTokenKind {
        self.kind
    }

    /// Token text before rendering (identifiers are stored unquoted).
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Token(SqliteToken),
    /// Rendered in parentheses.
    Group(Expression),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expression {
    elements: Vec<Element>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate the given parts, skipping `None`s. Nested expressions are
    /// flattened into this one.
    pub fn from_parts(parts: impl IntoIterator<Item = Option<Expression>>) -> Self {
        let mut expression = Self::new();
        for part in parts.into_iter().flatten() {
            expression.append(part);
        }
        expression
    }

    /// An expression holding a single parenthesized group.
    pub fn group(inner: Expression) -> Self {
        Self {
            elements: vec![Element::Group(inner)],
        }
    }

    pub fn push(&mut self, token: SqliteToken) {
        self.elements.push(Element::Token(token));
    }

    /// Append another expression's elements (flattening).
    pub fn append(&mut self, other: Expression) {
        self.elements.extend(other.elements);
    }

    pub fn push_group(&mut self, inner: Expression) {
        self.elements.push(Element::Group(inner));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, token: SqliteToken) -> Self {
        self.push(token);
        self
    }

    /// Builder-style [`append`](Self::append).
    pub fn then(mut self, other: Expression) -> Self {
        self.append(other);
        self
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

impl From<SqliteToken> for Expression {
    fn from(token: SqliteToken) -> Self {
        Self {
            elements: vec![Element::Token(token)],
        }
    }
}

impl FromIterator<SqliteToken> for Expression {
    fn from_iter<I: IntoIterator<Item = SqliteToken>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().map(Element::Token).collect(),
        }
    }
}
