//! Parse tree model.
//!
//! The parser produces a tree of [`Node`]s whose leaves are [`Token`]s.
//! Consumers walk it with pattern matching over [`Child`]. The tree is
//! read-only once built; the only mutation is appending children while
//! parsing, which merges fragment nodes into their parent.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use crate::grammar::{Keyword, Rule, Symbol};

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    BackTickQuotedId,
    SingleQuotedText,
    DoubleQuotedText,
    IntNumber,
    DecimalNumber,
    FloatNumber,
    HexNumber,
    ParamMarker,
    UserVariable,
    Symbol(Symbol),
    Eof,
}

impl TokenKind {
    /// Numeric token type. Keywords and symbols get disjoint ranges.
    pub fn id(self) -> u16 {
        match self {
            TokenKind::Eof => 0,
            TokenKind::Identifier => 1,
            TokenKind::BackTickQuotedId => 2,
            TokenKind::SingleQuotedText => 3,
            TokenKind::DoubleQuotedText => 4,
            TokenKind::IntNumber => 5,
            TokenKind::DecimalNumber => 6,
            TokenKind::FloatNumber => 7,
            TokenKind::HexNumber => 8,
            TokenKind::ParamMarker => 9,
            TokenKind::UserVariable => 10,
            TokenKind::Symbol(symbol) => 100 + symbol as u16,
            TokenKind::Keyword(keyword) => 1000 + keyword as u16,
        }
    }

    pub fn is_number(self) -> bool {
        matches!(
            self,
            TokenKind::IntNumber
                | TokenKind::DecimalNumber
                | TokenKind::FloatNumber
                | TokenKind::HexNumber
        )
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            TokenKind::SingleQuotedText | TokenKind::DoubleQuotedText
        )
    }
}

/// A leaf of the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw source text.
    pub value: String,
    /// Byte offset in the statement.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn id(&self) -> u16 {
        self.kind.id()
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self.kind {
            TokenKind::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    /// The token's logical value: identifiers without backticks and strings
    /// with quotes removed and MySQL escapes decoded.
    pub fn text(&self) -> Cow<'_, str> {
        match self.kind {
            TokenKind::BackTickQuotedId => Cow::Owned(unquote(&self.value, '`', false)),
            TokenKind::SingleQuotedText => Cow::Owned(unquote(&self.value, '\'', true)),
            TokenKind::DoubleQuotedText => Cow::Owned(unquote(&self.value, '"', true)),
            _ => Cow::Borrowed(&self.value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Strip the surrounding quote and decode doubled quotes and, for string
/// literals, MySQL backslash escapes.
fn unquote(raw: &str, quote: char, backslash_escapes: bool) -> String {
    let inner = raw
        .strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote && chars.peek() == Some(&quote) {
            chars.next();
            out.push(quote);
        } else if c == '\\' && backslash_escapes {
            match chars.next() {
                Some('0') => out.push('\0'),
                Some('b') => out.push('\u{8}'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('Z') => out.push('\u{1a}'),
                // \% and \_ keep their backslash for LIKE patterns.
                Some('%') => out.push_str("\\%"),
                Some('_') => out.push_str("\\_"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A child of a parse tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(Node),
    Token(Token),
}

impl Child {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(token) => Some(token),
            Child::Node(_) => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Token> for Child {
    fn from(token: Token) -> Self {
        Child::Token(token)
    }
}

/// An interior node of the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub rule: Rule,
    children: Vec<Child>,
}

impl Node {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            children: Vec::new(),
        }
    }

    /// A fragment node; its children are spliced into whatever it is pushed onto.
    pub fn fragment() -> Self {
        Self::new(Rule::Fragment)
    }

    pub fn with_children(rule: Rule, children: impl IntoIterator<Item = Child>) -> Self {
        let mut node = Self::new(rule);
        for child in children {
            node.push(child);
        }
        node
    }

    /// Append a child. Fragment nodes are merged into this node's children.
    pub fn push(&mut self, child: impl Into<Child>) {
        match child.into() {
            Child::Node(node) if node.rule.is_fragment() => {
                self.children.extend(node.children);
            }
            child => self.children.push(child),
        }
    }

    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn first_child(&self) -> Option<&Child> {
        self.children.first()
    }

    pub fn first_child_node(&self) -> Option<&Node> {
        self.children.iter().find_map(Child::as_node)
    }

    pub fn first_child_token(&self) -> Option<&Token> {
        self.children.iter().find_map(Child::as_token)
    }

    /// First direct child node with the given rule.
    pub fn child_node(&self, rule: Rule) -> Option<&Node> {
        self.child_nodes(rule).next()
    }

    pub fn child_nodes(&self, rule: Rule) -> impl Iterator<Item = &Node> {
        self.all_child_nodes().filter(move |node| node.rule == rule)
    }

    pub fn all_child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// First direct child token of the given kind.
    pub fn child_token(&self, kind: TokenKind) -> Option<&Token> {
        self.child_tokens(kind).next()
    }

    pub fn child_tokens(&self, kind: TokenKind) -> impl Iterator<Item = &Token> {
        self.all_child_tokens().filter(move |token| token.kind == kind)
    }

    pub fn all_child_tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(Child::as_token)
    }

    pub fn has_child_node(&self, rule: Rule) -> bool {
        self.child_node(rule).is_some()
    }

    pub fn has_child_token(&self, kind: TokenKind) -> bool {
        self.child_token(kind).is_some()
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.has_child_token(TokenKind::Keyword(keyword))
    }

    pub fn has_symbol(&self, symbol: Symbol) -> bool {
        self.has_child_token(TokenKind::Symbol(symbol))
    }

    /// Breadth-first search for the nearest descendant node with the given rule.
    pub fn descendant_node(&self, rule: Rule) -> Option<&Node> {
        let mut queue: VecDeque<&Node> = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            if let Some(found) = node.child_node(rule) {
                return Some(found);
            }
            queue.extend(node.all_child_nodes());
        }
        None
    }

    /// All descendant nodes with the given rule, in document order.
    pub fn descendant_nodes(&self, rule: Rule) -> Vec<&Node> {
        let mut found = Vec::new();
        self.collect_nodes(rule, &mut found);
        found
    }

    fn collect_nodes<'a>(&'a self, rule: Rule, found: &mut Vec<&'a Node>) {
        for child in self.all_child_nodes() {
            if child.rule == rule {
                found.push(child);
            }
            child.collect_nodes(rule, found);
        }
    }

    /// Breadth-first search for the nearest descendant token of the given kind.
    pub fn descendant_token(&self, kind: TokenKind) -> Option<&Token> {
        let mut queue: VecDeque<&Node> = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            if let Some(found) = node.child_token(kind) {
                return Some(found);
            }
            queue.extend(node.all_child_nodes());
        }
        None
    }

    /// All descendant tokens of the given kind, in document order.
    pub fn descendant_tokens(&self, kind: TokenKind) -> Vec<&Token> {
        self.tokens().filter(|token| token.kind == kind).collect()
    }

    /// Every descendant (nodes and tokens), depth-first in document order.
    pub fn descendants(&self) -> Vec<&Child> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Child>) {
        for child in &self.children {
            out.push(child);
            if let Child::Node(node) = child {
                node.collect_descendants(out);
            }
        }
    }

    /// Every token under this node, in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.descendants().into_iter().filter_map(Child::as_token)
    }

    pub fn has_descendant_keyword(&self, keyword: Keyword) -> bool {
        self.tokens().any(|token| token.is_keyword(keyword))
    }

    /// Logical text of all tokens concatenated without separators.
    pub fn text(&self) -> String {
        self.tokens().map(|token| token.text()).collect()
    }

    /// Render the tree as an indented outline, one rule or token per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.rule.name());
        out.push('\n');
        for child in &self.children {
            match child {
                Child::Node(node) => node.write_outline(depth + 1, out),
                Child::Token(token) if token.kind == TokenKind::Eof => {}
                Child::Token(token) => {
                    out.push_str(&"  ".repeat(depth + 1));
                    out.push_str(&token.value);
                    out.push('\n');
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(kw: Keyword) -> Token {
        Token::new(TokenKind::Keyword(kw), kw.as_str(), 0)
    }

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, 0)
    }

    fn sample_tree() -> Node {
        // select_statement
        //   SELECT
        //   select_item_list
        //     column_ref(a)
        //   from_clause
        //     FROM
        //     table_ref
        //       identifier(t)
        let mut item = Node::new(Rule::SelectItemList);
        item.push(Node::with_children(Rule::ColumnRef, [ident("a").into()]));

        let mut table = Node::new(Rule::TableRef);
        table.push(Node::with_children(Rule::Identifier, [ident("t").into()]));

        let mut from = Node::new(Rule::FromClause);
        from.push(keyword(Keyword::From));
        from.push(table);

        let mut root = Node::new(Rule::QuerySpecification);
        root.push(keyword(Keyword::Select));
        root.push(item);
        root.push(from);
        root
    }

    #[test]
    fn test_fragments_are_merged() {
        let mut fragment = Node::fragment();
        fragment.push(keyword(Keyword::If));
        fragment.push(keyword(Keyword::Not));

        let mut node = Node::new(Rule::CreateTable);
        node.push(keyword(Keyword::Table));
        node.push(fragment);
        node.push(ident("t"));

        let values: Vec<&str> = node
            .children()
            .iter()
            .map(|child| child.as_token().map(|t| t.value.as_str()).unwrap_or("?"))
            .collect();
        assert_eq!(values, vec!["TABLE", "IF", "NOT", "t"]);
        assert!(node.all_child_nodes().next().is_none());
    }

    #[test]
    fn test_child_queries() {
        let tree = sample_tree();
        assert!(tree.has_keyword(Keyword::Select));
        assert!(!tree.has_keyword(Keyword::Where));
        assert!(tree.has_child_node(Rule::FromClause));
        assert!(!tree.has_child_node(Rule::TableRef));
        assert_eq!(tree.first_child_node().map(|n| n.rule), Some(Rule::SelectItemList));
        assert_eq!(tree.first_child_token().map(|t| t.id()), Some(keyword(Keyword::Select).id()));
    }

    #[test]
    fn test_descendant_queries() {
        let tree = sample_tree();
        let table = tree.descendant_node(Rule::TableRef).expect("table ref");
        assert_eq!(table.text(), "t");

        let identifiers = tree.descendant_tokens(TokenKind::Identifier);
        let names: Vec<&str> = identifiers.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(names, vec!["a", "t"]);

        assert_eq!(tree.descendant_nodes(Rule::Identifier).len(), 1);
        assert_eq!(tree.descendants().len(), 9);
        assert_eq!(
            tree.descendant_token(TokenKind::Keyword(Keyword::From)).map(|t| t.position),
            Some(0)
        );
    }

    #[test]
    fn test_token_text_unquotes() {
        let tick = Token::new(TokenKind::BackTickQuotedId, "`my``col`", 0);
        assert_eq!(tick.text(), "my`col");

        let single = Token::new(TokenKind::SingleQuotedText, r"'it''s a \'test\'\n'", 0);
        assert_eq!(single.text(), "it's a 'test'\n");

        let double = Token::new(TokenKind::DoubleQuotedText, r#""say ""hi""""#, 0);
        assert_eq!(double.text(), "say \"hi\"");

        let like = Token::new(TokenKind::SingleQuotedText, r"'100\%'", 0);
        assert_eq!(like.text(), r"100\%");
    }

    #[test]
    fn test_token_ids_are_distinct() {
        assert_ne!(TokenKind::Identifier.id(), TokenKind::Eof.id());
        assert_ne!(
            TokenKind::Keyword(Keyword::Select).id(),
            TokenKind::Keyword(Keyword::From).id()
        );
        assert_ne!(
            TokenKind::Symbol(Symbol::LParen).id(),
            TokenKind::Symbol(Symbol::RParen).id()
        );
    }

    #[test]
    fn test_outline() {
        let tree = sample_tree();
        let outline = tree.outline();
        assert!(outline.starts_with("querySpecification\n  SELECT\n  selectItemList\n"));
        assert!(outline.contains("      identifier\n        t\n"));
    }
}
