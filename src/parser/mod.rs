//! Recursive-descent parser for the MySQL dialect.
//!
//! Produces an [`ast::Node`](crate::ast::Node) tree rooted at the `query`
//! rule. The tree keeps every significant source token so that the
//! translator can walk it rule by rule.
//!
//! # Tree shape
//!
//! ```text
//! query
//! ├── simpleStatement
//! │   └── selectStatement | insertStatement | updateStatement | ...
//! ├── ;            (optional)
//! └── <EOF>
//! ```

mod ddl;
mod expr;

use crate::ast::{Node, Token, TokenKind};
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Keyword, Rule, Symbol};
use crate::lexer::tokenize;

/// Parse a single MySQL statement.
pub fn parse(grammar: &Grammar, sql: &str) -> Result<Node> {
    Parser::new(grammar, sql)?.parse()
}

/// A parser over one tokenized statement.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, sql: &str) -> Result<Self> {
        let tokens = tokenize(grammar, sql)?;
        Ok(Self {
            grammar,
            tokens,
            pos: 0,
        })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Parse the whole statement.
    pub fn parse(mut self) -> Result<Node> {
        let mut query = Node::new(Rule::Query);
        query.push(self.parse_simple_statement()?);
        if let Some(semicolon) = self.eat_symbol(Symbol::Semicolon) {
            query.push(semicolon);
        }
        if !self.at_eof() {
            return Err(self.unexpected("end of statement"));
        }
        query.push(self.advance());
        Ok(query)
    }

    // ---------------------------------------------------------------------
    // Token cursor
    // ---------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn at(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    fn at_nth(&self, n: usize, keyword: Keyword) -> bool {
        self.peek_nth(n).is_keyword(keyword)
    }

    fn at_any(&self, keywords: &[Keyword]) -> bool {
        self.peek().keyword().is_some_and(|kw| keywords.contains(&kw))
    }

    fn at_symbol(&self, symbol: Symbol) -> bool {
        self.peek().is_symbol(symbol)
    }

    fn eat(&mut self, keyword: Keyword) -> Option<Token> {
        if self.at(keyword) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn eat_any(&mut self, keywords: &[Keyword]) -> Option<Token> {
        if self.at_any(keywords) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn eat_symbol(&mut self, symbol: Symbol) -> Option<Token> {
        if self.at_symbol(symbol) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, keyword: Keyword) -> Result<Token> {
        self.eat(keyword)
            .ok_or_else(|| self.unexpected(keyword.as_str()))
    }

    fn expect_any(&mut self, keywords: &[Keyword]) -> Result<Token> {
        self.eat_any(keywords).ok_or_else(|| {
            let names: Vec<&str> = keywords.iter().map(|kw| kw.as_str()).collect();
            self.unexpected(&names.join(" or "))
        })
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<Token> {
        self.eat_symbol(symbol)
            .ok_or_else(|| self.unexpected(&format!("'{}'", symbol)))
    }

    fn unexpected(&self, expected: &str) -> Error {
        let token = self.peek();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.value),
        };
        Error::parse(token.position, format!("Expected {}, found {}", expected, found))
    }

    fn unsupported_here(&self, what: &str) -> Error {
        Error::unsupported(format!("{} (at position {})", what, self.peek().position))
    }

    // ---------------------------------------------------------------------
    // Identifiers
    // ---------------------------------------------------------------------

    fn is_identifier(token: &Token) -> bool {
        match token.kind {
            TokenKind::Identifier | TokenKind::BackTickQuotedId => true,
            TokenKind::Keyword(keyword) => !keyword.is_reserved(),
            _ => false,
        }
    }

    fn at_identifier(&self) -> bool {
        Self::is_identifier(self.peek())
    }

    fn parse_identifier(&mut self) -> Result<Node> {
        if !self.at_identifier() {
            return Err(self.unexpected("identifier"));
        }
        Ok(Node::with_children(Rule::Identifier, [self.advance().into()]))
    }

    /// After a dot any word is an identifier, reserved or not.
    fn parse_dotted_identifier(&mut self) -> Result<Node> {
        if matches!(self.peek().kind, TokenKind::Keyword(_)) {
            return Ok(Node::with_children(Rule::Identifier, [self.advance().into()]));
        }
        self.parse_identifier()
    }

    /// `identifier [. identifier]` under the given rule (table names and refs).
    fn parse_qualified_name(&mut self, rule: Rule) -> Result<Node> {
        let mut node = Node::new(rule);
        node.push(self.parse_identifier()?);
        if self.at_symbol(Symbol::Dot) {
            node.push(self.advance());
            node.push(self.parse_dotted_identifier()?);
        }
        Ok(node)
    }

    fn parse_table_ref(&mut self) -> Result<Node> {
        self.parse_qualified_name(Rule::TableRef)
    }

    /// `identifier [. identifier [. identifier]]`
    fn parse_column_ref(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ColumnRef);
        node.push(self.parse_identifier()?);
        for _ in 0..2 {
            if !self.at_symbol(Symbol::Dot) {
                break;
            }
            node.push(self.advance());
            node.push(self.parse_dotted_identifier()?);
        }
        Ok(node)
    }

    /// `( identifier [, identifier]* )`
    fn parse_identifier_list_with_parentheses(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::IdentifierListWithParentheses);
        node.push(self.expect_symbol(Symbol::LParen)?);
        let mut list = Node::new(Rule::IdentifierList);
        list.push(self.parse_identifier()?);
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            list.push(comma);
            list.push(self.parse_identifier()?);
        }
        node.push(list);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn parse_simple_statement(&mut self) -> Result<Node> {
        let statement = match self.peek().kind {
            TokenKind::Keyword(Keyword::Select) | TokenKind::Symbol(Symbol::LParen) => {
                self.parse_select_statement()?
            }
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert_statement()?,
            TokenKind::Keyword(Keyword::Replace) => self.parse_replace_statement()?,
            TokenKind::Keyword(Keyword::Update) => self.parse_update_statement()?,
            TokenKind::Keyword(Keyword::Delete) => self.parse_delete_statement()?,
            TokenKind::Keyword(Keyword::Create) => self.parse_create_statement()?,
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter_statement()?,
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop_statement()?,
            TokenKind::Keyword(Keyword::Set) => self.parse_set_statement()?,
            _ => return Err(self.unexpected("a statement")),
        };
        Ok(Node::with_children(Rule::SimpleStatement, [statement.into()]))
    }

    fn parse_select_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SelectStatement);
        node.push(self.parse_query_expression()?);
        if let Some(locking) = self.parse_locking_clause()? {
            node.push(locking);
        }
        Ok(node)
    }

    fn parse_query_expression(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::QueryExpression);
        node.push(self.parse_query_term()?);
        while self.at(Keyword::Union) {
            let mut union = Node::new(Rule::UnionClause);
            union.push(self.advance());
            if let Some(option) = self.eat_any(&[Keyword::All, Keyword::Distinct]) {
                union.push(option);
            }
            union.push(self.parse_query_term()?);
            node.push(union);
        }
        if self.at(Keyword::Order) {
            node.push(self.parse_order_clause()?);
        }
        if self.at(Keyword::Limit) {
            node.push(self.parse_limit_clause()?);
        }
        Ok(node)
    }

    fn parse_query_term(&mut self) -> Result<Node> {
        if self.at_symbol(Symbol::LParen) {
            let mut node = Node::new(Rule::QueryExpressionParens);
            node.push(self.advance());
            node.push(self.parse_query_expression()?);
            node.push(self.expect_symbol(Symbol::RParen)?);
            Ok(node)
        } else {
            self.parse_query_specification()
        }
    }

    fn parse_query_specification(&mut self) -> Result<Node> {
        const SELECT_OPTIONS: &[Keyword] = &[
            Keyword::All,
            Keyword::Distinct,
            Keyword::Distinctrow,
            Keyword::HighPriority,
            Keyword::StraightJoin,
            Keyword::SqlSmallResult,
            Keyword::SqlBigResult,
            Keyword::SqlBufferResult,
            Keyword::SqlCache,
            Keyword::SqlNoCache,
            Keyword::SqlCalcFoundRows,
        ];

        let mut node = Node::new(Rule::QuerySpecification);
        node.push(self.expect(Keyword::Select)?);
        while let Some(option) = self.eat_any(SELECT_OPTIONS) {
            node.push(Node::with_children(Rule::SelectOption, [option.into()]));
        }
        node.push(self.parse_select_item_list()?);
        if self.at(Keyword::From) {
            node.push(self.parse_from_clause()?);
        }
        if self.at(Keyword::Where) {
            node.push(self.parse_where_clause()?);
        }
        if self.at(Keyword::Group) {
            node.push(self.parse_group_by_clause()?);
        }
        if self.at(Keyword::Having) {
            let mut having = Node::new(Rule::HavingClause);
            having.push(self.advance());
            having.push(self.parse_expr()?);
            node.push(having);
        }
        Ok(node)
    }

    fn parse_select_item_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SelectItemList);
        loop {
            if self.at_symbol(Symbol::Star) {
                node.push(self.advance());
            } else {
                node.push(self.parse_select_item()?);
            }
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        Ok(node)
    }

    fn at_table_wild(&self) -> bool {
        let dot = |n: usize| self.peek_nth(n).is_symbol(Symbol::Dot);
        let star = |n: usize| self.peek_nth(n).is_symbol(Symbol::Star);
        Self::is_identifier(self.peek())
            && dot(1)
            && (star(2) || (dot(3) && star(4)))
    }

    fn parse_select_item(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SelectItem);
        if self.at_table_wild() {
            let mut wild = Node::new(Rule::TableWild);
            wild.push(self.parse_identifier()?);
            wild.push(self.advance());
            if !self.at_symbol(Symbol::Star) {
                wild.push(self.parse_dotted_identifier()?);
                wild.push(self.expect_symbol(Symbol::Dot)?);
            }
            wild.push(self.expect_symbol(Symbol::Star)?);
            node.push(wild);
            return Ok(node);
        }

        node.push(self.parse_expr()?);
        let mut alias = Node::new(Rule::SelectAlias);
        if let Some(as_token) = self.eat(Keyword::As) {
            alias.push(as_token);
            alias.push(self.parse_alias_name()?);
            node.push(alias);
        } else if self.at_identifier() || self.peek().kind.is_text() {
            alias.push(self.parse_alias_name()?);
            node.push(alias);
        }
        Ok(node)
    }

    /// Aliases may be identifiers or quoted strings.
    fn parse_alias_name(&mut self) -> Result<Node> {
        if self.peek().kind.is_text() {
            return Ok(Node::with_children(Rule::Identifier, [self.advance().into()]));
        }
        self.parse_identifier()
    }

    fn parse_from_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::FromClause);
        node.push(self.expect(Keyword::From)?);
        if let Some(dual) = self.eat(Keyword::Dual) {
            node.push(dual);
        } else {
            node.push(self.parse_table_reference_list()?);
        }
        Ok(node)
    }

    fn parse_table_reference_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::TableReferenceList);
        node.push(self.parse_table_reference()?);
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            node.push(comma);
            node.push(self.parse_table_reference()?);
        }
        Ok(node)
    }

    fn parse_table_reference(&mut self) -> Result<Node> {
        const JOIN_STARTS: &[Keyword] = &[
            Keyword::Join,
            Keyword::Inner,
            Keyword::Cross,
            Keyword::Left,
            Keyword::Right,
            Keyword::Natural,
            Keyword::StraightJoin,
        ];

        let mut node = Node::new(Rule::TableReference);
        node.push(self.parse_table_factor()?);
        while self.at_any(JOIN_STARTS) {
            node.push(self.parse_joined_table()?);
        }
        Ok(node)
    }

    fn parse_table_factor(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::TableFactor);
        if self.at_symbol(Symbol::LParen) {
            if self.at_nth(1, Keyword::Select) || self.peek_nth(1).is_symbol(Symbol::LParen) {
                let mut derived = Node::new(Rule::DerivedTable);
                derived.push(self.parse_subquery()?);
                if let Some(alias) = self.parse_table_alias()? {
                    derived.push(alias);
                }
                node.push(derived);
            } else {
                let mut parens = Node::new(Rule::TableReferenceListParens);
                parens.push(self.advance());
                parens.push(self.parse_table_reference_list()?);
                parens.push(self.expect_symbol(Symbol::RParen)?);
                node.push(parens);
            }
            return Ok(node);
        }

        let mut single = Node::new(Rule::SingleTable);
        single.push(self.parse_table_ref()?);
        if let Some(alias) = self.parse_table_alias()? {
            single.push(alias);
        }
        if self.at_any(&[Keyword::Use, Keyword::Force, Keyword::Ignore]) {
            single.push(self.parse_index_hint_list()?);
        }
        node.push(single);
        Ok(node)
    }

    fn parse_table_alias(&mut self) -> Result<Option<Node>> {
        let mut node = Node::new(Rule::TableAlias);
        if let Some(as_token) = self.eat(Keyword::As) {
            node.push(as_token);
            node.push(self.parse_identifier()?);
            return Ok(Some(node));
        }
        if self.at_identifier() {
            node.push(self.parse_identifier()?);
            return Ok(Some(node));
        }
        Ok(None)
    }

    fn parse_index_hint_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::IndexHintList);
        loop {
            let mut hint = Node::new(Rule::IndexHint);
            hint.push(self.expect_any(&[Keyword::Use, Keyword::Force, Keyword::Ignore])?);
            hint.push(self.expect_any(&[Keyword::Index, Keyword::Key])?);
            if let Some(for_token) = self.eat(Keyword::For) {
                hint.push(for_token);
                if let Some(join) = self.eat(Keyword::Join) {
                    hint.push(join);
                } else {
                    hint.push(self.expect_any(&[Keyword::Order, Keyword::Group])?);
                    hint.push(self.expect(Keyword::By)?);
                }
            }
            hint.push(self.expect_symbol(Symbol::LParen)?);
            while !self.at_symbol(Symbol::RParen) {
                if let Some(primary) = self.eat(Keyword::Primary) {
                    hint.push(primary);
                } else {
                    hint.push(self.parse_identifier()?);
                }
                match self.eat_symbol(Symbol::Comma) {
                    Some(comma) => hint.push(comma),
                    None => break,
                }
            }
            hint.push(self.expect_symbol(Symbol::RParen)?);
            node.push(hint);

            if self.at_symbol(Symbol::Comma)
                && matches!(
                    self.peek_nth(1).keyword(),
                    Some(Keyword::Use | Keyword::Force | Keyword::Ignore)
                )
            {
                node.push(self.advance());
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_joined_table(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::JoinedTable);
        let natural = self.at(Keyword::Natural);

        let join_type = match self.peek().keyword() {
            Some(Keyword::Natural) => {
                let mut join = Node::new(Rule::NaturalJoinType);
                join.push(self.advance());
                if let Some(inner) = self.eat(Keyword::Inner) {
                    join.push(inner);
                } else if let Some(side) = self.eat_any(&[Keyword::Left, Keyword::Right]) {
                    join.push(side);
                    if let Some(outer) = self.eat(Keyword::Outer) {
                        join.push(outer);
                    }
                }
                join.push(self.expect(Keyword::Join)?);
                join
            }
            Some(Keyword::Left | Keyword::Right) => {
                let mut join = Node::new(Rule::OuterJoinType);
                join.push(self.advance());
                if let Some(outer) = self.eat(Keyword::Outer) {
                    join.push(outer);
                }
                join.push(self.expect(Keyword::Join)?);
                join
            }
            Some(Keyword::StraightJoin) => {
                Node::with_children(Rule::InnerJoinType, [self.advance().into()])
            }
            _ => {
                let mut join = Node::new(Rule::InnerJoinType);
                if let Some(kind) = self.eat_any(&[Keyword::Inner, Keyword::Cross]) {
                    join.push(kind);
                }
                join.push(self.expect(Keyword::Join)?);
                join
            }
        };
        node.push(join_type);
        node.push(self.parse_table_factor()?);

        if !natural {
            if let Some(on) = self.eat(Keyword::On) {
                node.push(on);
                node.push(self.parse_expr()?);
            } else if let Some(using) = self.eat(Keyword::Using) {
                node.push(using);
                node.push(self.parse_identifier_list_with_parentheses()?);
            }
        }
        Ok(node)
    }

    fn parse_where_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::WhereClause);
        node.push(self.expect(Keyword::Where)?);
        node.push(self.parse_expr()?);
        Ok(node)
    }

    fn parse_group_by_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::GroupByClause);
        node.push(self.expect(Keyword::Group)?);
        node.push(self.expect(Keyword::By)?);
        node.push(self.parse_expr()?);
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            node.push(comma);
            node.push(self.parse_expr()?);
        }
        if self.at(Keyword::With) && self.at_nth(1, Keyword::Rollup) {
            let mut olap = Node::new(Rule::OlapOption);
            olap.push(self.advance());
            olap.push(self.advance());
            node.push(olap);
        }
        Ok(node)
    }

    fn parse_order_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::OrderClause);
        node.push(self.expect(Keyword::Order)?);
        node.push(self.expect(Keyword::By)?);

        let mut list = Node::new(Rule::OrderList);
        loop {
            let mut item = Node::new(Rule::OrderExpression);
            item.push(self.parse_expr()?);
            if let Some(direction) = self.eat_any(&[Keyword::Asc, Keyword::Desc]) {
                item.push(Node::with_children(Rule::Direction, [direction.into()]));
            }
            list.push(item);
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => list.push(comma),
                None => break,
            }
        }
        node.push(list);
        Ok(node)
    }

    fn parse_limit_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::LimitClause);
        node.push(self.expect(Keyword::Limit)?);

        let mut options = Node::new(Rule::LimitOptions);
        options.push(self.parse_limit_option()?);
        if let Some(separator) = self
            .eat_symbol(Symbol::Comma)
            .or_else(|| self.eat(Keyword::Offset))
        {
            options.push(separator);
            options.push(self.parse_limit_option()?);
        }
        node.push(options);
        Ok(node)
    }

    fn parse_limit_option(&mut self) -> Result<Node> {
        let token = self.peek();
        let valid = matches!(token.kind, TokenKind::IntNumber | TokenKind::ParamMarker)
            || Self::is_identifier(token);
        if !valid {
            return Err(self.unexpected("a LIMIT value"));
        }
        Ok(Node::with_children(Rule::LimitOption, [self.advance().into()]))
    }

    fn parse_locking_clause(&mut self) -> Result<Option<Node>> {
        let mut node = Node::new(Rule::LockingClause);
        if self.at(Keyword::For)
            && (self.at_nth(1, Keyword::Update) || self.at_nth(1, Keyword::Share))
        {
            node.push(self.advance());
            node.push(self.advance());
            return Ok(Some(node));
        }
        if self.at(Keyword::Lock) {
            node.push(self.advance());
            node.push(self.expect(Keyword::In)?);
            node.push(self.expect(Keyword::Share)?);
            node.push(self.expect(Keyword::Mode)?);
            return Ok(Some(node));
        }
        Ok(None)
    }

    // INSERT / REPLACE

    fn parse_insert_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::InsertStatement);
        node.push(self.expect(Keyword::Insert)?);
        if let Some(priority) =
            self.eat_any(&[Keyword::LowPriority, Keyword::Delayed, Keyword::HighPriority])
        {
            node.push(Node::with_children(Rule::InsertLockOption, [priority.into()]));
        }
        if let Some(ignore) = self.eat(Keyword::Ignore) {
            node.push(ignore);
        }
        if let Some(into) = self.eat(Keyword::Into) {
            node.push(into);
        }
        node.push(self.parse_table_ref()?);
        node.push(self.parse_insert_source()?);

        if self.at(Keyword::On) {
            let mut update = Node::new(Rule::InsertUpdateList);
            update.push(self.advance());
            update.push(self.expect(Keyword::Duplicate)?);
            update.push(self.expect(Keyword::Key)?);
            update.push(self.expect(Keyword::Update)?);
            update.push(self.parse_update_list()?);
            node.push(update);
        }
        Ok(node)
    }

    fn parse_replace_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ReplaceStatement);
        node.push(self.expect(Keyword::Replace)?);
        if let Some(priority) = self.eat_any(&[Keyword::LowPriority, Keyword::Delayed]) {
            node.push(Node::with_children(Rule::InsertLockOption, [priority.into()]));
        }
        if let Some(into) = self.eat(Keyword::Into) {
            node.push(into);
        }
        node.push(self.parse_table_ref()?);
        node.push(self.parse_insert_source()?);
        Ok(node)
    }

    /// The part after the table name: `SET ...`, `[(cols)] VALUES ...` or `[(cols)] SELECT ...`.
    fn parse_insert_source(&mut self) -> Result<Node> {
        if self.at(Keyword::Set) {
            let mut node = Node::fragment();
            node.push(self.advance());
            node.push(self.parse_update_list()?);
            return Ok(node);
        }

        let mut fields = Node::fragment();
        let query_in_parens = self.at_symbol(Symbol::LParen)
            && (self.at_nth(1, Keyword::Select) || self.peek_nth(1).is_symbol(Symbol::LParen));
        if self.at_symbol(Symbol::LParen) && !query_in_parens {
            fields.push(self.advance());
            if !self.at_symbol(Symbol::RParen) {
                let mut list = Node::new(Rule::Fields);
                list.push(self.parse_column_ref()?);
                while let Some(comma) = self.eat_symbol(Symbol::Comma) {
                    list.push(comma);
                    list.push(self.parse_column_ref()?);
                }
                fields.push(list);
            }
            fields.push(self.expect_symbol(Symbol::RParen)?);
        }

        if self.at_any(&[Keyword::Values, Keyword::Value]) {
            let mut node = Node::new(Rule::InsertFromConstructor);
            node.push(fields);
            node.push(self.advance());
            node.push(self.parse_insert_values()?);
            Ok(node)
        } else {
            let mut node = Node::new(Rule::InsertQueryExpression);
            node.push(fields);
            node.push(self.parse_query_expression()?);
            Ok(node)
        }
    }

    fn parse_insert_values(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ValueList);
        loop {
            node.push(self.expect_symbol(Symbol::LParen)?);
            let mut values = Node::new(Rule::Values);
            while !self.at_symbol(Symbol::RParen) {
                if let Some(default) = self.eat(Keyword::Default) {
                    values.push(default);
                } else {
                    values.push(self.parse_expr()?);
                }
                match self.eat_symbol(Symbol::Comma) {
                    Some(comma) => values.push(comma),
                    None => break,
                }
            }
            node.push(values);
            node.push(self.expect_symbol(Symbol::RParen)?);
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        Ok(Node::with_children(Rule::InsertValues, [node.into()]))
    }

    fn parse_update_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::UpdateList);
        loop {
            let mut element = Node::new(Rule::UpdateElement);
            element.push(self.parse_column_ref()?);
            element.push(self.expect_symbol(Symbol::Equal)?);
            if let Some(default) = self.eat(Keyword::Default) {
                element.push(default);
            } else {
                element.push(self.parse_expr()?);
            }
            node.push(element);
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        Ok(node)
    }

    // UPDATE / DELETE

    fn parse_update_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::UpdateStatement);
        node.push(self.expect(Keyword::Update)?);
        if let Some(priority) = self.eat(Keyword::LowPriority) {
            node.push(priority);
        }
        if let Some(ignore) = self.eat(Keyword::Ignore) {
            node.push(ignore);
        }
        node.push(self.parse_table_reference_list()?);
        node.push(self.expect(Keyword::Set)?);
        node.push(self.parse_update_list()?);
        if self.at(Keyword::Where) {
            node.push(self.parse_where_clause()?);
        }
        if self.at(Keyword::Order) {
            node.push(self.parse_order_clause()?);
        }
        if self.at(Keyword::Limit) {
            node.push(self.parse_limit_clause()?);
        }
        Ok(node)
    }

    fn parse_delete_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::DeleteStatement);
        node.push(self.expect(Keyword::Delete)?);
        while let Some(option) =
            self.eat_any(&[Keyword::LowPriority, Keyword::Quick, Keyword::Ignore])
        {
            node.push(Node::with_children(Rule::DeleteStatementOption, [option.into()]));
        }
        if !self.at(Keyword::From) {
            return Err(self.unsupported_here("multi-table DELETE"));
        }
        node.push(self.advance());
        node.push(self.parse_table_ref()?);
        if let Some(alias) = self.parse_table_alias()? {
            node.push(alias);
        }
        if self.at(Keyword::Using) || self.at_symbol(Symbol::Comma) {
            return Err(self.unsupported_here("multi-table DELETE"));
        }
        if self.at(Keyword::Where) {
            node.push(self.parse_where_clause()?);
        }
        if self.at(Keyword::Order) {
            node.push(self.parse_order_clause()?);
        }
        if self.at(Keyword::Limit) {
            node.push(self.parse_limit_clause()?);
        }
        Ok(node)
    }

    // SET

    /// `SET` statements are kept as a flat token list; they are never applied.
    fn parse_set_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SetStatement);
        node.push(self.expect(Keyword::Set)?);
        while !self.at_eof() && !self.at_symbol(Symbol::Semicolon) {
            node.push(self.advance());
        }
        Ok(node)
    }
}
