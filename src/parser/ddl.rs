//! CREATE, ALTER and DROP statements, column definitions and data types.

use super::Parser;
use crate::ast::{Node, TokenKind};
use crate::error::Result;
use crate::grammar::{Keyword, Rule, Symbol};

const CONSTRAINT_STARTS: &[Keyword] = &[
    Keyword::Constraint,
    Keyword::Primary,
    Keyword::Unique,
    Keyword::Foreign,
    Keyword::Check,
    Keyword::Key,
    Keyword::Index,
    Keyword::Fulltext,
    Keyword::Spatial,
];

const INTEGER_TYPES: &[Keyword] = &[
    Keyword::Int,
    Keyword::Integer,
    Keyword::Tinyint,
    Keyword::Smallint,
    Keyword::Mediumint,
    Keyword::Bigint,
];

const SPATIAL_TYPES: &[Keyword] = &[
    Keyword::Geometry,
    Keyword::Point,
    Keyword::Linestring,
    Keyword::Polygon,
    Keyword::Multipoint,
    Keyword::Multilinestring,
    Keyword::Multipolygon,
    Keyword::Geometrycollection,
    Keyword::Geomcollection,
];

impl Parser<'_> {
    // ---------------------------------------------------------------------
    // CREATE
    // ---------------------------------------------------------------------

    pub(super) fn parse_create_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CreateStatement);
        node.push(self.expect(Keyword::Create)?);
        match self.peek().keyword() {
            Some(Keyword::Temporary | Keyword::Table) => node.push(self.parse_create_table()?),
            Some(Keyword::Unique | Keyword::Fulltext | Keyword::Spatial | Keyword::Index) => {
                node.push(self.parse_create_index()?)
            }
            _ => return Err(self.unexpected("TABLE or INDEX")),
        }
        Ok(node)
    }

    fn parse_if_not_exists(&mut self) -> Result<Option<Node>> {
        if !self.at(Keyword::If) {
            return Ok(None);
        }
        let mut node = Node::new(Rule::IfNotExists);
        node.push(self.advance());
        node.push(self.expect(Keyword::Not)?);
        node.push(self.expect(Keyword::Exists)?);
        Ok(Some(node))
    }

    fn parse_if_exists(&mut self) -> Result<Option<Node>> {
        if !self.at(Keyword::If) {
            return Ok(None);
        }
        let mut node = Node::new(Rule::IfExists);
        node.push(self.advance());
        node.push(self.expect(Keyword::Exists)?);
        Ok(Some(node))
    }

    fn parse_create_table(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CreateTable);
        if let Some(temporary) = self.eat(Keyword::Temporary) {
            node.push(temporary);
        }
        node.push(self.expect(Keyword::Table)?);
        if let Some(if_not_exists) = self.parse_if_not_exists()? {
            node.push(if_not_exists);
        }
        node.push(self.parse_qualified_name(Rule::TableName)?);

        if let Some(like) = self.eat(Keyword::Like) {
            node.push(like);
            node.push(self.parse_table_ref()?);
            return Ok(node);
        }

        let has_elements = self.at_symbol(Symbol::LParen)
            && !self.at_nth(1, Keyword::Select)
            && !self.peek_nth(1).is_symbol(Symbol::LParen);
        if has_elements {
            node.push(self.advance());
            node.push(self.parse_table_element_list()?);
            node.push(self.expect_symbol(Symbol::RParen)?);
        }
        if let Some(options) = self.parse_create_table_options()? {
            node.push(options);
        }

        let query_follows = self.at_any(&[Keyword::As, Keyword::Select, Keyword::Replace, Keyword::Ignore])
            || self.at_symbol(Symbol::LParen);
        if query_follows {
            let mut query = Node::new(Rule::DuplicateAsQueryExpression);
            if let Some(mode) = self.eat_any(&[Keyword::Replace, Keyword::Ignore]) {
                query.push(mode);
            }
            if let Some(as_token) = self.eat(Keyword::As) {
                query.push(as_token);
            }
            query.push(self.parse_query_expression()?);
            node.push(query);
        } else if !has_elements {
            return Err(self.unexpected("'(' or AS"));
        }
        Ok(node)
    }

    fn parse_table_element_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::TableElementList);
        loop {
            let element = if self.at_any(CONSTRAINT_STARTS) {
                self.parse_table_constraint_def()?
            } else {
                self.parse_column_definition()?
            };
            node.push(Node::with_children(Rule::TableElement, [element.into()]));
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        Ok(node)
    }

    fn parse_column_definition(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ColumnDefinition);
        node.push(self.parse_identifier()?);
        node.push(self.parse_field_definition()?);
        Ok(node)
    }

    fn parse_field_definition(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::FieldDefinition);
        node.push(self.parse_data_type()?);
        if self.at_any(&[Keyword::Generated, Keyword::As]) {
            let mut generated = Node::new(Rule::GeneratedColumn);
            if let Some(token) = self.eat(Keyword::Generated) {
                generated.push(token);
                generated.push(self.expect(Keyword::Always)?);
            }
            generated.push(self.expect(Keyword::As)?);
            generated.push(self.parse_expr_with_parentheses()?);
            if let Some(storage) = self.eat_any(&[Keyword::Virtual, Keyword::Stored]) {
                generated.push(storage);
            }
            node.push(generated);
        }
        while let Some(attribute) = self.parse_column_attribute()? {
            node.push(attribute);
        }
        Ok(node)
    }

    fn parse_expr_with_parentheses(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ExprWithParentheses);
        node.push(self.expect_symbol(Symbol::LParen)?);
        node.push(self.parse_expr()?);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    fn parse_column_attribute(&mut self) -> Result<Option<Node>> {
        let mut node = Node::new(Rule::ColumnAttribute);
        match self.peek().keyword() {
            Some(Keyword::Not) if self.at_nth(1, Keyword::Null) => {
                node.push(self.advance());
                node.push(self.advance());
            }
            Some(Keyword::Null | Keyword::AutoIncrement | Keyword::Visible | Keyword::Invisible) => {
                node.push(self.advance());
            }
            Some(Keyword::Default) => {
                node.push(self.advance());
                node.push(self.parse_default_value()?);
            }
            Some(Keyword::On) => {
                node.push(self.advance());
                node.push(self.expect(Keyword::Update)?);
                node.push(self.parse_now_function()?);
            }
            Some(Keyword::Primary) => {
                node.push(self.advance());
                node.push(self.expect(Keyword::Key)?);
            }
            Some(Keyword::Key) => node.push(self.advance()),
            Some(Keyword::Unique) => {
                node.push(self.advance());
                if let Some(key) = self.eat(Keyword::Key) {
                    node.push(key);
                }
            }
            Some(Keyword::Comment) => {
                node.push(self.advance());
                node.push(self.parse_text_string_literal()?);
            }
            Some(Keyword::Collate) => {
                node.push(self.advance());
                node.push(self.parse_collation_name()?);
            }
            Some(Keyword::ColumnFormat | Keyword::Storage) => {
                node.push(self.advance());
                if !(self.at_identifier() || self.at_any(&[Keyword::Default, Keyword::Fixed])) {
                    return Err(self.unexpected("a column format"));
                }
                node.push(self.advance());
            }
            Some(Keyword::Serial) if self.at_nth(1, Keyword::Default) => {
                node.push(self.advance());
                node.push(self.advance());
                node.push(self.expect(Keyword::Value)?);
            }
            Some(Keyword::Constraint) if self.at_nth(2, Keyword::Check) || self.at_nth(1, Keyword::Check) => {
                node.push(self.parse_constraint_name()?);
                node.push(self.expect(Keyword::Check)?);
                node.push(self.parse_expr_with_parentheses()?);
            }
            Some(Keyword::Check) => {
                node.push(self.advance());
                node.push(self.parse_expr_with_parentheses()?);
            }
            Some(Keyword::References) => return self.parse_references().map(Some),
            _ => return Ok(None),
        }
        Ok(Some(node))
    }

    /// Column defaults: literals, signed numbers, `NOW()`-style functions or `(expr)`.
    fn parse_default_value(&mut self) -> Result<Node> {
        if self.at_symbol(Symbol::LParen) {
            return self.parse_expr_with_parentheses();
        }
        if self.at_symbol(Symbol::Minus) || self.at_symbol(Symbol::Plus) {
            let mut node = Node::new(Rule::SignedLiteral);
            node.push(self.advance());
            if !self.peek().kind.is_number() {
                return Err(self.unexpected("a number"));
            }
            node.push(Node::with_children(Rule::NumLiteral, [self.advance().into()]));
            return Ok(node);
        }
        if self.at_any(&[
            Keyword::CurrentTimestamp,
            Keyword::Now,
            Keyword::CurrentDate,
            Keyword::CurrentTime,
            Keyword::UtcTimestamp,
        ]) {
            return self.parse_now_function();
        }
        let literal = matches!(
            self.peek().kind,
            TokenKind::SingleQuotedText
                | TokenKind::DoubleQuotedText
                | TokenKind::Keyword(Keyword::Null | Keyword::True | Keyword::False)
        ) || self.peek().kind.is_number();
        if !literal {
            return Err(self.unexpected("a default value"));
        }
        self.parse_simple_expr()
    }

    /// `CURRENT_TIMESTAMP [( [n] )]` and friends.
    fn parse_now_function(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::RuntimeFunctionCall);
        node.push(self.expect_any(&[
            Keyword::CurrentTimestamp,
            Keyword::Now,
            Keyword::CurrentDate,
            Keyword::CurrentTime,
            Keyword::UtcTimestamp,
        ])?);
        if let Some(open) = self.eat_symbol(Symbol::LParen) {
            node.push(open);
            if self.peek().kind == TokenKind::IntNumber {
                let precision = Node::with_children(Rule::NumLiteral, [self.advance().into()]);
                node.push(Node::with_children(Rule::UdfExprList, [
                    Node::with_children(Rule::UdfExpr, [precision.into()]).into(),
                ]));
            }
            node.push(self.expect_symbol(Symbol::RParen)?);
        }
        Ok(node)
    }

    fn parse_constraint_name(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ConstraintName);
        node.push(self.expect(Keyword::Constraint)?);
        if self.at_identifier() {
            node.push(self.parse_identifier()?);
        }
        Ok(node)
    }

    fn parse_table_constraint_def(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::TableConstraintDef);
        if self.at(Keyword::Constraint) {
            node.push(self.parse_constraint_name()?);
        }

        match self.peek().keyword() {
            Some(Keyword::Primary) => {
                node.push(self.advance());
                node.push(self.expect(Keyword::Key)?);
                self.parse_index_tail(&mut node, false)?;
            }
            Some(Keyword::Unique) => {
                node.push(self.advance());
                if let Some(kind) = self.eat_any(&[Keyword::Key, Keyword::Index]) {
                    node.push(kind);
                }
                self.parse_index_tail(&mut node, true)?;
            }
            Some(Keyword::Key | Keyword::Index) if !node.has_child_node(Rule::ConstraintName) => {
                node.push(self.advance());
                self.parse_index_tail(&mut node, true)?;
            }
            Some(Keyword::Fulltext | Keyword::Spatial) if !node.has_child_node(Rule::ConstraintName) => {
                node.push(self.advance());
                if let Some(kind) = self.eat_any(&[Keyword::Key, Keyword::Index]) {
                    node.push(kind);
                }
                self.parse_index_tail(&mut node, true)?;
            }
            Some(Keyword::Foreign) => {
                node.push(self.advance());
                node.push(self.expect(Keyword::Key)?);
                if self.at_identifier() {
                    node.push(Node::with_children(Rule::IndexName, [self.parse_identifier()?.into()]));
                }
                node.push(self.parse_key_list()?);
                node.push(self.parse_references()?);
            }
            Some(Keyword::Check) => {
                node.push(self.advance());
                node.push(self.parse_expr_with_parentheses()?);
            }
            _ => return Err(self.unexpected("a table constraint")),
        }
        Ok(node)
    }

    /// `[name] [USING type] (key parts) [options]` after an index keyword.
    fn parse_index_tail(&mut self, node: &mut Node, named: bool) -> Result<()> {
        let type_clause_ahead = self.at(Keyword::Type) && !self.peek_nth(1).is_symbol(Symbol::LParen);
        if named && self.at_identifier() && !type_clause_ahead {
            node.push(Node::with_children(Rule::IndexName, [self.parse_identifier()?.into()]));
        }
        if self.at_any(&[Keyword::Using, Keyword::Type]) {
            node.push(self.parse_index_type_clause()?);
        }
        node.push(self.parse_key_list()?);
        while let Some(option) = self.parse_index_option()? {
            node.push(option);
        }
        Ok(())
    }

    fn parse_index_type_clause(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::IndexTypeClause);
        node.push(self.expect_any(&[Keyword::Using, Keyword::Type])?);
        let kind = self.expect_any(&[Keyword::Btree, Keyword::Rtree, Keyword::Hash])?;
        node.push(Node::with_children(Rule::IndexType, [kind.into()]));
        Ok(node)
    }

    fn parse_index_option(&mut self) -> Result<Option<Node>> {
        let mut node = Node::new(Rule::IndexOption);
        match self.peek().keyword() {
            Some(Keyword::Comment) => {
                node.push(self.advance());
                node.push(self.parse_text_string_literal()?);
            }
            Some(Keyword::Using | Keyword::Type) => node.push(self.parse_index_type_clause()?),
            Some(Keyword::KeyBlockSize) => {
                node.push(self.advance());
                if let Some(equal) = self.eat_symbol(Symbol::Equal) {
                    node.push(equal);
                }
                if self.peek().kind != TokenKind::IntNumber {
                    return Err(self.unexpected("a number"));
                }
                node.push(self.advance());
            }
            Some(Keyword::Visible | Keyword::Invisible) => node.push(self.advance()),
            _ => return Ok(None),
        }
        Ok(Some(node))
    }

    /// `( part [, part]* )` where a part is `column [(length)] [ASC|DESC]`.
    fn parse_key_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::KeyList);
        node.push(self.expect_symbol(Symbol::LParen)?);
        loop {
            let mut part = Node::new(Rule::KeyPart);
            part.push(self.parse_identifier()?);
            if self.at_symbol(Symbol::LParen) {
                part.push(self.parse_field_length()?);
            }
            if let Some(direction) = self.eat_any(&[Keyword::Asc, Keyword::Desc]) {
                part.push(Node::with_children(Rule::Direction, [direction.into()]));
            }
            node.push(part);
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    fn parse_references(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::References);
        node.push(self.expect(Keyword::References)?);
        node.push(self.parse_table_ref()?);
        if self.at_symbol(Symbol::LParen) {
            node.push(self.parse_identifier_list_with_parentheses()?);
        }
        if let Some(match_token) = self.eat(Keyword::Match) {
            node.push(match_token);
            if !self.at_identifier() {
                return Err(self.unexpected("FULL, PARTIAL or SIMPLE"));
            }
            node.push(self.advance());
        }
        while self.at(Keyword::On) && matches!(self.peek_nth(1).keyword(), Some(Keyword::Delete | Keyword::Update)) {
            node.push(self.advance());
            node.push(self.advance());
            match self.peek().keyword() {
                Some(Keyword::Restrict | Keyword::Cascade) => node.push(self.advance()),
                Some(Keyword::Set) => {
                    node.push(self.advance());
                    node.push(self.expect_any(&[Keyword::Null, Keyword::Default])?);
                }
                Some(Keyword::No) => {
                    node.push(self.advance());
                    node.push(self.expect(Keyword::Action)?);
                }
                _ => return Err(self.unexpected("a referential action")),
            }
        }
        Ok(node)
    }

    // ---------------------------------------------------------------------
    // Data types
    // ---------------------------------------------------------------------

    pub(super) fn parse_data_type(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::DataType);
        let Some(keyword) = self.peek().keyword() else {
            return Err(self.unexpected("a data type"));
        };

        match keyword {
            kw if INTEGER_TYPES.contains(&kw) => {
                node.push(self.advance());
                self.push_optional_length(&mut node)?;
                self.push_field_options(&mut node);
            }
            Keyword::Real | Keyword::Double => {
                node.push(self.advance());
                if let Some(precision) = self.eat(Keyword::Precision) {
                    node.push(precision);
                }
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_length_or_precision()?);
                }
                self.push_field_options(&mut node);
            }
            Keyword::Float | Keyword::Decimal | Keyword::Dec | Keyword::Numeric | Keyword::Fixed => {
                node.push(self.advance());
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_length_or_precision()?);
                }
                self.push_field_options(&mut node);
            }
            Keyword::Bit | Keyword::Binary | Keyword::Varbinary | Keyword::Year => {
                node.push(self.advance());
                self.push_optional_length(&mut node)?;
            }
            Keyword::Bool | Keyword::Boolean | Keyword::Serial | Keyword::Date | Keyword::Json => {
                node.push(self.advance());
            }
            Keyword::Char | Keyword::Character => {
                node.push(self.advance());
                if let Some(varying) = self.eat(Keyword::Varying) {
                    node.push(varying);
                }
                self.push_optional_length(&mut node)?;
                self.push_charset(&mut node)?;
            }
            Keyword::Varchar | Keyword::Nvarchar => {
                node.push(self.advance());
                self.push_optional_length(&mut node)?;
                self.push_charset(&mut node)?;
            }
            Keyword::National => {
                node.push(self.advance());
                node.push(self.expect_any(&[Keyword::Char, Keyword::Character, Keyword::Varchar])?);
                if let Some(varying) = self.eat(Keyword::Varying) {
                    node.push(varying);
                }
                self.push_optional_length(&mut node)?;
                self.push_charset(&mut node)?;
            }
            Keyword::Nchar => {
                node.push(self.advance());
                if let Some(varying) = self.eat_any(&[Keyword::Varchar, Keyword::Varying]) {
                    node.push(varying);
                }
                self.push_optional_length(&mut node)?;
                self.push_charset(&mut node)?;
            }
            Keyword::Long => {
                node.push(self.advance());
                if let Some(kind) = self.eat_any(&[Keyword::Varchar, Keyword::Varbinary]) {
                    node.push(kind);
                } else if let Some(kind) = self.eat(Keyword::Char) {
                    node.push(kind);
                    node.push(self.expect(Keyword::Varying)?);
                }
                self.push_charset(&mut node)?;
            }
            Keyword::Time | Keyword::Timestamp | Keyword::Datetime => {
                node.push(self.advance());
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_datetime_precision()?);
                }
            }
            Keyword::Tinyblob | Keyword::Blob | Keyword::Mediumblob | Keyword::Longblob => {
                node.push(self.advance());
                self.push_optional_length(&mut node)?;
            }
            Keyword::Tinytext | Keyword::Text | Keyword::Mediumtext | Keyword::Longtext => {
                node.push(self.advance());
                self.push_optional_length(&mut node)?;
                self.push_charset(&mut node)?;
            }
            Keyword::Enum | Keyword::Set => {
                node.push(self.advance());
                node.push(self.parse_string_list()?);
                self.push_charset(&mut node)?;
            }
            kw if SPATIAL_TYPES.contains(&kw) => node.push(self.advance()),
            _ => return Err(self.unexpected("a data type")),
        }
        Ok(node)
    }

    fn push_optional_length(&mut self, node: &mut Node) -> Result<()> {
        if self.at_symbol(Symbol::LParen) {
            node.push(self.parse_field_length()?);
        }
        Ok(())
    }

    fn push_field_options(&mut self, node: &mut Node) {
        let mut options = Node::new(Rule::FieldOptions);
        while let Some(option) = self.eat_any(&[Keyword::Unsigned, Keyword::Signed, Keyword::Zerofill]) {
            options.push(option);
        }
        if !options.is_empty() {
            node.push(options);
        }
    }

    fn push_charset(&mut self, node: &mut Node) -> Result<()> {
        if let Some(charset) = self.parse_charset_with_opt_binary()? {
            node.push(charset);
        }
        Ok(())
    }

    /// `( n )`
    pub(super) fn parse_field_length(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::FieldLength);
        node.push(self.expect_symbol(Symbol::LParen)?);
        if !self.peek().kind.is_number() {
            return Err(self.unexpected("a length"));
        }
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// `( n )` or `( m , d )`
    pub(super) fn parse_length_or_precision(&mut self) -> Result<Node> {
        if !self.peek_nth(2).is_symbol(Symbol::Comma) {
            return self.parse_field_length();
        }
        let mut node = Node::new(Rule::Precision);
        node.push(self.expect_symbol(Symbol::LParen)?);
        for separator in [Symbol::Comma, Symbol::RParen] {
            if self.peek().kind != TokenKind::IntNumber {
                return Err(self.unexpected("a number"));
            }
            node.push(self.advance());
            node.push(self.expect_symbol(separator)?);
        }
        Ok(node)
    }

    pub(super) fn parse_datetime_precision(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::TypeDatetimePrecision);
        node.push(self.expect_symbol(Symbol::LParen)?);
        if self.peek().kind != TokenKind::IntNumber {
            return Err(self.unexpected("a precision"));
        }
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    fn parse_string_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::StringList);
        node.push(self.expect_symbol(Symbol::LParen)?);
        loop {
            node.push(self.parse_text_string_literal()?);
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// Character set clauses after string types, or `None` when absent.
    pub(super) fn parse_charset_with_opt_binary(&mut self) -> Result<Option<Node>> {
        let mut node = Node::new(Rule::CharsetWithOptBinary);
        let charset_keyword = self.at(Keyword::Charset)
            || (self.at(Keyword::Character) && self.at_nth(1, Keyword::Set));

        if charset_keyword {
            self.push_charset_keyword(&mut node)?;
            node.push(self.parse_charset_name()?);
            if let Some(binary) = self.eat(Keyword::Binary) {
                node.push(binary);
            }
        } else if let Some(token) = self.eat_any(&[Keyword::Ascii, Keyword::Unicode]) {
            node.push(token);
            if let Some(binary) = self.eat(Keyword::Binary) {
                node.push(binary);
            }
        } else if let Some(byte) = self.eat(Keyword::Byte) {
            node.push(byte);
        } else if let Some(binary) = self.eat(Keyword::Binary) {
            node.push(binary);
            if self.at(Keyword::Charset) || (self.at(Keyword::Character) && self.at_nth(1, Keyword::Set)) {
                self.push_charset_keyword(&mut node)?;
                node.push(self.parse_charset_name()?);
            } else if let Some(token) = self.eat_any(&[Keyword::Ascii, Keyword::Unicode]) {
                node.push(token);
            }
        } else {
            return Ok(None);
        }
        Ok(Some(node))
    }

    fn push_charset_keyword(&mut self, node: &mut Node) -> Result<()> {
        if let Some(charset) = self.eat(Keyword::Charset) {
            node.push(charset);
        } else {
            node.push(self.expect(Keyword::Character)?);
            node.push(self.expect(Keyword::Set)?);
        }
        Ok(())
    }

    pub(super) fn parse_charset_name(&mut self) -> Result<Node> {
        let valid = self.at_identifier()
            || self.peek().kind.is_text()
            || self.at_any(&[Keyword::Binary, Keyword::Default]);
        if !valid {
            return Err(self.unexpected("a character set name"));
        }
        Ok(Node::with_children(Rule::CharsetName, [self.advance().into()]))
    }

    pub(super) fn parse_collation_name(&mut self) -> Result<Node> {
        let valid = self.at_identifier() || self.peek().kind.is_text() || self.at(Keyword::Binary);
        if !valid {
            return Err(self.unexpected("a collation name"));
        }
        Ok(Node::with_children(Rule::CollationName, [self.advance().into()]))
    }

    // ---------------------------------------------------------------------
    // Table options
    // ---------------------------------------------------------------------

    fn at_create_table_option(&self) -> bool {
        match self.peek().keyword() {
            Some(
                Keyword::Engine
                | Keyword::Charset
                | Keyword::Collate
                | Keyword::AutoIncrement
                | Keyword::Comment
                | Keyword::RowFormat,
            ) => true,
            Some(Keyword::Character) => self.at_nth(1, Keyword::Set),
            Some(Keyword::Default) => matches!(
                self.peek_nth(1).keyword(),
                Some(Keyword::Charset | Keyword::Character | Keyword::Collate)
            ),
            _ => {
                // Other `NAME [=] value` pairs such as KEY_BLOCK_SIZE=8 or STATS_PERSISTENT=0.
                self.at_identifier()
                    && (self.peek_nth(1).is_symbol(Symbol::Equal)
                        || self.peek_nth(1).kind.is_number())
            }
        }
    }

    fn parse_create_table_options(&mut self) -> Result<Option<Node>> {
        if !self.at_create_table_option() {
            return Ok(None);
        }
        let mut node = Node::new(Rule::CreateTableOptions);
        loop {
            node.push(self.parse_create_table_option()?);
            if self.at_symbol(Symbol::Comma) {
                let comma = self.advance();
                node.push(comma);
            } else if !self.at_create_table_option() {
                break;
            }
        }
        Ok(Some(node))
    }

    fn parse_create_table_option(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CreateTableOption);
        if let Some(default) = self.eat(Keyword::Default) {
            node.push(default);
        }
        match self.peek().keyword() {
            Some(Keyword::Engine) => {
                node.push(self.advance());
                self.push_optional_equal(&mut node);
                let valid = self.at_identifier() || self.peek().kind.is_text();
                if !valid {
                    return Err(self.unexpected("an engine name"));
                }
                node.push(Node::with_children(Rule::EngineRef, [self.advance().into()]));
            }
            Some(Keyword::Charset | Keyword::Character) => {
                self.push_charset_keyword(&mut node)?;
                self.push_optional_equal(&mut node);
                node.push(self.parse_charset_name()?);
            }
            Some(Keyword::Collate) => {
                node.push(self.advance());
                self.push_optional_equal(&mut node);
                node.push(self.parse_collation_name()?);
            }
            Some(Keyword::AutoIncrement) => {
                node.push(self.advance());
                self.push_optional_equal(&mut node);
                if self.peek().kind != TokenKind::IntNumber {
                    return Err(self.unexpected("a number"));
                }
                node.push(self.advance());
            }
            Some(Keyword::Comment) => {
                node.push(self.advance());
                self.push_optional_equal(&mut node);
                node.push(self.parse_text_string_literal()?);
            }
            _ => {
                node.push(self.parse_identifier()?);
                self.push_optional_equal(&mut node);
                let token = self.peek();
                let valid = token.kind.is_number()
                    || token.kind.is_text()
                    || matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword(_));
                if !valid {
                    return Err(self.unexpected("an option value"));
                }
                node.push(self.advance());
            }
        }
        Ok(node)
    }

    fn push_optional_equal(&mut self, node: &mut Node) {
        if let Some(equal) = self.eat_symbol(Symbol::Equal) {
            node.push(equal);
        }
    }

    // ---------------------------------------------------------------------
    // CREATE INDEX
    // ---------------------------------------------------------------------

    fn parse_create_index(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CreateIndex);
        if let Some(kind) = self.eat_any(&[Keyword::Unique, Keyword::Fulltext, Keyword::Spatial]) {
            node.push(kind);
        }
        node.push(self.expect(Keyword::Index)?);
        node.push(Node::with_children(Rule::IndexName, [self.parse_identifier()?.into()]));
        if self.at_any(&[Keyword::Using, Keyword::Type]) {
            node.push(self.parse_index_type_clause()?);
        }
        node.push(self.expect(Keyword::On)?);
        node.push(self.parse_table_ref()?);
        node.push(self.parse_key_list()?);
        while let Some(option) = self.parse_index_option()? {
            node.push(option);
        }
        Ok(node)
    }

    // ---------------------------------------------------------------------
    // ALTER
    // ---------------------------------------------------------------------

    pub(super) fn parse_alter_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::AlterStatement);
        node.push(self.expect(Keyword::Alter)?);

        let mut alter = Node::new(Rule::AlterTable);
        alter.push(self.expect(Keyword::Table)?);
        alter.push(self.parse_table_ref()?);
        if !self.at_eof() && !self.at_symbol(Symbol::Semicolon) {
            let mut list = Node::new(Rule::AlterList);
            loop {
                list.push(self.parse_alter_list_item()?);
                match self.eat_symbol(Symbol::Comma) {
                    Some(comma) => list.push(comma),
                    None => break,
                }
            }
            alter.push(list);
        }
        node.push(alter);
        Ok(node)
    }

    fn parse_alter_list_item(&mut self) -> Result<Node> {
        if self.at_create_table_option() {
            let option = self.parse_create_table_option()?;
            return Ok(Node::with_children(Rule::CreateTableOptions, [option.into()]));
        }

        let mut node = Node::new(Rule::AlterListItem);
        match self.peek().keyword() {
            Some(Keyword::Add) => {
                node.push(self.advance());
                if self.at_any(CONSTRAINT_STARTS) {
                    node.push(self.parse_table_constraint_def()?);
                    return Ok(node);
                }
                if let Some(column) = self.eat(Keyword::Column) {
                    node.push(column);
                }
                if let Some(open) = self.eat_symbol(Symbol::LParen) {
                    node.push(open);
                    node.push(self.parse_table_element_list()?);
                    node.push(self.expect_symbol(Symbol::RParen)?);
                } else {
                    node.push(self.parse_column_definition()?);
                    self.push_place(&mut node)?;
                }
            }
            Some(Keyword::Drop) => {
                node.push(self.advance());
                match self.peek().keyword() {
                    Some(Keyword::Index | Keyword::Key) => {
                        node.push(self.advance());
                        node.push(Node::with_children(Rule::IndexName, [self.parse_identifier()?.into()]));
                    }
                    Some(Keyword::Primary) => {
                        node.push(self.advance());
                        node.push(self.expect(Keyword::Key)?);
                    }
                    Some(Keyword::Foreign) => {
                        node.push(self.advance());
                        node.push(self.expect(Keyword::Key)?);
                        node.push(self.parse_identifier()?);
                    }
                    _ => {
                        if let Some(column) = self.eat(Keyword::Column) {
                            node.push(column);
                        }
                        node.push(self.parse_identifier()?);
                        if let Some(behavior) = self.eat_any(&[Keyword::Restrict, Keyword::Cascade]) {
                            node.push(behavior);
                        }
                    }
                }
            }
            Some(Keyword::Change) => {
                node.push(self.advance());
                if let Some(column) = self.eat(Keyword::Column) {
                    node.push(column);
                }
                node.push(self.parse_identifier()?);
                node.push(self.parse_column_definition()?);
                self.push_place(&mut node)?;
            }
            Some(Keyword::Modify) => {
                node.push(self.advance());
                if let Some(column) = self.eat(Keyword::Column) {
                    node.push(column);
                }
                node.push(self.parse_column_definition()?);
                self.push_place(&mut node)?;
            }
            Some(Keyword::Rename) => {
                node.push(self.advance());
                match self.peek().keyword() {
                    Some(Keyword::Column | Keyword::Index | Keyword::Key) => {
                        node.push(self.advance());
                        node.push(self.parse_identifier()?);
                        node.push(self.expect(Keyword::To)?);
                        node.push(self.parse_identifier()?);
                    }
                    _ => {
                        if let Some(to) = self.eat_any(&[Keyword::To, Keyword::As]) {
                            node.push(to);
                        }
                        node.push(self.parse_qualified_name(Rule::TableName)?);
                    }
                }
            }
            _ => return Err(self.unexpected("an ALTER TABLE action")),
        }
        Ok(node)
    }

    fn push_place(&mut self, node: &mut Node) -> Result<()> {
        if let Some(first) = self.eat(Keyword::First) {
            node.push(Node::with_children(Rule::Place, [first.into()]));
        } else if let Some(after) = self.eat(Keyword::After) {
            let mut place = Node::new(Rule::Place);
            place.push(after);
            place.push(self.parse_identifier()?);
            node.push(place);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // DROP
    // ---------------------------------------------------------------------

    pub(super) fn parse_drop_statement(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::DropStatement);
        node.push(self.expect(Keyword::Drop)?);

        if self.at(Keyword::Index) {
            let mut drop = Node::new(Rule::DropIndex);
            drop.push(self.advance());
            drop.push(Node::with_children(Rule::IndexName, [self.parse_identifier()?.into()]));
            drop.push(self.expect(Keyword::On)?);
            drop.push(self.parse_table_ref()?);
            node.push(drop);
            return Ok(node);
        }

        let mut drop = Node::new(Rule::DropTable);
        if let Some(temporary) = self.eat(Keyword::Temporary) {
            drop.push(temporary);
        }
        drop.push(self.expect(Keyword::Table)?);
        if let Some(if_exists) = self.parse_if_exists()? {
            drop.push(if_exists);
        }
        let mut tables = Node::new(Rule::TableRefList);
        tables.push(self.parse_table_ref()?);
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            tables.push(comma);
            tables.push(self.parse_table_ref()?);
        }
        drop.push(tables);
        if let Some(behavior) = self.eat_any(&[Keyword::Restrict, Keyword::Cascade]) {
            drop.push(behavior);
        }
        node.push(drop);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::statement;
    use crate::ast::TokenKind;
    use crate::grammar::{Keyword, Rule};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_table() {
        let create = statement(
            "CREATE TABLE IF NOT EXISTS `wp_users` (
                ID bigint(20) unsigned NOT NULL auto_increment,
                user_login varchar(60) NOT NULL default '',
                user_registered datetime NOT NULL default '0000-00-00 00:00:00',
                PRIMARY KEY  (ID),
                KEY user_login_key (user_login),
                UNIQUE KEY email (user_email(100))
            ) DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci ENGINE=InnoDB",
        );
        let table = create.child_node(Rule::CreateTable).unwrap();
        assert!(table.has_child_node(Rule::IfNotExists));
        assert!(table.has_child_node(Rule::CreateTableOptions));
        let elements = table.descendant_nodes(Rule::TableElement);
        assert_eq!(elements.len(), 6);
        assert_eq!(table.descendant_nodes(Rule::ColumnDefinition).len(), 3);
        assert_eq!(table.descendant_nodes(Rule::TableConstraintDef).len(), 3);

        let first = table.descendant_node(Rule::ColumnDefinition).unwrap();
        let data_type = first.descendant_node(Rule::DataType).unwrap();
        assert!(data_type.has_keyword(Keyword::Bigint));
        assert!(data_type.has_child_node(Rule::FieldLength));
        assert!(data_type.has_child_node(Rule::FieldOptions));
        assert_eq!(first.descendant_nodes(Rule::ColumnAttribute).len(), 2);
    }

    #[test]
    fn test_data_types() {
        let create = statement(
            "CREATE TABLE t (
                a decimal(10,2), b enum('x','y') CHARACTER SET utf8, c double precision,
                d timestamp(6) ON UPDATE CURRENT_TIMESTAMP(6), e national varchar(5),
                f int DEFAULT -1, g text COLLATE utf8mb4_bin COMMENT 'note'
            )",
        );
        let types = create.descendant_nodes(Rule::DataType);
        assert_eq!(types.len(), 7);
        assert!(types[0].has_child_node(Rule::Precision));
        assert!(types[1].has_child_node(Rule::StringList));
        assert!(types[1].has_child_node(Rule::CharsetWithOptBinary));
        assert!(types[2].has_keyword(Keyword::Precision));
        assert!(types[3].has_child_node(Rule::TypeDatetimePrecision));
        assert!(create.descendant_node(Rule::SignedLiteral).is_some());
    }

    #[test]
    fn test_create_table_as_select() {
        let create = statement("CREATE TABLE t2 SELECT * FROM t1");
        let table = create.child_node(Rule::CreateTable).unwrap();
        assert!(table.has_child_node(Rule::DuplicateAsQueryExpression));
        assert!(!table.has_child_node(Rule::TableElementList));
    }

    #[test]
    fn test_create_index() {
        let create = statement("CREATE UNIQUE INDEX idx ON t (a(10) DESC, b)");
        let index = create.child_node(Rule::CreateIndex).unwrap();
        assert!(index.has_keyword(Keyword::Unique));
        assert_eq!(index.descendant_nodes(Rule::KeyPart).len(), 2);
    }

    #[test]
    fn test_alter_table() {
        let alter = statement(
            "ALTER TABLE t ADD COLUMN c int NOT NULL AFTER b, DROP INDEX idx, \
             ADD UNIQUE KEY u (c), CHANGE a a2 varchar(10), ENGINE=InnoDB",
        );
        let list = alter.descendant_node(Rule::AlterList).unwrap();
        assert_eq!(list.child_nodes(Rule::AlterListItem).count(), 4);
        assert!(list.has_child_node(Rule::CreateTableOptions));
        assert!(list.descendant_node(Rule::Place).is_some());
    }

    #[test]
    fn test_drop_statements() {
        let drop = statement("DROP TABLE IF EXISTS a, `b`");
        let table = drop.child_node(Rule::DropTable).unwrap();
        assert!(table.has_child_node(Rule::IfExists));
        let list = table.child_node(Rule::TableRefList).unwrap();
        assert_eq!(list.child_nodes(Rule::TableRef).count(), 2);

        let drop = statement("DROP INDEX idx ON t");
        let index = drop.child_node(Rule::DropIndex).unwrap();
        assert_eq!(
            index.descendant_token(TokenKind::Identifier).map(|t| t.value.as_str()),
            Some("idx")
        );
    }
}
