//! Expression grammar.
//!
//! Precedence, lowest first: `OR`/`||`, `XOR`, `AND`/`&&`, `NOT`,
//! comparisons and `IS`, predicates (`IN`, `BETWEEN`, `LIKE`, `REGEXP`),
//! then the bit-expression ladder `|`, `&`, shifts, `+ -`, `* / DIV MOD %`,
//! `^`, and finally simple expressions.

use super::Parser;
use crate::ast::{Node, Token, TokenKind};
use crate::error::Result;
use crate::grammar::{Keyword, Rule, Symbol};

/// Aggregate functions parsed as `sumExpr`.
const AGGREGATES: &[Keyword] = &[
    Keyword::Count,
    Keyword::Sum,
    Keyword::Avg,
    Keyword::Min,
    Keyword::Max,
    Keyword::GroupConcat,
];

/// Functions that may be written without parentheses.
const NILADIC: &[Keyword] = &[
    Keyword::CurrentTimestamp,
    Keyword::CurrentDate,
    Keyword::CurrentTime,
    Keyword::UtcTimestamp,
];

const INTERVAL_UNITS: &[Keyword] = &[
    Keyword::Microsecond,
    Keyword::Second,
    Keyword::Minute,
    Keyword::Hour,
    Keyword::Day,
    Keyword::Week,
    Keyword::Month,
    Keyword::Quarter,
    Keyword::Year,
];

const BIT_LEVELS: &[&[Symbol]] = &[
    &[Symbol::Pipe],
    &[Symbol::Amp],
    &[Symbol::ShiftLeft, Symbol::ShiftRight],
    &[Symbol::Plus, Symbol::Minus],
    &[Symbol::Star, Symbol::Slash, Symbol::Percent],
    &[Symbol::Caret],
];

/// Index of the multiplicative level, which also takes `DIV` and `MOD`.
const MULTIPLICATIVE: usize = 4;

impl Parser<'_> {
    pub(super) fn parse_expr(&mut self) -> Result<Node> {
        self.parse_logical(0)
    }

    /// `OR`, `XOR` and `AND` chains, flattened into one `expr` node per level.
    fn parse_logical(&mut self, level: usize) -> Result<Node> {
        let operators: &[TokenKind] = match level {
            0 => &[TokenKind::Keyword(Keyword::Or), TokenKind::Symbol(Symbol::LogicalOr)],
            1 => &[TokenKind::Keyword(Keyword::Xor)],
            2 => &[TokenKind::Keyword(Keyword::And), TokenKind::Symbol(Symbol::LogicalAnd)],
            _ => return self.parse_not_expr(),
        };

        let first = self.parse_logical(level + 1)?;
        if !operators.contains(&self.peek().kind) {
            return Ok(first);
        }
        let mut node = Node::new(Rule::Expr);
        node.push(first);
        while operators.contains(&self.peek().kind) {
            node.push(self.advance());
            node.push(self.parse_logical(level + 1)?);
        }
        Ok(node)
    }

    fn parse_not_expr(&mut self) -> Result<Node> {
        if self.at(Keyword::Not) {
            let mut node = Node::new(Rule::Expr);
            node.push(self.advance());
            node.push(self.parse_not_expr()?);
            return Ok(node);
        }
        self.parse_bool_pri()
    }

    fn parse_bool_pri(&mut self) -> Result<Node> {
        let mut left = self.parse_predicate()?;
        loop {
            if self.at(Keyword::Is) {
                let mut node = Node::new(Rule::BoolPri);
                node.push(left);
                node.push(self.advance());
                if let Some(not) = self.eat(Keyword::Not) {
                    node.push(not);
                }
                node.push(self.expect_any(&[
                    Keyword::Null,
                    Keyword::True,
                    Keyword::False,
                    Keyword::Unknown,
                ])?);
                left = node;
                continue;
            }

            if self.peek().symbol().is_some_and(|symbol| symbol.is_comparison()) {
                let mut node = Node::new(Rule::BoolPri);
                node.push(left);
                node.push(Node::with_children(Rule::CompOp, [self.advance().into()]));
                if self.at_any(&[Keyword::Any, Keyword::Some, Keyword::All]) {
                    node.push(self.advance());
                    node.push(self.parse_subquery()?);
                } else {
                    node.push(self.parse_predicate()?);
                }
                left = node;
                continue;
            }
            return Ok(left);
        }
    }

    fn parse_predicate(&mut self) -> Result<Node> {
        let left = self.parse_bit_expr(0)?;

        let negated = self.at(Keyword::Not)
            && matches!(
                self.peek_nth(1).keyword(),
                Some(Keyword::In | Keyword::Between | Keyword::Like | Keyword::Regexp | Keyword::Rlike)
            );
        let operator_at = usize::from(negated);
        let operator = match self.peek_nth(operator_at).keyword() {
            Some(kw @ (Keyword::In | Keyword::Between | Keyword::Like | Keyword::Regexp | Keyword::Rlike)) => kw,
            _ => return Ok(left),
        };

        let mut node = Node::new(Rule::Predicate);
        node.push(left);
        if negated {
            node.push(self.advance());
        }
        node.push(self.advance());

        match operator {
            Keyword::In => {
                if self.at_nth(1, Keyword::Select) {
                    node.push(self.parse_subquery()?);
                } else {
                    node.push(self.expect_symbol(Symbol::LParen)?);
                    node.push(self.parse_expr_list()?);
                    node.push(self.expect_symbol(Symbol::RParen)?);
                }
            }
            Keyword::Between => {
                node.push(self.parse_bit_expr(0)?);
                node.push(self.expect(Keyword::And)?);
                node.push(self.parse_predicate()?);
            }
            Keyword::Like => {
                node.push(self.parse_simple_expr()?);
                if let Some(escape) = self.eat(Keyword::Escape) {
                    node.push(escape);
                    node.push(self.parse_simple_expr()?);
                }
            }
            _ => node.push(self.parse_bit_expr(0)?),
        }
        Ok(node)
    }

    fn at_bit_operator(&self, level: usize) -> bool {
        let token = self.peek();
        let symbol_match = token
            .symbol()
            .is_some_and(|symbol| BIT_LEVELS[level].contains(&symbol));
        symbol_match
            || (level == MULTIPLICATIVE
                && (token.is_keyword(Keyword::Div) || token.is_keyword(Keyword::Mod)))
    }

    fn parse_bit_expr(&mut self, level: usize) -> Result<Node> {
        if level == BIT_LEVELS.len() {
            return self.parse_simple_expr();
        }

        let mut left = self.parse_bit_expr(level + 1)?;
        while self.at_bit_operator(level) {
            let mut node = Node::new(Rule::BitExpr);
            node.push(left);
            node.push(self.advance());
            if self.at(Keyword::Interval) {
                node.push(self.parse_interval()?);
            } else {
                node.push(self.parse_bit_expr(level + 1)?);
            }
            left = node;
        }
        Ok(left)
    }

    /// `INTERVAL expr unit`
    pub(super) fn parse_interval(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::Interval);
        node.push(self.expect(Keyword::Interval)?);
        node.push(self.parse_expr()?);
        let unit = self.expect_any(INTERVAL_UNITS)?;
        node.push(Node::with_children(Rule::IntervalTimeStamp, [unit.into()]));
        Ok(node)
    }

    pub(super) fn parse_simple_expr(&mut self) -> Result<Node> {
        let base = self.parse_simple_expr_base()?;
        if !self.at(Keyword::Collate) {
            return Ok(base);
        }
        let mut node = Node::new(Rule::SimpleExpr);
        node.push(base);
        node.push(self.advance());
        node.push(self.parse_collation_name()?);
        Ok(node)
    }

    fn parse_simple_expr_base(&mut self) -> Result<Node> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Symbol(Symbol::Minus | Symbol::Plus | Symbol::Tilde | Symbol::Bang) => {
                let mut node = Node::new(Rule::SimpleExpr);
                node.push(self.advance());
                node.push(self.parse_simple_expr()?);
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Binary) => {
                let mut node = Node::new(Rule::SimpleExpr);
                node.push(self.advance());
                node.push(self.parse_simple_expr()?);
                Ok(node)
            }
            TokenKind::Symbol(Symbol::LParen) => {
                if self.at_nth(1, Keyword::Select) {
                    return self.parse_subquery();
                }
                self.advance();
                let first = self.parse_expr()?;
                if self.at_symbol(Symbol::Comma) {
                    let mut list = Node::new(Rule::ExprList);
                    list.push(first);
                    while let Some(comma) = self.eat_symbol(Symbol::Comma) {
                        list.push(comma);
                        list.push(self.parse_expr()?);
                    }
                    let mut node = Node::new(Rule::SimpleExpr);
                    node.push(token);
                    node.push(list);
                    node.push(self.expect_symbol(Symbol::RParen)?);
                    return Ok(node);
                }
                let mut node = Node::new(Rule::ExprWithParentheses);
                node.push(token);
                node.push(first);
                node.push(self.expect_symbol(Symbol::RParen)?);
                Ok(node)
            }
            TokenKind::Keyword(Keyword::Exists) => {
                let mut node = Node::new(Rule::SimpleExpr);
                node.push(self.advance());
                node.push(self.parse_subquery()?);
                Ok(node)
            }
            TokenKind::Symbol(Symbol::AtAt) => self.parse_system_variable(),
            TokenKind::UserVariable => {
                Ok(Node::with_children(Rule::UserVariable, [self.advance().into()]))
            }
            TokenKind::ParamMarker => {
                Ok(Node::with_children(Rule::SimpleExpr, [self.advance().into()]))
            }
            TokenKind::SingleQuotedText | TokenKind::DoubleQuotedText => self.parse_text_literal(),
            kind if kind.is_number() => {
                let number = Node::with_children(Rule::NumLiteral, [self.advance().into()]);
                Ok(Node::with_children(Rule::Literal, [number.into()]))
            }
            TokenKind::Keyword(Keyword::Null) => {
                let null = Node::with_children(Rule::NullLiteral, [self.advance().into()]);
                Ok(Node::with_children(Rule::Literal, [null.into()]))
            }
            TokenKind::Keyword(Keyword::True | Keyword::False) => {
                let boolean = Node::with_children(Rule::BoolLiteral, [self.advance().into()]);
                Ok(Node::with_children(Rule::Literal, [boolean.into()]))
            }
            TokenKind::Keyword(Keyword::Date | Keyword::Time | Keyword::Timestamp)
                if self.peek_nth(1).kind.is_text() =>
            {
                let mut temporal = Node::new(Rule::TemporalLiteral);
                temporal.push(self.advance());
                temporal.push(self.parse_text_string_literal()?);
                Ok(Node::with_children(Rule::Literal, [temporal.into()]))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Interval) => {
                Err(self.unsupported_here("INTERVAL outside of date arithmetic"))
            }
            TokenKind::Keyword(Keyword::Match) => Err(self.unsupported_here("MATCH ... AGAINST")),
            TokenKind::Keyword(keyword)
                if AGGREGATES.contains(&keyword) && self.peek_nth(1).is_symbol(Symbol::LParen) =>
            {
                self.parse_sum_expr()
            }
            TokenKind::Keyword(Keyword::Cast) if self.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.parse_cast()
            }
            TokenKind::Keyword(Keyword::Convert) if self.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.parse_convert()
            }
            TokenKind::Keyword(Keyword::Extract) if self.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.parse_extract()
            }
            TokenKind::Keyword(Keyword::Position) if self.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.parse_position()
            }
            TokenKind::Keyword(keyword) if NILADIC.contains(&keyword) => {
                let mut node = Node::new(Rule::RuntimeFunctionCall);
                node.push(self.advance());
                if let Some(open) = self.eat_symbol(Symbol::LParen) {
                    node.push(open);
                    if !self.at_symbol(Symbol::RParen) {
                        node.push(self.parse_udf_expr_list()?);
                    }
                    node.push(self.expect_symbol(Symbol::RParen)?);
                }
                Ok(node)
            }
            TokenKind::Keyword(_) if self.peek_nth(1).is_symbol(Symbol::LParen) => {
                self.parse_function_call(Rule::RuntimeFunctionCall)
            }
            TokenKind::Identifier | TokenKind::BackTickQuotedId
                if self.peek_nth(1).is_symbol(Symbol::LParen) =>
            {
                self.parse_function_call(Rule::FunctionCall)
            }
            _ if self.at_identifier() => self.parse_column_ref(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    pub(super) fn parse_expr_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::ExprList);
        node.push(self.parse_expr()?);
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            node.push(comma);
            node.push(self.parse_expr()?);
        }
        Ok(node)
    }

    /// `( queryExpression )`
    pub(super) fn parse_subquery(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::Subquery);
        node.push(self.expect_symbol(Symbol::LParen)?);
        node.push(self.parse_query_expression()?);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// One or more adjacent string tokens, which MySQL concatenates.
    pub(super) fn parse_text_string_literal(&mut self) -> Result<Node> {
        if !self.peek().kind.is_text() {
            return Err(self.unexpected("a string"));
        }
        let mut node = Node::new(Rule::TextStringLiteral);
        while self.peek().kind.is_text() {
            node.push(self.advance());
        }
        Ok(node)
    }

    pub(super) fn parse_text_literal(&mut self) -> Result<Node> {
        let text = Node::with_children(Rule::TextLiteral, [self.parse_text_string_literal()?.into()]);
        Ok(Node::with_children(Rule::Literal, [text.into()]))
    }

    fn parse_system_variable(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SystemVariable);
        node.push(self.expect_symbol(Symbol::AtAt)?);
        if self.at_any(&[Keyword::Global, Keyword::Session, Keyword::Local])
            && self.peek_nth(1).is_symbol(Symbol::Dot)
        {
            node.push(self.advance());
            node.push(self.advance());
        }
        node.push(self.parse_dotted_identifier()?);
        if let Some(dot) = self.eat_symbol(Symbol::Dot) {
            node.push(dot);
            node.push(self.parse_dotted_identifier()?);
        }
        Ok(node)
    }

    fn parse_case_expression(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CaseExpression);
        node.push(self.expect(Keyword::Case)?);
        if !self.at(Keyword::When) {
            node.push(self.parse_expr()?);
        }
        while self.at(Keyword::When) {
            let mut when = Node::new(Rule::WhenExpression);
            when.push(self.advance());
            when.push(self.parse_expr()?);
            when.push(self.expect(Keyword::Then)?);
            when.push(self.parse_expr()?);
            node.push(when);
        }
        if !node.has_child_node(Rule::WhenExpression) {
            return Err(self.unexpected("WHEN"));
        }
        if self.at(Keyword::Else) {
            let mut otherwise = Node::new(Rule::ElseExpression);
            otherwise.push(self.advance());
            otherwise.push(self.parse_expr()?);
            node.push(otherwise);
        }
        node.push(self.expect(Keyword::End)?);
        Ok(node)
    }

    /// `COUNT(*)`, `SUM(DISTINCT x)`, `GROUP_CONCAT(x ORDER BY y SEPARATOR ',')` ...
    fn parse_sum_expr(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::SumExpr);
        let name = self.advance();
        let group_concat = name.is_keyword(Keyword::GroupConcat);
        node.push(name);
        node.push(self.expect_symbol(Symbol::LParen)?);
        if let Some(quantifier) = self.eat_any(&[Keyword::Distinct, Keyword::All]) {
            node.push(quantifier);
        }
        if let Some(star) = self.eat_symbol(Symbol::Star) {
            node.push(star);
        } else {
            node.push(self.parse_expr_list()?);
        }
        if group_concat {
            if self.at(Keyword::Order) {
                node.push(self.parse_order_clause()?);
            }
            if let Some(separator) = self.eat(Keyword::Separator) {
                node.push(separator);
                node.push(self.parse_text_string_literal()?);
            }
        }
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// `CAST(expr AS type)`
    fn parse_cast(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::RuntimeFunctionCall);
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::LParen)?);
        node.push(self.parse_expr()?);
        node.push(self.expect(Keyword::As)?);
        node.push(self.parse_cast_type()?);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// `CONVERT(expr, type)` or `CONVERT(expr USING charset)`
    fn parse_convert(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::RuntimeFunctionCall);
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::LParen)?);
        node.push(self.parse_expr()?);
        if let Some(using) = self.eat(Keyword::Using) {
            node.push(using);
            node.push(self.parse_charset_name()?);
        } else {
            node.push(self.expect_symbol(Symbol::Comma)?);
            node.push(self.parse_cast_type()?);
        }
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// `EXTRACT(unit FROM expr)`
    fn parse_extract(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::RuntimeFunctionCall);
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::LParen)?);
        let unit = self.expect_any(INTERVAL_UNITS)?;
        node.push(Node::with_children(Rule::IntervalTimeStamp, [unit.into()]));
        node.push(self.expect(Keyword::From)?);
        node.push(self.parse_expr()?);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// `POSITION(needle IN haystack)`, with the arguments in call order.
    fn parse_position(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::RuntimeFunctionCall);
        node.push(self.advance());
        node.push(self.expect_symbol(Symbol::LParen)?);
        let mut arguments = Node::new(Rule::UdfExprList);
        arguments.push(Node::with_children(Rule::UdfExpr, [self.parse_bit_expr(0)?.into()]));
        let position = self.expect(Keyword::In)?.position;
        arguments.push(Token::new(TokenKind::Symbol(Symbol::Comma), ",", position));
        arguments.push(Node::with_children(Rule::UdfExpr, [self.parse_expr()?.into()]));
        node.push(arguments);
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    fn parse_cast_type(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::CastType);
        let token = self.peek().clone();
        match token.keyword() {
            Some(Keyword::Signed | Keyword::Unsigned) => {
                node.push(self.advance());
                if let Some(int) = self.eat_any(&[Keyword::Int, Keyword::Integer]) {
                    node.push(int);
                }
            }
            Some(Keyword::Char | Keyword::Binary | Keyword::Nchar) => {
                node.push(self.advance());
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_field_length()?);
                }
                if let Some(charset) = self.parse_charset_with_opt_binary()? {
                    node.push(charset);
                }
            }
            Some(Keyword::Decimal | Keyword::Float) => {
                node.push(self.advance());
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_length_or_precision()?);
                }
            }
            Some(Keyword::Datetime | Keyword::Time) => {
                node.push(self.advance());
                if self.at_symbol(Symbol::LParen) {
                    node.push(self.parse_datetime_precision()?);
                }
            }
            Some(
                Keyword::Date
                | Keyword::Double
                | Keyword::Real
                | Keyword::Json
                | Keyword::Int
                | Keyword::Integer
                | Keyword::Year,
            ) => node.push(self.advance()),
            _ => return Err(self.unexpected("a cast type")),
        }
        Ok(node)
    }

    /// `name ( [args] )` for built-in (keyword) and user functions.
    fn parse_function_call(&mut self, rule: Rule) -> Result<Node> {
        let mut node = Node::new(rule);
        let name = self.advance();
        let substring = matches!(name.keyword(), Some(Keyword::Substring | Keyword::Substr));
        match rule {
            Rule::FunctionCall => node.push(Node::with_children(Rule::Identifier, [name.into()])),
            _ => node.push(name),
        }
        node.push(self.expect_symbol(Symbol::LParen)?);
        if !self.at_symbol(Symbol::RParen) {
            if substring {
                node.push(self.parse_substring_arguments()?);
            } else {
                node.push(self.parse_udf_expr_list()?);
            }
        }
        node.push(self.expect_symbol(Symbol::RParen)?);
        Ok(node)
    }

    /// Accepts both `SUBSTRING(s, pos, len)` and `SUBSTRING(s FROM pos FOR len)`.
    fn parse_substring_arguments(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::UdfExprList);
        node.push(Node::with_children(Rule::UdfExpr, [self.parse_expr()?.into()]));
        if self.at(Keyword::From) {
            self.advance();
            node.push(Token::new(TokenKind::Symbol(Symbol::Comma), ",", self.peek().position));
            node.push(Node::with_children(Rule::UdfExpr, [self.parse_expr()?.into()]));
            if self.at(Keyword::For) {
                self.advance();
                node.push(Token::new(TokenKind::Symbol(Symbol::Comma), ",", self.peek().position));
                node.push(Node::with_children(Rule::UdfExpr, [self.parse_expr()?.into()]));
            }
            return Ok(node);
        }
        while let Some(comma) = self.eat_symbol(Symbol::Comma) {
            node.push(comma);
            node.push(Node::with_children(Rule::UdfExpr, [self.parse_expr()?.into()]));
        }
        Ok(node)
    }

    fn parse_udf_expr_list(&mut self) -> Result<Node> {
        let mut node = Node::new(Rule::UdfExprList);
        loop {
            let argument = if self.at(Keyword::Interval) {
                self.parse_interval()?
            } else {
                self.parse_expr()?
            };
            node.push(Node::with_children(Rule::UdfExpr, [argument.into()]));
            match self.eat_symbol(Symbol::Comma) {
                Some(comma) => node.push(comma),
                None => break,
            }
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::statement;
    use crate::ast::{Node, TokenKind};
    use crate::grammar::{Grammar, Keyword, Rule};
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn expr(sql: &str) -> Node {
        let select = statement(&format!("SELECT {sql}"));
        let item = select.descendant_node(Rule::SelectItem).unwrap();
        item.first_child_node().unwrap().clone()
    }

    #[test]
    fn test_precedence() {
        let node = expr("a OR b AND c");
        assert_eq!(node.rule, Rule::Expr);
        assert!(node.has_keyword(Keyword::Or));
        let right = node.child_node(Rule::Expr).unwrap();
        assert!(right.has_keyword(Keyword::And));

        let node = expr("1 + 2 * 3");
        assert_eq!(node.rule, Rule::BitExpr);
        let right = node.child_node(Rule::BitExpr).unwrap();
        assert_eq!(right.text(), "2*3");
    }

    #[test]
    fn test_comparisons_and_is() {
        let node = expr("a <=> NULL");
        assert_eq!(node.rule, Rule::BoolPri);
        assert!(node.has_child_node(Rule::CompOp));

        let node = expr("a IS NOT NULL");
        assert_eq!(node.rule, Rule::BoolPri);
        assert!(node.has_keyword(Keyword::Not));
    }

    #[test]
    fn test_predicates() {
        let node = expr("a NOT IN (1, 2)");
        assert_eq!(node.rule, Rule::Predicate);
        assert!(node.has_keyword(Keyword::Not));
        assert!(node.has_child_node(Rule::ExprList));

        let node = expr("a IN (SELECT b FROM t)");
        assert!(node.has_child_node(Rule::Subquery));

        let node = expr("a BETWEEN 1 AND 2");
        assert!(node.has_keyword(Keyword::Between));

        let node = expr(r"a LIKE 'x\_%' ESCAPE '\\'");
        assert!(node.has_keyword(Keyword::Escape));
    }

    #[test]
    fn test_function_calls() {
        let node = expr("CONCAT(a, 'b')");
        assert_eq!(node.rule, Rule::FunctionCall);
        assert_eq!(node.descendant_nodes(Rule::UdfExpr).len(), 2);

        let node = expr("NOW()");
        assert_eq!(node.rule, Rule::RuntimeFunctionCall);

        let node = expr("CURRENT_TIMESTAMP");
        assert_eq!(node.rule, Rule::RuntimeFunctionCall);

        let node = expr("DATE_ADD(d, INTERVAL 1 DAY)");
        assert!(node.descendant_node(Rule::Interval).is_some());

        let node = expr("COUNT(DISTINCT a)");
        assert_eq!(node.rule, Rule::SumExpr);
        assert!(node.has_keyword(Keyword::Distinct));

        let node = expr("GROUP_CONCAT(a ORDER BY a SEPARATOR ';')");
        assert!(node.has_child_node(Rule::OrderClause));
        assert!(node.has_keyword(Keyword::Separator));

        let node = expr("CAST(a AS SIGNED)");
        assert!(node.has_child_node(Rule::CastType));

        let node = expr("SUBSTRING(a FROM 2 FOR 3)");
        assert_eq!(node.descendant_nodes(Rule::UdfExpr).len(), 3);
    }

    #[test]
    fn test_literals() {
        let node = expr("'a' 'b'");
        let text = node.descendant_node(Rule::TextStringLiteral).unwrap();
        assert_eq!(text.children().len(), 2);

        let node = expr("DATE '2024-01-01'");
        assert!(node.descendant_node(Rule::TemporalLiteral).is_some());

        let node = expr("-1");
        assert_eq!(node.rule, Rule::SimpleExpr);
        assert!(node.descendant_token(TokenKind::IntNumber).is_some());
    }

    #[test]
    fn test_case_expression() {
        let node = expr("CASE a WHEN 1 THEN 'one' ELSE 'other' END");
        assert_eq!(node.rule, Rule::CaseExpression);
        assert!(node.has_child_node(Rule::WhenExpression));
        assert!(node.has_child_node(Rule::ElseExpression));
    }

    #[test]
    fn test_variables() {
        let node = expr("@@SESSION.sql_mode");
        assert_eq!(node.rule, Rule::SystemVariable);
        let node = expr("@counter");
        assert_eq!(node.rule, Rule::UserVariable);
    }

    #[test]
    fn test_match_against_is_unsupported() {
        let grammar = Grammar::mysql();
        let err = crate::parser::parse(&grammar, "SELECT MATCH (a) AGAINST ('x') FROM t").unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
