//! Translator: walks a MySQL parse tree and produces SQLite [`Expression`]s.
//!
//! Every rule is handled by an exhaustive `match` in [`Translator::translate_node`].
//! Rules without special handling concatenate their children's translations,
//! skipping children that translate to nothing.
//!
//! # Example
//!
//! ```
//! use mysqlite::grammar::Grammar;
//! use mysqlite::transpiler::Translator;
//!
//! let grammar = Grammar::mysql();
//! let tree = mysqlite::parse(&grammar, "SELECT a FROM t WHERE b <=> NULL").unwrap();
//! let sql = Translator::new("wp").translate_to_sql(&tree).unwrap();
//! assert_eq!(sql.as_deref(), Some(r#"SELECT "a" FROM "t" WHERE "b" IS NULL"#));
//! ```

pub mod builder;
pub mod expression;
pub mod factory;
mod functions;
pub mod types;

pub use builder::ToSql;
pub use expression::{Element, Expression, SqliteToken, SqliteTokenKind};

use crate::ast::{Child, Node, Token, TokenKind};
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule, Symbol};
use factory::{identifier, raw};

/// Name of the SQLite index created for MySQL index `index` on `table`.
/// SQLite index names are global, so they are prefixed with the table.
pub fn index_name(table: &str, index: &str) -> String {
    format!("{}__{}", table, index)
}

/// Logical text of an `identifier` node.
pub fn identifier_text(node: &Node) -> String {
    node.first_child_token()
        .map(|token| token.text().into_owned())
        .unwrap_or_default()
}

/// The last identifier of a dotted name, i.e. the column of `t.c` or the
/// table of `db.t`.
pub fn last_identifier(node: &Node) -> Option<String> {
    node.child_nodes(Rule::Identifier).last().map(identifier_text)
}

/// Column names of a standalone `PRIMARY KEY (...)` constraint in a table
/// element list, if there is one.
pub fn primary_key_columns(elements: &Node) -> Option<Vec<String>> {
    elements
        .child_nodes(Rule::TableElement)
        .filter_map(|element| element.child_node(Rule::TableConstraintDef))
        .find(|constraint| constraint.has_keyword(Keyword::Primary))
        .and_then(|constraint| constraint.child_node(Rule::KeyList))
        .map(|keys| {
            keys.child_nodes(Rule::KeyPart)
                .filter_map(|part| part.child_node(Rule::Identifier))
                .map(identifier_text)
                .collect()
        })
}

/// Per-call translation state.
pub struct Translator<'a> {
    database_name: &'a str,
    has_seen_calc_found_rows: bool,
    has_seen_found_rows: bool,
}

impl<'a> Translator<'a> {
    /// `database_name` is the MySQL schema name; `DATABASE()` returns it and
    /// `name.table` qualifiers using it are dropped.
    pub fn new(database_name: &'a str) -> Self {
        Self {
            database_name,
            has_seen_calc_found_rows: false,
            has_seen_found_rows: false,
        }
    }

    pub fn database_name(&self) -> &str {
        self.database_name
    }

    pub fn has_seen_calc_found_rows(&self) -> bool {
        self.has_seen_calc_found_rows
    }

    pub fn has_seen_found_rows(&self) -> bool {
        self.has_seen_found_rows
    }

    pub fn translate(&mut self, child: Option<&Child>) -> Result<Option<Expression>> {
        match child {
            None => Ok(None),
            Some(Child::Node(node)) => self.translate_node(node),
            Some(Child::Token(token)) => self.translate_token(token),
        }
    }

    /// Translate and render to SQL text.
    pub fn translate_to_sql(&mut self, node: &Node) -> Result<Option<String>> {
        Ok(self.translate_node(node)?.map(|expression| expression.to_sql()))
    }

    pub fn translate_node(&mut self, node: &Node) -> Result<Option<Expression>> {
        match node.rule {
            Rule::Fragment
            | Rule::Query
            | Rule::SimpleStatement
            | Rule::SelectStatement
            | Rule::QueryExpression
            | Rule::QuerySpecification
            | Rule::UnionClause
            | Rule::SelectItemList
            | Rule::SelectItem
            | Rule::TableWild
            | Rule::TableReferenceList
            | Rule::TableReference
            | Rule::TableFactor
            | Rule::SingleTable
            | Rule::DerivedTable
            | Rule::TableReferenceListParens
            | Rule::JoinedTable
            | Rule::InnerJoinType
            | Rule::OuterJoinType
            | Rule::NaturalJoinType
            | Rule::IdentifierList
            | Rule::IdentifierListWithParentheses
            | Rule::WhereClause
            | Rule::HavingClause
            | Rule::OrderClause
            | Rule::OrderList
            | Rule::Direction
            | Rule::LimitClause
            | Rule::LimitOptions
            | Rule::LimitOption
            | Rule::InsertValues
            | Rule::ValueList
            | Rule::InsertQueryExpression
            | Rule::UpdateList
            | Rule::DeleteStatement
            | Rule::CreateStatement
            | Rule::IfNotExists
            | Rule::IfExists
            | Rule::TableRefList
            | Rule::TableElement
            | Rule::FieldDefinition
            | Rule::GeneratedColumn
            | Rule::SignedLiteral
            | Rule::IndexName
            | Rule::KeyList
            | Rule::KeyPart
            | Rule::DropStatement
            | Rule::Expr
            | Rule::CompOp
            | Rule::Predicate
            | Rule::ExprList
            | Rule::ExprWithParentheses
            | Rule::Subquery
            | Rule::Literal
            | Rule::TextLiteral
            | Rule::NumLiteral
            | Rule::NullLiteral
            | Rule::QualifiedIdentifier
            | Rule::UdfExprList
            | Rule::UdfExpr
            | Rule::CaseExpression
            | Rule::WhenExpression
            | Rule::ElseExpression => self.translate_sequence(node),

            // Clauses with no SQLite counterpart.
            Rule::LockingClause
            | Rule::InsertLockOption
            | Rule::DeleteStatementOption
            | Rule::FieldLength
            | Rule::Precision
            | Rule::TypeDatetimePrecision
            | Rule::FieldOptions
            | Rule::StringList
            | Rule::CharsetWithOptBinary
            | Rule::CharsetName
            | Rule::CollationName
            | Rule::IndexTypeClause
            | Rule::IndexType
            | Rule::IndexOption
            | Rule::CreateTableOptions
            | Rule::CreateTableOption
            | Rule::EngineRef
            | Rule::Place
            | Rule::SetStatement => Ok(None),

            Rule::QueryExpressionParens => self.translate_query_expression_parens(node),
            Rule::SelectOption => self.translate_select_option(node),
            Rule::SelectAlias | Rule::TableAlias => self.translate_alias(node),
            Rule::FromClause => {
                if node.has_keyword(Keyword::Dual) {
                    Ok(None)
                } else {
                    self.translate_sequence(node)
                }
            }
            Rule::IndexHintList | Rule::IndexHint => Err(Error::unsupported("index hints")),
            Rule::GroupByClause => {
                if node.has_child_node(Rule::OlapOption) {
                    return Err(Error::unsupported("WITH ROLLUP"));
                }
                self.translate_sequence(node)
            }
            Rule::OlapOption => Err(Error::unsupported("WITH ROLLUP")),
            Rule::OrderExpression => {
                let mut expression = self.translate_sequence(node)?.unwrap_or_default();
                if !node.has_child_node(Rule::Direction) {
                    expression.push(raw("ASC"));
                }
                Ok(Some(expression))
            }

            Rule::InsertStatement | Rule::ReplaceStatement => self.translate_insert(node).map(Some),
            Rule::InsertFromConstructor => self.translate_insert_constructor(node).map(Some),
            Rule::Fields => Ok(Some(self.translate_fields(node)?)),
            Rule::Values => {
                if node.has_keyword(Keyword::Default) {
                    return Err(Error::unsupported("DEFAULT in a VALUES row"));
                }
                self.translate_sequence(node)
            }
            Rule::InsertUpdateList => {
                let list = required_child(node, Rule::UpdateList)?;
                let mut expression = Expression::from_iter([
                    raw("ON"),
                    raw("CONFLICT"),
                    raw("DO"),
                    raw("UPDATE"),
                    raw("SET"),
                ]);
                expression.append(self.translate_required(list)?);
                Ok(Some(expression))
            }
            Rule::UpdateElement => self.translate_update_element(node).map(Some),
            Rule::UpdateStatement => self.translate_update(node).map(Some),

            Rule::CreateTable => {
                if node.has_keyword(Keyword::Like) {
                    return Err(Error::unsupported("CREATE TABLE ... LIKE"));
                }
                if node.has_child_node(Rule::TableElementList)
                    && node.has_child_node(Rule::DuplicateAsQueryExpression)
                {
                    return Err(Error::unsupported(
                        "CREATE TABLE with both column definitions and a query",
                    ));
                }
                self.translate_sequence(node)
            }
            Rule::TableName | Rule::TableRef => self.translate_table_name(node),
            Rule::TableElementList => self.translate_table_elements(node).map(Some),
            Rule::ColumnDefinition => self.translate_column_definition(node, false).map(Some),
            Rule::DataType => types::translate_data_type(node).map(Some),
            Rule::ColumnAttribute => self.translate_column_attribute(node),
            Rule::References => self.translate_references(node).map(Some),
            Rule::TableConstraintDef => self.translate_table_constraint(node),
            Rule::ConstraintName => {
                if node.has_child_node(Rule::Identifier) {
                    self.translate_sequence(node)
                } else {
                    Ok(None)
                }
            }
            Rule::DuplicateAsQueryExpression => {
                let query = required_child(node, Rule::QueryExpression)?;
                Ok(Some(Expression::from(raw("AS")).then(self.translate_required(query)?)))
            }
            Rule::CreateIndex => {
                let table = required_child(node, Rule::TableRef)?;
                let index = required_child(node, Rule::IndexName)?;
                let keys = required_child(node, Rule::KeyList)?;
                let table = last_identifier(table).unwrap_or_default();
                let index = last_identifier(index).unwrap_or_default();
                self.index_definition(&table, &index, node.has_keyword(Keyword::Unique), keys)
                    .map(Some)
            }
            Rule::AlterStatement | Rule::AlterTable | Rule::AlterList | Rule::AlterListItem => {
                Err(Error::unsupported("ALTER TABLE outside of the driver"))
            }
            Rule::DropTable => self.translate_drop_table(node).map(Some),
            Rule::DropIndex => {
                let table = required_child(node, Rule::TableRef)?;
                let index = required_child(node, Rule::IndexName)?;
                let name = index_name(
                    &last_identifier(table).unwrap_or_default(),
                    &last_identifier(index).unwrap_or_default(),
                );
                Ok(Some(Expression::from_iter([raw("INDEX"), identifier(&name)])))
            }

            Rule::BoolPri => self.translate_bool_pri(node),
            Rule::BitExpr => self.translate_bit_expr(node).map(Some),
            Rule::SimpleExpr => self.translate_simple_expr(node),
            Rule::TextStringLiteral => Ok(Some(factory::value(&node.text()).into())),
            Rule::BoolLiteral => {
                let truth = node.has_keyword(Keyword::True);
                Ok(Some(factory::boolean(truth).into()))
            }
            Rule::TemporalLiteral => {
                let text = required_child(node, Rule::TextStringLiteral)?;
                self.translate_node(text)
            }
            Rule::ColumnRef => self.translate_column_ref(node),
            Rule::Identifier => {
                let token = node
                    .first_child_token()
                    .ok_or_else(|| Error::unsupported("empty identifier"))?;
                Ok(Some(identifier(&token.text()).into()))
            }
            Rule::FunctionCall | Rule::RuntimeFunctionCall => {
                self.translate_function_call(node).map(Some)
            }
            Rule::SumExpr => self.translate_sum_expr(node).map(Some),
            Rule::CastType => Err(Error::unsupported("a cast type outside of CAST")),
            Rule::Interval | Rule::IntervalTimeStamp => {
                Err(Error::unsupported("INTERVAL outside of date arithmetic"))
            }
            Rule::SystemVariable => Ok(Some(factory::null().into())),
            Rule::UserVariable => Err(Error::unsupported("user variables")),
        }
    }

    /// Concatenate the translations of all children.
    pub fn translate_sequence(&mut self, node: &Node) -> Result<Option<Expression>> {
        let mut parts = Vec::with_capacity(node.children().len());
        for child in node.children() {
            parts.push(self.translate(Some(child))?);
        }
        let expression = Expression::from_parts(parts);
        Ok((!expression.is_empty()).then_some(expression))
    }

    /// Translate a node that must produce output.
    pub(crate) fn translate_required(&mut self, node: &Node) -> Result<Expression> {
        self.translate_node(node)?.ok_or_else(|| {
            Error::unsupported(format!("empty translation of {}", node.rule_name()))
        })
    }

    pub fn translate_token(&mut self, token: &Token) -> Result<Option<Expression>> {
        let translated = match token.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Keyword(keyword) => translate_keyword(keyword)?,
            TokenKind::Symbol(symbol) => match translate_symbol(symbol)? {
                Some(translated) => translated,
                None => return Ok(None),
            },
            TokenKind::Identifier | TokenKind::BackTickQuotedId => identifier(&token.text()),
            TokenKind::SingleQuotedText | TokenKind::DoubleQuotedText => {
                factory::value(&token.text())
            }
            TokenKind::IntNumber
            | TokenKind::DecimalNumber
            | TokenKind::FloatNumber
            | TokenKind::HexNumber => factory::number(&token.value)?,
            TokenKind::ParamMarker => raw("?"),
            TokenKind::UserVariable => return Err(Error::unsupported("user variables")),
        };
        Ok(Some(translated.into()))
    }

    fn translate_query_expression_parens(&mut self, node: &Node) -> Result<Option<Expression>> {
        let inner = required_child(node, Rule::QueryExpression)?;
        let query = self.translate_required(inner)?;
        // SQLite rejects parenthesized compound members; only a query with its
        // own ORDER BY or LIMIT needs to stay nested.
        if inner.has_child_node(Rule::OrderClause) || inner.has_child_node(Rule::LimitClause) {
            let select = Expression::from_iter([raw("SELECT"), raw("*"), raw("FROM")]);
            return Ok(Some(select.then(Expression::group(query))));
        }
        Ok(Some(query))
    }

    fn translate_select_option(&mut self, node: &Node) -> Result<Option<Expression>> {
        match node.first_child_token().and_then(Token::keyword) {
            Some(Keyword::SqlCalcFoundRows) => {
                self.has_seen_calc_found_rows = true;
                Ok(None)
            }
            Some(Keyword::Distinct | Keyword::Distinctrow) => Ok(Some(raw("DISTINCT").into())),
            Some(Keyword::All) => Ok(Some(raw("ALL").into())),
            _ => Ok(None),
        }
    }

    /// `[AS] name`, always emitted with `AS`.
    fn translate_alias(&mut self, node: &Node) -> Result<Option<Expression>> {
        let name = required_child(node, Rule::Identifier)?;
        Ok(Some(Expression::from(raw("AS")).then(self.translate_required(name)?)))
    }

    /// Table names, with a qualifier naming the configured database dropped.
    fn translate_table_name(&mut self, node: &Node) -> Result<Option<Expression>> {
        let parts: Vec<&Node> = node.child_nodes(Rule::Identifier).collect();
        if let [schema, table] = parts.as_slice() {
            if identifier_text(schema).eq_ignore_ascii_case(self.database_name) {
                return self.translate_node(table);
            }
        }
        self.translate_sequence(node)
    }

    fn translate_column_ref(&mut self, node: &Node) -> Result<Option<Expression>> {
        let parts: Vec<&Node> = node.child_nodes(Rule::Identifier).collect();
        if let [schema, table, column] = parts.as_slice() {
            if identifier_text(schema).eq_ignore_ascii_case(self.database_name) {
                let mut expression = self.translate_required(table)?;
                expression.push(raw("."));
                expression.append(self.translate_required(column)?);
                return Ok(Some(expression));
            }
        }
        self.translate_sequence(node)
    }

    fn translate_insert(&mut self, node: &Node) -> Result<Expression> {
        let mut expression = Expression::new();
        expression.push(raw(if node.rule == Rule::ReplaceStatement {
            "REPLACE"
        } else {
            "INSERT"
        }));
        if node.has_keyword(Keyword::Ignore) {
            expression.push(raw("OR"));
            expression.push(raw("IGNORE"));
        }
        expression.push(raw("INTO"));
        expression.append(self.translate_required(required_child(node, Rule::TableRef)?)?);

        if let Some(assignments) = node.child_node(Rule::UpdateList) {
            expression.append(self.translate_insert_set(assignments)?);
        } else if let Some(constructor) = node.child_node(Rule::InsertFromConstructor) {
            expression.append(self.translate_required(constructor)?);
        } else if let Some(query) = node.child_node(Rule::InsertQueryExpression) {
            if node.has_child_node(Rule::InsertUpdateList) {
                return Err(Error::unsupported(
                    "ON DUPLICATE KEY UPDATE on INSERT ... SELECT",
                ));
            }
            expression.append(self.translate_required(query)?);
        }

        if let Some(update) = node.child_node(Rule::InsertUpdateList) {
            expression.append(self.translate_required(update)?);
        }
        Ok(expression)
    }

    /// `INSERT ... SET a = 1, b = 2` becomes `("a", "b") VALUES (1, 2)`.
    fn translate_insert_set(&mut self, assignments: &Node) -> Result<Expression> {
        let mut columns = Expression::new();
        let mut values = Expression::new();
        for (index, element) in assignments.child_nodes(Rule::UpdateElement).enumerate() {
            if index > 0 {
                columns.push(raw(","));
                values.push(raw(","));
            }
            columns.push(identifier(&assigned_column(element)?));
            values.append(self.assigned_value(element)?);
        }
        Ok(Expression::group(columns)
            .with(raw("VALUES"))
            .then(Expression::group(values)))
    }

    fn translate_insert_constructor(&mut self, node: &Node) -> Result<Expression> {
        let rows = node.descendant_nodes(Rule::Values);
        let empty_row = rows.len() == 1 && rows[0].is_empty();
        if empty_row && !node.has_child_node(Rule::Fields) {
            return Ok(Expression::from_iter([raw("DEFAULT"), raw("VALUES")]));
        }
        Ok(self.translate_sequence(node)?.unwrap_or_default())
    }

    /// Insert column lists take bare column names.
    fn translate_fields(&mut self, node: &Node) -> Result<Expression> {
        let mut expression = Expression::new();
        for (index, column) in node.child_nodes(Rule::ColumnRef).enumerate() {
            if index > 0 {
                expression.push(raw(","));
            }
            let name = last_identifier(column)
                .ok_or_else(|| Error::unsupported("empty column reference"))?;
            expression.push(identifier(&name));
        }
        Ok(expression)
    }

    fn translate_update_element(&mut self, node: &Node) -> Result<Expression> {
        let column = assigned_column(node)?;
        let mut expression = Expression::from(identifier(&column));
        expression.push(raw("="));
        expression.append(self.assigned_value(node)?);
        Ok(expression)
    }

    fn assigned_value(&mut self, element: &Node) -> Result<Expression> {
        if element.has_keyword(Keyword::Default) {
            return Err(Error::unsupported("DEFAULT as an assigned value"));
        }
        let value = element
            .all_child_nodes()
            .nth(1)
            .ok_or_else(|| Error::unsupported("assignment without a value"))?;
        self.translate_required(value)
    }

    fn translate_update(&mut self, node: &Node) -> Result<Expression> {
        let tables = required_child(node, Rule::TableReferenceList)?;
        let references: Vec<&Node> = tables.child_nodes(Rule::TableReference).collect();
        if references.len() != 1 || references[0].has_child_node(Rule::JoinedTable) {
            return Err(Error::unsupported("multi-table UPDATE"));
        }

        let mut expression = Expression::from(raw("UPDATE"));
        if node.has_keyword(Keyword::Ignore) {
            expression.push(raw("OR"));
            expression.push(raw("IGNORE"));
        }
        for child in node.children() {
            if let Child::Token(token) = child {
                if matches!(
                    token.keyword(),
                    Some(Keyword::Update | Keyword::LowPriority | Keyword::Ignore)
                ) {
                    continue;
                }
            }
            if let Some(translated) = self.translate(Some(child))? {
                expression.append(translated);
            }
        }
        Ok(expression)
    }

    /// Column definitions first, then table constraints. A single-column
    /// `PRIMARY KEY (...)` moves inline into its column.
    fn translate_table_elements(&mut self, node: &Node) -> Result<Expression> {
        let inline_key = primary_key_columns(node)
            .filter(|columns| columns.len() == 1)
            .and_then(|mut columns| columns.pop());

        let mut parts = Vec::new();
        for element in node.child_nodes(Rule::TableElement) {
            if let Some(column) = element.child_node(Rule::ColumnDefinition) {
                let name = column
                    .child_node(Rule::Identifier)
                    .map(identifier_text)
                    .unwrap_or_default();
                let primary = inline_key
                    .as_deref()
                    .is_some_and(|key| key.eq_ignore_ascii_case(&name));
                parts.push(self.translate_column_definition(column, primary)?);
            }
        }
        for element in node.child_nodes(Rule::TableElement) {
            let Some(constraint) = element.child_node(Rule::TableConstraintDef) else {
                continue;
            };
            if inline_key.is_some() && constraint.has_keyword(Keyword::Primary) {
                continue;
            }
            if let Some(translated) = self.translate_node(constraint)? {
                parts.push(translated);
            }
        }

        let mut expression = Expression::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                expression.push(raw(","));
            }
            expression.append(part);
        }
        Ok(expression)
    }

    /// A column definition. `primary_key` marks a column whose key was
    /// declared separately as a single-column `PRIMARY KEY (...)`.
    pub fn translate_column_definition(&mut self, node: &Node, primary_key: bool) -> Result<Expression> {
        let name = required_child(node, Rule::Identifier)?;
        let field = required_child(node, Rule::FieldDefinition)?;
        let data_type = required_child(field, Rule::DataType)?;
        let attributes: Vec<&Node> = field.child_nodes(Rule::ColumnAttribute).collect();

        let is_primary = primary_key || attributes.iter().any(|a| is_primary_key_attribute(a));
        let auto_increment = attributes.iter().any(|a| a.has_keyword(Keyword::AutoIncrement));
        if auto_increment && !is_primary {
            return Err(Error::unsupported(
                "AUTO_INCREMENT outside a single-column primary key",
            ));
        }

        let mut expression = self.translate_required(name)?;
        if is_primary && auto_increment {
            expression.push(raw("INTEGER"));
        } else if is_primary && types::is_integer_type(data_type) {
            // INTEGER PRIMARY KEY would alias the rowid.
            expression.push(raw("INT"));
        } else {
            expression.append(types::translate_data_type(data_type)?);
        }
        if let Some(generated) = field.child_node(Rule::GeneratedColumn) {
            expression.append(self.translate_required(generated)?);
        }
        for attribute in attributes {
            if is_primary_key_attribute(attribute) || attribute.has_keyword(Keyword::AutoIncrement) {
                continue;
            }
            if let Some(translated) = self.translate_node(attribute)? {
                expression.append(translated);
            }
        }
        if is_primary {
            expression.push(raw("PRIMARY"));
            expression.push(raw("KEY"));
        }
        if auto_increment {
            expression.push(raw("AUTOINCREMENT"));
        }
        Ok(expression)
    }

    fn translate_column_attribute(&mut self, node: &Node) -> Result<Option<Expression>> {
        let first = node.first_child_token().and_then(Token::keyword);
        match first {
            Some(Keyword::Primary) | Some(Keyword::Key) => {
                Ok(Some(Expression::from_iter([raw("PRIMARY"), raw("KEY")])))
            }
            Some(Keyword::Unique) => Ok(Some(raw("UNIQUE").into())),
            Some(
                Keyword::Comment
                | Keyword::Collate
                | Keyword::On
                | Keyword::ColumnFormat
                | Keyword::Storage
                | Keyword::Visible
                | Keyword::Invisible
                | Keyword::Serial,
            ) => Ok(None),
            _ => self.translate_sequence(node),
        }
    }

    /// `REFERENCES t (cols) [ON DELETE ...]`; `MATCH` is dropped.
    fn translate_references(&mut self, node: &Node) -> Result<Expression> {
        let mut expression = Expression::new();
        let mut skip_next = false;
        for child in node.children() {
            if skip_next {
                skip_next = false;
                continue;
            }
            if let Child::Token(token) = child {
                if token.is_keyword(Keyword::Match) {
                    skip_next = true;
                    continue;
                }
            }
            if let Some(translated) = self.translate(Some(child))? {
                expression.append(translated);
            }
        }
        Ok(expression)
    }

    /// Indexes become separate `CREATE INDEX` statements; only PRIMARY KEY,
    /// FOREIGN KEY and CHECK stay in the table definition.
    fn translate_table_constraint(&mut self, node: &Node) -> Result<Option<Expression>> {
        let kind = node.all_child_tokens().find_map(Token::keyword);
        let mut expression = Expression::new();
        if let Some(name) = node.child_node(Rule::ConstraintName) {
            if let Some(translated) = self.translate_node(name)? {
                expression.append(translated);
            }
        }
        match kind {
            Some(Keyword::Primary) => {
                expression.push(raw("PRIMARY"));
                expression.push(raw("KEY"));
                expression.append(self.translate_required(required_child(node, Rule::KeyList)?)?);
            }
            Some(Keyword::Foreign) => {
                expression.push(raw("FOREIGN"));
                expression.push(raw("KEY"));
                expression.append(self.translate_required(required_child(node, Rule::KeyList)?)?);
                expression.append(self.translate_required(required_child(node, Rule::References)?)?);
            }
            Some(Keyword::Check) => {
                expression.push(raw("CHECK"));
                let check = required_child(node, Rule::ExprWithParentheses)?;
                expression.append(self.translate_required(check)?);
            }
            _ => return Ok(None),
        }
        Ok(Some(expression))
    }

    /// `[UNIQUE] INDEX "<table>__<index>" ON "<table>" (...)`, without the
    /// leading `CREATE`.
    pub fn index_definition(&mut self, table: &str, index: &str, unique: bool, keys: &Node) -> Result<Expression> {
        let mut expression = Expression::new();
        if unique {
            expression.push(raw("UNIQUE"));
        }
        expression.push(raw("INDEX"));
        expression.push(identifier(&index_name(table, index)));
        expression.push(raw("ON"));
        expression.push(identifier(table));
        expression.append(self.translate_required(keys)?);
        Ok(expression)
    }

    fn translate_drop_table(&mut self, node: &Node) -> Result<Expression> {
        let tables = required_child(node, Rule::TableRefList)?;
        let references: Vec<&Node> = tables.child_nodes(Rule::TableRef).collect();
        let [table] = references.as_slice() else {
            return Err(Error::unsupported("DROP TABLE with several tables"));
        };
        let mut expression = Expression::from(raw("TABLE"));
        if node.has_child_node(Rule::IfExists) {
            expression.push(raw("IF"));
            expression.push(raw("EXISTS"));
        }
        expression.append(self.translate_required(table)?);
        Ok(expression)
    }

    /// `= ANY (subquery)` and `<> ALL (subquery)` become `IN` and `NOT IN`.
    fn translate_bool_pri(&mut self, node: &Node) -> Result<Option<Expression>> {
        let quantifier = node.all_child_tokens().find_map(|token| {
            token
                .keyword()
                .filter(|keyword| matches!(keyword, Keyword::Any | Keyword::Some | Keyword::All))
        });
        let Some(quantifier) = quantifier else {
            return self.translate_sequence(node);
        };

        let comparison = node
            .child_node(Rule::CompOp)
            .and_then(Node::first_child_token)
            .and_then(Token::symbol);
        let operator = match (comparison, quantifier) {
            (Some(Symbol::Equal), Keyword::Any | Keyword::Some) => Expression::from(raw("IN")),
            (Some(Symbol::NotEqual | Symbol::BangEqual), Keyword::All) => {
                Expression::from_iter([raw("NOT"), raw("IN")])
            }
            _ => {
                return Err(Error::unsupported(format!(
                    "comparison with {} (subquery)",
                    quantifier
                )));
            }
        };
        let left = node
            .first_child_node()
            .ok_or_else(|| Error::unsupported("comparison without an operand"))?;
        let subquery = required_child(node, Rule::Subquery)?;
        Ok(Some(
            self.translate_required(left)?
                .then(operator)
                .then(self.translate_required(subquery)?),
        ))
    }

    fn translate_bit_expr(&mut self, node: &Node) -> Result<Expression> {
        let operator = node
            .all_child_tokens()
            .next()
            .ok_or_else(|| Error::unsupported("operator expression without an operator"))?;

        if let Some(interval) = node.child_node(Rule::Interval) {
            let subtract = match operator.symbol() {
                Some(Symbol::Plus) => false,
                Some(Symbol::Minus) => true,
                _ => return Err(Error::unsupported("INTERVAL outside of date arithmetic")),
            };
            let date = node
                .first_child_node()
                .ok_or_else(|| Error::unsupported("date arithmetic without a date"))?;
            let date = self.translate_required(date)?;
            return self.date_arithmetic(date, subtract, interval);
        }

        // SQLite gives `| & << >>` one shared precedence below `+ -`.
        let bitwise = matches!(
            operator.symbol(),
            Some(Symbol::Pipe | Symbol::Amp | Symbol::ShiftLeft | Symbol::ShiftRight)
        );
        let mut expression = Expression::new();
        for child in node.children() {
            match child {
                Child::Node(operand) if bitwise && operand.rule == Rule::BitExpr => {
                    expression.push_group(self.translate_required(operand)?);
                }
                other => {
                    if let Some(translated) = self.translate(Some(other))? {
                        expression.append(translated);
                    }
                }
            }
        }
        Ok(expression)
    }

    fn translate_simple_expr(&mut self, node: &Node) -> Result<Option<Expression>> {
        let operand = || {
            node.first_child_node()
                .ok_or_else(|| Error::unsupported("expression without an operand"))
        };
        match node.first_child() {
            Some(Child::Token(token)) if token.is_keyword(Keyword::Binary) => {
                self.translate_node(operand()?)
            }
            Some(Child::Token(token)) if token.is_symbol(Symbol::Bang) => {
                let negated = self.translate_required(operand()?)?;
                Ok(Some(Expression::from(raw("NOT")).then(Expression::group(negated))))
            }
            _ if node.has_keyword(Keyword::Collate) => self.translate_node(operand()?),
            _ => self.translate_sequence(node),
        }
    }
}

fn required_child(node: &Node, rule: Rule) -> Result<&Node> {
    node.child_node(rule).ok_or_else(|| {
        Error::unsupported(format!("{} without {}", node.rule_name(), rule.name()))
    })
}

fn assigned_column(element: &Node) -> Result<String> {
    element
        .child_node(Rule::ColumnRef)
        .and_then(last_identifier)
        .ok_or_else(|| Error::unsupported("assignment without a column"))
}

fn is_primary_key_attribute(attribute: &Node) -> bool {
    attribute.has_keyword(Keyword::Primary)
        || (attribute.has_keyword(Keyword::Key) && !attribute.has_keyword(Keyword::Unique))
}

fn translate_keyword(keyword: Keyword) -> Result<SqliteToken> {
    Ok(match keyword {
        Keyword::AutoIncrement => raw("AUTOINCREMENT"),
        Keyword::Value => raw("VALUES"),
        Keyword::Distinctrow => raw("DISTINCT"),
        Keyword::StraightJoin => raw("JOIN"),
        Keyword::Rlike => raw("REGEXP"),
        Keyword::Div => raw("/"),
        Keyword::Mod => raw("%"),
        Keyword::Unknown => raw("NULL"),
        Keyword::Xor => return Err(Error::unsupported("XOR")),
        other => raw(other.as_str()),
    })
}

fn translate_symbol(symbol: Symbol) -> Result<Option<SqliteToken>> {
    let token = match symbol {
        Symbol::Semicolon => return Ok(None),
        Symbol::LogicalOr => raw("OR"),
        Symbol::LogicalAnd => raw("AND"),
        Symbol::Bang => raw("NOT"),
        Symbol::NullSafeEqual => raw("IS"),
        Symbol::Caret => return Err(Error::unsupported("the ^ operator")),
        Symbol::Assign => return Err(Error::unsupported(":= assignment")),
        Symbol::AtAt => return Err(Error::unsupported("system variable outside an expression")),
        other => factory::operator(other.as_str())?,
    };
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    pub(super) fn translate(sql: &str) -> Result<String> {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, sql)?;
        Ok(Translator::new("wp").translate_to_sql(&tree)?.unwrap_or_default())
    }

    fn sql(input: &str) -> String {
        translate(input).unwrap()
    }

    fn unsupported(input: &str) -> bool {
        matches!(translate(input), Err(Error::Unsupported(_)))
    }

    #[test]
    fn test_select() {
        assert_eq!(sql("SELECT * FROM t WHERE a = 1"), r#"SELECT * FROM "t" WHERE "a" = 1"#);
        assert_eq!(
            sql("SELECT a, b c FROM t ORDER BY a DESC, b LIMIT 1, 2;"),
            r#"SELECT "a", "b" AS "c" FROM "t" ORDER BY "a" DESC, "b" ASC LIMIT 1, 2"#
        );
        assert_eq!(
            sql("SELECT `t`.* FROM `t` AS `x` LEFT JOIN u ON x.id = u.id"),
            r#"SELECT "t".* FROM "t" AS "x" LEFT JOIN "u" ON "x"."id" = "u"."id""#
        );
        assert_eq!(
            sql("SELECT DISTINCTROW a FROM t GROUP BY a HAVING COUNT(*) > 1"),
            r#"SELECT DISTINCT "a" FROM "t" GROUP BY "a" HAVING COUNT(*) > 1"#
        );
    }

    #[test]
    fn test_dropped_clauses() {
        assert_eq!(sql("SELECT 1 FROM DUAL"), "SELECT 1");
        assert_eq!(sql("SELECT * FROM t FOR UPDATE"), r#"SELECT * FROM "t""#);
        assert_eq!(sql("SELECT * FROM t LOCK IN SHARE MODE"), r#"SELECT * FROM "t""#);
        assert_eq!(sql("SELECT SQL_NO_CACHE a FROM t"), r#"SELECT "a" FROM "t""#);
        assert_eq!(sql("SELECT @@SESSION.sql_mode"), "SELECT NULL");
        assert_eq!(sql("SELECT a FROM wp.t"), r#"SELECT "a" FROM "t""#);
        assert_eq!(sql("SELECT wp.t.a FROM other.t"), r#"SELECT "t"."a" FROM "other"."t""#);
    }

    #[test]
    fn test_found_rows_flag() {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, "SELECT SQL_CALC_FOUND_ROWS * FROM t LIMIT 10").unwrap();
        let mut translator = Translator::new("wp");
        let sql = translator.translate_to_sql(&tree).unwrap().unwrap();
        assert_eq!(sql, r#"SELECT * FROM "t" LIMIT 10"#);
        assert!(translator.has_seen_calc_found_rows());
        assert!(!translator.has_seen_found_rows());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            sql("SELECT a <=> NULL, 5 DIV 2, 5 MOD 2, !b, c || d && e"),
            r#"SELECT "a" IS NULL, 5 / 2, 5 % 2, NOT ("b"), "c" OR "d" AND "e""#
        );
        assert_eq!(sql("SELECT a | b + c"), r#"SELECT "a" | ("b" + "c")"#);
        assert_eq!(sql("SELECT a RLIKE 'x'"), r#"SELECT "a" REGEXP 'x'"#);
        assert_eq!(sql("SELECT a IS UNKNOWN"), r#"SELECT "a" IS NULL"#);
        assert_eq!(sql("SELECT BINARY a = 'x' COLLATE utf8mb4_bin"), r#"SELECT "a" = 'x'"#);
        assert_eq!(sql("SELECT TRUE, FALSE, 'it''s'"), "SELECT 1, 0, 'it''s'");
        assert_eq!(sql("SELECT DATE '2024-01-01'"), "SELECT '2024-01-01'");
        assert_eq!(sql("SELECT 'a' 'b'"), "SELECT 'ab'");
        assert_eq!(sql("SELECT a FROM t WHERE b = ?"), r#"SELECT "a" FROM "t" WHERE "b" = ?"#);
    }

    #[test]
    fn test_quantified_comparisons() {
        assert_eq!(
            sql("SELECT a FROM t WHERE a = ANY (SELECT b FROM u)"),
            r#"SELECT "a" FROM "t" WHERE "a" IN (SELECT "b" FROM "u")"#
        );
        assert_eq!(
            sql("SELECT a FROM t WHERE a <> ALL (SELECT b FROM u)"),
            r#"SELECT "a" FROM "t" WHERE "a" NOT IN (SELECT "b" FROM "u")"#
        );
        assert!(unsupported("SELECT a FROM t WHERE a > ALL (SELECT b FROM u)"));
    }

    #[test]
    fn test_interval_arithmetic() {
        assert_eq!(
            sql("SELECT d + INTERVAL 1 DAY FROM t"),
            r#"SELECT DATETIME("d", '+' || 1 || ' days') FROM "t""#
        );
        assert_eq!(
            sql("SELECT d - INTERVAL 3 MONTH"),
            r#"SELECT DATETIME("d", '-' || 3 || ' months')"#
        );
    }

    #[test]
    fn test_parenthesized_queries() {
        assert_eq!(
            sql("(SELECT a FROM t) UNION ALL (SELECT b FROM u)"),
            r#"SELECT "a" FROM "t" UNION ALL SELECT "b" FROM "u""#
        );
        assert_eq!(
            sql("(SELECT a FROM t ORDER BY a LIMIT 1) UNION SELECT b FROM u"),
            r#"SELECT * FROM (SELECT "a" FROM "t" ORDER BY "a" ASC LIMIT 1) UNION SELECT "b" FROM "u""#
        );
    }

    #[test]
    fn test_insert() {
        assert_eq!(
            sql("INSERT IGNORE t (a, t.b) VALUE (1, 'x'), (2, NULL)"),
            r#"INSERT OR IGNORE INTO "t" ("a", "b") VALUES (1, 'x'), (2, NULL)"#
        );
        assert_eq!(
            sql("INSERT LOW_PRIORITY INTO t SET a = 1, b = 'x'"),
            r#"INSERT INTO "t" ("a", "b") VALUES (1, 'x')"#
        );
        assert_eq!(
            sql("INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = VALUES(a) + 1"),
            r#"INSERT INTO "t" ("a") VALUES (1) ON CONFLICT DO UPDATE SET "a" = excluded."a" + 1"#
        );
        assert_eq!(
            sql("REPLACE INTO t (a) SELECT b FROM u"),
            r#"REPLACE INTO "t" ("a") SELECT "b" FROM "u""#
        );
        assert_eq!(sql("INSERT INTO t () VALUES ()"), r#"INSERT INTO "t" DEFAULT VALUES"#);
        assert!(unsupported("INSERT INTO t (a) VALUES (DEFAULT)"));
        assert!(unsupported(
            "INSERT INTO t (a) SELECT b FROM u ON DUPLICATE KEY UPDATE a = 1"
        ));
    }

    #[test]
    fn test_update_and_delete() {
        assert_eq!(
            sql("UPDATE LOW_PRIORITY IGNORE t SET a = a + 1, t.b = 'x' WHERE c = 2"),
            r#"UPDATE OR IGNORE "t" SET "a" = "a" + 1, "b" = 'x' WHERE "c" = 2"#
        );
        assert_eq!(
            sql("DELETE QUICK FROM t WHERE a IN (1, 2)"),
            r#"DELETE FROM "t" WHERE "a" IN (1, 2)"#
        );
        assert!(unsupported("UPDATE t JOIN u ON t.a = u.a SET t.b = 1"));
        assert!(unsupported("UPDATE t, u SET t.b = 1"));
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            sql("CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT)"),
            r#"CREATE TABLE "t" ("id" INTEGER PRIMARY KEY AUTOINCREMENT)"#
        );
        assert_eq!(
            sql("CREATE TABLE t (id INT PRIMARY KEY)"),
            r#"CREATE TABLE "t" ("id" INT PRIMARY KEY)"#
        );
        assert_eq!(
            sql("CREATE TABLE wp_options (
                option_id bigint(20) unsigned NOT NULL auto_increment,
                option_name varchar(191) NOT NULL default '' COMMENT 'name',
                autoload varchar(20) NOT NULL DEFAULT 'yes',
                PRIMARY KEY  (option_id),
                UNIQUE KEY option_name (option_name),
                KEY autoload (autoload)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_520_ci"),
            concat!(
                r#"CREATE TABLE "wp_options" ("option_id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, "#,
                r#""option_name" TEXT NOT NULL DEFAULT '', "autoload" TEXT NOT NULL DEFAULT 'yes')"#
            )
        );
        assert_eq!(
            sql("CREATE TABLE t (a INT, b INT, PRIMARY KEY (a, b), CONSTRAINT fk FOREIGN KEY (b) REFERENCES u (id) ON DELETE CASCADE)"),
            r#"CREATE TABLE "t" ("a" INTEGER, "b" INTEGER, PRIMARY KEY ("a", "b"), CONSTRAINT "fk" FOREIGN KEY ("b") REFERENCES "u" ("id") ON DELETE CASCADE)"#
        );
        assert_eq!(
            sql("CREATE TABLE t (k CHAR(3) KEY, u INT UNIQUE KEY, d DATETIME DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP)"),
            r#"CREATE TABLE "t" ("k" TEXT PRIMARY KEY, "u" INTEGER UNIQUE, "d" TEXT DEFAULT CURRENT_TIMESTAMP)"#
        );
        assert_eq!(
            sql("CREATE TABLE t2 AS SELECT * FROM t"),
            r#"CREATE TABLE "t2" AS SELECT * FROM "t""#
        );
        assert_eq!(
            sql("CREATE TABLE t2 IGNORE SELECT * FROM t"),
            r#"CREATE TABLE "t2" AS SELECT * FROM "t""#
        );
    }

    #[test]
    fn test_create_table_failures() {
        assert!(unsupported(
            "CREATE TABLE t (a INT AUTO_INCREMENT, b INT, PRIMARY KEY (a, b))"
        ));
        assert!(unsupported("CREATE TABLE t (a JSON)"));
        assert!(unsupported("CREATE TABLE t LIKE u"));
    }

    #[test]
    fn test_indexes_and_drops() {
        assert_eq!(
            sql("CREATE UNIQUE INDEX idx ON t (a(10) DESC, b)"),
            r#"CREATE UNIQUE INDEX "t__idx" ON "t" ("a" DESC, "b")"#
        );
        assert_eq!(
            sql("CREATE FULLTEXT INDEX body ON posts (content)"),
            r#"CREATE INDEX "posts__body" ON "posts" ("content")"#
        );
        assert_eq!(sql("DROP INDEX idx ON t"), r#"DROP INDEX "t__idx""#);
        assert_eq!(sql("DROP TEMPORARY TABLE IF EXISTS t"), r#"DROP TABLE IF EXISTS "t""#);
        assert!(unsupported("DROP TABLE a, b"));
        assert!(unsupported("ALTER TABLE t ADD c INT"));
    }

    #[test]
    fn test_unsupported_constructs() {
        assert!(unsupported("SELECT a FROM t GROUP BY a WITH ROLLUP"));
        assert!(unsupported("SELECT * FROM t USE INDEX (i)"));
        assert!(unsupported("SELECT a XOR b"));
        assert!(unsupported("SELECT a ^ b"));
        assert!(unsupported("SELECT @x"));
    }

    #[test]
    fn test_set_translates_to_nothing() {
        assert_eq!(sql("SET NAMES utf8mb4"), "");
    }
}
