//! Planning: one MySQL statement becomes an ordered list of SQLite
//! statements, each optionally followed by a catalog change.

use crate::ast::{Child, Node, Token};
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule};
use crate::schema::{IndexDefinition, IndexKind};
use crate::transpiler::factory::{identifier, raw};
use crate::transpiler::{Expression, ToSql, Translator, identifier_text, index_name, last_identifier};

use super::result::QueryType;

/// Catalog maintenance that follows a successful statement.
#[derive(Debug)]
pub(crate) enum CatalogChange<'a> {
    CreateTable(&'a Node),
    AddColumn { table: String, column: &'a Node },
    DropColumn { table: String, column: String },
    AddIndex { table: String, index: IndexDefinition<'a> },
    DropIndex { table: String, index: String },
    RenameTable { from: String, to: String },
    RenameColumn { table: String, from: String, to: String },
    DropTable { table: String },
}

#[derive(Debug, Default)]
pub(crate) struct Step<'a> {
    pub statements: Vec<String>,
    pub catalog: Option<CatalogChange<'a>>,
}

impl<'a> Step<'a> {
    fn new(statement: impl Into<String>, catalog: Option<CatalogChange<'a>>) -> Self {
        Self {
            statements: vec![statement.into()],
            catalog,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Plan<'a> {
    pub query_type: QueryType,
    pub table: Option<String>,
    pub steps: Vec<Step<'a>>,
    /// `CREATE TABLE IF NOT EXISTS`: the whole plan is skipped when this
    /// table already exists.
    pub if_not_exists: Option<String>,
}

impl<'a> Plan<'a> {
    fn new(query_type: QueryType, table: Option<String>) -> Self {
        Self {
            query_type,
            table,
            steps: Vec::new(),
            if_not_exists: None,
        }
    }

    fn single(query_type: QueryType, table: Option<String>, statement: String) -> Self {
        let mut plan = Self::new(query_type, table);
        plan.steps.push(Step::new(statement, None));
        plan
    }
}

/// Plan a parsed `query` node.
pub(crate) fn plan<'a>(translator: &mut Translator<'_>, query: &'a Node) -> Result<Plan<'a>> {
    let statement = query
        .child_node(Rule::SimpleStatement)
        .and_then(Node::first_child_node)
        .ok_or_else(|| Error::unsupported("empty query"))?;

    match statement.rule {
        Rule::SelectStatement => {
            let sql = translator.translate_required(statement)?.to_sql();
            Ok(Plan::single(QueryType::Select, first_table(statement), sql))
        }
        Rule::InsertStatement | Rule::ReplaceStatement => {
            let query_type = if statement.rule == Rule::InsertStatement {
                QueryType::Insert
            } else {
                QueryType::Replace
            };
            let sql = translator.translate_required(statement)?.to_sql();
            Ok(Plan::single(query_type, first_table(statement), sql))
        }
        Rule::UpdateStatement => {
            let sql = plan_limited(translator, statement)?;
            Ok(Plan::single(QueryType::Update, first_table(statement), sql))
        }
        Rule::DeleteStatement => {
            let sql = plan_limited(translator, statement)?;
            Ok(Plan::single(QueryType::Delete, first_table(statement), sql))
        }
        Rule::CreateStatement => plan_create(translator, statement),
        Rule::AlterStatement => plan_alter(translator, statement),
        Rule::DropStatement => plan_drop(translator, statement),
        Rule::SetStatement => Ok(Plan::new(QueryType::Set, None)),
        _ => Err(Error::unsupported(format!(
            "{} statements",
            statement.rule_name()
        ))),
    }
}

fn first_table(statement: &Node) -> Option<String> {
    statement.descendant_node(Rule::TableRef).and_then(last_identifier)
}

/// UPDATE and DELETE. SQLite has no ORDER BY/LIMIT on them, so a limited
/// statement selects its target rows by rowid.
fn plan_limited(translator: &mut Translator<'_>, statement: &Node) -> Result<String> {
    let limited = statement.has_child_node(Rule::OrderClause) || statement.has_child_node(Rule::LimitClause);
    if !limited {
        return Ok(translator.translate_required(statement)?.to_sql());
    }

    let is_filter = |child: &Child| {
        child.as_node().is_some_and(|node| {
            matches!(
                node.rule,
                Rule::WhereClause | Rule::OrderClause | Rule::LimitClause
            )
        })
    };
    let head = Node::with_children(
        statement.rule,
        statement.children().iter().filter(|child| !is_filter(*child)).cloned(),
    );
    let mut expression = translator.translate_required(&head)?;

    let mut select = Expression::from_iter([raw("SELECT"), raw("rowid"), raw("FROM")]);
    if statement.rule == Rule::UpdateStatement {
        let tables = statement
            .child_node(Rule::TableReferenceList)
            .ok_or_else(|| Error::unsupported("UPDATE without a table"))?;
        select.append(translator.translate_required(tables)?);
    } else {
        let table = statement
            .child_node(Rule::TableRef)
            .ok_or_else(|| Error::unsupported("DELETE without a table"))?;
        select.append(translator.translate_required(table)?);
        if let Some(alias) = statement.child_node(Rule::TableAlias) {
            select.append(translator.translate_required(alias)?);
        }
    }
    for rule in [Rule::WhereClause, Rule::OrderClause, Rule::LimitClause] {
        if let Some(clause) = statement.child_node(rule) {
            select.append(translator.translate_required(clause)?);
        }
    }

    expression.append(Expression::from_iter([raw("WHERE"), raw("rowid"), raw("IN")]));
    expression.push_group(select);
    Ok(expression.to_sql())
}

fn plan_create<'a>(translator: &mut Translator<'_>, statement: &'a Node) -> Result<Plan<'a>> {
    if let Some(create) = statement.child_node(Rule::CreateIndex) {
        let table = create
            .child_node(Rule::TableRef)
            .and_then(last_identifier)
            .ok_or_else(|| Error::unsupported("CREATE INDEX without a table"))?;
        let index = IndexDefinition::from_create_index(create)?;
        let sql = translator.translate_required(statement)?.to_sql();
        let mut plan = Plan::new(QueryType::Create, Some(table.clone()));
        plan.steps
            .push(Step::new(sql, Some(CatalogChange::AddIndex { table, index })));
        return Ok(plan);
    }

    let create = statement
        .child_node(Rule::CreateTable)
        .ok_or_else(|| Error::unsupported("CREATE statement without a table or index"))?;
    let table = create
        .child_node(Rule::TableName)
        .and_then(last_identifier)
        .ok_or_else(|| Error::unsupported("CREATE TABLE without a name"))?;

    let mut step = Step::new(
        translator.translate_required(statement)?.to_sql(),
        Some(CatalogChange::CreateTable(create)),
    );
    if let Some(elements) = create.child_node(Rule::TableElementList) {
        for index in IndexDefinition::from_table_elements(elements) {
            if index.kind == IndexKind::Primary {
                continue;
            }
            let definition = translator.index_definition(&table, &index.name, index.is_unique(), index.keys)?;
            step.statements
                .push(Expression::from(raw("CREATE")).then(definition).to_sql());
        }
    }

    let mut plan = Plan::new(QueryType::Create, Some(table.clone()));
    if create.has_child_node(Rule::IfNotExists) {
        plan.if_not_exists = Some(table);
    }
    plan.steps.push(step);
    Ok(plan)
}

fn plan_drop<'a>(translator: &mut Translator<'_>, statement: &'a Node) -> Result<Plan<'a>> {
    if let Some(drop) = statement.child_node(Rule::DropIndex) {
        let table = drop
            .child_node(Rule::TableRef)
            .and_then(last_identifier)
            .ok_or_else(|| Error::unsupported("DROP INDEX without a table"))?;
        let index = drop
            .child_node(Rule::IndexName)
            .and_then(last_identifier)
            .ok_or_else(|| Error::unsupported("DROP INDEX without a name"))?;
        let sql = translator.translate_required(statement)?.to_sql();
        let mut plan = Plan::new(QueryType::Drop, Some(table.clone()));
        plan.steps
            .push(Step::new(sql, Some(CatalogChange::DropIndex { table, index })));
        return Ok(plan);
    }

    let drop = statement
        .child_node(Rule::DropTable)
        .ok_or_else(|| Error::unsupported("DROP statement without a table or index"))?;
    let mut plan = Plan::new(QueryType::Drop, None);
    for table_ref in drop
        .child_node(Rule::TableRefList)
        .into_iter()
        .flat_map(|tables| tables.child_nodes(Rule::TableRef))
    {
        let table = last_identifier(table_ref)
            .ok_or_else(|| Error::unsupported("DROP TABLE without a name"))?;
        let mut expression = Expression::from_iter([raw("DROP"), raw("TABLE")]);
        if drop.has_child_node(Rule::IfExists) {
            expression.push(raw("IF"));
            expression.push(raw("EXISTS"));
        }
        expression.append(translator.translate_required(table_ref)?);
        plan.table.get_or_insert_with(|| table.clone());
        plan.steps.push(Step::new(
            expression.to_sql(),
            Some(CatalogChange::DropTable { table }),
        ));
    }
    Ok(plan)
}

fn plan_alter<'a>(translator: &mut Translator<'_>, statement: &'a Node) -> Result<Plan<'a>> {
    let alter = statement
        .child_node(Rule::AlterTable)
        .ok_or_else(|| Error::unsupported("ALTER statement without a table"))?;
    let mut table = alter
        .child_node(Rule::TableRef)
        .and_then(last_identifier)
        .ok_or_else(|| Error::unsupported("ALTER TABLE without a name"))?;
    let mut plan = Plan::new(QueryType::Alter, Some(table.clone()));

    // Table options have no SQLite counterpart.
    for item in alter
        .child_node(Rule::AlterList)
        .into_iter()
        .flat_map(|list| list.child_nodes(Rule::AlterListItem))
    {
        let action = item
            .first_child_token()
            .and_then(Token::keyword)
            .ok_or_else(|| Error::unsupported("ALTER TABLE action"))?;
        match action {
            Keyword::Add => plan_alter_add(translator, &table, item, &mut plan.steps)?,
            Keyword::Drop => plan.steps.push(plan_alter_drop(&table, item)?),
            Keyword::Rename => {
                let step = plan_alter_rename(&table, item)?;
                if let Some(CatalogChange::RenameTable { to, .. }) = &step.catalog {
                    table = to.clone();
                }
                plan.steps.push(step);
            }
            other => {
                return Err(Error::unsupported(format!("ALTER TABLE ... {}", other)));
            }
        }
    }
    Ok(plan)
}

fn alter_table(table: &str) -> Expression {
    Expression::from_iter([raw("ALTER"), raw("TABLE"), identifier(table)])
}

fn plan_alter_add<'a>(
    translator: &mut Translator<'_>,
    table: &str,
    item: &'a Node,
    steps: &mut Vec<Step<'a>>,
) -> Result<()> {
    if let Some(constraint) = item.child_node(Rule::TableConstraintDef) {
        let index = IndexDefinition::from_constraint(constraint).ok_or_else(|| {
            Error::unsupported("ALTER TABLE ... ADD FOREIGN KEY or CHECK")
        })?;
        if index.kind == IndexKind::Primary {
            return Err(Error::unsupported("ALTER TABLE ... ADD PRIMARY KEY"));
        }
        let definition = translator.index_definition(table, &index.name, index.is_unique(), index.keys)?;
        steps.push(Step::new(
            Expression::from(raw("CREATE")).then(definition).to_sql(),
            Some(CatalogChange::AddIndex {
                table: table.to_string(),
                index,
            }),
        ));
        return Ok(());
    }

    let columns: Vec<&'a Node> = match item.child_node(Rule::TableElementList) {
        Some(elements) => elements
            .child_nodes(Rule::TableElement)
            .map(|element| {
                element
                    .child_node(Rule::ColumnDefinition)
                    .ok_or_else(|| Error::unsupported("constraints in ALTER TABLE ... ADD (...)"))
            })
            .collect::<Result<_>>()?,
        None => item
            .child_node(Rule::ColumnDefinition)
            .into_iter()
            .collect(),
    };
    if columns.is_empty() {
        return Err(Error::unsupported("ALTER TABLE ... ADD without a column"));
    }

    for column in columns {
        let keyed = column.descendant_nodes(Rule::ColumnAttribute).into_iter().any(|attribute| {
            attribute.has_keyword(Keyword::Primary)
                || attribute.has_keyword(Keyword::Key)
                || attribute.has_keyword(Keyword::Unique)
                || attribute.has_keyword(Keyword::AutoIncrement)
        });
        if keyed {
            return Err(Error::unsupported(
                "ALTER TABLE ... ADD COLUMN with a key or AUTO_INCREMENT",
            ));
        }
        let definition = translator.translate_column_definition(column, false)?;
        let sql = alter_table(table)
            .with(raw("ADD"))
            .with(raw("COLUMN"))
            .then(definition)
            .to_sql();
        steps.push(Step::new(
            sql,
            Some(CatalogChange::AddColumn {
                table: table.to_string(),
                column,
            }),
        ));
    }
    Ok(())
}

fn plan_alter_drop<'a>(table: &str, item: &'a Node) -> Result<Step<'a>> {
    if let Some(index) = item.child_node(Rule::IndexName).and_then(last_identifier) {
        let sql = Expression::from_iter([
            raw("DROP"),
            raw("INDEX"),
            identifier(&index_name(table, &index)),
        ])
        .to_sql();
        return Ok(Step::new(
            sql,
            Some(CatalogChange::DropIndex {
                table: table.to_string(),
                index,
            }),
        ));
    }
    if item.has_keyword(Keyword::Primary) {
        return Err(Error::unsupported("ALTER TABLE ... DROP PRIMARY KEY"));
    }
    if item.has_keyword(Keyword::Foreign) {
        return Err(Error::unsupported("ALTER TABLE ... DROP FOREIGN KEY"));
    }

    let column = item
        .child_node(Rule::Identifier)
        .map(identifier_text)
        .ok_or_else(|| Error::unsupported("ALTER TABLE ... DROP without a column"))?;
    let sql = alter_table(table)
        .with(raw("DROP"))
        .with(raw("COLUMN"))
        .with(identifier(&column))
        .to_sql();
    Ok(Step::new(
        sql,
        Some(CatalogChange::DropColumn {
            table: table.to_string(),
            column,
        }),
    ))
}

fn plan_alter_rename<'a>(table: &str, item: &'a Node) -> Result<Step<'a>> {
    if let Some(new_name) = item.child_node(Rule::TableName).and_then(last_identifier) {
        let sql = alter_table(table)
            .with(raw("RENAME"))
            .with(raw("TO"))
            .with(identifier(&new_name))
            .to_sql();
        return Ok(Step::new(
            sql,
            Some(CatalogChange::RenameTable {
                from: table.to_string(),
                to: new_name,
            }),
        ));
    }
    if item.has_keyword(Keyword::Index) || item.has_keyword(Keyword::Key) {
        return Err(Error::unsupported("ALTER TABLE ... RENAME INDEX"));
    }

    let names: Vec<String> = item.child_nodes(Rule::Identifier).map(identifier_text).collect();
    let [from, to] = names.as_slice() else {
        return Err(Error::unsupported("ALTER TABLE ... RENAME COLUMN"));
    };
    let sql = alter_table(table)
        .with(raw("RENAME"))
        .with(raw("COLUMN"))
        .with(identifier(from))
        .with(raw("TO"))
        .with(identifier(to))
        .to_sql();
    Ok(Step::new(
        sql,
        Some(CatalogChange::RenameColumn {
            table: table.to_string(),
            from: from.clone(),
            to: to.clone(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn statements(sql: &str) -> Result<Vec<String>> {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, sql)?;
        let mut translator = Translator::new("wp");
        let plan = plan(&mut translator, &tree)?;
        Ok(plan
            .steps
            .into_iter()
            .flat_map(|step| step.statements)
            .collect())
    }

    fn unsupported(sql: &str) -> bool {
        matches!(statements(sql), Err(Error::Unsupported(_)))
    }

    #[test]
    fn test_limited_update_and_delete() {
        assert_eq!(
            statements("UPDATE t SET c=1 ORDER BY c LIMIT 1").unwrap(),
            vec![r#"UPDATE "t" SET "c" = 1 WHERE rowid IN (SELECT rowid FROM "t" ORDER BY "c" ASC LIMIT 1)"#]
        );
        assert_eq!(
            statements("DELETE FROM wp.t AS x WHERE a > 1 LIMIT 10").unwrap(),
            vec![r#"DELETE FROM "t" AS "x" WHERE rowid IN (SELECT rowid FROM "t" AS "x" WHERE "a" > 1 LIMIT 10)"#]
        );
        assert_eq!(
            statements("DELETE FROM t WHERE a = 1").unwrap(),
            vec![r#"DELETE FROM "t" WHERE "a" = 1"#]
        );
    }

    #[test]
    fn test_create_table_with_indexes() {
        assert_eq!(
            statements(
                "CREATE TABLE wp_postmeta (
                    meta_id bigint(20) unsigned NOT NULL auto_increment,
                    post_id bigint(20) unsigned NOT NULL default '0',
                    meta_key varchar(255) default NULL,
                    PRIMARY KEY  (meta_id),
                    KEY post_id (post_id),
                    UNIQUE KEY meta_key (meta_key(191), post_id)
                )"
            )
            .unwrap(),
            vec![
                concat!(
                    r#"CREATE TABLE "wp_postmeta" ("meta_id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, "#,
                    r#""post_id" INTEGER NOT NULL DEFAULT '0', "meta_key" TEXT DEFAULT NULL)"#
                ),
                r#"CREATE INDEX "wp_postmeta__post_id" ON "wp_postmeta" ("post_id")"#,
                r#"CREATE UNIQUE INDEX "wp_postmeta__meta_key" ON "wp_postmeta" ("meta_key", "post_id")"#,
            ]
        );
    }

    #[test]
    fn test_alter_table_actions() {
        assert_eq!(
            statements("ALTER TABLE t ADD a INT, ADD COLUMN b TEXT AFTER a, DROP c").unwrap(),
            vec![
                r#"ALTER TABLE "t" ADD COLUMN "a" INTEGER"#,
                r#"ALTER TABLE "t" ADD COLUMN "b" TEXT"#,
                r#"ALTER TABLE "t" DROP COLUMN "c""#,
            ]
        );
        assert_eq!(
            statements("ALTER TABLE t ADD INDEX k (a), DROP KEY old, RENAME TO u, RENAME COLUMN a TO z").unwrap(),
            vec![
                r#"CREATE INDEX "t__k" ON "t" ("a")"#,
                r#"DROP INDEX "t__old""#,
                r#"ALTER TABLE "t" RENAME TO "u""#,
                r#"ALTER TABLE "u" RENAME COLUMN "a" TO "z""#,
            ]
        );
        assert_eq!(
            statements("ALTER TABLE t ENGINE = InnoDB").unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_alter_table_unsupported() {
        assert!(unsupported("ALTER TABLE t ADD PRIMARY KEY (a)"));
        assert!(unsupported("ALTER TABLE t ADD id INT AUTO_INCREMENT"));
        assert!(unsupported("ALTER TABLE t ADD u INT UNIQUE"));
        assert!(unsupported("ALTER TABLE t DROP PRIMARY KEY"));
        assert!(unsupported("ALTER TABLE t CHANGE a b INT"));
        assert!(unsupported("ALTER TABLE t MODIFY a BIGINT"));
        assert!(unsupported("ALTER TABLE t RENAME INDEX a TO b"));
    }

    #[test]
    fn test_drop_tables() {
        assert_eq!(
            statements("DROP TABLE IF EXISTS a, wp.b").unwrap(),
            vec![r#"DROP TABLE IF EXISTS "a""#, r#"DROP TABLE IF EXISTS "b""#]
        );
    }

    #[test]
    fn test_plan_metadata() {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, "CREATE TABLE IF NOT EXISTS t (a INT)").unwrap();
        let mut translator = Translator::new("wp");
        let create = plan(&mut translator, &tree).unwrap();
        assert_eq!(create.query_type, QueryType::Create);
        assert_eq!(create.table.as_deref(), Some("t"));
        assert_eq!(create.if_not_exists.as_deref(), Some("t"));
        assert!(matches!(create.steps[0].catalog, Some(CatalogChange::CreateTable(_))));

        let tree = parse(&grammar, "SET NAMES utf8mb4").unwrap();
        let set = plan(&mut translator, &tree).unwrap();
        assert_eq!(set.query_type, QueryType::Set);
        assert!(set.steps.is_empty());
    }
}
