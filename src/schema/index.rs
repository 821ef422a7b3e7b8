//! Index definitions from `tableConstraintDef` and `createIndex` nodes.

use std::collections::HashSet;

use crate::ast::{Node, Token};
use crate::engine::SqlValue;
use crate::error::{Error, Result};
use crate::grammar::{Keyword, Rule};
use crate::transpiler::{identifier_text, last_identifier};

use super::column::ColumnInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
    Fulltext,
    Spatial,
}

impl IndexKind {
    pub fn is_unique(self) -> bool {
        matches!(self, IndexKind::Primary | IndexKind::Unique)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub column: String,
    pub length: Option<i64>,
    pub descending: bool,
}

/// A MySQL index as written, before it is split into statistics rows.
#[derive(Debug, Clone)]
pub struct IndexDefinition<'a> {
    pub name: String,
    pub kind: IndexKind,
    /// `USING BTREE|HASH|RTREE`, when given.
    pub using: Option<Keyword>,
    pub comment: String,
    pub parts: Vec<KeyPart>,
    /// The `keyList` node the parts came from.
    pub keys: &'a Node,
}

impl<'a> IndexDefinition<'a> {
    /// The index kind of a constraint, or `None` for FOREIGN KEY and CHECK.
    pub fn constraint_kind(constraint: &Node) -> Option<IndexKind> {
        let keyword = constraint.all_child_tokens().find_map(Token::keyword)?;
        match keyword {
            Keyword::Primary => Some(IndexKind::Primary),
            Keyword::Unique => Some(IndexKind::Unique),
            Keyword::Key | Keyword::Index => Some(IndexKind::Index),
            Keyword::Fulltext => Some(IndexKind::Fulltext),
            Keyword::Spatial => Some(IndexKind::Spatial),
            _ => None,
        }
    }

    /// An index declared inside `CREATE TABLE` or `ALTER TABLE ... ADD`.
    /// FOREIGN KEY and CHECK constraints are not indexes.
    pub fn from_constraint(constraint: &'a Node) -> Option<Self> {
        let kind = Self::constraint_kind(constraint)?;
        let name = constraint
            .child_node(Rule::IndexName)
            .and_then(last_identifier);
        Self::build(constraint, kind, name).ok()
    }

    /// An index from `CREATE [UNIQUE|FULLTEXT|SPATIAL] INDEX`.
    pub fn from_create_index(create: &'a Node) -> Result<Self> {
        let kind = match create.first_child_token().and_then(Token::keyword) {
            Some(Keyword::Unique) => IndexKind::Unique,
            Some(Keyword::Fulltext) => IndexKind::Fulltext,
            Some(Keyword::Spatial) => IndexKind::Spatial,
            _ => IndexKind::Index,
        };
        let name = create
            .child_node(Rule::IndexName)
            .and_then(last_identifier);
        Self::build(create, kind, name)
    }

    /// All indexes of a table element list, with duplicate names suffixed
    /// `_2`, `_3`, ...
    pub fn from_table_elements(elements: &'a Node) -> Vec<Self> {
        let mut used = HashSet::new();
        let mut indexes = Vec::new();
        for constraint in elements
            .child_nodes(Rule::TableElement)
            .filter_map(|element| element.child_node(Rule::TableConstraintDef))
        {
            let Some(mut index) = Self::from_constraint(constraint) else {
                continue;
            };
            let base = index.name.clone();
            let mut suffix = 2;
            while !used.insert(index.name.to_lowercase()) {
                index.name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            indexes.push(index);
        }
        indexes
    }

    fn build(node: &'a Node, kind: IndexKind, name: Option<String>) -> Result<Self> {
        let keys = node
            .child_node(Rule::KeyList)
            .ok_or_else(|| Error::unsupported("index without key parts"))?;
        let parts: Vec<KeyPart> = keys
            .child_nodes(Rule::KeyPart)
            .map(|part| KeyPart {
                column: part
                    .child_node(Rule::Identifier)
                    .map(identifier_text)
                    .unwrap_or_default(),
                length: part
                    .child_node(Rule::FieldLength)
                    .and_then(|length| length.all_child_tokens().find(|token| token.kind.is_number()))
                    .and_then(|token| token.value.parse().ok()),
                descending: part
                    .child_node(Rule::Direction)
                    .is_some_and(|direction| direction.has_keyword(Keyword::Desc)),
            })
            .collect();
        let first_column = parts
            .first()
            .map(|part| part.column.clone())
            .ok_or_else(|| Error::unsupported("index without key parts"))?;

        let name = match kind {
            IndexKind::Primary => "PRIMARY".to_string(),
            _ => name.unwrap_or(first_column),
        };

        let options: Vec<&Node> = node.child_nodes(Rule::IndexOption).collect();
        let using = node
            .child_node(Rule::IndexTypeClause)
            .into_iter()
            .chain(options.iter().filter_map(|option| option.child_node(Rule::IndexTypeClause)))
            .find_map(|clause| clause.child_node(Rule::IndexType))
            .and_then(Node::first_child_token)
            .and_then(Token::keyword);
        let comment = options
            .iter()
            .find(|option| option.has_keyword(Keyword::Comment))
            .and_then(|option| option.child_node(Rule::TextStringLiteral))
            .map(Node::text)
            .unwrap_or_default();

        Ok(Self {
            name,
            kind,
            using,
            comment,
            parts,
            keys,
        })
    }

    pub fn is_unique(&self) -> bool {
        self.kind.is_unique()
    }

    /// The `INDEX_TYPE` fixed by the definition alone: an explicit `USING`
    /// wins, then the FULLTEXT/SPATIAL keyword.
    pub fn explicit_index_type(&self) -> Option<&'static str> {
        match (self.using, self.kind) {
            (Some(Keyword::Rtree), _) => Some("SPATIAL"),
            (Some(Keyword::Hash | Keyword::Btree), _) => Some("BTREE"),
            (_, IndexKind::Fulltext) => Some("FULLTEXT"),
            (_, IndexKind::Spatial) => Some("SPATIAL"),
            _ => None,
        }
    }

    /// `INDEX_TYPE`, falling back to the type of the leading column.
    pub fn index_type(&self, leading_column_spatial: bool) -> &'static str {
        self.explicit_index_type()
            .unwrap_or(if leading_column_spatial { "SPATIAL" } else { "BTREE" })
    }

    /// One statistics row per key part, in index order.
    pub fn rows<'c>(
        &self,
        schema: &str,
        table: &str,
        column: impl Fn(&str) -> Option<&'c ColumnInfo>,
    ) -> Vec<Vec<(&'static str, SqlValue)>> {
        let leading_spatial = self
            .parts
            .first()
            .and_then(|part| column(&part.column))
            .is_some_and(ColumnInfo::is_spatial);
        let index_type = self.index_type(leading_spatial);

        self.parts
            .iter()
            .enumerate()
            .map(|(position, part)| {
                let info = column(&part.column);
                let nullable = info.is_some_and(|info| info.nullable);
                let sub_part = match part.length {
                    Some(length) => Some(
                        info.and_then(|info| info.char_length)
                            .map_or(length, |max| length.min(max)),
                    ),
                    None if index_type == "SPATIAL" => Some(32),
                    None => None,
                };
                let collation = match (index_type, part.descending) {
                    ("FULLTEXT", _) => None,
                    (_, true) => Some("D"),
                    (_, false) => Some("A"),
                };
                vec![
                    ("table_schema", schema.into()),
                    ("table_name", table.into()),
                    ("non_unique", i64::from(!self.is_unique()).into()),
                    ("index_schema", schema.into()),
                    ("index_name", self.name.as_str().into()),
                    ("seq_in_index", (position as i64 + 1).into()),
                    ("column_name", part.column.as_str().into()),
                    ("collation", collation.into()),
                    ("cardinality", 0i64.into()),
                    ("sub_part", sub_part.into()),
                    ("packed", SqlValue::Null),
                    ("nullable", if nullable { "YES" } else { "" }.into()),
                    ("index_type", index_type.into()),
                    ("comment", "".into()),
                    ("index_comment", self.comment.as_str().into()),
                    ("is_visible", "YES".into()),
                    ("expression", SqlValue::Null),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn with_indexes(sql: &str, check: impl FnOnce(Vec<IndexDefinition<'_>>)) {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, sql).unwrap();
        let elements = tree.descendant_node(Rule::TableElementList).unwrap();
        check(IndexDefinition::from_table_elements(elements));
    }

    #[test]
    fn test_names_and_kinds() {
        with_indexes(
            "CREATE TABLE t (
                a int, b varchar(10), c int,
                PRIMARY KEY (a),
                KEY (b),
                KEY b (c),
                UNIQUE INDEX u (c DESC),
                FULLTEXT (b),
                FOREIGN KEY (c) REFERENCES o (id),
                CHECK (a > 0)
            )",
            |indexes| {
                let summary: Vec<(&str, IndexKind)> = indexes
                    .iter()
                    .map(|index| (index.name.as_str(), index.kind))
                    .collect();
                assert_eq!(
                    summary,
                    vec![
                        ("PRIMARY", IndexKind::Primary),
                        ("b", IndexKind::Index),
                        ("b_2", IndexKind::Index),
                        ("u", IndexKind::Unique),
                        ("b_3", IndexKind::Fulltext),
                    ]
                );
                assert!(indexes[3].parts[0].descending);
            },
        );
    }

    #[test]
    fn test_index_types() {
        with_indexes(
            "CREATE TABLE t (
                g point, b varchar(10),
                KEY h (b) USING HASH,
                KEY r (b) USING RTREE,
                SPATIAL KEY s (g),
                KEY g_key (g),
                KEY c (b) COMMENT 'note'
            )",
            |indexes| {
                assert_eq!(indexes[0].index_type(false), "BTREE");
                assert_eq!(indexes[1].index_type(false), "SPATIAL");
                assert_eq!(indexes[2].index_type(false), "SPATIAL");
                assert_eq!(indexes[3].index_type(true), "SPATIAL");
                assert_eq!(indexes[4].index_type(false), "BTREE");
                assert_eq!(indexes[4].comment, "note");
            },
        );
    }

    #[test]
    fn test_create_index() {
        let grammar = Grammar::mysql();
        let tree = parse(&grammar, "CREATE UNIQUE INDEX idx ON t (a(10), b)").unwrap();
        let create = tree.descendant_node(Rule::CreateIndex).unwrap();
        let index = IndexDefinition::from_create_index(create).unwrap();
        assert_eq!(index.name, "idx");
        assert!(index.is_unique());
        assert_eq!(
            index.parts,
            vec![
                KeyPart { column: "a".into(), length: Some(10), descending: false },
                KeyPart { column: "b".into(), length: None, descending: false },
            ]
        );
    }
}
