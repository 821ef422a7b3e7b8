//! # mysqlite
//!
//! Run MySQL-dialect SQL against SQLite.
//!
//! A statement goes through four stages:
//!
//! | Stage      | Module                 | Produces                          |
//! |------------|------------------------|-----------------------------------|
//! | Lex        | [`lexer`]              | tokens                            |
//! | Parse      | [`parser`]             | an [`ast::Node`] tree             |
//! | Translate  | [`transpiler`]         | SQLite [`transpiler::Expression`] |
//! | Execute    | [`engine`]             | a [`engine::QueryResult`]         |
//!
//! DDL is also mirrored into an emulated `information_schema` ([`schema`]),
//! so MySQL catalog queries keep working.
//!
//! ## Quick Example
//!
//! ```
//! use mysqlite::prelude::*;
//!
//! let grammar = Grammar::mysql();
//! let tree = mysqlite::parse(&grammar, "SELECT * FROM wp_posts WHERE ID = 1 LIMIT 1").unwrap();
//! let sql = Translator::new("wp").translate_to_sql(&tree).unwrap();
//! assert_eq!(sql.as_deref(), Some(r#"SELECT * FROM "wp_posts" WHERE "ID" = 1 LIMIT 1"#));
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::{Child, Node, Token, TokenKind};
    pub use crate::config::Config;
    pub use crate::engine::{Driver, FetchMode, QueryResult, ReturnValue, SqlValue, Storage};
    pub use crate::error::*;
    pub use crate::grammar::{Grammar, Keyword, Rule};
    pub use crate::parser::parse;
    pub use crate::transpiler::{ToSql, Translator};
}

pub use parser::parse;
