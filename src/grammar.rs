//! The MySQL grammar tables.
//!
//! A [`Grammar`] is built once with [`Grammar::mysql`] and shared by
//! reference (usually as `Arc<Grammar>`) into every lexer, parser and
//! driver. It owns the keyword table used by the lexer and the rule table
//! that maps grammar rule names onto the closed [`Rule`] enum.

use std::collections::HashMap;
use std::fmt;

macro_rules! keywords {
    (
        reserved { $($rvariant:ident => $rtext:literal,)* }
        unreserved { $($uvariant:ident => $utext:literal,)* }
    ) => {
        /// A MySQL keyword.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($rvariant,)*
            $($uvariant,)*
        }

        impl Keyword {
            /// Every keyword, reserved ones first.
            pub const ALL: &'static [Keyword] = &[
                $(Keyword::$rvariant,)*
                $(Keyword::$uvariant,)*
            ];

            /// Canonical (uppercase) spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$rvariant => $rtext,)*
                    $(Keyword::$uvariant => $utext,)*
                }
            }

            /// Reserved words cannot be used as bare identifiers.
            pub fn is_reserved(self) -> bool {
                match self {
                    $(Keyword::$rvariant => true,)*
                    $(Keyword::$uvariant => false,)*
                }
            }
        }
    };
}

keywords! {
    reserved {
        Add => "ADD",
        All => "ALL",
        Alter => "ALTER",
        And => "AND",
        As => "AS",
        Asc => "ASC",
        Between => "BETWEEN",
        Bigint => "BIGINT",
        Binary => "BINARY",
        Blob => "BLOB",
        By => "BY",
        Cascade => "CASCADE",
        Case => "CASE",
        Change => "CHANGE",
        Char => "CHAR",
        Character => "CHARACTER",
        Check => "CHECK",
        Collate => "COLLATE",
        Column => "COLUMN",
        Constraint => "CONSTRAINT",
        Convert => "CONVERT",
        Create => "CREATE",
        Cross => "CROSS",
        CurrentDate => "CURRENT_DATE",
        CurrentTime => "CURRENT_TIME",
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        Database => "DATABASE",
        Dec => "DEC",
        Decimal => "DECIMAL",
        Default => "DEFAULT",
        Delayed => "DELAYED",
        Delete => "DELETE",
        Desc => "DESC",
        Distinct => "DISTINCT",
        Distinctrow => "DISTINCTROW",
        Div => "DIV",
        Double => "DOUBLE",
        Drop => "DROP",
        Dual => "DUAL",
        Else => "ELSE",
        Exists => "EXISTS",
        False => "FALSE",
        Float => "FLOAT",
        For => "FOR",
        Force => "FORCE",
        Foreign => "FOREIGN",
        From => "FROM",
        Fulltext => "FULLTEXT",
        Generated => "GENERATED",
        Group => "GROUP",
        Having => "HAVING",
        HighPriority => "HIGH_PRIORITY",
        If => "IF",
        Ignore => "IGNORE",
        In => "IN",
        Index => "INDEX",
        Inner => "INNER",
        Insert => "INSERT",
        Int => "INT",
        Integer => "INTEGER",
        Interval => "INTERVAL",
        Into => "INTO",
        Is => "IS",
        Join => "JOIN",
        Key => "KEY",
        Left => "LEFT",
        Like => "LIKE",
        Limit => "LIMIT",
        Lock => "LOCK",
        Long => "LONG",
        Longblob => "LONGBLOB",
        Longtext => "LONGTEXT",
        LowPriority => "LOW_PRIORITY",
        Match => "MATCH",
        Mediumblob => "MEDIUMBLOB",
        Mediumint => "MEDIUMINT",
        Mediumtext => "MEDIUMTEXT",
        Mod => "MOD",
        Natural => "NATURAL",
        Not => "NOT",
        Null => "NULL",
        Numeric => "NUMERIC",
        On => "ON",
        Or => "OR",
        Order => "ORDER",
        Outer => "OUTER",
        Precision => "PRECISION",
        Primary => "PRIMARY",
        Real => "REAL",
        References => "REFERENCES",
        Regexp => "REGEXP",
        Rename => "RENAME",
        Replace => "REPLACE",
        Restrict => "RESTRICT",
        Right => "RIGHT",
        Rlike => "RLIKE",
        Schema => "SCHEMA",
        Select => "SELECT",
        Separator => "SEPARATOR",
        Set => "SET",
        Smallint => "SMALLINT",
        Spatial => "SPATIAL",
        SqlBigResult => "SQL_BIG_RESULT",
        SqlCalcFoundRows => "SQL_CALC_FOUND_ROWS",
        SqlSmallResult => "SQL_SMALL_RESULT",
        Stored => "STORED",
        StraightJoin => "STRAIGHT_JOIN",
        Table => "TABLE",
        Then => "THEN",
        Tinyblob => "TINYBLOB",
        Tinyint => "TINYINT",
        Tinytext => "TINYTEXT",
        To => "TO",
        True => "TRUE",
        Union => "UNION",
        Unique => "UNIQUE",
        Unsigned => "UNSIGNED",
        Update => "UPDATE",
        Use => "USE",
        Using => "USING",
        UtcTimestamp => "UTC_TIMESTAMP",
        Values => "VALUES",
        Varbinary => "VARBINARY",
        Varchar => "VARCHAR",
        Varying => "VARYING",
        Virtual => "VIRTUAL",
        When => "WHEN",
        Where => "WHERE",
        With => "WITH",
        Xor => "XOR",
        Zerofill => "ZEROFILL",
    }
    unreserved {
        Action => "ACTION",
        Adddate => "ADDDATE",
        After => "AFTER",
        Always => "ALWAYS",
        Any => "ANY",
        Ascii => "ASCII",
        AutoIncrement => "AUTO_INCREMENT",
        Avg => "AVG",
        Begin => "BEGIN",
        Bit => "BIT",
        Bool => "BOOL",
        Boolean => "BOOLEAN",
        Btree => "BTREE",
        Byte => "BYTE",
        Cast => "CAST",
        Charset => "CHARSET",
        ColumnFormat => "COLUMN_FORMAT",
        Comment => "COMMENT",
        Commit => "COMMIT",
        Count => "COUNT",
        Curdate => "CURDATE",
        Curtime => "CURTIME",
        Date => "DATE",
        DateAdd => "DATE_ADD",
        DateSub => "DATE_SUB",
        Datetime => "DATETIME",
        Day => "DAY",
        Duplicate => "DUPLICATE",
        End => "END",
        Engine => "ENGINE",
        Enum => "ENUM",
        Escape => "ESCAPE",
        Extract => "EXTRACT",
        First => "FIRST",
        Fixed => "FIXED",
        Geomcollection => "GEOMCOLLECTION",
        Geometry => "GEOMETRY",
        Geometrycollection => "GEOMETRYCOLLECTION",
        Global => "GLOBAL",
        GroupConcat => "GROUP_CONCAT",
        Hash => "HASH",
        Hour => "HOUR",
        Invisible => "INVISIBLE",
        Json => "JSON",
        KeyBlockSize => "KEY_BLOCK_SIZE",
        Linestring => "LINESTRING",
        Local => "LOCAL",
        Max => "MAX",
        Microsecond => "MICROSECOND",
        Min => "MIN",
        Minute => "MINUTE",
        Mode => "MODE",
        Modify => "MODIFY",
        Month => "MONTH",
        Multilinestring => "MULTILINESTRING",
        Multipoint => "MULTIPOINT",
        Multipolygon => "MULTIPOLYGON",
        Names => "NAMES",
        National => "NATIONAL",
        Nchar => "NCHAR",
        No => "NO",
        Now => "NOW",
        Nvarchar => "NVARCHAR",
        Offset => "OFFSET",
        Point => "POINT",
        Polygon => "POLYGON",
        Position => "POSITION",
        Quarter => "QUARTER",
        Quick => "QUICK",
        Rollback => "ROLLBACK",
        Rollup => "ROLLUP",
        RowFormat => "ROW_FORMAT",
        Rtree => "RTREE",
        Second => "SECOND",
        Serial => "SERIAL",
        Session => "SESSION",
        Share => "SHARE",
        Signed => "SIGNED",
        Some => "SOME",
        SqlBufferResult => "SQL_BUFFER_RESULT",
        SqlCache => "SQL_CACHE",
        SqlNoCache => "SQL_NO_CACHE",
        Start => "START",
        Storage => "STORAGE",
        Subdate => "SUBDATE",
        Substr => "SUBSTR",
        Substring => "SUBSTRING",
        Sum => "SUM",
        Sysdate => "SYSDATE",
        Temporary => "TEMPORARY",
        Text => "TEXT",
        Time => "TIME",
        Timestamp => "TIMESTAMP",
        Transaction => "TRANSACTION",
        Trim => "TRIM",
        Type => "TYPE",
        Unicode => "UNICODE",
        Unknown => "UNKNOWN",
        Value => "VALUE",
        Visible => "VISIBLE",
        Week => "WEEK",
        Work => "WORK",
        Year => "YEAR",
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Punctuation and operator symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    Star,
    Plus,
    Minus,
    Slash,
    Percent,
    Equal,
    NullSafeEqual,
    NotEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Bang,
    Tilde,
    Caret,
    Pipe,
    Amp,
    LogicalOr,
    LogicalAnd,
    ShiftLeft,
    ShiftRight,
    Assign,
    AtAt,
}

impl Symbol {
    /// Multi-character symbols first, so the lexer can match greedily.
    pub const ALL: &'static [Symbol] = &[
        Symbol::NullSafeEqual,
        Symbol::NotEqual,
        Symbol::BangEqual,
        Symbol::LessEqual,
        Symbol::GreaterEqual,
        Symbol::ShiftLeft,
        Symbol::ShiftRight,
        Symbol::LogicalOr,
        Symbol::LogicalAnd,
        Symbol::Assign,
        Symbol::AtAt,
        Symbol::LParen,
        Symbol::RParen,
        Symbol::Comma,
        Symbol::Dot,
        Symbol::Semicolon,
        Symbol::Star,
        Symbol::Plus,
        Symbol::Minus,
        Symbol::Slash,
        Symbol::Percent,
        Symbol::Equal,
        Symbol::Less,
        Symbol::Greater,
        Symbol::Bang,
        Symbol::Tilde,
        Symbol::Caret,
        Symbol::Pipe,
        Symbol::Amp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::Comma => ",",
            Symbol::Dot => ".",
            Symbol::Semicolon => ";",
            Symbol::Star => "*",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Slash => "/",
            Symbol::Percent => "%",
            Symbol::Equal => "=",
            Symbol::NullSafeEqual => "<=>",
            Symbol::NotEqual => "<>",
            Symbol::BangEqual => "!=",
            Symbol::Less => "<",
            Symbol::LessEqual => "<=",
            Symbol::Greater => ">",
            Symbol::GreaterEqual => ">=",
            Symbol::Bang => "!",
            Symbol::Tilde => "~",
            Symbol::Caret => "^",
            Symbol::Pipe => "|",
            Symbol::Amp => "&",
            Symbol::LogicalOr => "||",
            Symbol::LogicalAnd => "&&",
            Symbol::ShiftLeft => "<<",
            Symbol::ShiftRight => ">>",
            Symbol::Assign => ":=",
            Symbol::AtAt => "@@",
        }
    }

    /// Whether the symbol is a comparison operator.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Symbol::Equal
                | Symbol::NullSafeEqual
                | Symbol::NotEqual
                | Symbol::BangEqual
                | Symbol::Less
                | Symbol::LessEqual
                | Symbol::Greater
                | Symbol::GreaterEqual
        )
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! rules {
    ($($variant:ident => $name:literal,)*) => {
        /// A grammar rule, i.e. the production a parse tree node instantiates.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Rule {
            $($variant,)*
        }

        impl Rule {
            pub const ALL: &'static [Rule] = &[$(Rule::$variant,)*];

            /// The grammar name of the rule.
            pub fn name(self) -> &'static str {
                match self {
                    $(Rule::$variant => $name,)*
                }
            }
        }
    };
}

rules! {
    Fragment => "%fragment",
    Query => "query",
    SimpleStatement => "simpleStatement",
    // SELECT
    SelectStatement => "selectStatement",
    QueryExpression => "queryExpression",
    QueryExpressionParens => "queryExpressionParens",
    QuerySpecification => "querySpecification",
    UnionClause => "unionClause",
    SelectOption => "selectOption",
    SelectItemList => "selectItemList",
    SelectItem => "selectItem",
    SelectAlias => "selectAlias",
    TableWild => "tableWild",
    FromClause => "fromClause",
    TableReferenceList => "tableReferenceList",
    TableReference => "tableReference",
    TableFactor => "tableFactor",
    SingleTable => "singleTable",
    DerivedTable => "derivedTable",
    TableReferenceListParens => "tableReferenceListParens",
    TableAlias => "tableAlias",
    IndexHintList => "indexHintList",
    IndexHint => "indexHint",
    JoinedTable => "joinedTable",
    InnerJoinType => "innerJoinType",
    OuterJoinType => "outerJoinType",
    NaturalJoinType => "naturalJoinType",
    IdentifierList => "identifierList",
    IdentifierListWithParentheses => "identifierListWithParentheses",
    WhereClause => "whereClause",
    GroupByClause => "groupByClause",
    OlapOption => "olapOption",
    HavingClause => "havingClause",
    OrderClause => "orderClause",
    OrderList => "orderList",
    OrderExpression => "orderExpression",
    Direction => "direction",
    LimitClause => "limitClause",
    LimitOptions => "limitOptions",
    LimitOption => "limitOption",
    LockingClause => "lockingClause",
    // INSERT / REPLACE / UPDATE / DELETE
    InsertStatement => "insertStatement",
    ReplaceStatement => "replaceStatement",
    InsertLockOption => "insertLockOption",
    InsertFromConstructor => "insertFromConstructor",
    Fields => "fields",
    InsertValues => "insertValues",
    ValueList => "valueList",
    Values => "values",
    InsertQueryExpression => "insertQueryExpression",
    InsertUpdateList => "insertUpdateList",
    UpdateList => "updateList",
    UpdateElement => "updateElement",
    UpdateStatement => "updateStatement",
    DeleteStatement => "deleteStatement",
    DeleteStatementOption => "deleteStatementOption",
    // DDL
    CreateStatement => "createStatement",
    CreateTable => "createTable",
    CreateIndex => "createIndex",
    IfNotExists => "ifNotExists",
    IfExists => "ifExists",
    TableName => "tableName",
    TableRef => "tableRef",
    TableRefList => "tableRefList",
    TableElementList => "tableElementList",
    TableElement => "tableElement",
    ColumnDefinition => "columnDefinition",
    FieldDefinition => "fieldDefinition",
    DataType => "dataType",
    FieldLength => "fieldLength",
    Precision => "precision",
    TypeDatetimePrecision => "typeDatetimePrecision",
    FieldOptions => "fieldOptions",
    StringList => "stringList",
    CharsetWithOptBinary => "charsetWithOptBinary",
    CharsetName => "charsetName",
    CollationName => "collationName",
    ColumnAttribute => "columnAttribute",
    GeneratedColumn => "generatedColumn",
    SignedLiteral => "signedLiteral",
    References => "references",
    TableConstraintDef => "tableConstraintDef",
    ConstraintName => "constraintName",
    IndexName => "indexName",
    KeyList => "keyList",
    KeyPart => "keyPart",
    IndexTypeClause => "indexTypeClause",
    IndexType => "indexType",
    IndexOption => "indexOption",
    CreateTableOptions => "createTableOptions",
    CreateTableOption => "createTableOption",
    EngineRef => "engineRef",
    DuplicateAsQueryExpression => "duplicateAsQueryExpression",
    AlterStatement => "alterStatement",
    AlterTable => "alterTable",
    AlterList => "alterList",
    AlterListItem => "alterListItem",
    Place => "place",
    DropStatement => "dropStatement",
    DropTable => "dropTable",
    DropIndex => "dropIndex",
    SetStatement => "setStatement",
    // Expressions
    Expr => "expr",
    BoolPri => "boolPri",
    CompOp => "compOp",
    Predicate => "predicate",
    BitExpr => "bitExpr",
    SimpleExpr => "simpleExpr",
    ExprList => "exprList",
    ExprWithParentheses => "exprWithParentheses",
    Subquery => "subquery",
    Literal => "literal",
    TextLiteral => "textLiteral",
    TextStringLiteral => "textStringLiteral",
    NumLiteral => "numLiteral",
    NullLiteral => "nullLiteral",
    BoolLiteral => "boolLiteral",
    TemporalLiteral => "temporalLiteral",
    ColumnRef => "columnRef",
    Identifier => "identifier",
    QualifiedIdentifier => "qualifiedIdentifier",
    FunctionCall => "functionCall",
    RuntimeFunctionCall => "runtimeFunctionCall",
    SumExpr => "sumExpr",
    UdfExprList => "udfExprList",
    UdfExpr => "udfExpr",
    CastType => "castType",
    Interval => "interval",
    IntervalTimeStamp => "intervalTimeStamp",
    CaseExpression => "caseExpression",
    WhenExpression => "whenExpression",
    ElseExpression => "elseExpression",
    SystemVariable => "systemVariable",
    UserVariable => "userVariable",
}

impl Rule {
    /// Numeric rule id (stable for the lifetime of the crate version).
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Fragment nodes are grammar-factoring artifacts merged into their parent.
    pub fn is_fragment(self) -> bool {
        self == Rule::Fragment
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable keyword and rule tables for the MySQL dialect.
#[derive(Debug)]
pub struct Grammar {
    keywords: HashMap<&'static str, Keyword>,
    rules: HashMap<&'static str, Rule>,
}

impl Grammar {
    /// Build the MySQL grammar tables.
    pub fn mysql() -> Self {
        let keywords = Keyword::ALL.iter().map(|kw| (kw.as_str(), *kw)).collect();
        let rules = Rule::ALL
            .iter()
            .filter(|rule| !rule.is_fragment())
            .map(|rule| (rule.name(), *rule))
            .collect();
        Self { keywords, rules }
    }

    /// Look up a word, case-insensitively, in the keyword table.
    pub fn keyword(&self, word: &str) -> Option<Keyword> {
        if word.bytes().all(|b| !b.is_ascii_lowercase()) {
            return self.keywords.get(word).copied();
        }
        self.keywords.get(word.to_ascii_uppercase().as_str()).copied()
    }

    /// Look up a public rule by its grammar name. Fragments are not public.
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.rules.get(name).copied()
    }

    /// All keywords, sorted by spelling.
    pub fn keywords(&self) -> Vec<Keyword> {
        let mut all: Vec<Keyword> = self.keywords.values().copied().collect();
        all.sort_by_key(|kw| kw.as_str());
        all
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
