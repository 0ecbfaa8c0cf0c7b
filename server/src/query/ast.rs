//! Filter expression tree

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Parsed filter expression.
///
/// Only lexical and grammatical shape is checked at this stage. Column
/// names and literal types are validated when the tree is compiled
/// against a record type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Comparison {
        column: String,
        operator: String,
        raw_value: String,
        is_null: bool,
    },
    Call {
        name: String,
        args: Vec<Arg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Identifier(String),
    Literal { value: String, kind: LiteralKind },
}
