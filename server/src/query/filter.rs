//! Predicate compiler for `$filter`

use std::cmp::Ordering;
use std::fmt;

use super::ast::{Arg, Expr, LiteralKind, LogicalOp};
use super::error::QueryError;
use super::parser::parse_filter;
use super::schema::{Column, Record};
use super::value::{Value, ValueKind, coerce};

type PredicateFn<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// Compiled filter over records of type `R`
pub struct Predicate<R> {
    test: PredicateFn<R>,
}

impl<R: 'static> Predicate<R> {
    fn new(test: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        Self {
            test: Box::new(test),
        }
    }

    pub fn matches(&self, record: &R) -> bool {
        (self.test)(record)
    }

    fn and(self, other: Self) -> Self {
        Self::new(move |r| self.matches(r) && other.matches(r))
    }

    fn or(self, other: Self) -> Self {
        Self::new(move |r| self.matches(r) || other.matches(r))
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// Comparison operator after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn parse(op: &str) -> Result<Self, QueryError> {
        match op.to_ascii_lowercase().as_str() {
            "eq" | "=" => Ok(Self::Eq),
            "ne" | "!=" => Ok(Self::Ne),
            "gt" | ">" => Ok(Self::Gt),
            "ge" | ">=" => Ok(Self::Ge),
            "lt" | "<" => Ok(Self::Lt),
            "le" | "<=" => Ok(Self::Le),
            _ => Err(QueryError::UnsupportedOperator(op.to_string())),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }

    fn is_ordering(&self) -> bool {
        !matches!(self, Self::Eq | Self::Ne)
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
        }
    }
}

/// Parse and compile a `$filter` expression for record type `R`
pub fn compile_filter<R: Record>(input: &str) -> Result<Predicate<R>, QueryError> {
    let expr = parse_filter(input)?;
    compile_expr(&expr)
}

/// Compile an already parsed expression for record type `R`
pub fn compile_expr<R: Record>(expr: &Expr) -> Result<Predicate<R>, QueryError> {
    match expr {
        Expr::Logical { op, left, right } => {
            let left = compile_expr::<R>(left)?;
            let right = compile_expr::<R>(right)?;
            Ok(match op {
                LogicalOp::And => left.and(right),
                LogicalOp::Or => left.or(right),
            })
        }
        Expr::Comparison {
            column,
            operator,
            raw_value,
            is_null,
        } => compile_comparison(column, operator, raw_value, *is_null),
        Expr::Call { name, args } => compile_call(name, args),
    }
}

fn compile_comparison<R: Record>(
    name: &str,
    operator: &str,
    raw_value: &str,
    is_null: bool,
) -> Result<Predicate<R>, QueryError> {
    let column = *R::query_schema().resolve(name)?;
    let op = CompareOp::parse(operator)?;

    if is_null {
        return match op {
            CompareOp::Eq => Ok(Predicate::new(move |r| column.read(r).is_null())),
            CompareOp::Ne => Ok(Predicate::new(move |r| !column.read(r).is_null())),
            _ => Err(QueryError::coercion(
                name,
                raw_value,
                format!("operator '{}' cannot be used with null", op.as_str()),
            )),
        };
    }

    let literal = coerce(raw_value, column.kind, name)?;

    if op.is_ordering() {
        if !column.kind.is_ordered() {
            return Err(QueryError::coercion(
                name,
                raw_value,
                format!(
                    "operator '{}' is not supported on {} columns",
                    op.as_str(),
                    column.kind
                ),
            ));
        }
        // A missing value never satisfies an ordering comparison
        return Ok(Predicate::new(move |r| {
            column
                .read(r)
                .partial_compare(&literal)
                .is_some_and(|ord| op.accepts(ord))
        }));
    }

    let equal = op == CompareOp::Eq;
    Ok(Predicate::new(move |r| (column.read(r) == literal) == equal))
}

fn compile_call<R: Record>(name: &str, args: &[Arg]) -> Result<Predicate<R>, QueryError> {
    if !name.eq_ignore_ascii_case("contains") {
        return Err(QueryError::UnsupportedFunction(name.to_string()));
    }

    let [target, needle] = args else {
        return Err(QueryError::syntax(format!(
            "contains expects 2 arguments, got {}",
            args.len()
        )));
    };
    let Arg::Identifier(column_name) = target else {
        return Err(QueryError::syntax(
            "contains expects a column name as its first argument",
        ));
    };
    let Arg::Literal {
        value: needle,
        kind: LiteralKind::String,
    } = needle
    else {
        return Err(QueryError::syntax(
            "contains expects a string literal as its second argument",
        ));
    };

    let column: Column<R> = *R::query_schema().resolve(column_name)?;
    if column.kind != ValueKind::Text {
        return Err(QueryError::coercion(
            column_name.as_str(),
            needle.as_str(),
            "contains is only supported on string columns",
        ));
    }

    let needle = needle.clone();
    Ok(Predicate::new(move |r| match column.read(r) {
        Value::Text(text) => text.contains(needle.as_str()),
        _ => false,
    }))
}
