//! Query engine error types

use std::fmt;

use thiserror::Error;

use crate::api::types::ApiError;

/// Errors raised while tokenizing, parsing or compiling a query facet.
///
/// Every variant is a caller-input error. A facet that fails to compile is
/// rejected as a whole.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unexpected trailing token {0}")]
    UnexpectedTrailingToken(String),

    #[error("syntax error: {0}")]
    MalformedSyntax(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("unsupported function '{0}'")]
    UnsupportedFunction(String),

    #[error("cannot use '{value}' with column '{column}': {reason}")]
    TypeCoercion {
        column: String,
        value: String,
        reason: String,
    },
}

impl QueryError {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::MalformedSyntax(message.into())
    }

    pub(crate) fn coercion(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "UNEXPECTED_CHARACTER",
            Self::UnterminatedString { .. } => "UNTERMINATED_STRING",
            Self::UnexpectedTrailingToken(_) => "UNEXPECTED_TRAILING_TOKEN",
            Self::MalformedSyntax(_) => "MALFORMED_SYNTAX",
            Self::UnknownColumn(_) => "UNKNOWN_COLUMN",
            Self::UnsupportedOperator(_) => "UNSUPPORTED_OPERATOR",
            Self::UnsupportedFunction(_) => "UNSUPPORTED_FUNCTION",
            Self::TypeCoercion { .. } => "TYPE_COERCION_FAILURE",
        }
    }
}

/// Query-string facet a compile error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Filter,
    OrderBy,
    Select,
    Apply,
}

impl Facet {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Facet::Filter => "$filter",
            Facet::OrderBy => "$orderby",
            Facet::Select => "$select",
            Facet::Apply => "$apply",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`QueryError`] tagged with the facet that produced it
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{facet}: {error}")]
pub struct FacetError {
    pub facet: Facet,
    #[source]
    pub error: QueryError,
}

impl FacetError {
    pub fn new(facet: Facet, error: QueryError) -> Self {
        Self { facet, error }
    }
}

impl From<FacetError> for ApiError {
    fn from(e: FacetError) -> Self {
        tracing::debug!(facet = %e.facet, error = %e.error, "Rejected query facet");
        ApiError::bad_request(e.error.code(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_column_display() {
        let err = QueryError::UnknownColumn("colour".to_string());
        assert_eq!(err.to_string(), "unknown column 'colour'");
        assert_eq!(err.code(), "UNKNOWN_COLUMN");
    }

    #[test]
    fn test_facet_error_prefixes_facet() {
        let err = FacetError::new(
            Facet::OrderBy,
            QueryError::syntax("unexpected direction 'sideways'"),
        );
        assert_eq!(
            err.to_string(),
            "$orderby: syntax error: unexpected direction 'sideways'"
        );
    }

    #[test]
    fn test_coercion_display() {
        let err = QueryError::coercion("nps", "abc", "expected an integer");
        assert_eq!(
            err.to_string(),
            "cannot use 'abc' with column 'nps': expected an integer"
        );
        assert_eq!(err.code(), "TYPE_COERCION_FAILURE");
    }
}
