//! Recursive-descent filter parser
//!
//! ```text
//! expr          := or_expr
//! or_expr       := and_expr ( "or" and_expr )*
//! and_expr      := primary ( "and" primary )*
//! primary       := "(" expr ")" | comparison | function_call
//! comparison    := IDENT operator ( STRING | NUMBER | "null" | IDENT )
//! function_call := IDENT "(" [ arg ( "," arg )* ] ")"
//! arg           := IDENT | STRING | NUMBER | "null"
//! ```

use super::ast::{Arg, Expr, LiteralKind, LogicalOp};
use super::error::QueryError;
use super::token::{Token, tokenize};

/// Tokenize and parse a filter string into an expression tree
pub fn parse_filter(input: &str) -> Result<Expr, QueryError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expr)
}

static END: Token = Token::End;

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, QueryError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut expr = self.parse_and()?;
        while self.match_token(&Token::Or) {
            let right = self.parse_and()?;
            expr = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut expr = self.parse_primary()?;
        while self.match_token(&Token::And) {
            let right = self.parse_primary()?;
            expr = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        match self.advance() {
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Identifier(name) => match self.peek() {
                Token::LParen => {
                    self.advance();
                    self.parse_call(name)
                }
                Token::Operator(_) => self.parse_comparison(name),
                other => Err(QueryError::syntax(format!(
                    "expected operator or '(' after '{}', found {}",
                    name, other
                ))),
            },
            other => Err(QueryError::syntax(format!(
                "expected column, function or '(', found {}",
                other
            ))),
        }
    }

    fn parse_comparison(&mut self, column: String) -> Result<Expr, QueryError> {
        let operator = match self.advance() {
            Token::Operator(op) if op == "!" => {
                return Err(QueryError::syntax(format!(
                    "'!' must be followed by '=' after '{}'",
                    column
                )));
            }
            Token::Operator(op) => op,
            other => {
                return Err(QueryError::syntax(format!(
                    "expected operator after '{}', found {}",
                    column, other
                )));
            }
        };

        let raw_value = match self.advance() {
            Token::StringLiteral(value)
            | Token::NumberLiteral(value)
            | Token::Identifier(value) => value,
            Token::NullLiteral => "null".to_string(),
            other => {
                return Err(QueryError::syntax(format!(
                    "expected value after '{} {}', found {}",
                    column, operator, other
                )));
            }
        };
        let is_null = raw_value.eq_ignore_ascii_case("null");

        Ok(Expr::Comparison {
            column,
            operator,
            raw_value,
            is_null,
        })
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, QueryError> {
        let mut args = Vec::new();
        if self.match_token(&Token::RParen) {
            return Ok(Expr::Call { name, args });
        }
        loop {
            args.push(self.parse_arg(&name)?);
            if self.match_token(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "',' or ')'")?;
            return Ok(Expr::Call { name, args });
        }
    }

    fn parse_arg(&mut self, function: &str) -> Result<Arg, QueryError> {
        match self.advance() {
            Token::Identifier(name) => Ok(Arg::Identifier(name)),
            Token::StringLiteral(value) => Ok(Arg::Literal {
                value,
                kind: LiteralKind::String,
            }),
            Token::NumberLiteral(value) => Ok(Arg::Literal {
                value,
                kind: LiteralKind::Number,
            }),
            Token::NullLiteral => Ok(Arg::Literal {
                value: "null".to_string(),
                kind: LiteralKind::Null,
            }),
            other => Err(QueryError::syntax(format!(
                "invalid argument to '{}': {}",
                function, other
            ))),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&END)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, label: &str) -> Result<(), QueryError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(QueryError::syntax(format!(
                "expected {}, found {}",
                label,
                self.peek()
            )))
        }
    }

    fn expect_end(&self) -> Result<(), QueryError> {
        match self.peek() {
            Token::End => Ok(()),
            other => Err(QueryError::UnexpectedTrailingToken(other.to_string())),
        }
    }
}
