//! Filter tokenizer

use std::fmt;

use super::error::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Identifier(String),
    Operator(String),
    StringLiteral(String),
    NumberLiteral(String),
    NullLiteral,
    And,
    Or,
    LParen,
    RParen,
    Comma,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Operator(op) => write!(f, "operator '{}'", op),
            Token::StringLiteral(value) => write!(f, "string '{}'", value),
            Token::NumberLiteral(text) => write!(f, "number {}", text),
            Token::NullLiteral => f.write_str("'null'"),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::End => f.write_str("end of input"),
        }
    }
}

/// Split a filter string into tokens, always terminated by [`Token::End`]
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
    tokens.push(Token::End);
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.consume_whitespace();
        let ch = self.peek_char()?;

        let token = if is_identifier_start(ch) {
            Ok(self.consume_identifier())
        } else if ch == '\'' {
            self.consume_string()
        } else if ch.is_ascii_digit() || (ch == '-' && self.next_is_digit()) {
            Ok(self.consume_number())
        } else {
            match ch {
                '(' => {
                    self.advance();
                    Ok(Token::LParen)
                }
                ')' => {
                    self.advance();
                    Ok(Token::RParen)
                }
                ',' => {
                    self.advance();
                    Ok(Token::Comma)
                }
                '>' | '<' | '!' | '=' => Ok(self.consume_operator(ch)),
                _ => Err(QueryError::UnexpectedCharacter {
                    ch,
                    position: self.position,
                }),
            }
        };

        Some(token)
    }
}

impl Lexer<'_> {
    fn consume_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn consume_identifier(&mut self) -> Token {
        let start = self.position;
        self.advance();
        while let Some(ch) = self.peek_char() {
            if is_identifier_part(ch) {
                self.advance();
            } else {
                break;
            }
        }
        let ident = &self.input[start..self.position];
        match ident.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "null" => Token::NullLiteral,
            "eq" | "ne" | "gt" | "ge" | "lt" | "le" => Token::Operator(ident.to_string()),
            _ => Token::Identifier(ident.to_string()),
        }
    }

    fn consume_string(&mut self) -> Result<Token, QueryError> {
        let start = self.position;
        self.advance();
        let mut value = String::new();
        while let Some(ch) = self.next_char() {
            if ch == '\'' {
                // '' inside a literal is an escaped quote
                if self.peek_char() == Some('\'') {
                    self.advance();
                    value.push('\'');
                    continue;
                }
                return Ok(Token::StringLiteral(value));
            }
            value.push(ch);
        }
        Err(QueryError::UnterminatedString { position: start })
    }

    fn consume_number(&mut self) -> Token {
        let start = self.position;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        self.consume_digits();
        if self.peek_char() == Some('.') && self.next_is_digit() {
            self.advance();
            self.consume_digits();
        }
        Token::NumberLiteral(self.input[start..self.position].to_string())
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn consume_operator(&mut self, first: char) -> Token {
        self.advance();
        if first != '=' && self.peek_char() == Some('=') {
            self.advance();
            return Token::Operator(format!("{}=", first));
        }
        Token::Operator(first.to_string())
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Whether the character after the current one is an ASCII digit
    fn next_is_digit(&self) -> bool {
        self.input[self.position..]
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn advance(&mut self) {
        self.next_char();
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
