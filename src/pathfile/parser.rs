//! Recursive-descent parser producing the path-file syntax tree

use std::path::Path;

use super::lexer::{Spanned, Token};
use crate::error::{Error, Result};

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Attrs(Vec<Binding>),
    Str(String),
    /// A path literal exactly as written.
    Path(String),
    Import(Box<Expr>),
    Int(i64),
    Bool(bool),
    Null,
    List(Vec<Expr>),
}

/// `a.b.c = value;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub attrpath: Vec<String>,
    pub value: Expr,
}

struct Parser<'a> {
    file: &'a Path,
    tokens: Vec<Spanned>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Spanned {
        // tokenize always ends the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let spanned = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        spanned
    }

    fn error_at(&self, spanned: &Spanned, message: String) -> Error {
        Error::Syntax {
            file: self.file.to_path_buf(),
            line: spanned.line,
            column: spanned.column,
            message,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let spanned = self.advance();
        if spanned.token == expected {
            Ok(())
        } else {
            Err(self.error_at(
                &spanned,
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    spanned.token.describe()
                ),
            ))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        if matches!(&self.peek().token, Token::Ident(name) if name == "import") {
            self.advance();
            let argument = self.parse_atom()?;
            return Ok(Expr::Import(Box::new(argument)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let spanned = self.advance();
        match spanned.token {
            Token::LBrace => self.parse_attrs(),
            Token::LBracket => {
                let mut items = Vec::new();
                while self.peek().token != Token::RBracket {
                    if self.peek().token == Token::Eof {
                        let eof = self.peek().clone();
                        return Err(self.error_at(&eof, "unterminated list".to_string()));
                    }
                    items.push(self.parse_atom()?);
                }
                self.advance();
                Ok(Expr::List(items))
            }
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Str(value) => Ok(Expr::Str(value)),
            Token::Path(path) => Ok(Expr::Path(path)),
            Token::Int(value) => Ok(Expr::Int(value)),
            Token::Ident(ref name) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                "import" => Err(self.error_at(
                    &spanned,
                    "'import' must be applied to an argument".to_string(),
                )),
                other => Err(self.error_at(&spanned, format!("undefined variable '{}'", other))),
            },
            ref other => Err(self.error_at(
                &spanned,
                format!("expected an expression, found {}", other.describe()),
            )),
        }
    }

    /// Parses bindings up to and including the closing brace.
    fn parse_attrs(&mut self) -> Result<Expr> {
        let mut bindings = Vec::new();
        loop {
            if self.peek().token == Token::RBrace {
                self.advance();
                return Ok(Expr::Attrs(bindings));
            }
            let attrpath = self.parse_attrpath()?;
            self.expect(Token::Eq)?;
            let value = self.parse_expr()?;
            self.expect(Token::Semi)?;
            bindings.push(Binding { attrpath, value });
        }
    }

    fn parse_attrname(&mut self) -> Result<String> {
        let spanned = self.advance();
        match spanned.token {
            Token::Ident(name) => Ok(name),
            Token::Str(name) if !name.is_empty() => Ok(name),
            ref other => Err(self.error_at(
                &spanned,
                format!("expected an attribute name, found {}", other.describe()),
            )),
        }
    }

    fn parse_attrpath(&mut self) -> Result<Vec<String>> {
        let mut attrpath = vec![self.parse_attrname()?];
        while self.peek().token == Token::Dot {
            self.advance();
            attrpath.push(self.parse_attrname()?);
        }
        Ok(attrpath)
    }
}

/// Parse a whole file: exactly one expression followed by end of input.
pub fn parse(tokens: Vec<Spanned>, file: &Path) -> Result<Expr> {
    let mut parser = Parser {
        file,
        tokens,
        pos: 0,
    };
    let expr = parser.parse_expr()?;
    let trailing = parser.advance();
    if trailing.token != Token::Eof {
        return Err(parser.error_at(
            &trailing,
            format!(
                "unexpected {} after the end of the expression",
                trailing.token.describe()
            ),
        ));
    }
    Ok(expr)
}
