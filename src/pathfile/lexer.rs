//! Tokenizer for path files

use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eq,
    Semi,
    Dot,
    Ident(String),
    Str(String),
    Path(String),
    Int(i64),
    Eof,
}

impl Token {
    /// How the token is named in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Semi => "';'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(_) => "a string".to_string(),
            Token::Path(path) => format!("path '{}'", path),
            Token::Int(value) => format!("integer {}", value),
            Token::Eof => "end of file".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '/')
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '\'')
}

struct Lexer<'a> {
    file: &'a Path,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> Error {
        Error::Syntax {
            file: self.file.to_path_buf(),
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek_at(0), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('#'), _) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek_at(0), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(self.error(line, column, "unterminated comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn starts_path(&self) -> bool {
        match (self.peek_at(0), self.peek_at(1), self.peek_at(2)) {
            (Some('.'), Some('/'), _) => true,
            (Some('.'), Some('.'), Some('/')) => true,
            (Some('~'), Some('/'), _) => true,
            (Some('/'), Some(c), _) => c != '*' && is_path_char(c),
            _ => false,
        }
    }

    fn lex_path(&mut self, line: usize, column: usize) -> Result<Token> {
        let mut path = String::new();
        while let Some(c) = self.peek_at(0) {
            if !is_path_char(c) {
                break;
            }
            path.push(c);
            self.bump();
        }
        if path.len() > 1 && path.ends_with('/') {
            return Err(self.error(
                line,
                column,
                format!("path '{}' has a trailing slash", path),
            ));
        }
        Ok(Token::Path(path))
    }

    fn lex_string(&mut self, line: usize, column: usize) -> Result<Token> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(line, column, "unterminated string")),
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    // `\"`, `\\`, `\$` and unknown escapes stand for the character itself.
                    Some(c) => value.push(c),
                    None => return Err(self.error(line, column, "unterminated string")),
                },
                Some('$') if self.peek_at(0) == Some('{') => {
                    return Err(self.error(
                        self.line,
                        self.column - 1,
                        "string interpolation is not supported",
                    ));
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn next_token(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let spanned = |token| Spanned {
            token,
            line,
            column,
        };

        let c = match self.peek_at(0) {
            None => return Ok(spanned(Token::Eof)),
            Some(c) => c,
        };

        if self.starts_path() {
            return self.lex_path(line, column).map(spanned);
        }

        let single = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '=' => Some(Token::Eq),
            ';' => Some(Token::Semi),
            '.' => Some(Token::Dot),
            _ => None,
        };
        if let Some(token) = single {
            self.bump();
            return Ok(spanned(token));
        }

        if c == '"' {
            return self.lex_string(line, column).map(spanned);
        }

        if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(d) = self.peek_at(0).filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                self.bump();
            }
            let value = digits
                .parse::<i64>()
                .map_err(|e| self.error(line, column, format!("invalid integer: {}", e)))?;
            return Ok(spanned(Token::Int(value)));
        }

        if is_ident_start(c) {
            let mut name = String::new();
            while let Some(d) = self.peek_at(0).filter(|d| is_ident_char(*d)) {
                name.push(d);
                self.bump();
            }
            return Ok(spanned(Token::Ident(name)));
        }

        Err(self.error(line, column, format!("unexpected character '{}'", c)))
    }
}

/// Split `source` into tokens, ending with [`Token::Eof`].
pub fn tokenize(source: &str, file: &Path) -> Result<Vec<Spanned>> {
    let mut lexer = Lexer {
        file,
        chars: source.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };

    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}
