use crate::LexError;
use std::ops::Index;
use tracing::debug;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    TkPlus,                 // +
    TkMinus,                // -
    TkStar,                 // *
    TkSlash,                // /
    TkLParen,               // (
    TkRParen,               // )
    TkSemi,                 // ;
    TkAssign,               // =
    TkReturn,               // "return"
    TkNum { val: i64 },     // Integer literals
    TkIdent { name: char }, // Single-letter variables
    TkEof,                  // End-of-input marker
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source text.
    pub loc: usize,
}

impl Token {
    pub fn new(kind: TokenKind, loc: usize) -> Self {
        Self { kind, loc }
    }
}

/// Tokens in source order. A finished stream always ends with exactly one
/// `TkEof`.
#[derive(Debug, PartialEq)]
pub struct TokenStream(Vec<Token>);

impl Index<usize> for TokenStream {
    type Output = Token;
    fn index(&self, i: usize) -> &Token {
        &self.0[i]
    }
}

impl TokenStream {
    pub(crate) fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push_back(&mut self, token: Token) {
        self.0.push(token);
    }

    pub(crate) fn finish(mut self, loc: usize) -> Self {
        self.0.push(Token::new(TokenKind::TkEof, loc));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    fn is_ident_char(c: u8) -> bool {
        c.is_ascii_alphanumeric() || c == b'_'
    }

    fn skip_whitespace(s: &str, i: &mut usize) {
        let bytes = s.as_bytes();
        while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
            *i += 1;
        }
    }

    fn extract_digit(s: &str, i: &mut usize) -> Option<Result<i64, LexError>> {
        let bytes = s.as_bytes();
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        if start == *i {
            return None;
        }
        Some(s[start..*i].parse::<i64>().map_err(|_| LexError::NumberOutOfRange {
            pos: start,
            rest: s[start..].to_string(),
        }))
    }

    fn extract_reserve(s: &str, i: &mut usize) -> Option<TokenKind> {
        let bytes = s.as_bytes();
        let kind = match bytes.get(*i)? {
            b'+' => TokenKind::TkPlus,
            b'-' => TokenKind::TkMinus,
            b'*' => TokenKind::TkStar,
            b'/' => TokenKind::TkSlash,
            b'(' => TokenKind::TkLParen,
            b')' => TokenKind::TkRParen,
            b';' => TokenKind::TkSemi,
            b'=' => TokenKind::TkAssign,
            _ => return None,
        };
        *i += 1;
        Some(kind)
    }

    // "return" only counts as the keyword when it is not the prefix of a
    // longer alphanumeric run.
    fn extract_keyword(s: &str, i: &mut usize) -> Option<TokenKind> {
        let bytes = s.as_bytes();
        let end = *i + "return".len();
        if !s[*i..].starts_with("return") {
            return None;
        }
        if bytes.get(end).is_some_and(|&c| Self::is_ident_char(c)) {
            return None;
        }
        *i = end;
        Some(TokenKind::TkReturn)
    }

    // One lowercase letter is one variable; `ab` lexes as `a` then `b`.
    fn extract_ident(s: &str, i: &mut usize) -> Option<TokenKind> {
        let c = *s.as_bytes().get(*i)?;
        if !c.is_ascii_lowercase() {
            return None;
        }
        *i += 1;
        Some(TokenKind::TkIdent { name: c as char })
    }

    fn generate_token(&mut self, s: &str, i: &mut usize) -> Result<(), LexError> {
        Self::skip_whitespace(s, i);
        if *i >= s.len() {
            return Ok(());
        }
        let loc = *i;

        if let Some(val) = Self::extract_digit(s, i) {
            self.push_back(Token::new(TokenKind::TkNum { val: val? }, loc));
            return Ok(());
        }

        if let Some(kind) = Self::extract_reserve(s, i) {
            self.push_back(Token::new(kind, loc));
            return Ok(());
        }

        if let Some(kind) = Self::extract_keyword(s, i) {
            self.push_back(Token::new(kind, loc));
            return Ok(());
        }

        if let Some(kind) = Self::extract_ident(s, i) {
            self.push_back(Token::new(kind, loc));
            return Ok(());
        }

        Err(LexError::UnexpectedChar {
            pos: loc,
            rest: s[loc..].to_string(),
        })
    }

    pub fn tokenizer(s: &str) -> Result<Self, LexError> {
        let mut rv = Self::new();
        let mut i = 0;
        while i < s.len() {
            rv.generate_token(s, &mut i)?;
        }
        let rv = rv.finish(s.len());
        debug!(tokens = rv.len(), "tokenized source");
        Ok(rv)
    }
}
