//! Self-check of the token storage, run by `stackcc -test`.

use thiserror::Error;

use crate::{Parser, Token, TokenKind, TokenStream};

#[derive(Debug, Error, PartialEq)]
#[error("line {line}: {expected} expected, but got {actual}")]
pub struct SelfTestError {
    pub line: u32,
    pub expected: String,
    pub actual: String,
}

fn expect<T: PartialEq + std::fmt::Debug>(
    line: u32,
    expected: T,
    actual: T,
) -> Result<(), SelfTestError> {
    if expected == actual {
        return Ok(());
    }
    Err(SelfTestError {
        line,
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

pub fn run_self_test() -> Result<(), SelfTestError> {
    let mut stream = TokenStream::new();
    expect(line!(), 0, stream.len())?;

    for i in 0..100 {
        stream.push_back(Token::new(TokenKind::TkNum { val: i }, i as usize));
    }
    expect(line!(), 100, stream.len())?;
    expect(line!(), TokenKind::TkNum { val: 0 }, stream[0].kind)?;
    expect(line!(), TokenKind::TkNum { val: 50 }, stream[50].kind)?;
    expect(line!(), TokenKind::TkNum { val: 99 }, stream[99].kind)?;

    let stream = stream.finish(100);
    expect(line!(), 101, stream.len())?;
    expect(line!(), TokenKind::TkEof, stream[100].kind)?;

    // The cursor must stay on the sentinel no matter how often it is read.
    let eof_only = TokenStream::new().finish(0);
    let mut parser = Parser::new("", &eof_only);
    expect(line!(), 0, parser.program().map(|nodes| nodes.len()).unwrap_or(usize::MAX))?;
    expect(line!(), 0, parser.program().map(|nodes| nodes.len()).unwrap_or(usize::MAX))?;
    Ok(())
}
