use thiserror::Error;

/// Raised by the tokenizer on the first character it cannot classify.
#[derive(Debug, Error, PartialEq)]
pub enum LexError {
    #[error("cannot tokenize at {pos}: {rest}")]
    UnexpectedChar { pos: usize, rest: String },
    #[error("number out of range at {pos}: {rest}")]
    NumberOutOfRange { pos: usize, rest: String },
}

/// Structural errors found while building the syntax tree.
///
/// `pos` is the byte offset of the offending token, `rest` the source text
/// from that token onwards.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("missing closing parenthesis at {pos}: {rest}")]
    UnclosedParen { pos: usize, rest: String },
    #[error("expected a number, a variable or '(' at {pos}: {rest}")]
    UnexpectedToken { pos: usize, rest: String },
    #[error("expected ';' at {pos}: {rest}")]
    MissingSemicolon { pos: usize, rest: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CodegenError {
    #[error("left side of assignment is not a variable: {node}")]
    NotAnLvalue { node: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
