mod code_generator;
mod errors;
mod parser;
mod selftest;
mod tokenizer;

pub use code_generator::{var_offset, CodeGenerator, FRAME_SIZE, SLOT_COUNT, SLOT_SIZE};
pub use errors::{CodegenError, CompileError, LexError, ParseError};
pub use parser::{BinOp, Node, Parser};
pub use selftest::{run_self_test, SelfTestError};
pub use tokenizer::{Token, TokenKind, TokenStream};

/// Everything a successful compilation prints, in output order.
#[derive(Debug)]
pub struct Output {
    pub ast_dump: String,
    pub asm: String,
}

/// Runs the whole pipeline, stopping at the first error.
pub fn compile(source: &str) -> Result<Output, CompileError> {
    let tokens = TokenStream::tokenizer(source)?;
    let nodes = Parser::new(source, &tokens).program()?;
    let asm = CodeGenerator::new().generate(&nodes)?;

    let mut ast_dump = String::new();
    for node in &nodes {
        node.dump(0, &mut ast_dump);
    }
    Ok(Output { ast_dump, asm })
}
