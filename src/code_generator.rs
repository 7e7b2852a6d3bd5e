use tracing::{debug, warn};

use crate::{BinOp, CodegenError, Node};

/// Size of one variable slot in bytes.
pub const SLOT_SIZE: usize = 8;
/// One slot per lowercase letter.
pub const SLOT_COUNT: usize = 26;
/// Every frame reserves all slots, used or not.
pub const FRAME_SIZE: usize = SLOT_SIZE * SLOT_COUNT;

/// Offset of `name`'s slot below `rbp`: `z` sits at 8, `a` at 208.
pub fn var_offset(name: char) -> usize {
    debug_assert!(name.is_ascii_lowercase());
    (('z' as usize) - (name as usize) + 1) * SLOT_SIZE
}

type GenResult = Result<(), CodegenError>;

#[derive(Default)]
pub struct CodeGenerator {
    out: String,
    returned: bool,
}

impl CodeGenerator {
    pub fn new() -> CodeGenerator {
        Self::default()
    }

    fn emit(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    /// Emits `main` for the whole program. The value of the last statement
    /// executed ends up in `rax` and becomes the exit status.
    pub fn generate(mut self, nodes: &[Node]) -> Result<String, CodegenError> {
        self.emit(".intel_syntax noprefix");
        self.emit(".global main");
        self.emit("main:");

        self.emit("  push rbp");
        self.emit("  mov rbp, rsp");
        self.emit(&format!("  sub rsp, {FRAME_SIZE}"));
        debug!(frame_size = FRAME_SIZE, statements = nodes.len(), "generating main");

        for (i, node) in nodes.iter().enumerate() {
            if self.returned {
                // Still emitted, never executed.
                warn!(statement = i, "code after return is unreachable");
            }
            self.generate_stmt(node)?;
        }

        self.epilogue();
        Ok(self.out)
    }

    fn epilogue(&mut self) {
        self.emit("  mov rsp, rbp");
        self.emit("  pop rbp");
        self.emit("  ret");
    }

    fn generate_stmt(&mut self, node: &Node) -> GenResult {
        if let Node::Return { lhs } = node {
            self.generate_single_node(lhs)?;
            self.emit("  pop rax");
            self.epilogue();
            self.returned = true;
            return Ok(());
        }
        self.generate_single_node(node)?;
        self.emit("  pop rax");
        Ok(())
    }

    // Pushes the address of a variable slot.
    fn generate_lvalue(&mut self, node: &Node) -> GenResult {
        let Node::Var { name } = node else {
            return Err(CodegenError::NotAnLvalue {
                node: node.to_string(),
            });
        };
        self.emit("  mov rax, rbp");
        self.emit(&format!("  sub rax, {}", var_offset(*name)));
        self.emit("  push rax");
        Ok(())
    }

    fn generate_single_node(&mut self, node: &Node) -> GenResult {
        match node {
            Node::Num { val } => {
                // push only takes a sign-extended 32-bit immediate.
                if i32::try_from(*val).is_ok() {
                    self.emit(&format!("  push {val}"));
                } else {
                    self.emit(&format!("  mov rax, {val}"));
                    self.emit("  push rax");
                }
            }
            Node::Var { .. } => {
                self.generate_lvalue(node)?;
                self.emit("  pop rax");
                self.emit("  mov rax, [rax]");
                self.emit("  push rax");
            }
            Node::Assign { lhs, rhs } => {
                self.generate_lvalue(lhs)?;
                self.generate_single_node(rhs)?;
                self.emit("  pop rdi");
                self.emit("  pop rax");
                self.emit("  mov [rax], rdi");
                self.emit("  push rdi");
            }
            Node::Return { lhs } => {
                // Only reachable when nested, which the parser never produces.
                self.generate_single_node(lhs)?;
            }
            Node::BinOp { op, lhs, rhs } => {
                self.generate_single_node(lhs)?;
                self.generate_single_node(rhs)?;
                self.emit("  pop rdi");
                self.emit("  pop rax");
                match op {
                    BinOp::Add => self.emit("  add rax, rdi"),
                    BinOp::Sub => self.emit("  sub rax, rdi"),
                    BinOp::Mul => self.emit("  imul rax, rdi"),
                    BinOp::Div => {
                        self.emit("  cqo");
                        self.emit("  idiv rdi");
                    }
                }
                self.emit("  push rax");
            }
        }
        Ok(())
    }
}
