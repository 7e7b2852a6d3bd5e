//! Helpers shared by the integration tests: run the compiler binary and
//! execute its output on a small interpreter for the instructions it emits.

#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{Command, Output};

use anyhow::{anyhow, bail, Context, Result};

pub fn stackcc(args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_stackcc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .context("running stackcc")
}

/// Compiles `source` and returns the assembly (AST dump lines included).
pub fn compile(source: &str) -> Result<String> {
    let output = stackcc(&[source])?;
    if !output.status.success() {
        bail!(
            "compiling {source:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Compiles and executes `source`, returning the final value of `rax`.
pub fn run(source: &str) -> Result<i64> {
    Machine::new().execute(&compile(source)?)
}

const STACK_TOP: i64 = 0x10_0000;
const RETURN_ADDRESS: i64 = -1;

#[derive(Default)]
struct Machine {
    regs: HashMap<String, i64>,
    memory: HashMap<i64, i64>,
}

enum Operand {
    Reg(String),
    Mem(String),
    Imm(i64),
}

impl Machine {
    fn new() -> Self {
        let mut machine = Self::default();
        machine.regs.insert("rsp".to_string(), STACK_TOP);
        machine.push(RETURN_ADDRESS);
        machine
    }

    fn reg(&self, name: &str) -> i64 {
        self.regs.get(name).copied().unwrap_or(0)
    }

    fn push(&mut self, value: i64) {
        let rsp = self.reg("rsp") - 8;
        self.regs.insert("rsp".to_string(), rsp);
        self.memory.insert(rsp, value);
    }

    fn pop(&mut self) -> i64 {
        let rsp = self.reg("rsp");
        self.regs.insert("rsp".to_string(), rsp + 8);
        self.memory.get(&rsp).copied().unwrap_or(0)
    }

    fn operand(text: &str) -> Result<Operand> {
        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            return Ok(Operand::Mem(inner.to_string()));
        }
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Operand::Imm(value));
        }
        if text.chars().all(|c| c.is_ascii_lowercase()) {
            return Ok(Operand::Reg(text.to_string()));
        }
        Err(anyhow!("unknown operand {text:?}"))
    }

    fn read(&self, operand: &Operand) -> i64 {
        match operand {
            Operand::Reg(r) => self.reg(r),
            Operand::Mem(r) => self.memory.get(&self.reg(r)).copied().unwrap_or(0),
            Operand::Imm(v) => *v,
        }
    }

    fn write(&mut self, operand: &Operand, value: i64) -> Result<()> {
        match operand {
            Operand::Reg(r) => {
                self.regs.insert(r.clone(), value);
            }
            Operand::Mem(r) => {
                let address = self.reg(r);
                self.memory.insert(address, value);
            }
            Operand::Imm(_) => bail!("cannot write to an immediate"),
        }
        Ok(())
    }

    fn execute(mut self, asm: &str) -> Result<i64> {
        for line in asm.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('.') || line.ends_with(':') {
                continue;
            }
            let (mnemonic, rest) = line.split_once(' ').unwrap_or((line, ""));
            let operands = rest
                .split(", ")
                .filter(|s| !s.is_empty())
                .map(Self::operand)
                .collect::<Result<Vec<_>>>()?;
            match (mnemonic, operands.as_slice()) {
                ("push", [src]) => {
                    let value = self.read(src);
                    self.push(value);
                }
                ("pop", [dst]) => {
                    let value = self.pop();
                    self.write(dst, value)?;
                }
                ("mov", [dst, src]) => {
                    let value = self.read(src);
                    self.write(dst, value)?;
                }
                ("add", [dst, src]) => {
                    let value = self.read(dst).wrapping_add(self.read(src));
                    self.write(dst, value)?;
                }
                ("sub", [dst, src]) => {
                    let value = self.read(dst).wrapping_sub(self.read(src));
                    self.write(dst, value)?;
                }
                ("imul", [dst, src]) => {
                    let value = self.read(dst).wrapping_mul(self.read(src));
                    self.write(dst, value)?;
                }
                ("cqo", []) => {}
                ("idiv", [src]) => {
                    let divisor = self.read(src);
                    if divisor == 0 {
                        bail!("division by zero");
                    }
                    let rax = self.reg("rax");
                    self.regs.insert("rax".to_string(), rax / divisor);
                    self.regs.insert("rdx".to_string(), rax % divisor);
                }
                ("ret", []) => {
                    let address = self.pop();
                    if address != RETURN_ADDRESS {
                        bail!("returned to {address:#x}");
                    }
                    return Ok(self.reg("rax"));
                }
                _ => bail!("unsupported instruction {line:?}"),
            }
        }
        bail!("fell off the end of main")
    }
}
