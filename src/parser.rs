use std::fmt;

use tracing::debug;

use crate::tokenizer::{Token, TokenKind, TokenStream};
use crate::ParseError;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
        };
        write!(f, "{c}")
    }
}

#[derive(PartialEq, Debug)]
pub enum Node {
    BinOp {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    }, // + - * /
    Assign {
        lhs: Box<Node>,
        rhs: Box<Node>,
    }, // =
    Return {
        lhs: Box<Node>,
    }, // "return"
    Var {
        name: char,
    }, // Variable, one lowercase letter
    Num {
        val: i64,
    }, // Integer
}

type ParseResult = Result<Node, ParseError>;

impl Node {
    pub fn new_num(val: i64) -> Self {
        Node::Num { val }
    }

    pub fn new_var(name: char) -> Self {
        Node::Var { name }
    }

    pub fn new_binary(op: BinOp, lhs: Node, rhs: Node) -> Self {
        Node::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn new_assign(lhs: Node, rhs: Node) -> Self {
        Node::Assign {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Label printed for this node by [`Node::dump`].
    pub fn label(&self) -> String {
        match self {
            Node::BinOp { op, .. } => op.to_string(),
            Node::Assign { .. } => "=".to_string(),
            Node::Return { .. } => "return".to_string(),
            Node::Var { name } => name.to_string(),
            Node::Num { val } => val.to_string(),
        }
    }

    /// Appends one `# `-prefixed line per node, children before their parent,
    /// indented four spaces per level.
    pub fn dump(&self, level: usize, out: &mut String) {
        match self {
            Node::BinOp { lhs, rhs, .. } | Node::Assign { lhs, rhs } => {
                lhs.dump(level + 1, out);
                rhs.dump(level + 1, out);
            }
            Node::Return { lhs } => lhs.dump(level + 1, out),
            Node::Var { .. } | Node::Num { .. } => {}
        }
        out.push_str("# ");
        out.push_str(&" ".repeat(level * 4));
        out.push_str(&self.label());
        out.push('\n');
    }
}

/// Renders the node back as a fully parenthesised expression, used in
/// diagnostics.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::BinOp { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Node::Assign { lhs, rhs } => write!(f, "({lhs} = {rhs})"),
            Node::Return { lhs } => write!(f, "return {lhs}"),
            Node::Var { name } => write!(f, "{name}"),
            Node::Num { val } => write!(f, "{val}"),
        }
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, token_stream: &'a TokenStream) -> Self {
        Self {
            source,
            tokens: token_stream.tokens(),
            pos: 0,
        }
    }

    // Reading past the end yields the end-of-input sentinel.
    fn peek(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => *token,
            None => Token::new(TokenKind::TkEof, self.source.len()),
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::TkEof
    }

    fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind != kind {
            return false;
        }
        self.advance();
        true
    }

    fn rest(&self) -> (usize, String) {
        let loc = self.peek().loc.min(self.source.len());
        (loc, self.source.get(loc..).unwrap_or_default().to_string())
    }

    // program = stmt*
    pub fn program(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        while !self.at_eof() {
            nodes.push(self.stmt()?);
        }
        debug!(statements = nodes.len(), "parsed program");
        Ok(nodes)
    }

    // stmt = "return" expr ";"
    //      | expr ";"
    fn stmt(&mut self) -> ParseResult {
        let node = if self.consume(TokenKind::TkReturn) {
            Node::Return {
                lhs: Box::new(self.expr()?),
            }
        } else {
            self.expr()?
        };
        if !self.consume(TokenKind::TkSemi) {
            let (pos, rest) = self.rest();
            return Err(ParseError::MissingSemicolon { pos, rest });
        }
        Ok(node)
    }

    // expr = assign
    fn expr(&mut self) -> ParseResult {
        self.assign()
    }

    // assign = add ("=" assign)?
    // The left side is not checked here; code generation rejects anything
    // that is not a variable.
    fn assign(&mut self) -> ParseResult {
        let node = self.add()?;
        if self.consume(TokenKind::TkAssign) {
            return Ok(Node::new_assign(node, self.assign()?));
        }
        Ok(node)
    }

    // add = mul ("+" mul | "-" mul)*
    fn add(&mut self) -> ParseResult {
        let mut node = self.mul()?;
        loop {
            if self.consume(TokenKind::TkPlus) {
                node = Node::new_binary(BinOp::Add, node, self.mul()?);
            } else if self.consume(TokenKind::TkMinus) {
                node = Node::new_binary(BinOp::Sub, node, self.mul()?);
            } else {
                return Ok(node);
            }
        }
    }

    // mul = unary ("*" unary | "/" unary)*
    fn mul(&mut self) -> ParseResult {
        let mut node = self.unary()?;
        loop {
            if self.consume(TokenKind::TkStar) {
                node = Node::new_binary(BinOp::Mul, node, self.unary()?);
            } else if self.consume(TokenKind::TkSlash) {
                node = Node::new_binary(BinOp::Div, node, self.unary()?);
            } else {
                return Ok(node);
            }
        }
    }

    // unary = ("+" | "-")? primary
    fn unary(&mut self) -> ParseResult {
        if self.consume(TokenKind::TkPlus) {
            return self.primary();
        }
        if self.consume(TokenKind::TkMinus) {
            return Ok(Node::new_binary(BinOp::Sub, Node::new_num(0), self.primary()?));
        }
        self.primary()
    }

    // primary = "(" expr ")" | ident | num
    fn primary(&mut self) -> ParseResult {
        if self.consume(TokenKind::TkLParen) {
            let node = self.expr()?;
            if !self.consume(TokenKind::TkRParen) {
                let (pos, rest) = self.rest();
                return Err(ParseError::UnclosedParen { pos, rest });
            }
            return Ok(node);
        }
        match self.peek().kind {
            TokenKind::TkNum { val } => {
                self.advance();
                Ok(Node::new_num(val))
            }
            TokenKind::TkIdent { name } => {
                self.advance();
                Ok(Node::new_var(name))
            }
            _ => {
                let (pos, rest) = self.rest();
                Err(ParseError::UnexpectedToken { pos, rest })
            }
        }
    }
}
