use lachs::Span;

use super::statement::{Block, Param};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Ident(Ident),
    Integer(IntegerLit),
    String(StringLit),
    Boolean(BooleanLit),
    Binary(BinaryOp),
    Unary(UnaryOp),
    Call(Call),
    Lambda(Lambda),
    /// `$x` — only meaningful inside a `macro` template body.
    PatternVar(PatternVar),
}

impl Expression {
    pub fn position(&self) -> Span {
        match self {
            Expression::Ident(e) => e.position.clone(),
            Expression::Integer(e) => e.position.clone(),
            Expression::String(e) => e.position.clone(),
            Expression::Boolean(e) => e.position.clone(),
            Expression::Binary(e) => e.position.clone(),
            Expression::Unary(e) => e.position.clone(),
            Expression::Call(e) => e.position.clone(),
            Expression::Lambda(e) => e.position.clone(),
            Expression::PatternVar(e) => e.position.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLit {
    pub value: i64,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub value: String,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLit {
    pub value: bool,
    pub position: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
    Assign,
}

impl BinOpKind {
    /// The operator symbol, which becomes the `call` node name.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Rem => "%",
            BinOpKind::Lt => "<",
            BinOpKind::Gt => ">",
            BinOpKind::LtEq => "<=",
            BinOpKind::GtEq => ">=",
            BinOpKind::Eq => "==",
            BinOpKind::NotEq => "!=",
            BinOpKind::And => "&&",
            BinOpKind::Or => "||",
            BinOpKind::Assign => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Not,
    Neg,
}

impl UnaryOpKind {
    /// The `call` node name: the symbol with the `unary_` prefix that keeps
    /// unary `-` distinct from binary `-`.
    pub fn call_name(&self) -> &'static str {
        match self {
            UnaryOpKind::Not => "unary_!",
            UnaryOpKind::Neg => "unary_-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub op: BinOpKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: UnaryOpKind,
    pub operand: Box<Expression>,
    pub position: Span,
}

/// A call always names its callee directly; there is no surface syntax for
/// calling the result of an arbitrary expression. The optional trailing
/// brace block is the block-argument form `f(a, b) { … }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: Ident,
    pub args: Vec<Expression>,
    pub block: Option<Block>,
    pub position: Span,
}

/// `(p1, p2) -> { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: Block,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternVar {
    pub name: String,
    pub position: Span,
}
