//! Statement tree consumed by the compiler.
//!
//! Nodes are allocated in a `bumpalo::Bump` arena by the parser and borrow
//! identifier and string text from the source. Every node carries the
//! [`Location`] diagnostics are reported at.

use core::fmt;
use core::ops::Range;

use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }

    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }

    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

/// Source position of a node: byte span plus 1-based line and column of its
/// first character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(span: Span, line: usize, column: usize) -> Self {
        Self { span, line, column }
    }

    /// Covers `self` through `end`, keeping `self`'s line and column.
    pub fn to(&self, end: &Location) -> Location {
        Location::new(Span::combine(&self.span, &end.span), self.line, self.column)
    }
}

impl From<pest::Span<'_>> for Location {
    fn from(s: pest::Span<'_>) -> Self {
        let (line, column) = s.start_pos().line_col();
        Self::new(s.into(), line, column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program<'a> {
    pub statements: &'a [Stmt<'a>],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<'a> {
    /// A lone `;`.
    Empty,
    Declaration {
        ty: Type,
        names: &'a [Ident<'a>],
    },
    /// Expression evaluated for its effect; its value is discarded.
    Expression(&'a Expr<'a>),
    Read(&'a [Ident<'a>]),
    Write(&'a [&'a Expr<'a>]),
    Block(&'a [Stmt<'a>]),
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    While {
        cond: &'a Expr<'a>,
        body: &'a Stmt<'a>,
    },
    DoWhile {
        body: &'a Stmt<'a>,
        cond: &'a Expr<'a>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident<'a> {
    pub name: &'a str,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'a> {
    Literal(Literal<'a>),
    Ident(&'a str),
    /// Parenthesized expression; kept so locations point at the parentheses.
    Grouping(&'a Expr<'a>),
    Unary {
        op: UnaryOp,
        expr: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Assign {
        target: Ident<'a>,
        value: &'a Expr<'a>,
    },
    Ternary {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    },
}

#[derive(Clone, PartialEq)]
pub enum Literal<'a> {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(&'a str),
}

impl fmt::Debug for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "Int({value})"),
            Literal::Float(value) => write!(f, "Float({value:?})"),
            Literal::Bool(b) => write!(f, "Bool({b})"),
            Literal::Str(s) => write!(f, "Str({s:?})"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Lt,
    Gt,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => ".",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
