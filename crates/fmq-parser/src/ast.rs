//! AST types for parsed expressions.
//!
//! The AST is produced by [`crate::parse_expression`] and consumed by the
//! interpreter in `fmq-query`. One grammar serves both `where` conditions
//! and template placeholders.

use serde::{Deserialize, Serialize};

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// A bare name: a record field in conditions, a namespace in templates.
    Ident(String),
    /// `object.property`
    Member {
        object: Box<Expr>,
        property: String,
    },
    /// `object[index]`
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    /// The dotted name path of an identifier or a chain of member accesses,
    /// e.g. `["tp", "date", "now"]` for `tp.date.now`.
    ///
    /// Returns `None` when any link in the chain is not a plain name.
    #[must_use]
    pub fn name_path(&self) -> Option<Vec<&str>> {
        match self {
            Self::Ident(name) => Some(vec![name.as_str()]),
            Self::Member { object, property } => {
                let mut path = object.name_path()?;
                path.push(property.as_str());
                Some(path)
            }
            _ => None,
        }
    }
}

/// Literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    /// `null` or `undefined`
    Null,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!` or `not`
    Not,
    Neg,
    Plus,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}
