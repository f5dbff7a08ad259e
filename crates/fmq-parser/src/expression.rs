//! Expression parsing: pest grammar plus a Pratt pass for precedence.

use std::sync::LazyLock;

use fmq_core::EvalError;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;

use crate::ast::{BinaryOp, Expr, Literal, UnaryOp};

#[derive(pest_derive::Parser)]
#[grammar = "expr.pest"]
struct ExprParser;

/// Operator table, loosest binding first.
static PRATT: LazyLock<PrattParser<Rule>> = LazyLock::new(|| {
    PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::eq, Assoc::Left)
            | Op::infix(Rule::ne, Assoc::Left)
            | Op::infix(Rule::strict_eq, Assoc::Left)
            | Op::infix(Rule::strict_ne, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::rem, Assoc::Left))
        .op(Op::prefix(Rule::not) | Op::prefix(Rule::neg) | Op::prefix(Rule::plus))
        .op(Op::postfix(Rule::call) | Op::postfix(Rule::member) | Op::postfix(Rule::index))
});

/// Parse an expression string into an [`Expr`].
///
/// # Errors
///
/// Returns [`EvalError::Syntax`] if the text is not a single well-formed
/// expression.
pub fn parse_expression(source: &str) -> Result<Expr, EvalError> {
    let mut pairs = ExprParser::parse(Rule::expression, source).map_err(syntax_error)?;

    // expression = { SOI ~ expr ~ EOI }
    let expr = pairs
        .next()
        .and_then(|expression| expression.into_inner().next())
        .ok_or_else(|| EvalError::Syntax("empty expression".to_string()))?;

    Ok(build(expr.into_inner()))
}

fn syntax_error(err: pest::error::Error<Rule>) -> EvalError {
    let (line, col) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    EvalError::Syntax(format!("{} at {line}:{col}", err.variant.message()))
}

fn build(pairs: Pairs<'_, Rule>) -> Expr {
    PRATT
        .map_primary(primary)
        .map_prefix(|op, operand| {
            let op = match op.as_rule() {
                Rule::not => UnaryOp::Not,
                Rule::neg => UnaryOp::Neg,
                _ => UnaryOp::Plus,
            };
            Expr::Unary {
                op,
                operand: Box::new(operand),
            }
        })
        .map_postfix(|object, op| match op.as_rule() {
            Rule::call => Expr::Call {
                callee: Box::new(object),
                args: op.into_inner().map(|arg| build(arg.into_inner())).collect(),
            },
            Rule::member => Expr::Member {
                object: Box::new(object),
                property: op
                    .into_inner()
                    .next()
                    .map(|name| name.as_str().to_string())
                    .unwrap_or_default(),
            },
            _ => Expr::Index {
                object: Box::new(object),
                index: Box::new(
                    op.into_inner()
                        .next()
                        .map_or(Expr::Literal(Literal::Null), |inner| build(inner.into_inner())),
                ),
            },
        })
        .map_infix(|left, op, right| Expr::Binary {
            op: binary_op(op.as_rule()),
            left: Box::new(left),
            right: Box::new(right),
        })
        .parse(pairs)
}

fn primary(pair: Pair<'_, Rule>) -> Expr {
    match pair.as_rule() {
        Rule::number => Expr::Literal(Literal::Number(
            pair.as_str().parse().unwrap_or(f64::NAN),
        )),
        Rule::string => Expr::Literal(Literal::String(unquote(pair.as_str()))),
        Rule::boolean => Expr::Literal(Literal::Boolean(pair.as_str() == "true")),
        Rule::null => Expr::Literal(Literal::Null),
        Rule::ident => Expr::Ident(pair.as_str().to_string()),
        // parenthesized sub-expression
        _ => build(pair.into_inner()),
    }
}

fn binary_op(rule: Rule) -> BinaryOp {
    match rule {
        Rule::or => BinaryOp::Or,
        Rule::and => BinaryOp::And,
        Rule::eq => BinaryOp::Eq,
        Rule::ne => BinaryOp::Ne,
        Rule::strict_eq => BinaryOp::StrictEq,
        Rule::strict_ne => BinaryOp::StrictNe,
        Rule::lt => BinaryOp::Lt,
        Rule::le => BinaryOp::Le,
        Rule::gt => BinaryOp::Gt,
        Rule::ge => BinaryOp::Ge,
        Rule::add => BinaryOp::Add,
        Rule::sub => BinaryOp::Sub,
        Rule::mul => BinaryOp::Mul,
        Rule::div => BinaryOp::Div,
        _ => BinaryOp::Rem,
    }
}

/// Strip the surrounding quotes of a string literal and resolve escapes.
fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
