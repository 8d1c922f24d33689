//! Expression evaluation against the scope and the environment.

use std::cmp::Ordering;

use thiserror::Error;

use super::parser::{BinaryOp, Expr, UnaryOp};
use super::value::Value;
use crate::environment::Environment;
use crate::error::CmdError;
use crate::interpreter::Scope;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("invalid expression at {offset}: {text}")]
    Lex { offset: usize, text: String },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token in expression: {0}")]
    Unexpected(String),

    #[error("trailing characters in expression: {0}")]
    Trailing(String),

    #[error("expected `{0}`")]
    Expected(&'static str),

    #[error("cannot assign to {0}")]
    BadTarget(String),

    #[error("undefined variable: {0}")]
    Undefined(String),

    #[error("expression nested too deeply")]
    TooDeep,
}

impl From<EvalError> for CmdError {
    fn from(e: EvalError) -> Self {
        CmdError::Expression(e.to_string())
    }
}

/// Evaluates expressions. Reads only; assignments are applied by `let`.
pub struct Evaluator<'a> {
    scope: &'a Scope,
    env: &'a dyn Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(scope: &'a Scope, env: &'a dyn Environment) -> Self {
        Self { scope, env }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Env(name) => Ok(Value::Str(self.env.get(name).unwrap_or_default())),
            Expr::Var(name) => self
                .scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::Undefined(name.clone())),
            Expr::Unary(op, operand) => {
                let v = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::from_bool(!v.is_truthy()),
                    UnaryOp::Neg => Value::Int(v.to_int().wrapping_neg()),
                    UnaryOp::Pos => Value::Int(v.to_int()),
                })
            }
            // Short-circuit: the right side is not evaluated at all.
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if self.eval(lhs)?.is_truthy() {
                    return Ok(Value::Int(1));
                }
                Ok(Value::from_bool(self.eval(rhs)?.is_truthy()))
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !self.eval(lhs)?.is_truthy() {
                    return Ok(Value::Int(0));
                }
                Ok(Value::from_bool(self.eval(rhs)?.is_truthy()))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                Ok(binary(*op, &l, &r))
            }
        }
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        BinaryOp::Add => Value::Int(l.to_int().wrapping_add(r.to_int())),
        BinaryOp::Sub => Value::Int(l.to_int().wrapping_sub(r.to_int())),
        BinaryOp::Concat => Value::Str(format!("{l}{r}")),
        BinaryOp::Eq => Value::from_bool(compare(l, r) == Ordering::Equal),
        BinaryOp::Ne => Value::from_bool(compare(l, r) != Ordering::Equal),
        BinaryOp::Lt => Value::from_bool(compare(l, r) == Ordering::Less),
        BinaryOp::Le => Value::from_bool(compare(l, r) != Ordering::Greater),
        BinaryOp::Gt => Value::from_bool(compare(l, r) == Ordering::Greater),
        BinaryOp::Ge => Value::from_bool(compare(l, r) != Ordering::Less),
        BinaryOp::Or => Value::from_bool(l.is_truthy() || r.is_truthy()),
        BinaryOp::And => Value::from_bool(l.is_truthy() && r.is_truthy()),
    }
}

fn compare(l: &Value, r: &Value) -> Ordering {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        _ => l.to_string().cmp(&r.to_string()),
    }
}
