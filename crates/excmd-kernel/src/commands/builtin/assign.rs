//! let / unlet

use crate::commands::{Command, ExecContext, Invocation};
use crate::error::{CmdError, Result};
use crate::expr::{parse_assignment, AssignOp, EvalError, Evaluator, Target, Value};
use crate::interpreter::ExecResult;

pub struct Let;

impl Command for Let {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let assignment = parse_assignment(&inv.args_text)?;
        let rhs = Evaluator::new(ctx.scope, ctx.env).eval(&assignment.value)?;

        match &assignment.target {
            Target::Env(name) => {
                let current = ctx.env.get(name).map(Value::Str);
                let value = combine(assignment.op, current, rhs, name)?;
                ctx.env.set(name, &value.to_string());
            }
            Target::Var(name) => {
                let current = ctx.scope.get(name).cloned();
                let value = combine(assignment.op, current, rhs, name)?;
                ctx.scope.set(name.clone(), value);
            }
        }
        Ok(ExecResult::success(""))
    }
}

fn combine(op: AssignOp, current: Option<Value>, rhs: Value, name: &str) -> Result<Value> {
    if op == AssignOp::Set {
        return Ok(rhs);
    }
    let current = current.ok_or_else(|| EvalError::Undefined(name.to_string()))?;
    Ok(match op {
        AssignOp::Set => rhs,
        AssignOp::Append => Value::Str(format!("{current}{rhs}")),
        AssignOp::Add => Value::Int(current.to_int().wrapping_add(rhs.to_int())),
        AssignOp::Sub => Value::Int(current.to_int().wrapping_sub(rhs.to_int())),
    })
}

/// `unlet[!] name...`: `$NAME` removes an environment variable.
pub struct Unlet;

impl Command for Unlet {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let mut missing = Vec::new();
        for arg in &inv.argv {
            match arg.strip_prefix('$') {
                Some(name) => {
                    if ctx.env.get(name).is_none() {
                        missing.push(arg.as_str());
                    }
                    ctx.env.remove(name);
                }
                None => {
                    if !ctx.scope.unset(arg) {
                        missing.push(arg.as_str());
                    }
                }
            }
        }
        if !missing.is_empty() && !inv.emark {
            return Err(CmdError::Expression(format!(
                "no such variable: {}",
                missing.join(", ")
            )));
        }
        Ok(ExecResult::success(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_ops_need_existing_value() {
        assert_eq!(
            combine(AssignOp::Add, None, Value::Int(1), "n"),
            Err(CmdError::Expression("undefined variable: n".into()))
        );
        assert_eq!(
            combine(AssignOp::Append, Some(Value::from("a")), Value::Int(1), "s").unwrap(),
            Value::from("a1")
        );
        assert_eq!(
            combine(AssignOp::Sub, Some(Value::from("5")), Value::Int(2), "n").unwrap(),
            Value::Int(3)
        );
    }
}
