//! if / elseif / else / endif / finish
//!
//! Conditions are evaluated only when they can matter. A condition that
//! fails to evaluate still opens (or moves within) its block, as a branch
//! that is not taken, so the matching `endif` stays balanced.

use crate::commands::{Command, ExecContext, InputType, Invocation};
use crate::error::{CmdError, Result};
use crate::expr::{parse_expression, Evaluator};
use crate::interpreter::ExecResult;

fn condition(inv: &Invocation, ctx: &ExecContext<'_>) -> Result<bool> {
    let expr = parse_expression(&inv.args_text)?;
    let value = Evaluator::new(ctx.scope, ctx.env).eval(&expr)?;
    Ok(value.is_truthy())
}

pub struct If;

impl Command for If {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        if !ctx.scope.conditions().is_active() {
            ctx.scope.conditions_mut().push_if(false);
            return Ok(ExecResult::success(""));
        }
        let cond = condition(inv, ctx);
        ctx.scope.conditions_mut().push_if(matches!(cond, Ok(true)));
        cond.map(|_| ExecResult::success(""))
    }
}

pub struct ElseIf;

impl Command for ElseIf {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        if !ctx.scope.conditions().needs_condition() {
            ctx.scope.conditions_mut().elseif(false)?;
            return Ok(ExecResult::success(""));
        }
        let cond = condition(inv, ctx);
        ctx.scope.conditions_mut().elseif(matches!(cond, Ok(true)))?;
        cond.map(|_| ExecResult::success(""))
    }
}

pub struct Else;

impl Command for Else {
    fn execute(&self, _inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        ctx.scope.conditions_mut().else_branch()?;
        Ok(ExecResult::success(""))
    }
}

pub struct EndIf;

impl Command for EndIf {
    fn execute(&self, _inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        ctx.scope.conditions_mut().endif()?;
        Ok(ExecResult::success(""))
    }
}

/// Stops the script or user-command body it appears in.
pub struct Finish;

impl Command for Finish {
    fn execute(&self, _inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        if ctx.input != InputType::Script && ctx.depth == 0 {
            return Err(CmdError::Control(":finish used outside of a script".into()));
        }
        ctx.scope.finish();
        Ok(ExecResult::success(""))
    }
}
