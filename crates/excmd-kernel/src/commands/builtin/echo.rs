//! echo: evaluate expressions and print them.

use crate::commands::{Command, ExecContext, Invocation};
use crate::error::Result;
use crate::expr::{parse_list, Evaluator};
use crate::interpreter::ExecResult;

pub struct Echo;

impl Command for Echo {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let exprs = parse_list(&inv.args_text)?;
        let eval = Evaluator::new(ctx.scope, ctx.env);
        let mut parts = Vec::with_capacity(exprs.len());
        for expr in &exprs {
            parts.push(eval.eval(expr)?.to_string());
        }
        Ok(ExecResult::success(parts.join(" ")))
    }
}
