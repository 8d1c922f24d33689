//! Running user-defined commands.
//!
//! A body starting with `:` is an engine command line and is re-parsed on
//! every invocation inside a fresh child frame. Any other body is handed
//! to the shell.

use tracing::debug;

use crate::commands::builtin::run_shell;
use crate::commands::{ExecContext, Invocation};
use crate::error::{CmdError, Result};
use crate::interpreter::ExecResult;
use crate::kernel::run_line;
use crate::parser::{split_segment, TailMode};

/// Substitute `%a` (the invocation's argument text) and `%%` in a body.
/// Unknown `%` sequences are kept as written.
pub fn expand_body(body: &str, args: &str) -> String {
    let mut out = String::with_capacity(body.len() + args.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('a') => {
                chars.next();
                out.push_str(args);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

pub fn run_user_command(
    name: &str,
    body: &str,
    inv: &Invocation,
    ctx: &mut ExecContext<'_>,
) -> Result<ExecResult> {
    if ctx.depth >= ctx.config.max_depth {
        return Err(CmdError::RecursionLimit(ctx.config.max_depth));
    }

    let expanded = expand_body(body, &inv.args_text);
    let trimmed = expanded.trim_start_matches([' ', '\t']);
    if trimmed.starts_with(':') {
        debug!(%name, depth = ctx.depth + 1, "entering user command");
        run_in_child_frame(trimmed, ctx)
    } else {
        let segment = split_segment(trimmed.as_bytes(), TailMode::Raw { detect_bg: true })?;
        let command = String::from_utf8_lossy(segment.body);
        run_shell(ctx, command.trim_end(), inv.bg || segment.bg)
    }
}

fn run_in_child_frame(line: &str, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
    ctx.scope.push_frame();
    ctx.depth += 1;
    let outcome = run_line(ctx, line.as_bytes());
    ctx.depth -= 1;
    let frame = ctx.scope.pop_frame();

    let result = outcome?;
    if frame.is_some_and(|f| !f.conditions().is_empty()) {
        return Err(CmdError::Control("missing :endif".into()));
    }
    Ok(result)
}
