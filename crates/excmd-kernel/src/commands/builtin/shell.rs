//! `!cmd`: run a shell command.

use tracing::{debug, warn};

use crate::commands::{Command, ExecContext, Invocation};
use crate::error::{CmdError, Result};
use crate::interpreter::ExecResult;
use crate::launcher::Launched;

pub struct Shell;

impl Command for Shell {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        run_shell(ctx, inv.args_text.trim(), inv.bg)
    }
}

/// Run `command` through the configured shell.
pub fn run_shell(ctx: &mut ExecContext<'_>, command: &str, bg: bool) -> Result<ExecResult> {
    let argv = vec![
        ctx.config.shell.clone(),
        ctx.config.shell_flag.clone(),
        command.to_string(),
    ];
    debug!(%command, bg, "launching shell command");
    match ctx.launcher.spawn(&argv, bg) {
        Ok(Launched::Detached) | Ok(Launched::Finished(0)) => Ok(ExecResult::success("")),
        Ok(Launched::Finished(code)) => Ok(ExecResult::failure(
            i64::from(code),
            format!("shell returned {code}"),
        )),
        Err(e) => {
            warn!(program = %ctx.config.shell, error = %e, "shell launch failed");
            Err(CmdError::ShellLaunch {
                program: ctx.config.shell.clone(),
                reason: e.to_string(),
            })
        }
    }
}
