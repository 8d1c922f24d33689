//! command / delcommand / comclear
//!
//! ```text
//! command                 list user commands
//! command name            show one
//! command[!] name body    define (`!` replaces an existing one)
//! ```

use tracing::info;

use crate::commands::{resolve, Command, CommandDescriptor, ExecContext, Invocation};
use crate::error::{CmdError, Result};
use crate::interpreter::ExecResult;
use crate::parser::is_blank;

pub struct DefineCommand;

impl Command for DefineCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let text = inv.args_text.trim_start_matches([' ', '\t']);
        if text.is_empty() {
            return Ok(ExecResult::success(list(ctx, "")));
        }

        let name_end = text.bytes().position(is_blank).unwrap_or(text.len());
        let (name, body) = text.split_at(name_end);
        let body = body.trim_start_matches([' ', '\t']);

        if body.is_empty() {
            let listing = list(ctx, name);
            if listing.is_empty() {
                return Ok(ExecResult::failure(1, format!("no such user command: {name}")));
            }
            return Ok(ExecResult::success(listing));
        }

        if !is_valid_name(name) {
            return Ok(ExecResult::failure(
                1,
                format!("invalid command name: {name}"),
            ));
        }
        if ctx.builtins.contains(name) {
            return Err(CmdError::DuplicateName(name.to_string()));
        }

        ctx.scope
            .define_command(CommandDescriptor::user(name, body), inv.emark)?;
        info!(%name, %body, replace = inv.emark, "defined user command");
        Ok(ExecResult::success(""))
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// One line per user command starting with `prefix`.
fn list(ctx: &ExecContext<'_>, prefix: &str) -> String {
    ctx.scope
        .user_commands()
        .iter()
        .filter(|def| def.name.starts_with(prefix))
        .map(|def| format!("{:<10} {}", def.name, def.body))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct DeleteCommand;

impl Command for DeleteCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let Some(name) = inv.argv.first() else {
            return Ok(ExecResult::failure(1, "delcommand: argument required"));
        };
        // Abbreviated names are accepted. Only the current frame's user
        // commands can be removed.
        let target = match resolve(&[ctx.scope.local_commands()], name) {
            Ok(desc) => desc.name.clone(),
            Err(CmdError::NoSuchCommand(_)) => {
                return Ok(ExecResult::failure(1, format!("no such user command: {name}")));
            }
            Err(e) => return Err(e),
        };
        if !ctx.scope.delete_command(&target) {
            return Ok(ExecResult::failure(1, format!("no such user command: {name}")));
        }
        info!(name = %target, "deleted user command");
        Ok(ExecResult::success(""))
    }
}

pub struct ClearCommands;

impl Command for ClearCommands {
    fn execute(&self, _inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        ctx.scope.clear_commands();
        info!("cleared user commands");
        Ok(ExecResult::success(""))
    }
}
