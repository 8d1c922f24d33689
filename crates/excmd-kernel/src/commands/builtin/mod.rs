//! Built-in commands.
//!
//! These are always available. Hosts add their own through
//! [`crate::Kernel::register`].

mod assign;
mod cd;
mod conditional;
mod echo;
mod mapping;
mod shell;
mod usercmd;

pub use shell::run_shell;

use super::registry::{CommandDescriptor, CommandFlags, Registry};
use crate::error::Result;
use crate::mappings::Mode;

/// Ids of the built-in commands.
pub mod ids {
    pub const ECHO: i32 = 1;
    pub const LET: i32 = 2;
    pub const UNLET: i32 = 3;
    pub const IF: i32 = 4;
    pub const ELSEIF: i32 = 5;
    pub const ELSE: i32 = 6;
    pub const ENDIF: i32 = 7;
    pub const FINISH: i32 = 8;
    pub const COMMAND: i32 = 9;
    pub const DELCOMMAND: i32 = 10;
    pub const COMCLEAR: i32 = 11;
    pub const SHELL: i32 = 12;
    pub const CD: i32 = 13;
    pub const MAP: i32 = 14;
    pub const UNMAP: i32 = 15;
    pub const ABBREV: i32 = 16;
    pub const UNABBREV: i32 = 17;
}

const BOTH_MODES: &[Mode] = &[Mode::Normal, Mode::Visual];
const NORMAL_MODE: &[Mode] = &[Mode::Normal];

/// Register all built-in commands with the registry.
pub fn register_builtins(registry: &mut Registry) -> Result<()> {
    use CommandFlags as F;

    let expr = F::EXPR | F::QUOTES;
    let control = expr | F::CONTROL;

    let builtins = [
        CommandDescriptor::builtin("echo", echo::Echo)
            .abbr("ec")
            .id(ids::ECHO)
            .description("evaluate expressions and print them")
            .flags(expr),
        CommandDescriptor::builtin("let", assign::Let)
            .id(ids::LET)
            .description("assign a variable")
            .flags(expr)
            .args(1, Some(1)),
        CommandDescriptor::builtin("unlet", assign::Unlet)
            .abbr("unl")
            .id(ids::UNLET)
            .description("remove variables")
            .flags(F::EMARK)
            .args(1, None),
        CommandDescriptor::builtin("if", conditional::If)
            .id(ids::IF)
            .description("start a conditional block")
            .flags(control)
            .args(1, Some(1)),
        CommandDescriptor::builtin("elseif", conditional::ElseIf)
            .abbr("elsei")
            .id(ids::ELSEIF)
            .description("alternative condition")
            .flags(control)
            .args(1, Some(1)),
        CommandDescriptor::builtin("else", conditional::Else)
            .abbr("el")
            .id(ids::ELSE)
            .description("fallback branch")
            .flags(F::CONTROL)
            .args(0, Some(0)),
        CommandDescriptor::builtin("endif", conditional::EndIf)
            .abbr("en")
            .id(ids::ENDIF)
            .description("end a conditional block")
            .flags(F::CONTROL)
            .args(0, Some(0)),
        CommandDescriptor::builtin("finish", conditional::Finish)
            .abbr("fini")
            .id(ids::FINISH)
            .description("stop running the current script")
            .args(0, Some(0)),
        CommandDescriptor::builtin("command", usercmd::DefineCommand)
            .abbr("com")
            .id(ids::COMMAND)
            .description("list, show or define user commands")
            .flags(F::RAW | F::EMARK),
        CommandDescriptor::builtin("delcommand", usercmd::DeleteCommand)
            .abbr("delc")
            .id(ids::DELCOMMAND)
            .description("remove a user command")
            .args(1, Some(1)),
        CommandDescriptor::builtin("comclear", usercmd::ClearCommands)
            .abbr("comc")
            .id(ids::COMCLEAR)
            .description("remove all user commands")
            .args(0, Some(0)),
        CommandDescriptor::builtin("!", shell::Shell)
            .id(ids::SHELL)
            .description("run a shell command")
            .flags(F::RAW | F::BG)
            .args(1, Some(1)),
        CommandDescriptor::builtin("cd", cd::Cd)
            .id(ids::CD)
            .description("change the view's directory")
            .flags(F::QUOTES | F::EXPAND_ENV)
            .args(0, Some(1)),
        CommandDescriptor::builtin("map", mapping::Map::new(BOTH_MODES, false))
            .id(ids::MAP)
            .description("map keys in normal and visual modes"),
        CommandDescriptor::builtin("nmap", mapping::Map::new(NORMAL_MODE, false))
            .abbr("nm")
            .id(ids::MAP)
            .description("map keys in normal mode"),
        CommandDescriptor::builtin("noremap", mapping::Map::new(BOTH_MODES, true))
            .abbr("no")
            .id(ids::MAP)
            .description("map keys without remapping"),
        CommandDescriptor::builtin("nnoremap", mapping::Map::new(NORMAL_MODE, true))
            .abbr("nn")
            .id(ids::MAP)
            .description("map keys in normal mode without remapping"),
        CommandDescriptor::builtin("unmap", mapping::Unmap::new(BOTH_MODES))
            .abbr("unm")
            .id(ids::UNMAP)
            .description("remove a mapping")
            .args(1, Some(1)),
        CommandDescriptor::builtin("nunmap", mapping::Unmap::new(NORMAL_MODE))
            .abbr("nun")
            .id(ids::UNMAP)
            .description("remove a normal mode mapping")
            .args(1, Some(1)),
        CommandDescriptor::builtin("cabbrev", mapping::Abbrev::new(false))
            .abbr("ca")
            .id(ids::ABBREV)
            .description("define or list command-line abbreviations"),
        CommandDescriptor::builtin("cnoreabbrev", mapping::Abbrev::new(true))
            .abbr("cnorea")
            .id(ids::ABBREV)
            .description("define a non-recursive abbreviation"),
        CommandDescriptor::builtin("cunabbrev", mapping::Unabbrev)
            .abbr("cuna")
            .id(ids::UNABBREV)
            .description("remove command-line abbreviations")
            .args(1, None),
    ];

    for desc in builtins {
        registry.register(desc)?;
    }
    Ok(())
}
