//! excmd-kernel: the command-language engine of excmd.
//!
//! This crate provides:
//!
//! - **Parser**: a stateful byte scanner that splits a command line into
//!   `|`-chained sub-commands, resolves ranges, `!` and `&` markers, and
//!   splits arguments (no grammar generator involved)
//! - **Commands**: the registry of built-in and user-defined commands, the
//!   dispatcher that validates invocations, and the built-ins themselves
//! - **Interpreter**: nested scopes, conditional state and user-command
//!   execution
//! - **Expressions**: the small language of `echo`, `if` and `let`
//!
//! The [`Kernel`] ties them together behind a single "execute one line"
//! entry point.

pub mod commands;
pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod kernel;
pub mod launcher;
pub mod mappings;
pub mod parser;
pub mod paths;

pub use commands::{
    register_builtins, resolve, Command, CommandDescriptor, CommandFlags, ExecContext, Handler,
    InputType, Invocation, Registry, ViewState,
};
pub use environment::{Environment, MemoryEnv};
pub use error::{CmdError, Result};
pub use expr::Value;
pub use interpreter::{ExecResult, Scope, UserCommandDef};
pub use kernel::{Kernel, KernelConfig, ScriptFailure, ScriptOutcome};
pub use launcher::{Launched, ProcessLauncher, TokioLauncher};
pub use mappings::{Mapping, Mappings, Mode};
pub use parser::Range;
