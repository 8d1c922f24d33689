//! Command registry, dispatch and the built-in commands.

pub mod builtin;
mod context;
mod dispatch;
mod registry;

pub use builtin::register_builtins;
pub use context::{ExecContext, InputType, ViewState};
pub use dispatch::{dispatch, validate, Invocation};
pub use registry::{resolve, Command, CommandDescriptor, CommandFlags, Handler, Registry};
