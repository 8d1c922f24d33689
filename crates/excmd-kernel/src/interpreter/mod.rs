//! Execution state of the engine.
//!
//! - [`Scope`]: nested frames of user commands, variables and conditional
//!   state
//! - [`CondStack`]: `if`/`elseif`/`else`/`endif` bookkeeping
//! - [`ExecResult`]: what commands hand back
//! - user-command bodies re-entering the engine in a child frame

mod control_flow;
mod result;
mod scope;
pub(crate) mod user_command;

pub use control_flow::CondStack;
pub use result::ExecResult;
pub use scope::{Frame, Scope, UserCommandDef};
