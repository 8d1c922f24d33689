//! Execution context threaded through parsing and dispatch.

use crate::environment::Environment;
use crate::interpreter::Scope;
use crate::kernel::KernelConfig;
use crate::launcher::ProcessLauncher;
use crate::mappings::Mappings;

use super::registry::Registry;

/// The part of the host's current view that commands may look at or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// 0-based cursor line.
    pub cursor: usize,
    /// Number of lines in the view.
    pub len: usize,
    /// Directory shown by the view.
    pub cwd: String,
    /// Directory before the last `cd`, for `cd -`.
    pub prev_cwd: Option<String>,
}

impl ViewState {
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            len: 0,
            cwd: cwd.into(),
            prev_cwd: None,
        }
    }

    pub fn with_lines(mut self, len: usize) -> Self {
        self.len = len;
        self
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Where a command line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Typed by the user.
    Command,
    /// Read from a script or configuration file.
    Script,
}

/// Everything a command may touch while it runs.
pub struct ExecContext<'a> {
    pub view: &'a mut ViewState,
    pub scope: &'a mut Scope,
    pub env: &'a mut dyn Environment,
    pub launcher: &'a dyn ProcessLauncher,
    pub mappings: &'a mut Mappings,
    pub builtins: &'a Registry,
    pub config: &'a KernelConfig,
    pub input: InputType,
    /// User-command nesting level; 0 at top level.
    pub depth: usize,
}

impl ExecContext<'_> {
    /// Registries to resolve command names against, innermost first.
    pub fn command_chain(&self) -> Vec<&Registry> {
        let mut chain = self.scope.command_chain();
        chain.push(self.builtins);
        chain
    }
}
