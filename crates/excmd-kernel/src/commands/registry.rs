//! Command descriptors and name resolution.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use super::context::ExecContext;
use super::dispatch::Invocation;
use crate::error::{CmdError, Result};
use crate::interpreter::ExecResult;
use crate::parser::TailMode;

bitflags! {
    /// What a command accepts and how its tail is scanned.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u32 {
        /// Accepts a `!` after the name.
        const EMARK = 1 << 0;
        /// Accepts a trailing `&`.
        const BG = 1 << 1;
        /// Accepts a line range.
        const RANGE = 1 << 2;
        /// Arguments form an expression; `||` and `&&` are operators.
        const EXPR = 1 << 3;
        /// Takes the rest of the line verbatim.
        const RAW = 1 << 4;
        /// Argument splitting honours quotes.
        const QUOTES = 1 << 5;
        /// Runs even inside an inactive conditional branch.
        const CONTROL = 1 << 6;
        /// `$NAME` in arguments is expanded.
        const EXPAND_ENV = 1 << 7;
    }
}

impl CommandFlags {
    /// Separator rules for a command with these flags.
    pub fn tail_mode(self) -> TailMode {
        if self.contains(Self::RAW) {
            TailMode::Raw {
                detect_bg: self.contains(Self::BG),
            }
        } else if self.contains(Self::EXPR) {
            TailMode::Expression
        } else if self.contains(Self::QUOTES) {
            TailMode::Quoted
        } else {
            TailMode::Plain
        }
    }
}

/// A command implementation.
pub trait Command: Send + Sync {
    /// Run the command. Ordinary failures are an `ExecResult` with a
    /// non-zero code; engine failures are errors.
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult>;
}

/// What runs when a descriptor is dispatched.
#[derive(Clone)]
pub enum Handler {
    Builtin(Arc<dyn Command>),
    /// Stored command-line text of a user-defined command.
    User(String),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Builtin(_) => f.write_str("Builtin(..)"),
            Handler::User(body) => f.debug_tuple("User").field(body).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub abbr: Option<String>,
    pub id: i32,
    pub description: String,
    pub flags: CommandFlags,
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
    pub handler: Handler,
}

impl CommandDescriptor {
    /// Id of commands that need no identity of their own.
    pub const GENERIC: i32 = -1;

    /// A built-in with no flags taking any number of arguments.
    pub fn builtin(name: &str, command: impl Command + 'static) -> Self {
        Self {
            name: name.to_string(),
            abbr: None,
            id: Self::GENERIC,
            description: String::new(),
            flags: CommandFlags::empty(),
            min_args: 0,
            max_args: None,
            handler: Handler::Builtin(Arc::new(command)),
        }
    }

    /// A user-defined command with the given body.
    pub fn user(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            abbr: None,
            id: Self::GENERIC,
            description: body.to_string(),
            flags: CommandFlags::BG,
            min_args: 0,
            max_args: None,
            handler: Handler::User(body.to_string()),
        }
    }

    pub fn abbr(mut self, abbr: &str) -> Self {
        self.abbr = Some(abbr.to_string());
        self
    }

    pub fn id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn args(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }

    pub fn is_user(&self) -> bool {
        matches!(self.handler, Handler::User(_))
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args && self.max_args.is_none_or(|max| argc <= max)
    }

    /// Human-readable arity, as used in error messages.
    pub fn expected_args(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("{}..", self.min_args),
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.abbr.as_deref())
    }
}

/// Insertion-ordered command table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Arc<CommandDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. Its name and abbreviation must not collide with any
    /// existing name or abbreviation.
    pub fn register(&mut self, desc: CommandDescriptor) -> Result<()> {
        for existing in &self.entries {
            if let Some(clash) = desc.names().find(|n| existing.names().any(|e| e == *n)) {
                return Err(CmdError::DuplicateName(clash.to_string()));
            }
        }
        self.entries.push(Arc::new(desc));
        Ok(())
    }

    /// Replace the command of the same name in place, or append it.
    pub fn replace(&mut self, desc: CommandDescriptor) {
        let desc = Arc::new(desc);
        match self.entries.iter_mut().find(|e| e.name == desc.name) {
            Some(slot) => *slot = desc,
            None => self.entries.push(desc),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<CommandDescriptor>> {
        let idx = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Exact name lookup.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// True if `name` is taken as a name or an abbreviation.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.names().any(|n| n == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CommandDescriptor>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a command name against registries searched in order.
///
/// An exact name wins, then an exact abbreviation, then a prefix shared by
/// exactly one command name. Earlier registries shadow later ones.
pub fn resolve(chain: &[&Registry], head: &str) -> Result<Arc<CommandDescriptor>> {
    let all = || chain.iter().flat_map(|r| r.iter());

    if let Some(desc) = all().find(|d| d.name == head) {
        return Ok(Arc::clone(desc));
    }
    if let Some(desc) = all().find(|d| d.abbr.as_deref() == Some(head)) {
        return Ok(Arc::clone(desc));
    }

    let mut matches: Vec<&Arc<CommandDescriptor>> = Vec::new();
    if !head.is_empty() {
        for desc in all().filter(|d| d.name.starts_with(head)) {
            if !matches.iter().any(|m| m.name == desc.name) {
                matches.push(desc);
            }
        }
    }

    match matches.as_slice() {
        [] => Err(CmdError::NoSuchCommand(head.to_string())),
        [only] => Ok(Arc::clone(only)),
        many => {
            let mut candidates: Vec<String> = many.iter().map(|d| d.name.clone()).collect();
            candidates.sort();
            Err(CmdError::AmbiguousCommand {
                name: head.to_string(),
                candidates,
            })
        }
    }
}
