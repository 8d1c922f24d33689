//! Nested scopes for the command engine.
//!
//! The root frame lives as long as the kernel. Each user-command
//! invocation pushes a child frame holding its own command registry,
//! variables and conditional state; popping the frame discards all of it,
//! so nothing a body defines leaks into the caller. Lookups walk from the
//! innermost frame outwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::control_flow::CondStack;
use crate::commands::{CommandDescriptor, Handler, Registry};
use crate::error::{CmdError, Result};
use crate::expr::Value;

/// A user-defined command as persisted by a session writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCommandDef {
    pub name: String,
    pub body: String,
}

/// One level of scope.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    commands: Registry,
    vars: HashMap<String, Value>,
    conditions: CondStack,
    finished: bool,
}

impl Frame {
    pub fn commands(&self) -> &Registry {
        &self.commands
    }

    pub fn conditions(&self) -> &CondStack {
        &self.conditions
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    /// Last element is the innermost frame. Never empty.
    frames: Vec<Frame>,
}

impl Scope {
    /// Create a new scope with one empty frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame. The root frame is never popped.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of frames above the root.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn innermost(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Set a variable in the innermost frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.innermost_mut().vars.insert(name.into(), value);
    }

    /// Get a variable, searching from innermost to outermost frame.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|f| f.vars.get(name))
    }

    /// Remove `name` from the innermost frame. Bindings of enclosing
    /// frames are out of reach.
    pub fn unset(&mut self, name: &str) -> bool {
        self.innermost_mut().vars.remove(name).is_some()
    }

    /// All visible variable names, sorted.
    pub fn all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .frames
            .iter()
            .flat_map(|f| f.vars.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// User commands defined in the innermost frame.
    pub fn local_commands(&self) -> &Registry {
        &self.innermost().commands
    }

    /// User-command registries, innermost first.
    pub fn command_chain(&self) -> Vec<&Registry> {
        self.frames.iter().rev().map(|f| &f.commands).collect()
    }

    /// Define a user command in the innermost frame.
    ///
    /// An existing definition in that frame is replaced only when `force`
    /// is set.
    pub fn define_command(&mut self, desc: CommandDescriptor, force: bool) -> Result<()> {
        let commands = &mut self.innermost_mut().commands;
        if commands.get(&desc.name).is_some() {
            if !force {
                return Err(CmdError::DuplicateName(desc.name));
            }
            commands.replace(desc);
            return Ok(());
        }
        commands.register(desc)
    }

    /// Remove `name` from the innermost frame's commands.
    pub fn delete_command(&mut self, name: &str) -> bool {
        self.innermost_mut().commands.remove(name).is_some()
    }

    /// Drop every user command of the innermost frame.
    pub fn clear_commands(&mut self) {
        self.innermost_mut().commands.clear();
    }

    /// Visible user commands as name/body pairs, outermost definitions
    /// first.
    pub fn user_commands(&self) -> Vec<UserCommandDef> {
        let mut defs: Vec<UserCommandDef> = Vec::new();
        for frame in &self.frames {
            for desc in frame.commands.iter() {
                let Handler::User(body) = &desc.handler else {
                    continue;
                };
                let def = UserCommandDef {
                    name: desc.name.clone(),
                    body: body.clone(),
                };
                match defs.iter_mut().find(|d| d.name == def.name) {
                    Some(shadowed) => *shadowed = def,
                    None => defs.push(def),
                }
            }
        }
        defs
    }

    pub fn conditions(&self) -> &CondStack {
        &self.innermost().conditions
    }

    pub fn conditions_mut(&mut self) -> &mut CondStack {
        &mut self.innermost_mut().conditions
    }

    /// Replace the innermost conditional stack, returning the old one.
    pub fn swap_conditions(&mut self, conditions: CondStack) -> CondStack {
        std::mem::replace(&mut self.innermost_mut().conditions, conditions)
    }

    /// Mark the innermost frame as finished: no further commands run in it.
    pub fn finish(&mut self) {
        self.innermost_mut().finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.innermost().finished
    }

    pub fn clear_finished(&mut self) {
        self.innermost_mut().finished = false;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scope() {
        let scope = Scope::new();
        assert_eq!(scope.depth(), 0);
        assert!(scope.get("x").is_none());
    }

    #[test]
    fn test_set_get() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(42));
        assert_eq!(scope.get("x"), Some(&Value::Int(42)));
    }

    #[test]
    fn child_frame_sees_parent_but_does_not_leak() {
        let mut scope = Scope::new();
        scope.set("outer", Value::Int(1));
        scope.push_frame();
        assert_eq!(scope.get("outer"), Some(&Value::Int(1)));
        scope.set("inner", Value::from("x"));
        scope.set("outer", Value::Int(2));
        assert_eq!(scope.get("outer"), Some(&Value::Int(2)));
        assert!(scope.pop_frame().is_some());
        assert!(scope.get("inner").is_none());
        assert_eq!(scope.get("outer"), Some(&Value::Int(1)));
    }

    #[test]
    fn root_frame_is_never_popped() {
        let mut scope = Scope::new();
        assert!(scope.pop_frame().is_none());
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn unset_touches_only_innermost() {
        let mut scope = Scope::new();
        scope.set("v", Value::Int(1));
        scope.push_frame();
        scope.set("v", Value::Int(2));
        assert!(scope.unset("v"));
        assert_eq!(scope.get("v"), Some(&Value::Int(1)));
        assert!(!scope.unset("v"));
        assert_eq!(scope.get("v"), Some(&Value::Int(1)));
        scope.pop_frame();
        assert!(scope.unset("v"));
        assert!(scope.get("v").is_none());
    }

    #[test]
    fn all_names_dedups() {
        let mut scope = Scope::new();
        scope.set("b", Value::Int(1));
        scope.set("a", Value::Int(1));
        scope.push_frame();
        scope.set("a", Value::Int(2));
        assert_eq!(scope.all_names(), vec!["a", "b"]);
    }

    #[test]
    fn define_requires_force_to_replace() {
        let mut scope = Scope::new();
        scope
            .define_command(CommandDescriptor::user("udf", ":echo 1"), false)
            .unwrap();
        assert_eq!(
            scope.define_command(CommandDescriptor::user("udf", ":echo 2"), false),
            Err(CmdError::DuplicateName("udf".into()))
        );
        scope
            .define_command(CommandDescriptor::user("udf", ":echo 3"), true)
            .unwrap();
        assert_eq!(
            scope.user_commands(),
            vec![UserCommandDef {
                name: "udf".into(),
                body: ":echo 3".into()
            }]
        );
    }

    #[test]
    fn child_definitions_are_discarded() {
        let mut scope = Scope::new();
        scope.push_frame();
        scope
            .define_command(CommandDescriptor::user("tmp", ":echo"), false)
            .unwrap();
        assert_eq!(scope.command_chain().len(), 2);
        assert_eq!(scope.user_commands().len(), 1);
        scope.pop_frame();
        assert!(scope.user_commands().is_empty());
    }

    #[test]
    fn delete_and_clear() {
        let mut scope = Scope::new();
        scope
            .define_command(CommandDescriptor::user("a", "x"), false)
            .unwrap();
        scope
            .define_command(CommandDescriptor::user("b", "y"), false)
            .unwrap();
        assert!(scope.delete_command("a"));
        assert!(!scope.delete_command("a"));
        scope.clear_commands();
        assert!(scope.user_commands().is_empty());
    }

    #[test]
    fn child_cannot_delete_parent_definitions() {
        let mut scope = Scope::new();
        scope
            .define_command(CommandDescriptor::user("keep", ":echo"), false)
            .unwrap();
        scope.push_frame();
        assert!(scope.local_commands().get("keep").is_none());
        assert!(!scope.delete_command("keep"));
        scope.pop_frame();
        assert!(scope.local_commands().get("keep").is_some());
    }

    #[test]
    fn finish_is_per_frame() {
        let mut scope = Scope::new();
        scope.push_frame();
        scope.finish();
        assert!(scope.is_finished());
        scope.pop_frame();
        assert!(!scope.is_finished());
    }

    #[test]
    fn conditions_are_per_frame() {
        let mut scope = Scope::new();
        scope.push_frame();
        scope.conditions_mut().push_if(false);
        let frame = scope.pop_frame().unwrap();
        assert!(!frame.conditions().is_empty());
        assert!(scope.conditions().is_active());
    }
}
