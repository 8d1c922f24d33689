//! Conditional execution state.
//!
//! Each `if` pushes a level; `elseif`/`else` move within it and `endif`
//! pops it. Commands run only while the innermost level is active.

use crate::error::{CmdError, Result};

#[derive(Debug, Clone, Copy)]
struct Level {
    /// The enclosing code was running when this `if` was reached.
    parent_active: bool,
    /// Some branch of this `if` has been taken already.
    taken: bool,
    active: bool,
    seen_else: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CondStack {
    levels: Vec<Level>,
}

impl CondStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when commands should run.
    pub fn is_active(&self) -> bool {
        self.levels.last().is_none_or(|l| l.active)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn push_if(&mut self, cond: bool) {
        let parent_active = self.is_active();
        let active = parent_active && cond;
        self.levels.push(Level {
            parent_active,
            taken: active,
            active,
            seen_else: false,
        });
    }

    /// Whether an `elseif` condition would matter. Conditions that cannot
    /// change the outcome are not evaluated.
    pub fn needs_condition(&self) -> bool {
        self.levels
            .last()
            .is_some_and(|l| l.parent_active && !l.taken && !l.seen_else)
    }

    pub fn elseif(&mut self, cond: bool) -> Result<()> {
        let level = self.top("elseif")?;
        if level.seen_else {
            return Err(CmdError::Control(":elseif after :else".into()));
        }
        level.active = level.parent_active && !level.taken && cond;
        level.taken |= level.active;
        Ok(())
    }

    pub fn else_branch(&mut self) -> Result<()> {
        let level = self.top("else")?;
        if level.seen_else {
            return Err(CmdError::Control("multiple :else".into()));
        }
        level.active = level.parent_active && !level.taken;
        level.taken = true;
        level.seen_else = true;
        Ok(())
    }

    pub fn endif(&mut self) -> Result<()> {
        match self.levels.pop() {
            Some(_) => Ok(()),
            None => Err(CmdError::Control(":endif without :if".into())),
        }
    }

    fn top(&mut self, what: &str) -> Result<&mut Level> {
        self.levels
            .last_mut()
            .ok_or_else(|| CmdError::Control(format!(":{what} without :if")))
    }
}
