//! In-memory key-mapping and command-line abbreviation tables.
//!
//! The modal input engine that consumes these lives in the host; the kernel
//! only maintains the tables behind `map`, `unmap`, `cabbrev` and friends.

use std::collections::BTreeMap;

/// Input mode a key mapping applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    Normal,
    Visual,
}

impl Mode {
    /// Single-letter tag used when listing mappings.
    pub fn tag(self) -> char {
        match self {
            Mode::Normal => 'n',
            Mode::Visual => 'v',
        }
    }
}

/// One left-hand side to right-hand side binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub lhs: String,
    pub rhs: String,
    /// The right-hand side is not subject to further remapping.
    pub noremap: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Mappings {
    keys: BTreeMap<(Mode, String), Mapping>,
    abbrevs: BTreeMap<String, Mapping>,
}

impl Mappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `lhs` in `mode`, replacing an existing binding.
    pub fn map(&mut self, mode: Mode, lhs: &str, rhs: &str, noremap: bool) {
        self.keys.insert(
            (mode, lhs.to_string()),
            Mapping {
                lhs: lhs.to_string(),
                rhs: rhs.to_string(),
                noremap,
            },
        );
    }

    /// Remove a binding. Returns false if there was none.
    pub fn unmap(&mut self, mode: Mode, lhs: &str) -> bool {
        self.keys.remove(&(mode, lhs.to_string())).is_some()
    }

    pub fn get(&self, mode: Mode, lhs: &str) -> Option<&Mapping> {
        self.keys.get(&(mode, lhs.to_string()))
    }

    /// Bindings of `mode` whose left-hand side starts with `prefix`.
    pub fn list(&self, mode: Mode, prefix: &str) -> Vec<&Mapping> {
        self.keys
            .iter()
            .filter(|((m, lhs), _)| *m == mode && lhs.starts_with(prefix))
            .map(|(_, mapping)| mapping)
            .collect()
    }

    pub fn abbrev(&mut self, lhs: &str, rhs: &str, noremap: bool) {
        self.abbrevs.insert(
            lhs.to_string(),
            Mapping {
                lhs: lhs.to_string(),
                rhs: rhs.to_string(),
                noremap,
            },
        );
    }

    /// Remove an abbreviation by its left-hand side, falling back to a
    /// match on the expansion.
    pub fn unabbrev(&mut self, text: &str) -> bool {
        if self.abbrevs.remove(text).is_some() {
            return true;
        }
        let by_rhs = self
            .abbrevs
            .iter()
            .find(|(_, m)| m.rhs == text)
            .map(|(k, _)| k.clone());
        match by_rhs {
            Some(key) => self.abbrevs.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn abbrevs(&self, prefix: &str) -> Vec<&Mapping> {
        self.abbrevs
            .values()
            .filter(|m| m.lhs.starts_with(prefix))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.abbrevs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_is_per_mode() {
        let mut m = Mappings::new();
        m.map(Mode::Normal, "j", "k", false);
        assert!(m.get(Mode::Normal, "j").is_some());
        assert!(m.get(Mode::Visual, "j").is_none());
        assert!(m.unmap(Mode::Normal, "j"));
        assert!(!m.unmap(Mode::Normal, "j"));
        assert!(m.is_empty());
    }

    #[test]
    fn list_filters_by_prefix() {
        let mut m = Mappings::new();
        m.map(Mode::Normal, "gg", "top", false);
        m.map(Mode::Normal, "gj", "down", true);
        m.map(Mode::Normal, "x", "cut", false);
        let lhs: Vec<_> = m.list(Mode::Normal, "g").iter().map(|m| m.lhs.as_str()).collect();
        assert_eq!(lhs, ["gg", "gj"]);
    }

    #[test]
    fn unabbrev_by_lhs_or_rhs() {
        let mut m = Mappings::new();
        m.abbrev("q", "quit", false);
        m.abbrev("w", "write", true);
        assert!(m.unabbrev("q"));
        assert!(m.unabbrev("write"));
        assert!(!m.unabbrev("nothing"));
        assert!(m.abbrevs("").is_empty());
    }
}
