//! Front ends for the key-mapping and abbreviation tables.
//!
//! Arguments reach these commands only after the splitter has validated
//! their encoding, so the tables never see malformed text.

use crate::commands::{Command, ExecContext, Invocation};
use crate::error::Result;
use crate::interpreter::ExecResult;
use crate::mappings::{Mapping, Mode};

fn format_mapping(tag: char, m: &Mapping) -> String {
    let star = if m.noremap { '*' } else { ' ' };
    format!("{tag}{star} {:<10} {}", m.lhs, m.rhs)
}

/// `map`, `nmap`, `noremap`, `nnoremap`.
pub struct Map {
    modes: &'static [Mode],
    noremap: bool,
}

impl Map {
    pub fn new(modes: &'static [Mode], noremap: bool) -> Self {
        Self { modes, noremap }
    }
}

impl Command for Map {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        match inv.argv.as_slice() {
            [] => Ok(ExecResult::success(self.list(ctx, ""))),
            [lhs] => Ok(ExecResult::success(self.list(ctx, lhs))),
            [lhs, rhs @ ..] => {
                let rhs = rhs.join(" ");
                for &mode in self.modes {
                    ctx.mappings.map(mode, lhs, &rhs, self.noremap);
                }
                Ok(ExecResult::success(""))
            }
        }
    }
}

impl Map {
    fn list(&self, ctx: &ExecContext<'_>, prefix: &str) -> String {
        self.modes
            .iter()
            .flat_map(|&mode| {
                ctx.mappings
                    .list(mode, prefix)
                    .into_iter()
                    .map(move |m| format_mapping(mode.tag(), m))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `unmap`, `nunmap`.
pub struct Unmap {
    modes: &'static [Mode],
}

impl Unmap {
    pub fn new(modes: &'static [Mode]) -> Self {
        Self { modes }
    }
}

impl Command for Unmap {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let Some(lhs) = inv.argv.first() else {
            return Ok(ExecResult::failure(1, "unmap: argument required"));
        };
        let mut removed = false;
        for &mode in self.modes {
            removed |= ctx.mappings.unmap(mode, lhs);
        }
        if removed {
            Ok(ExecResult::success(""))
        } else {
            Ok(ExecResult::failure(1, format!("no such mapping: {lhs}")))
        }
    }
}

/// `cabbrev`, `cnoreabbrev`.
pub struct Abbrev {
    noremap: bool,
}

impl Abbrev {
    pub fn new(noremap: bool) -> Self {
        Self { noremap }
    }
}

impl Command for Abbrev {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let prefix = match inv.argv.as_slice() {
            [] => "",
            [lhs] => lhs.as_str(),
            [lhs, rhs @ ..] => {
                ctx.mappings.abbrev(lhs, &rhs.join(" "), self.noremap);
                return Ok(ExecResult::success(""));
            }
        };
        let listing: Vec<String> = ctx
            .mappings
            .abbrevs(prefix)
            .into_iter()
            .map(|m| format_mapping('c', m))
            .collect();
        if listing.is_empty() {
            return Ok(ExecResult::success("no abbreviation found"));
        }
        Ok(ExecResult::success(listing.join("\n")))
    }
}

/// `cunabbrev lhs...`
pub struct Unabbrev;

impl Command for Unabbrev {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let missing: Vec<&str> = inv
            .argv
            .iter()
            .filter(|arg| !ctx.mappings.unabbrev(arg))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(ExecResult::success(""))
        } else {
            Ok(ExecResult::failure(
                1,
                format!("no such abbreviation: {}", missing.join(", ")),
            ))
        }
    }
}
