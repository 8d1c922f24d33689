//! cd: change the view's directory.
//!
//! Only the view's notion of its directory changes; whether the target
//! exists is the host's business.

use std::path::{Component, Path, PathBuf};

use crate::commands::{Command, ExecContext, Invocation};
use crate::error::Result;
use crate::interpreter::ExecResult;

pub struct Cd;

impl Command for Cd {
    fn execute(&self, inv: &Invocation, ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
        let target = match inv.argv.first().map(String::as_str) {
            None => ctx.env.get("HOME").unwrap_or_else(|| "/".to_string()),
            Some("-") => match &ctx.view.prev_cwd {
                Some(prev) => prev.clone(),
                None => return Ok(ExecResult::failure(1, "cd: no previous directory")),
            },
            Some(path) => path.to_string(),
        };

        let resolved = resolve_path(&ctx.view.cwd, &target);
        let previous = std::mem::replace(&mut ctx.view.cwd, resolved);
        ctx.view.prev_cwd = Some(previous);
        Ok(ExecResult::success(""))
    }
}

/// Join `path` onto `cwd` and fold `.` and `..` components lexically.
fn resolve_path(cwd: &str, path: &str) -> String {
    let joined = Path::new(cwd).join(path);
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        return "/".to_string();
    }
    out.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_parent() {
        assert_eq!(resolve_path("/home/u", "docs"), "/home/u/docs");
        assert_eq!(resolve_path("/home/u", "../v/./x"), "/home/v/x");
        assert_eq!(resolve_path("/home/u", "/tmp"), "/tmp");
        assert_eq!(resolve_path("/", ".."), "/");
    }
}
