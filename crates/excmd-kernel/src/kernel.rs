//! The Kernel: executes command lines.
//!
//! The kernel owns the long-lived state (built-in registry, root scope,
//! mappings, collaborators) and exposes the "execute one line" entry point.
//! A line is processed one `|`-separated sub-command at a time: scan the
//! head, resolve the name, let the command's flags decide how far its
//! arguments reach, dispatch, then continue with whatever follows.
//!
//! ```ignore
//! let mut kernel = Kernel::new(KernelConfig::default())?;
//! let mut view = ViewState::new("/home/user");
//! kernel.execute("let $X = 1 || 0 | echo $X", &mut view, InputType::Command)?;
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::commands::{
    dispatch, register_builtins, resolve, CommandDescriptor, CommandFlags, ExecContext,
    InputType, Invocation, Registry, ViewState,
};
use crate::environment::{Environment, MemoryEnv};
use crate::error::{CmdError, Result};
use crate::expr::Value;
use crate::interpreter::{CondStack, ExecResult, Scope, UserCommandDef};
use crate::launcher::{ProcessLauncher, TokioLauncher};
use crate::mappings::Mappings;
use crate::parser::{
    is_blank, scan_head, split_args, split_segment, text, trim_trailing_blanks, CommandHead,
    Head, Segment, SplitOptions, TailMode,
};
use crate::paths;

/// Configuration for kernel initialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Program that runs `!` commands and shell-bodied user commands.
    pub shell: String,
    /// Flag passing the command text to `shell`.
    pub shell_flag: String,
    /// Deepest allowed nesting of user commands.
    pub max_depth: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            shell_flag: "-c".to_string(),
            max_depth: 64,
        }
    }
}

impl KernelConfig {
    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        paths::config_file()
    }

    /// Read a TOML configuration file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Load from [`Self::config_path`] if it exists, otherwise defaults.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// One failed line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFailure {
    /// 1-based line number (of the first physical line for continued lines).
    pub line: usize,
    pub error: CmdError,
}

/// What running a script produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub result: ExecResult,
    pub failures: Vec<ScriptFailure>,
    /// False when `finish` stopped the script early.
    pub completed: bool,
}

impl ScriptOutcome {
    pub fn ok(&self) -> bool {
        self.failures.is_empty() && self.result.ok()
    }
}

/// The command engine.
pub struct Kernel {
    config: KernelConfig,
    builtins: Registry,
    scope: Scope,
    env: Box<dyn Environment>,
    launcher: Box<dyn ProcessLauncher>,
    mappings: Mappings,
}

impl Kernel {
    /// Create a kernel that launches real processes and starts from a
    /// snapshot of the process environment.
    pub fn new(config: KernelConfig) -> anyhow::Result<Self> {
        let launcher = TokioLauncher::new().context("failed to start process launcher")?;
        Self::with_collaborators(
            config,
            Box::new(MemoryEnv::from_process()),
            Box::new(launcher),
        )
        .context("failed to register built-in commands")
    }

    /// Create a kernel with default configuration.
    pub fn transient() -> anyhow::Result<Self> {
        Self::new(KernelConfig::default())
    }

    /// Create a kernel around host-supplied collaborators.
    pub fn with_collaborators(
        config: KernelConfig,
        env: Box<dyn Environment>,
        launcher: Box<dyn ProcessLauncher>,
    ) -> Result<Self> {
        let mut builtins = Registry::new();
        register_builtins(&mut builtins)?;
        Ok(Self {
            config,
            builtins,
            scope: Scope::new(),
            env,
            launcher,
            mappings: Mappings::new(),
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Add a host command next to the built-ins.
    pub fn register(&mut self, desc: CommandDescriptor) -> Result<()> {
        info!(name = %desc.name, "registering command");
        self.builtins.register(desc)
    }

    /// Execute one command line.
    ///
    /// Every sub-command runs even if an earlier one failed; the first
    /// error is returned once the line is done.
    pub fn execute(
        &mut self,
        line: &str,
        view: &mut ViewState,
        input: InputType,
    ) -> Result<ExecResult> {
        self.execute_bytes(line.as_bytes(), view, input)
    }

    /// Like [`Self::execute`] for input that may not be valid UTF-8.
    pub fn execute_bytes(
        &mut self,
        line: &[u8],
        view: &mut ViewState,
        input: InputType,
    ) -> Result<ExecResult> {
        let result = {
            let mut ctx = self.context(view, input);
            run_line(&mut ctx, line)
        };
        self.scope.clear_finished();
        result
    }

    /// Execute a script line by line.
    ///
    /// The script gets its own conditional state, so an `if` it leaves open
    /// is reported instead of swallowing the caller's commands. Blocks left
    /// open by `finish` are dropped silently. Variables
    /// and user commands it defines persist. A line whose first non-blank
    /// character is `\` continues the previous line.
    pub fn execute_script(&mut self, script: &str, view: &mut ViewState) -> ScriptOutcome {
        let saved = self.scope.swap_conditions(CondStack::new());
        let mut result = ExecResult::default();
        let mut failures = Vec::new();
        let mut completed = true;
        let mut last_line = 0;

        for (line_no, line) in logical_lines(script) {
            last_line = line_no;
            let outcome = {
                let mut ctx = self.context(view, InputType::Script);
                run_line(&mut ctx, line.as_bytes())
            };
            match outcome {
                Ok(r) => result.combine(r),
                Err(error) => failures.push(ScriptFailure {
                    line: line_no,
                    error,
                }),
            }
            if self.scope.is_finished() {
                completed = false;
                break;
            }
        }

        let conditions = self.scope.swap_conditions(saved);
        if completed && !conditions.is_empty() {
            failures.push(ScriptFailure {
                line: last_line,
                error: CmdError::Control("missing :endif".into()),
            });
        }
        self.scope.clear_finished();

        ScriptOutcome {
            result,
            failures,
            completed,
        }
    }

    /// Get a scope variable.
    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    pub fn var_names(&self) -> Vec<&str> {
        self.scope.all_names()
    }

    pub fn env(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    pub fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    /// User commands in a form a session writer can persist.
    pub fn user_commands(&self) -> Vec<UserCommandDef> {
        self.scope.user_commands()
    }

    /// Restore persisted user commands, replacing same-named ones.
    pub fn load_user_commands(
        &mut self,
        defs: impl IntoIterator<Item = UserCommandDef>,
    ) -> Result<()> {
        for def in defs {
            if self.builtins.contains(&def.name) {
                return Err(CmdError::DuplicateName(def.name));
            }
            self.scope
                .define_command(CommandDescriptor::user(&def.name, &def.body), true)?;
        }
        Ok(())
    }

    /// Names of every command, built-ins first.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builtins.iter().map(|d| d.name.clone()).collect();
        names.extend(self.scope.user_commands().into_iter().map(|d| d.name));
        names
    }

    /// True while an `if` block is open at top level.
    pub fn in_conditional(&self) -> bool {
        !self.scope.conditions().is_empty()
    }

    fn context<'a>(&'a mut self, view: &'a mut ViewState, input: InputType) -> ExecContext<'a> {
        ExecContext {
            view,
            scope: &mut self.scope,
            env: self.env.as_mut(),
            launcher: self.launcher.as_ref(),
            mappings: &mut self.mappings,
            builtins: &self.builtins,
            config: &self.config,
            input,
            depth: 0,
        }
    }
}

/// Join continuation lines, keeping the number of the first physical line.
fn logical_lines(script: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if let Some(continued) = trimmed.strip_prefix('\\') {
            if let Some((_, last)) = lines.last_mut() {
                last.push_str(continued);
                continue;
            }
        }
        lines.push((idx + 1, line.to_string()));
    }
    lines
}

/// Run every sub-command of `line` in `ctx`.
pub(crate) fn run_line(ctx: &mut ExecContext<'_>, line: &[u8]) -> Result<ExecResult> {
    let mut combined = ExecResult::default();
    let mut first_error = None;
    let mut rest = Some(line);

    while let Some(chunk) = rest {
        if ctx.scope.is_finished() {
            break;
        }
        let step = run_segment(ctx, chunk);
        match step.outcome {
            Ok(Some(result)) => combined.combine(result),
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "command failed");
                first_error.get_or_insert(error);
            }
        }
        rest = step.rest;
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(combined),
    }
}

/// Outcome of one sub-command plus where the next one starts.
struct Step<'l> {
    outcome: Result<Option<ExecResult>>,
    rest: Option<&'l [u8]>,
}

impl<'l> Step<'l> {
    fn skip(rest: Option<&'l [u8]>) -> Self {
        Self {
            outcome: Ok(None),
            rest,
        }
    }

    fn fail(error: CmdError, rest: Option<&'l [u8]>) -> Self {
        Self {
            outcome: Err(error),
            rest,
        }
    }
}

/// Where the next sub-command starts if this one is not understood.
fn plain_rest(tail: &[u8]) -> Option<&[u8]> {
    split_segment(tail, TailMode::Plain)
        .ok()
        .and_then(|segment| segment.rest)
}

fn run_segment<'l>(ctx: &mut ExecContext<'_>, chunk: &'l [u8]) -> Step<'l> {
    let head = match scan_head(chunk) {
        Ok(Head::Command(head)) => head,
        Ok(Head::Empty { rest }) => return Step::skip(rest),
        Ok(Head::Comment) => return Step::skip(None),
        Err(error) => return Step::fail(error, None),
    };
    let active = ctx.scope.conditions().is_active();

    if head.name.is_empty() {
        return bare_range(ctx, &head, active);
    }

    let desc = match resolve(&ctx.command_chain(), head.name) {
        Ok(desc) => desc,
        Err(_) if !active => return Step::skip(plain_rest(head.tail)),
        Err(error) => return Step::fail(error, plain_rest(head.tail)),
    };

    let segment = match split_segment(head.tail, desc.flags.tail_mode()) {
        Ok(segment) => segment,
        Err(_) if !active => return Step::skip(plain_rest(head.tail)),
        Err(error) => return Step::fail(error, None),
    };
    let rest = segment.rest;

    if !active && !desc.flags.contains(CommandFlags::CONTROL) {
        debug!(name = %desc.name, "skipped in inactive branch");
        return Step::skip(rest);
    }

    let outcome = build_invocation(ctx, &desc, &head, &segment)
        .and_then(|inv| dispatch(&desc, &inv, ctx))
        .map(Some);
    Step { outcome, rest }
}

/// A sub-command without a name: a lone range moves the cursor, anything
/// else is an unknown command.
fn bare_range<'l>(ctx: &mut ExecContext<'_>, head: &CommandHead<'l>, active: bool) -> Step<'l> {
    let rest = plain_rest(head.tail);
    if !active {
        return Step::skip(rest);
    }

    let body_end = rest.map_or(head.tail.len(), |r| head.tail.len() - r.len() - 1);
    let body = &head.tail[..body_end];
    let spec = match head.range {
        Some(spec) if body.iter().all(|&b| is_blank(b)) => spec,
        _ => {
            let word_end = body.iter().position(|&b| is_blank(b)).unwrap_or(body.len());
            let word = String::from_utf8_lossy(&body[..word_end]).into_owned();
            return Step::fail(CmdError::NoSuchCommand(word), rest);
        }
    };

    let outcome = spec.resolve(ctx.view.cursor, ctx.view.len).map(|range| {
        if let Some(line) = range.end_line(ctx.view.len) {
            ctx.view.cursor = line;
        }
        None
    });
    Step { outcome, rest }
}

fn build_invocation(
    ctx: &ExecContext<'_>,
    desc: &CommandDescriptor,
    head: &CommandHead<'_>,
    segment: &Segment<'_>,
) -> Result<Invocation> {
    let flags = desc.flags;
    let body = trim_trailing_blanks(segment.body);
    let args_text = text(body)?.to_string();

    let argv = if flags.intersects(CommandFlags::RAW | CommandFlags::EXPR) {
        if args_text.is_empty() {
            Vec::new()
        } else {
            vec![args_text.clone()]
        }
    } else {
        let env: Option<&dyn Environment> = if flags.contains(CommandFlags::EXPAND_ENV) {
            Some(&*ctx.env)
        } else {
            None
        };
        split_args(
            body,
            SplitOptions {
                quotes: flags.contains(CommandFlags::QUOTES),
                env,
            },
        )?
    };

    let range = match head.range {
        None => None,
        Some(_) if !flags.contains(CommandFlags::RANGE) => {
            return Err(CmdError::FlagNotSupported {
                name: desc.name.clone(),
                flag: "range",
            });
        }
        Some(spec) => Some(spec.resolve(ctx.view.cursor, ctx.view.len)?),
    };

    Ok(Invocation {
        name: desc.name.clone(),
        argv,
        args_text,
        bg: segment.bg,
        emark: head.emark,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(config.shell_flag, "-c");
        assert_eq!(config.max_depth, 64);
        assert!(KernelConfig::config_path().ends_with("config.toml"));
    }

    #[test]
    fn config_load_keeps_missing_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shell = \"/bin/bash\"\nmax_depth = 8").unwrap();
        let config = KernelConfig::load(file.path()).unwrap();
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.shell_flag, "-c");
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn config_load_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = \"deep\"").unwrap();
        let err = KernelConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn config_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(KernelConfig::load(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn continuation_lines_join() {
        let lines = logical_lines("echo 1\n  \\ . 2\n\" note\necho 3");
        assert_eq!(
            lines,
            vec![
                (1, "echo 1 . 2".to_string()),
                (3, "\" note".to_string()),
                (4, "echo 3".to_string()),
            ]
        );
    }

    #[test]
    fn leading_continuation_is_its_own_line() {
        assert_eq!(logical_lines("\\x"), vec![(1, "\\x".to_string())]);
    }
}
