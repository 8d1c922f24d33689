//! excmd REPL: an interactive command line for the excmd engine.
//!
//! Lines are handed to the kernel as typed. A few meta-commands starting
//! with `/` inspect the session:
//!
//! - `/help`, `/quit`
//! - `/vars`: variables of the top-level scope
//! - `/commands`: every command name, built-ins first
//! - `/cwd`: the view's current directory
//!
//! On start-up the REPL restores user commands saved by the previous
//! session and runs the startup script, if there is one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::{info, warn};

use excmd_kernel::{
    paths, ExecResult, InputType, Kernel, KernelConfig, ScriptOutcome, UserCommandDef, ViewState,
};

/// REPL state: a kernel and the view it acts on.
pub struct Repl {
    kernel: Kernel,
    view: ViewState,
    quit: bool,
}

impl Repl {
    /// Create a REPL with the user's configuration and real processes.
    pub fn new() -> Result<Self> {
        let config = KernelConfig::load_or_default()?;
        let kernel = Kernel::new(config)?;
        let cwd = std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "/".to_string());
        Ok(Self::with_kernel(kernel, ViewState::new(cwd)))
    }

    pub fn with_kernel(kernel: Kernel, view: ViewState) -> Self {
        Self {
            kernel,
            view,
            quit: false,
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// True once `/quit` was entered.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();
        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }
        if trimmed.is_empty() {
            return Ok(None);
        }

        let result = self
            .kernel
            .execute(line, &mut self.view, InputType::Command)?;
        Ok(format_result(&result))
    }

    /// Run a script file with the kernel's script semantics.
    pub fn run_script_file(&mut self, path: &Path) -> Result<ScriptOutcome> {
        let script = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        info!(path = %path.display(), "running script");
        Ok(self.kernel.execute_script(&script, &mut self.view))
    }

    /// Run the startup script if it exists. Failures are logged, not fatal.
    pub fn source_startup(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let outcome = self.run_script_file(path)?;
        for failure in &outcome.failures {
            warn!(path = %path.display(), line = failure.line, error = %failure.error, "startup script line failed");
        }
        Ok(())
    }

    /// Restore user commands saved by [`Self::save_user_commands`].
    pub fn load_user_commands(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let defs: Vec<UserCommandDef> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        self.kernel.load_user_commands(defs)?;
        Ok(())
    }

    pub fn save_user_commands(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.kernel.user_commands())?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let command = cmd.split_whitespace().next().unwrap_or("");

        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            "/vars" => {
                let names = self.kernel.var_names();
                if names.is_empty() {
                    return Ok(Some("(no variables set)".to_string()));
                }
                let mut output = String::from("Variables:");
                for name in names {
                    if let Some(value) = self.kernel.get_var(name) {
                        output.push_str(&format!("\n  {name} = {value}"));
                    }
                }
                Ok(Some(output))
            }
            "/commands" => Ok(Some(self.kernel.command_names().join("\n"))),
            "/cwd" => Ok(Some(self.view.cwd.clone())),
            _ => Ok(Some(format!(
                "Unknown command: {command}\nType /help for available commands."
            ))),
        }
    }
}

/// Output to show for a result, if any.
fn format_result(result: &ExecResult) -> Option<String> {
    let mut output = result.out.clone();
    if !result.ok() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("E{}: {}", result.code, result.err));
    }
    if output.is_empty() { None } else { Some(output) }
}

const HELP_TEXT: &str = r#"excmd REPL

Meta-commands:
  /help, /h, /?     Show this help
  /quit, /q, /exit  Exit the REPL
  /vars             Show top-level variables
  /commands         List command names
  /cwd              Show the current directory

Language:
  echo 'a' . 1 + 2          Evaluate and print expressions
  let $VAR = 'value'        Set an environment variable
  let n += 1                Update a variable
  if n > 1 | ... | endif    Conditionals (also across lines)
  command name :echo %a     Define a user command (`:` runs excmd)
  command name make %a &    Define a shell-bodied user command
  !ls -l &                  Run a shell command in the background
  cd -                      Go back to the previous directory
  nnoremap tj gg            Key mappings
  cabbrev q quit            Command-line abbreviations
  cmd1 | cmd2               Chain commands
"#;

/// Run the REPL, or only `script` if one is given.
pub fn run(script: Option<PathBuf>) -> Result<()> {
    let mut repl = Repl::new()?;
    let commands_path = paths::user_commands_file();
    if let Err(e) = repl.load_user_commands(&commands_path) {
        warn!(error = %e, "could not restore user commands");
    }

    if let Some(path) = script {
        let outcome = repl.run_script_file(&path)?;
        if !outcome.result.out.is_empty() {
            println!("{}", outcome.result.out);
        }
        for failure in &outcome.failures {
            eprintln!("{}:{}: {}", path.display(), failure.line, failure.error);
        }
        if !outcome.ok() {
            anyhow::bail!("script {} failed", path.display());
        }
        return Ok(());
    }

    repl.source_startup(&paths::startup_script())?;

    println!("excmd v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;
    let history_path = paths::history_file();
    let _ = rl.load_history(&history_path);

    while !repl.should_quit() {
        let prompt = if repl.kernel().in_conditional() { ":> " } else { ": " };

        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);
    repl.save_user_commands(&commands_path)?;

    Ok(())
}
