//! Integration tests for the excmd REPL.
//!
//! These tests run lines through the REPL and verify what it prints.

use std::io;

use excmd_kernel::{Kernel, KernelConfig, Launched, MemoryEnv, ProcessLauncher, ViewState};
use excmd_repl::Repl;

struct QuietLauncher;

impl ProcessLauncher for QuietLauncher {
    fn spawn(&self, _argv: &[String], background: bool) -> io::Result<Launched> {
        Ok(if background {
            Launched::Detached
        } else {
            Launched::Finished(1)
        })
    }
}

fn new_repl() -> Repl {
    let kernel = Kernel::with_collaborators(
        KernelConfig::default(),
        Box::new(MemoryEnv::new().with("HOME", "/home/tester")),
        Box::new(QuietLauncher),
    )
    .expect("Failed to create kernel");
    Repl::with_kernel(kernel, ViewState::new("/home/tester"))
}

/// Run multiple lines through a REPL and collect outputs.
fn run_lines(repl: &mut Repl, script: &str) -> Vec<String> {
    let mut outputs = Vec::new();
    for line in script.lines() {
        match repl.process_line(line) {
            Ok(Some(output)) => outputs.push(output),
            Ok(None) => {}
            Err(e) => outputs.push(format!("ERROR: {e}")),
        }
    }
    outputs
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn echo_prints_output() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "echo 'hello' . ' ' . 'world'\n\n   ");
    assert_eq!(outputs, vec!["hello world"]);
}

#[test]
fn errors_are_returned() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "nosuch\necho 'still here'");
    assert_eq!(outputs[0], "ERROR: not an editor command: nosuch");
    assert_eq!(outputs[1], "still here");
}

#[test]
fn failing_shell_command_shows_code() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "!false\n!sleep 1 &");
    assert_eq!(outputs, vec!["E1: shell returned 1"]);
}

#[test]
fn conditionals_across_lines() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "if 1\n");
    assert!(outputs.is_empty());
    assert!(repl.kernel().in_conditional());
    let outputs = run_lines(&mut repl, "echo 'inside'\nendif");
    assert_eq!(outputs, vec!["inside"]);
    assert!(!repl.kernel().in_conditional());
}

#[test]
fn cd_updates_view() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "cd /tmp\n/cwd");
    assert_eq!(outputs, vec!["/tmp"]);
    assert_eq!(repl.view().cwd, "/tmp");
}

// ============================================================================
// Meta-commands
// ============================================================================

#[test]
fn meta_vars() {
    let mut repl = new_repl();
    assert_eq!(run_lines(&mut repl, "/vars"), vec!["(no variables set)"]);
    let outputs = run_lines(&mut repl, "let n = 4\nlet s = 'x'\n/vars");
    assert_eq!(outputs, vec!["Variables:\n  n = 4\n  s = x"]);
}

#[test]
fn meta_commands_lists_user_commands_last() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "command zz :echo 1\n/commands");
    let names: Vec<&str> = outputs[0].lines().collect();
    assert_eq!(names.first(), Some(&"echo"));
    assert_eq!(names.last(), Some(&"zz"));
}

#[test]
fn meta_help_and_unknown() {
    let mut repl = new_repl();
    let outputs = run_lines(&mut repl, "/help\n/bogus");
    assert!(outputs[0].contains("/quit"));
    assert!(outputs[1].starts_with("Unknown command: /bogus"));
}

#[test]
fn meta_quit() {
    let mut repl = new_repl();
    assert!(!repl.should_quit());
    run_lines(&mut repl, "/quit");
    assert!(repl.should_quit());
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn user_commands_survive_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("commands.json");

    let mut first = new_repl();
    run_lines(&mut first, "command greet :echo 'hi ' . %a");
    first.save_user_commands(&path).expect("save");

    let mut second = new_repl();
    second.load_user_commands(&path).expect("load");
    assert_eq!(run_lines(&mut second, "greet 'you'"), vec!["hi you"]);
}

#[test]
fn missing_files_are_fine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut repl = new_repl();
    repl.load_user_commands(&dir.path().join("none.json"))
        .expect("missing commands file");
    repl.source_startup(&dir.path().join("excmdrc"))
        .expect("missing startup script");
}

#[test]
fn corrupt_commands_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("commands.json");
    std::fs::write(&path, "{not json").expect("write");
    let mut repl = new_repl();
    let err = repl.load_user_commands(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn startup_script_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("excmdrc");
    std::fs::write(&path, "\" startup\nlet greeting = 'hey'\nnosuch\nnnoremap tj gg\n")
        .expect("write");

    let mut repl = new_repl();
    repl.source_startup(&path).expect("startup");
    assert!(repl.kernel().get_var("greeting").is_some());
    assert!(!repl.kernel().mappings().is_empty());
}

#[test]
fn script_file_reports_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("script");
    std::fs::write(&path, "echo 1\nif 1\nfinish\nendif\necho 2").expect("write");

    let mut repl = new_repl();
    let outcome = repl.run_script_file(&path).expect("run");
    assert_eq!(outcome.result.out, "1");
    assert!(!outcome.completed);
    assert!(outcome.failures.is_empty());
}
