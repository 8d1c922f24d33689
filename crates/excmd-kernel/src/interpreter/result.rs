//! ExecResult: what a command hands back to the engine.

/// The result of executing a command or a `|`-chain of commands.
///
/// A non-zero `code` is an ordinary failure the handler chose to report;
/// engine-level failures travel as [`crate::CmdError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Text meant for the status line or output pane.
    pub out: String,
    /// Error text.
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    /// True if the command succeeded (exit code 0).
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// Fold the result of a later sub-command into this one.
    ///
    /// Outputs are joined by newlines. A failing code replaces the current
    /// one, so the chain reports the last failure.
    pub fn combine(&mut self, next: ExecResult) {
        join_line(&mut self.out, &next.out);
        join_line(&mut self.err, &next.err);
        if !next.ok() {
            self.code = next.code;
        }
    }
}

impl Default for ExecResult {
    fn default() -> Self {
        Self::success("")
    }
}

fn join_line(acc: &mut String, next: &str) {
    if next.is_empty() {
        return;
    }
    if !acc.is_empty() {
        acc.push('\n');
    }
    acc.push_str(next);
}
