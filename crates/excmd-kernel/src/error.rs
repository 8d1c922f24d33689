//! Error kinds surfaced by the command engine.
//!
//! Every error is recoverable at the granularity of one sub-command: the
//! kernel logs it, keeps processing the rest of the `|` chain and reports
//! the first one to the caller.

use thiserror::Error;

/// Errors produced while scanning, resolving or dispatching a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmdError {
    /// A `'` or `"` was still open at the end of the line.
    #[error("unterminated {quote} quote")]
    UnterminatedQuote { quote: char },

    #[error("not an editor command: {0}")]
    NoSuchCommand(String),

    /// More than one command name starts with the given prefix.
    #[error("ambiguous command: {name} (could be {})", .candidates.join(", "))]
    AmbiguousCommand { name: String, candidates: Vec<String> },

    #[error("{name}: wrong number of arguments ({argc}, expected {expected})")]
    ArgumentCount {
        name: String,
        argc: usize,
        expected: String,
    },

    /// `!`, `&` or a range was given to a command that does not take it.
    #[error("{name}: {flag} is not supported")]
    FlagNotSupported { name: String, flag: &'static str },

    #[error("command already exists: {0}")]
    DuplicateName(String),

    #[error("failed to launch {program}: {reason}")]
    ShellLaunch { program: String, reason: String },

    /// Argument bytes are not valid UTF-8.
    #[error("malformed encoding at byte {offset}")]
    MalformedEncoding { offset: usize },

    #[error("user command nesting exceeds {0} levels")]
    RecursionLimit(usize),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Evaluation failure in `echo`, `if`, `let` and friends.
    #[error("{0}")]
    Expression(String),

    /// Unbalanced `if`/`else`/`endif` or misplaced `finish`.
    #[error("{0}")]
    Control(String),
}

/// Result alias used throughout the kernel.
pub type Result<T> = std::result::Result<T, CmdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_candidates() {
        let e = CmdError::AmbiguousCommand {
            name: "e".into(),
            candidates: vec!["echo".into(), "else".into()],
        };
        assert_eq!(e.to_string(), "ambiguous command: e (could be echo, else)");
    }

    #[test]
    fn argument_count_display() {
        let e = CmdError::ArgumentCount {
            name: "onearg".into(),
            argc: 0,
            expected: "1".into(),
        };
        assert_eq!(
            e.to_string(),
            "onearg: wrong number of arguments (0, expected 1)"
        );
    }

    #[test]
    fn unterminated_quote_display() {
        let e = CmdError::UnterminatedQuote { quote: '\'' };
        assert_eq!(e.to_string(), "unterminated ' quote");
    }
}
