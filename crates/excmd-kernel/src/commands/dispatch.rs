//! Invocation validation and handler dispatch.

use tracing::debug;

use super::context::ExecContext;
use super::registry::{CommandDescriptor, CommandFlags, Handler};
use crate::error::{CmdError, Result};
use crate::interpreter::user_command::run_user_command;
use crate::interpreter::ExecResult;
use crate::parser::Range;

/// One resolved call of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Full name of the resolved command.
    pub name: String,
    pub argv: Vec<String>,
    /// Argument text as written (escapes and quotes intact), without the
    /// background marker.
    pub args_text: String,
    pub bg: bool,
    pub emark: bool,
    pub range: Option<Range>,
}

impl Invocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argv: Vec::new(),
            args_text: String::new(),
            bg: false,
            emark: false,
            range: None,
        }
    }

    pub fn argc(&self) -> usize {
        self.argv.len()
    }
}

/// Check an invocation against what the command accepts.
pub fn validate(desc: &CommandDescriptor, inv: &Invocation) -> Result<()> {
    let unsupported = |flag| CmdError::FlagNotSupported {
        name: desc.name.clone(),
        flag,
    };
    if inv.emark && !desc.flags.contains(CommandFlags::EMARK) {
        return Err(unsupported("!"));
    }
    if inv.bg && !desc.flags.contains(CommandFlags::BG) {
        return Err(unsupported("&"));
    }
    if inv.range.is_some() && !desc.flags.contains(CommandFlags::RANGE) {
        return Err(unsupported("range"));
    }
    if !desc.accepts(inv.argc()) {
        return Err(CmdError::ArgumentCount {
            name: desc.name.clone(),
            argc: inv.argc(),
            expected: desc.expected_args(),
        });
    }
    Ok(())
}

/// Validate and run. The handler's outcome is returned unaltered.
pub fn dispatch(
    desc: &CommandDescriptor,
    inv: &Invocation,
    ctx: &mut ExecContext<'_>,
) -> Result<ExecResult> {
    validate(desc, inv)?;
    debug!(
        name = %desc.name,
        argc = inv.argc(),
        bg = inv.bg,
        emark = inv.emark,
        "dispatching"
    );
    match &desc.handler {
        Handler::Builtin(command) => command.execute(inv, ctx),
        Handler::User(body) => run_user_command(&desc.name, body, inv, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use rstest::rstest;

    struct Noop;

    impl Command for Noop {
        fn execute(&self, _inv: &Invocation, _ctx: &mut ExecContext<'_>) -> Result<ExecResult> {
            Ok(ExecResult::success(""))
        }
    }

    fn invocation(argc: usize) -> Invocation {
        let mut inv = Invocation::new("cmd");
        inv.argv = vec!["x".to_string(); argc];
        inv
    }

    #[rstest]
    #[case(0, Some(0), 0, true)]
    #[case(0, Some(0), 1, false)]
    #[case(1, Some(1), 0, false)]
    #[case(1, Some(1), 1, true)]
    #[case(1, Some(1), 2, false)]
    #[case(1, None, 7, true)]
    fn argument_count(
        #[case] min: usize,
        #[case] max: Option<usize>,
        #[case] argc: usize,
        #[case] ok: bool,
    ) {
        let desc = CommandDescriptor::builtin("cmd", Noop).args(min, max);
        let result = validate(&desc, &invocation(argc));
        if ok {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(CmdError::ArgumentCount { .. })));
        }
    }

    #[test]
    fn flags_must_be_allowed() {
        let desc = CommandDescriptor::builtin("cmd", Noop);

        let mut inv = invocation(0);
        inv.emark = true;
        assert_eq!(
            validate(&desc, &inv),
            Err(CmdError::FlagNotSupported {
                name: "cmd".into(),
                flag: "!"
            })
        );

        let mut inv = invocation(0);
        inv.bg = true;
        assert!(validate(&desc, &inv).is_err());
        let bg = desc.clone().flags(CommandFlags::BG);
        assert!(validate(&bg, &inv).is_ok());

        let mut inv = invocation(0);
        inv.range = Some(Range::Whole);
        assert!(validate(&desc, &inv).is_err());
    }
}
