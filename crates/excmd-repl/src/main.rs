//! excmd entry point.
//!
//! ```bash
//! excmd              # interactive
//! excmd script.vim   # run a script and exit
//! ```

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let script = std::env::args_os().nth(1).map(PathBuf::from);
    excmd_repl::run(script)
}
