//! Byte-level command-line scanning.
//!
//! A line is consumed one sub-command at a time:
//!
//! 1. [`scan_head`] skips blanks and `:`, reads an optional range, the
//!    command name and a `!` suffix, and hands back the raw tail.
//! 2. [`split_segment`] finds where the sub-command ends (the first
//!    separating `|`) and whether it carries a background `&`. How `|`,
//!    `&` and quotes are treated depends on the command, so this runs only
//!    after the name has been resolved.
//! 3. [`split_args`] turns the segment body into an argument vector.
//!
//! Everything works on bytes so malformed UTF-8 is detected and reported
//! rather than assumed away.

mod args;
mod range;
mod scanner;
mod separator;

pub use args::{split_args, text, trim_trailing_blanks, SplitOptions};
pub use range::{parse_range, Address, Base, Range, RangeSpec};
pub use scanner::{scan_head, CommandHead, Head};
pub use separator::{split_segment, Segment, TailMode};

/// Blank characters separating words. Other control characters are
/// ordinary argument bytes.
pub fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Drop leading blanks.
pub(crate) fn skip_blanks(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_blank(b)).unwrap_or(bytes.len());
    &bytes[start..]
}
