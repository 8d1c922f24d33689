//! Command head scanning: `[range] name[!] tail`.

use super::range::{parse_range, RangeSpec};
use super::{is_blank, skip_blanks};
use crate::error::Result;

/// What the start of a sub-command turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Head<'a> {
    /// Nothing to run. `rest` holds the remainder after a bare `|`.
    Empty { rest: Option<&'a [u8]> },
    /// A `"` comment; the rest of the line is ignored.
    Comment,
    Command(CommandHead<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandHead<'a> {
    pub range: Option<RangeSpec>,
    /// ASCII command name, `"!"` for a shell command, or empty when only a
    /// range (or junk) was found.
    pub name: &'a str,
    pub emark: bool,
    /// Unsplit text after the name, leading blanks removed.
    pub tail: &'a [u8],
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scan the head of one sub-command.
pub fn scan_head(line: &[u8]) -> Result<Head<'_>> {
    let start = line
        .iter()
        .position(|&b| !is_blank(b) && b != b':')
        .unwrap_or(line.len());
    let line = &line[start..];

    match line.first() {
        None => return Ok(Head::Empty { rest: None }),
        Some(b'"') => return Ok(Head::Comment),
        Some(b'|') => {
            return Ok(Head::Empty {
                rest: Some(&line[1..]),
            });
        }
        _ => {}
    }

    let (range, used) = match parse_range(line)? {
        Some((spec, used)) => (Some(spec), used),
        None => (None, 0),
    };
    let line = skip_blanks(&line[used..]);

    let name_len = match line.first() {
        Some(b'!') => 1,
        _ => line.iter().position(|&b| !is_name_byte(b)).unwrap_or(line.len()),
    };
    // Name bytes are ASCII by construction.
    let name = std::str::from_utf8(&line[..name_len]).unwrap_or_default();
    let mut rest = &line[name_len..];

    let mut emark = false;
    if name != "!" && !name.is_empty() && rest.first() == Some(&b'!') {
        emark = true;
        rest = &rest[1..];
    }

    Ok(Head::Command(CommandHead {
        range,
        name,
        emark,
        tail: skip_blanks(rest),
    }))
}
