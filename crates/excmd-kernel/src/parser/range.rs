//! Line ranges in front of a command name.
//!
//! ```text
//! %          whole view
//! 3          line 3
//! .,$        cursor to last line
//! .+1,$-2    offsets relative to either end
//! ```

use crate::error::{CmdError, Result};

/// Where an address starts counting from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    /// 1-based line number.
    Line(usize),
    /// `.`
    Current,
    /// `$`
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub base: Base,
    pub offset: i64,
}

impl Address {
    pub fn new(base: Base, offset: i64) -> Self {
        Self { base, offset }
    }

    fn resolve(&self, cursor: usize, len: usize) -> Result<usize> {
        let base = match self.base {
            Base::Line(n) => n as i64 - 1,
            Base::Current => cursor as i64,
            Base::Last => len as i64 - 1,
        };
        let line = base
            .checked_add(self.offset)
            .ok_or_else(|| CmdError::InvalidRange("line offset out of bounds".into()))?;
        if line < 0 || line >= len as i64 {
            return Err(CmdError::InvalidRange(format!(
                "line {} is outside 1..{}",
                line.saturating_add(1),
                len
            )));
        }
        Ok(line as usize)
    }
}

/// A range as written, before it is applied to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    Whole,
    Single(Address),
    Pair(Address, Address),
}

/// A resolved range of 0-based, inclusive line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Whole,
    Lines { begin: usize, end: usize },
}

impl Range {
    /// Last line covered, if the view has any lines.
    pub fn end_line(&self, len: usize) -> Option<usize> {
        match *self {
            Range::Whole => len.checked_sub(1),
            Range::Lines { end, .. } => Some(end),
        }
    }
}

impl RangeSpec {
    /// Apply the range to a view with `len` lines and the cursor at `cursor`.
    pub fn resolve(&self, cursor: usize, len: usize) -> Result<Range> {
        match self {
            RangeSpec::Whole => Ok(Range::Whole),
            RangeSpec::Single(addr) => {
                let line = addr.resolve(cursor, len)?;
                Ok(Range::Lines {
                    begin: line,
                    end: line,
                })
            }
            RangeSpec::Pair(a, b) => {
                let a = a.resolve(cursor, len)?;
                let b = b.resolve(cursor, len)?;
                Ok(Range::Lines {
                    begin: a.min(b),
                    end: a.max(b),
                })
            }
        }
    }
}

/// Parse a range prefix. Returns the range and the number of bytes it used,
/// or `None` if the input does not start with one.
pub fn parse_range(input: &[u8]) -> Result<Option<(RangeSpec, usize)>> {
    if input.first() == Some(&b'%') {
        return Ok(Some((RangeSpec::Whole, 1)));
    }

    let (first, mut pos) = parse_address(input, 0)?;
    if input.get(pos) != Some(&b',') {
        return Ok(first.map(|a| (RangeSpec::Single(a), pos)));
    }
    pos += 1;
    let (second, end) = parse_address(input, pos)?;
    let current = Address::new(Base::Current, 0);
    Ok(Some((
        RangeSpec::Pair(first.unwrap_or(current), second.unwrap_or(current)),
        end,
    )))
}

fn parse_address(input: &[u8], mut pos: usize) -> Result<(Option<Address>, usize)> {
    let base = match input.get(pos) {
        Some(b'.') => {
            pos += 1;
            Some(Base::Current)
        }
        Some(b'$') => {
            pos += 1;
            Some(Base::Last)
        }
        Some(b) if b.is_ascii_digit() => {
            let (n, used) = parse_number(&input[pos..])?;
            pos += used;
            Some(Base::Line(n as usize))
        }
        _ => None,
    };

    let mut offset = 0i64;
    let mut has_offset = false;
    while let Some(&(sign @ (b'+' | b'-'))) = input.get(pos) {
        pos += 1;
        let step = match input.get(pos) {
            Some(b) if b.is_ascii_digit() => {
                let (n, used) = parse_number(&input[pos..])?;
                pos += used;
                n as i64
            }
            _ => 1,
        };
        let next = if sign == b'+' {
            offset.checked_add(step)
        } else {
            offset.checked_sub(step)
        };
        offset = next.ok_or_else(|| CmdError::InvalidRange("line offset out of bounds".into()))?;
        has_offset = true;
    }

    let address = match base {
        Some(base) => Some(Address::new(base, offset)),
        None if has_offset => Some(Address::new(Base::Current, offset)),
        None => None,
    };
    Ok((address, pos))
}

fn parse_number(input: &[u8]) -> Result<(u64, usize)> {
    let used = input
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(input.len());
    // Digits are ASCII, so this never fails to decode.
    let digits = std::str::from_utf8(&input[..used]).unwrap_or_default();
    let n = digits
        .parse::<u64>()
        .map_err(|_| CmdError::InvalidRange(format!("line number too large: {digits}")))?;
    Ok((n.min(i64::MAX as u64 / 2), used))
}
