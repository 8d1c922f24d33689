//! Separator resolution: where does the current sub-command end?
//!
//! The same characters play different roles depending on the command:
//! `|` separates sub-commands except inside an operator-aware command's
//! `||`; `&` is a background marker only when nothing but blanks (and an
//! optional separator) follows it.

use super::is_blank;
use crate::error::{CmdError, Result};

/// How a command's tail is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailMode {
    /// Quote characters are ordinary bytes.
    Plain,
    /// `'...'` and `"..."` hide `|` and `&`.
    Quoted,
    /// Quoted, and `||`/`&&` are operators rather than separators.
    Expression,
    /// The rest of the line belongs to the command. A trailing `&` is
    /// recognised only when `detect_bg` is set.
    Raw { detect_bg: bool },
}

impl TailMode {
    fn quotes(self) -> bool {
        matches!(self, TailMode::Quoted | TailMode::Expression)
    }
}

/// One sub-command's share of the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Argument text with any background marker removed.
    pub body: &'a [u8],
    pub bg: bool,
    /// Text after the separating `|`, if there was one.
    pub rest: Option<&'a [u8]>,
}

/// Split `tail` at the first separating `|` and detect a background `&`.
pub fn split_segment(tail: &[u8], mode: TailMode) -> Result<Segment<'_>> {
    let mut quote: Option<u8> = None;
    let mut amp: Option<usize> = None;
    let mut end = tail.len();
    let mut rest = None;

    let mut i = 0;
    while i < tail.len() {
        let c = tail[i];

        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else if c == b'\\' && q == b'"' {
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }

        match c {
            b'\\' => {
                amp = None;
                i += 2;
                continue;
            }
            b'\'' | b'"' if mode.quotes() => {
                quote = Some(c);
                amp = None;
            }
            b'|' | b'&' if mode == TailMode::Expression && tail.get(i + 1) == Some(&c) => {
                amp = None;
                i += 2;
                continue;
            }
            b'|' if !matches!(mode, TailMode::Raw { .. }) => {
                end = i;
                rest = Some(&tail[i + 1..]);
                break;
            }
            b'&' => amp = Some(i),
            c if is_blank(c) => {}
            _ => amp = None,
        }
        i += 1;
    }

    if let Some(q) = quote {
        return Err(CmdError::UnterminatedQuote { quote: q as char });
    }

    let detect_bg = !matches!(mode, TailMode::Raw { detect_bg: false });
    let (body, bg) = match amp {
        Some(at) if detect_bg => (&tail[..at], true),
        _ => (&tail[..end], false),
    };
    Ok(Segment { body, bg, rest })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn split(tail: &str, mode: TailMode) -> Segment<'_> {
        split_segment(tail.as_bytes(), mode).unwrap()
    }

    #[rstest]
    #[case("&")]
    #[case("&    ")]
    #[case("&|")]
    #[case("& |")]
    #[case("  &  |  ")]
    fn trailing_amp_is_background(#[case] tail: &str) {
        let seg = split(tail, TailMode::Plain);
        assert!(seg.bg);
        assert!(seg.body.iter().all(|&b| is_blank(b)));
    }

    #[rstest]
    #[case("a&b")]
    #[case("& b")]
    #[case("\\&")]
    #[case("'&'")]
    fn literal_amp_is_argument(#[case] tail: &str) {
        let mode = TailMode::Quoted;
        let seg = split(tail, mode);
        assert!(!seg.bg, "{tail:?}");
        assert_eq!(seg.body, tail.as_bytes());
    }

    #[test]
    fn bar_ends_plain_segment() {
        let seg = split("1 | builtin", TailMode::Plain);
        assert_eq!(seg.body, b"1 ");
        assert_eq!(seg.rest, Some(b" builtin".as_slice()));
    }

    #[test]
    fn double_bar_belongs_to_expression() {
        let seg = split("1 || builtin", TailMode::Expression);
        assert_eq!(seg.body, b"1 || builtin");
        assert_eq!(seg.rest, None);
    }

    #[test]
    fn single_bar_after_double_bar_separates() {
        let seg = split("1 || 0 | builtin", TailMode::Expression);
        assert_eq!(seg.body, b"1 || 0 ");
        assert_eq!(seg.rest, Some(b" builtin".as_slice()));
    }

    #[test]
    fn double_amp_is_not_background() {
        let seg = split("1 &&", TailMode::Expression);
        assert!(!seg.bg);
    }

    #[test]
    fn quotes_hide_bar_only_when_enabled() {
        let quoted = split("'a|b' c", TailMode::Quoted);
        assert_eq!(quoted.rest, None);

        let plain = split("'a|b' c", TailMode::Plain);
        assert_eq!(plain.body, b"'a");
    }

    #[test]
    fn plain_mode_ignores_lone_quote() {
        let seg = split("\" &", TailMode::Plain);
        assert!(seg.bg);
        assert_eq!(seg.body, b"\" ");
    }

    #[test]
    fn escaped_bar_does_not_separate() {
        let seg = split("a\\|b", TailMode::Plain);
        assert_eq!(seg.rest, None);
    }

    #[test]
    fn raw_keeps_everything() {
        let seg = split("udf :builtin & | x", TailMode::Raw { detect_bg: false });
        assert_eq!(seg.body, b"udf :builtin & | x");
        assert!(!seg.bg);

        let seg = split("sleep 1 &", TailMode::Raw { detect_bg: true });
        assert_eq!(seg.body, b"sleep 1 ");
        assert!(seg.bg);
    }

    #[test]
    fn unterminated_quote_fails() {
        assert_eq!(
            split_segment(b"'abc", TailMode::Quoted),
            Err(CmdError::UnterminatedQuote { quote: '\'' })
        );
        assert_eq!(
            split_segment(b"\"a\\\"", TailMode::Expression),
            Err(CmdError::UnterminatedQuote { quote: '"' })
        );
    }

    #[test]
    fn sql_style_quote_doubling() {
        let seg = split("'it''s' | x", TailMode::Expression);
        assert_eq!(seg.body, b"'it''s' ");
    }
}
