//! Argument splitting.

use super::is_blank;
use crate::environment::Environment;
use crate::error::{CmdError, Result};

/// Per-command splitting rules.
#[derive(Clone, Copy, Default)]
pub struct SplitOptions<'e> {
    /// Honour `'...'` and `"..."`.
    pub quotes: bool,
    /// Expand `$NAME` outside single quotes.
    pub env: Option<&'e dyn Environment>,
}

/// Decode argument bytes, reporting where the encoding breaks.
pub fn text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| CmdError::MalformedEncoding {
        offset: e.valid_up_to(),
    })
}

/// Drop trailing blanks unless the last one is escaped.
pub fn trim_trailing_blanks(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && is_blank(bytes[end - 1]) {
        let backslashes = bytes[..end - 1]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 1 {
            break;
        }
        end -= 1;
    }
    &bytes[..end]
}

/// Split a segment body into arguments.
///
/// Runs of blanks separate arguments. A backslash makes the next character
/// literal (so `\ ` is an argument holding one space); a lone trailing
/// backslash is kept as is. Any other byte, control characters included,
/// is argument content.
pub fn split_args(body: &[u8], opts: SplitOptions<'_>) -> Result<Vec<String>> {
    let body = text(body)?;

    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some(_) => match c {
                '"' => quote = None,
                '\\' => current.push(chars.next().unwrap_or('\\')),
                '$' if opts.env.is_some() => expand_var(&mut chars, &mut current, opts.env),
                _ => current.push(c),
            },
            None => match c {
                ' ' | '\t' => {
                    if in_arg {
                        argv.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                '\\' => {
                    in_arg = true;
                    current.push(chars.next().unwrap_or('\\'));
                }
                '\'' | '"' if opts.quotes => {
                    in_arg = true;
                    quote = Some(c);
                }
                '$' if opts.env.is_some() => {
                    in_arg = true;
                    expand_var(&mut chars, &mut current, opts.env);
                }
                _ => {
                    in_arg = true;
                    current.push(c);
                }
            },
        }
    }

    if let Some(q) = quote {
        return Err(CmdError::UnterminatedQuote { quote: q });
    }
    if in_arg {
        argv.push(current);
    }
    Ok(argv)
}

fn expand_var(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
    env: Option<&dyn Environment>,
) {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        out.push('$');
        return;
    }
    if let Some(value) = env.and_then(|env| env.get(&name)) {
        out.push_str(&value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MemoryEnv;
    use proptest::prelude::*;

    fn split(body: &str) -> Vec<String> {
        split_args(body.as_bytes(), SplitOptions::default()).unwrap()
    }

    fn quoted(body: &str) -> Vec<String> {
        split_args(
            body.as_bytes(),
            SplitOptions {
                quotes: true,
                env: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn blanks_collapse() {
        assert_eq!(split("  a \t b   c "), ["a", "b", "c"]);
        assert!(split("   ").is_empty());
    }

    #[test]
    fn escaped_space_is_an_argument() {
        assert_eq!(split("\\ "), [" "]);
        assert_eq!(split("a\\ b c"), ["a b", "c"]);
    }

    #[test]
    fn form_feed_is_content() {
        assert_eq!(split("\x0C"), ["\x0C"]);
    }

    #[test]
    fn lone_trailing_backslash_is_kept() {
        assert_eq!(split("a\\"), ["a\\"]);
    }

    #[test]
    fn quotes_only_when_enabled() {
        assert_eq!(quoted("'a b' \"c\\\"d\""), ["a b", "c\"d"]);
        assert_eq!(split("'a b'"), ["'a", "b'"]);
        assert_eq!(quoted("''"), [""]);
    }

    #[test]
    fn single_quotes_keep_backslashes() {
        assert_eq!(quoted("'a\\b'"), ["a\\b"]);
    }

    #[test]
    fn unterminated_quote_fails() {
        let err = split_args(
            b"\"abc",
            SplitOptions {
                quotes: true,
                env: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, CmdError::UnterminatedQuote { quote: '"' });
    }

    #[test]
    fn env_expansion() {
        let env = MemoryEnv::new().with("DIR", "/tmp/x");
        let opts = SplitOptions {
            quotes: true,
            env: Some(&env),
        };
        let argv = split_args(b"$DIR/a \"$DIR\" '$DIR' \\$DIR $ $MISSING", opts).unwrap();
        assert_eq!(argv, ["/tmp/x/a", "/tmp/x", "$DIR", "$DIR", "$", ""]);
    }

    #[test]
    fn malformed_encoding_reports_offset() {
        let err = split_args(b"ab \xee\x85", SplitOptions::default()).unwrap_err();
        assert_eq!(err, CmdError::MalformedEncoding { offset: 3 });
    }

    #[test]
    fn trim_keeps_escaped_blank() {
        assert_eq!(trim_trailing_blanks(b"a \\  "), b"a \\ ");
        assert_eq!(trim_trailing_blanks(b"a\\\\  "), b"a\\\\");
        assert_eq!(trim_trailing_blanks(b"   "), b"");
    }

    proptest! {
        #[test]
        fn splitter_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = split_args(&bytes, SplitOptions { quotes: true, env: None });
        }

        #[test]
        fn plain_words_survive(words in proptest::collection::vec("[a-z0-9]{1,8}", 1..6)) {
            let line = words.join("  ");
            prop_assert_eq!(split(&line), words);
        }
    }
}
