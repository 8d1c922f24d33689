//! Tokens of the expression language, produced by logos.

use logos::Logos;

/// Lexer error kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    UnexpectedCharacter,
    InvalidNumber,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[token("||")]
    Or,

    #[token("&&")]
    And,

    #[token("==")]
    Eq,

    #[token("!=")]
    Ne,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Assign,

    #[token(".=")]
    ConcatAssign,

    #[token("+=")]
    AddAssign,

    #[token("-=")]
    SubAssign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token(".")]
    Dot,

    #[token("!")]
    Bang,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[regex("[0-9]+", lex_int)]
    Int(i64),

    /// `'...'` with `''` standing for one quote.
    #[regex("'([^']|'')*'", lex_single)]
    Single(String),

    /// `"..."` with backslash escapes processed.
    #[regex(r#""([^"\\]|\\.)*""#, lex_double)]
    Double(String),

    /// `$NAME`, name without the dollar.
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", lex_env)]
    EnvVar(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", lex_ident)]
    Ident(String),
}

fn lex_int(lex: &mut logos::Lexer<Token>) -> Result<i64, LexError> {
    lex.slice().parse().map_err(|_| LexError::InvalidNumber)
}

fn lex_single(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    s[1..s.len() - 1].replace("''", "'")
}

fn lex_double(lex: &mut logos::Lexer<Token>) -> String {
    let s = lex.slice();
    let mut out = String::with_capacity(s.len());
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('e') => out.push('\x1b'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn lex_env(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice()[1..].to_string()
}

fn lex_ident(lex: &mut logos::Lexer<Token>) -> String {
    lex.slice().to_string()
}

/// Tokenize an expression. On failure returns the byte offset and kind of
/// the first bad token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, (usize, LexError)> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(token),
            Err(err) => return Err((span.start, err)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_take_longest_match() {
        assert_eq!(
            tokenize("a||b && c != d .= e").unwrap(),
            vec![
                Token::Ident("a".into()),
                Token::Or,
                Token::Ident("b".into()),
                Token::And,
                Token::Ident("c".into()),
                Token::Ne,
                Token::Ident("d".into()),
                Token::ConcatAssign,
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn string_literals() {
        assert_eq!(
            tokenize(r#"'it''s' "a\"b\n""#).unwrap(),
            vec![Token::Single("it's".into()), Token::Double("a\"b\n".into())]
        );
    }

    #[test]
    fn env_vars_and_ints() {
        assert_eq!(
            tokenize("$HOME 42").unwrap(),
            vec![Token::EnvVar("HOME".into()), Token::Int(42)]
        );
    }

    #[test]
    fn bad_character_reports_offset() {
        let (offset, err) = tokenize("1 + @").unwrap_err();
        assert_eq!(offset, 4);
        assert_eq!(err, LexError::UnexpectedCharacter);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(tokenize("'abc").is_err());
    }

    #[test]
    fn huge_number_is_invalid() {
        let (_, err) = tokenize("99999999999999999999").unwrap_err();
        assert_eq!(err, LexError::InvalidNumber);
    }
}
