//! Recursive-descent parser over the token stream.
//!
//! Precedence, lowest first:
//!
//! | level      | operators                    |
//! |------------|------------------------------|
//! | or         | `\|\|`                       |
//! | and        | `&&`                         |
//! | comparison | `== != < <= > >=`            |
//! | additive   | `+ - .`                      |
//! | unary      | `! - +`                      |
//! | primary    | literals, variables, `( )`   |

use super::eval::EvalError;
use super::lexer::{tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Concat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Str(String),
    /// `$NAME`
    Env(String),
    /// Bare identifier naming a scope variable.
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Left-hand side of `let`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Env(String),
    Var(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Append,
    Add,
    Sub,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Target,
    pub op: AssignOp,
    pub value: Expr,
}

/// Deepest allowed nesting of parentheses and unary operators.
const MAX_NESTING: usize = 64;
/// Most binary operators a single parse may build.
const MAX_OPERATORS: usize = 512;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
    operators: usize,
}

impl Parser {
    fn new(source: &str) -> Result<Self, EvalError> {
        let tokens = tokenize(source).map_err(|(offset, _)| EvalError::Lex {
            offset,
            text: source[offset..].chars().take(16).collect(),
        })?;
        Ok(Self {
            tokens,
            pos: 0,
            nesting: 0,
            operators: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn finish(&self) -> Result<(), EvalError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(EvalError::Trailing(format!("{token:?}"))),
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Result<Expr, EvalError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(EvalError::TooDeep);
        }
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    /// Parse one nested level with `inner`, bounded by [`MAX_NESTING`].
    fn nested(
        &mut self,
        inner: fn(&mut Self) -> Result<Expr, EvalError>,
    ) -> Result<Expr, EvalError> {
        if self.nesting >= MAX_NESTING {
            return Err(EvalError::TooDeep);
        }
        self.nesting += 1;
        let expr = inner(self);
        self.nesting -= 1;
        expr
    }

    fn or(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::And) {
            let rhs = self.comparison()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.additive()?;
        self.binary(op, lhs, rhs)
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                Some(Token::Dot) => BinaryOp::Concat,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = self.binary(op, lhs, rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Pos,
            _ => return self.primary(),
        };
        self.pos += 1;
        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Single(s)) | Some(Token::Double(s)) => Ok(Expr::Str(s)),
            Some(Token::EnvVar(name)) => Ok(Expr::Env(name)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::or)?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Expected(")"));
                }
                Ok(inner)
            }
            Some(token) => Err(EvalError::Unexpected(format!("{token:?}"))),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Parse exactly one expression.
pub fn parse_expression(source: &str) -> Result<Expr, EvalError> {
    let mut parser = Parser::new(source)?;
    let expr = parser.or()?;
    parser.finish()?;
    Ok(expr)
}

/// Parse a blank-separated sequence of expressions, as `echo` takes.
pub fn parse_list(source: &str) -> Result<Vec<Expr>, EvalError> {
    let mut parser = Parser::new(source)?;
    let mut exprs = Vec::new();
    while !parser.at_end() {
        exprs.push(parser.or()?);
    }
    Ok(exprs)
}

/// Parse `target op expr` for `let`.
pub fn parse_assignment(source: &str) -> Result<Assignment, EvalError> {
    let mut parser = Parser::new(source)?;
    let target = match parser.next() {
        Some(Token::EnvVar(name)) => Target::Env(name),
        Some(Token::Ident(name)) => Target::Var(name),
        Some(token) => return Err(EvalError::BadTarget(format!("{token:?}"))),
        None => return Err(EvalError::UnexpectedEnd),
    };
    let op = match parser.next() {
        Some(Token::Assign) => AssignOp::Set,
        Some(Token::ConcatAssign) => AssignOp::Append,
        Some(Token::AddAssign) => AssignOp::Add,
        Some(Token::SubAssign) => AssignOp::Sub,
        _ => return Err(EvalError::Expected("=")),
    };
    let value = parser.or()?;
    parser.finish()?;
    Ok(Assignment { target, op, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(op: BinaryOp, l: Expr, r: Expr) -> Expr {
        Expr::Binary(op, Box::new(l), Box::new(r))
    }

    #[test]
    fn or_binds_loosest() {
        assert_eq!(
            parse_expression("0 || 1 && 2").unwrap(),
            bin(
                BinaryOp::Or,
                Expr::Int(0),
                bin(BinaryOp::And, Expr::Int(1), Expr::Int(2))
            )
        );
    }

    #[test]
    fn comparison_over_additive() {
        assert_eq!(
            parse_expression("1 + 2 > 2").unwrap(),
            bin(
                BinaryOp::Gt,
                bin(BinaryOp::Add, Expr::Int(1), Expr::Int(2)),
                Expr::Int(2)
            )
        );
    }

    #[test]
    fn parentheses_and_unary() {
        assert_eq!(
            parse_expression("!(a)").unwrap(),
            Expr::Unary(UnaryOp::Not, Box::new(Expr::Var("a".into())))
        );
        assert!(matches!(
            parse_expression("(1"),
            Err(EvalError::Expected(")"))
        ));
    }

    #[test]
    fn list_splits_on_adjacent_primaries() {
        let list = parse_list("'a' . 'b' 3 $X").unwrap();
        assert_eq!(list.len(), 3);
        assert!(parse_list("").unwrap().is_empty());
    }

    #[test]
    fn trailing_tokens_rejected() {
        assert!(matches!(
            parse_expression("1 2"),
            Err(EvalError::Trailing(_))
        ));
    }

    #[test]
    fn assignment_forms() {
        let a = parse_assignment("$a = 0 || 1").unwrap();
        assert_eq!(a.target, Target::Env("a".into()));
        assert_eq!(a.op, AssignOp::Set);
        assert_eq!(
            a.value,
            bin(BinaryOp::Or, Expr::Int(0), Expr::Int(1))
        );

        let a = parse_assignment("count += 2").unwrap();
        assert_eq!(a.target, Target::Var("count".into()));
        assert_eq!(a.op, AssignOp::Add);

        assert_eq!(parse_assignment("x .= 'y'").unwrap().op, AssignOp::Append);
        assert_eq!(parse_assignment("x -= 1").unwrap().op, AssignOp::Sub);
    }

    #[test]
    fn nesting_is_bounded() {
        let ok = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse_expression(&ok).unwrap(), Expr::Int(1));

        let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(parse_expression(&deep), Err(EvalError::TooDeep));
        assert_eq!(parse_expression(&"!".repeat(100_000)), Err(EvalError::TooDeep));
    }

    #[test]
    fn operator_count_is_bounded() {
        let long = vec!["1"; MAX_OPERATORS + 2].join(" + ");
        assert_eq!(parse_expression(&long), Err(EvalError::TooDeep));
        let fits = vec!["1"; MAX_OPERATORS + 1].join(" . ");
        assert!(parse_expression(&fits).is_ok());
    }

    #[test]
    fn assignment_errors() {
        assert!(matches!(parse_assignment("1 = 2"), Err(EvalError::BadTarget(_))));
        assert!(matches!(parse_assignment("x 2"), Err(EvalError::Expected("="))));
        assert!(matches!(parse_assignment("x ="), Err(EvalError::UnexpectedEnd)));
    }
}
