//! The expression language of operator-aware commands (`echo`, `if`,
//! `elseif`, `let`).
//!
//! ```text
//! echo 'a' . "b" 1 + 2
//! if $HOME == '/root' || x >= 3
//! let $PATH .= ':/opt/bin'
//! ```

mod eval;
mod lexer;
mod parser;
mod value;

pub use eval::{EvalError, Evaluator};
pub use lexer::{tokenize, LexError, Token};
pub use parser::{
    parse_assignment, parse_expression, parse_list, AssignOp, Assignment, BinaryOp, Expr,
    Target, UnaryOp,
};
pub use value::Value;
