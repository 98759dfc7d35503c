#![doc(html_root_url = "https://docs.rs/symexpr/0.1.0")]
//! Symexpr is a small symbolic-algebra front end. It parses infix arithmetic with numbers,
//! variables, the operators `+`, `-`, `*`, `/`, `^`, and parentheses into an expression
//! tree, flattens chains of `+` and `*`, and evaluates trees by substituting a number for
//! a variable.
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use symexpr::{parse, Expr, Operator};
//! let expr = parse::<f64>("2.54 + x + y")?;
//! assert_eq!(
//!     expr,
//!     Expr::op(
//!         Operator::Add,
//!         vec![Expr::num(2.54), Expr::sym("x")?, Expr::sym("y")?]
//!     )?
//! );
//! assert_eq!(expr.evaluate("x", 1.0).to_num()?, 3.54);
//! #
//! #     Ok(())
//! # }
//! ```
//! A number that is directly followed by a variable is multiplied with it, e.g., `2.5x`
//! is the same as `2.5*x`. Whitespace separates tokens and is never an
//! implicit multiplication, so `2 x` and `2 2` are syntax errors, while `2 * x` is fine.
//! A leading `-` is a negation with a single operand. It binds tighter than `*` and `/`
//! but looser than `^`, i.e., `-x^2` is `-(x^2)` and `2^-3*4` is `(2^(-3))*4`.
//!
//! ## Associativity
//!
//! Operators of the same priority nest to the right. The tree of `6.8-3.4-6.7` is
//! `6.8-(3.4-6.7)`. While the unordered operators `+` and `*` are flattened into one node
//! afterwards, the ordered operators `-`, `/`, and `^` keep their nesting.
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use symexpr::{parse, Expr, Operator};
//! let expr = parse::<f64>("2^3^5")?;
//! let reference = Expr::binary(
//!     Operator::Pow,
//!     Expr::num(2.0),
//!     Expr::binary(Operator::Pow, Expr::num(3.0), Expr::num(5.0)),
//! );
//! assert_eq!(expr, reference);
//! #
//! #     Ok(())
//! # }
//! ```
//!
//! ## Partial substitution
//!
//! [`Expr::evaluate`](Expr::evaluate) substitutes exactly one variable. Operands that still
//! depend on other variables are dropped from the fold of their parent instead of being
//! kept symbolically.
//! ```rust
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use symexpr::{parse, Evaluated};
//! let expr = parse::<f64>("x*y+1")?;
//! assert_eq!(expr.evaluate("x", 2.0), Evaluated::Num(3.0));
//! let expr = parse::<f64>("y*z")?;
//! assert_eq!(expr.evaluate("x", 2.0), Evaluated::Unresolved(expr.clone()));
//! #
//! #     Ok(())
//! # }
//! ```
//!
//! ## Serialization
//!
//! With the feature `serde`, expressions and symbols are (de-)serialized as strings.
//!

mod data_type;
mod expression;
mod operators;
mod parser;
mod result;
mod util;

pub use {
    data_type::NumType,
    expression::{
        eval::Evaluated,
        flatten::flatten,
        symbol::Symbol,
        Expr, NodeValue, OpNode, Terminal,
    },
    operators::{Operator, OperatorInfo, OPERATOR_TABLE},
    parser::{parse, MAX_DEPTH},
    result::{ExError, ExErrorKind, ExResult},
};
