use log::trace;

use super::{Expr, Terminal};
use crate::{data_type::NumType, exerr, ExResult};

/// Result of [`Expr::evaluate`](Expr::evaluate).
#[derive(Clone, PartialEq, Debug)]
pub enum Evaluated<T> {
    /// The expression collapsed to a number.
    Num(T),
    /// Nothing in the expression could be resolved, e.g., since it only contains
    /// symbols other than the substituted one. The expression is returned unchanged.
    Unresolved(Expr<T>),
}

impl<T: NumType> Evaluated<T> {
    pub fn num(&self) -> Option<T> {
        match self {
            Evaluated::Num(x) => Some(*x),
            Evaluated::Unresolved(_) => None,
        }
    }

    /// Returns the number or an [`Operand`](crate::ExErrorKind::Operand) error if the
    /// evaluation was not resolved.
    pub fn to_num(self) -> ExResult<T> {
        match self {
            Evaluated::Num(x) => Ok(x),
            Evaluated::Unresolved(expr) => {
                Err(exerr!(Operand, "could not resolve {} to a number", expr))
            }
        }
    }
}

fn eval_node<T: NumType>(expr: &Expr<T>, variable: &str, value: T) -> Option<T> {
    match expr {
        Expr::Terminal(Terminal::Num(x)) => Some(*x),
        Expr::Terminal(Terminal::Sym(s)) => (s.name() == variable).then_some(value),
        Expr::Op(node) if node.is_negation() => {
            eval_node(&node.operands[0], variable, value).map(|x| -x)
        }
        Expr::Op(node) => {
            let resolved = node.operands.iter().filter_map(|operand| {
                let evaluated = eval_node(operand, variable, value);
                if evaluated.is_none() {
                    trace!("dropping unresolved operand {} of {}", operand, node.op);
                }
                evaluated
            });
            node.op.fold(resolved)
        }
    }
}

impl<T: NumType> Expr<T> {
    /// Substitutes `variable` by `value` and folds everything that became numeric.
    ///
    /// Operands that cannot be resolved, i.e., that only depend on other symbols, are
    /// dropped from the fold of their parent. Hence, evaluating `x*y+1` at `x=2` yields
    /// `2+1=3`, not the expression `2*y+1`. A unary minus negates its operand. The tree
    /// itself is not changed.
    ///
    /// # Arguments
    ///
    /// * `variable` - name of the variable to substitute, a `&str` or a [`Symbol`](super::Symbol)
    /// * `value` - number the variable is replaced with
    ///
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use symexpr::parse;
    /// let expr = parse::<f64>("4x^3+3x^2+2x+1")?;
    /// assert_eq!(expr.evaluate("x", 1.0).to_num()?, 10.0);
    /// assert_eq!(expr.evaluate("x", -1.0).to_num()?, -2.0);
    /// #
    /// #     Ok(())
    /// # }
    /// ```
    pub fn evaluate<V: AsRef<str>>(&self, variable: V, value: T) -> Evaluated<T> {
        match eval_node(self, variable.as_ref(), value) {
            Some(x) => Evaluated::Num(x),
            None => Evaluated::Unresolved(self.clone()),
        }
    }
}

#[cfg(test)]
use crate::{
    parser::parse,
    util::{assert_float_eq_f32, assert_float_eq_f64},
    ExErrorKind, Operator, Symbol,
};

#[test]
fn test_terminals() {
    let x = Expr::<f64>::sym("x").unwrap();
    assert_eq!(x.evaluate("x", 2.5), Evaluated::Num(2.5));
    assert_eq!(x.evaluate("y", 2.5), Evaluated::Unresolved(x.clone()));
    assert_eq!(Expr::num(1.5).evaluate("x", 2.5), Evaluated::Num(1.5));
    let theta = Symbol::new("theta").unwrap();
    let expr = Expr::<f64>::from_symbol(theta.clone());
    assert_eq!(expr.evaluate(&theta, 0.5).num(), Some(0.5));
    assert_eq!(expr.evaluate("t", 0.5).num(), None);
}

#[test]
fn test_polynomial() {
    let expr = parse::<f64>("4x^3+3x^2+2x+1").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 1.0).to_num().unwrap(), 10.0);
    assert_float_eq_f64(expr.evaluate("x", 0.0).to_num().unwrap(), 1.0);
    assert_float_eq_f64(expr.evaluate("x", -1.0).to_num().unwrap(), -2.0);
    assert_float_eq_f64(expr.evaluate("x", 2.0).to_num().unwrap(), 49.0);

    let expr = parse::<f32>("0.5x^2-3").unwrap();
    assert_float_eq_f32(expr.evaluate("x", 3.0).to_num().unwrap(), 1.5);
}

#[test]
fn test_negation() {
    let expr = parse::<f64>("-3").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 0.0).to_num().unwrap(), -3.0);
    let expr = parse::<f64>("-x^2").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 3.0).to_num().unwrap(), -9.0);
    let expr = parse::<f64>("2*-(x+1)").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 3.0).to_num().unwrap(), -8.0);
}

#[test]
fn test_partial_substitution() {
    // unresolved operands are dropped from the fold
    let expr = parse::<f64>("x*y+1").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 2.0).to_num().unwrap(), 3.0);
    let expr = parse::<f64>("x-y").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 2.0).to_num().unwrap(), 2.0);
    assert_float_eq_f64(expr.evaluate("y", 2.0).to_num().unwrap(), 2.0);

    let expr = parse::<f64>("y^2+z").unwrap();
    assert_float_eq_f64(expr.evaluate("x", 5.0).to_num().unwrap(), 2.0);

    let expr = parse::<f64>("y*z").unwrap();
    let evaluated = expr.evaluate("x", 2.0);
    assert_eq!(evaluated, Evaluated::Unresolved(expr.clone()));
    assert_eq!(evaluated.to_num().unwrap_err().kind, ExErrorKind::Operand);
}

#[test]
fn test_no_mutation() {
    let expr = Expr::binary(Operator::Div, Expr::sym("x").unwrap(), Expr::num(4.0));
    let before = expr.clone();
    assert_float_eq_f64(expr.evaluate("x", 2.0).to_num().unwrap(), 0.5);
    assert_eq!(expr, before);
}
