use super::{Expr, OpNode};

/// Flattens an expression tree bottom-up.
///
/// Every operand that carries the same operator as its parent is replaced in place by its
/// own operands, if the operator is unordered, i.e., `+` or `*`. Hence, afterwards no `+`
/// has a `+` as a child and no `*` has a `*` as a child. Nodes of the ordered operators
/// `-`, `/`, and `^` are left as they are, since regrouping them changes the result.
///
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use symexpr::{Expr, Operator};
/// let nested = Expr::binary(
///     Operator::Add,
///     Expr::num(2.0),
///     Expr::binary(Operator::Add, Expr::sym("x")?, Expr::sym("y")?),
/// );
/// let flat = Expr::op(
///     Operator::Add,
///     vec![Expr::num(2.0), Expr::sym("x")?, Expr::sym("y")?],
/// )?;
/// assert_eq!(nested.flatten(), flat);
/// #
/// #     Ok(())
/// # }
/// ```
pub fn flatten<T>(expr: Expr<T>) -> Expr<T> {
    match expr {
        Expr::Terminal(_) => expr,
        Expr::Op(OpNode { op, operands }) => {
            let mut flat_operands = Vec::with_capacity(operands.len());
            for operand in operands.into_iter().map(flatten) {
                match operand {
                    Expr::Op(child) if !op.is_ordered() && child.op == op => {
                        flat_operands.extend(child.operands)
                    }
                    _ => flat_operands.push(operand),
                }
            }
            Expr::Op(OpNode {
                op,
                operands: flat_operands,
            })
        }
    }
}

#[cfg(test)]
use crate::Operator;

#[cfg(test)]
fn sym(name: &str) -> Expr<f64> {
    Expr::sym(name).unwrap()
}

#[test]
fn test_flatten_unordered() {
    // (x + 1) + (2 + (y + 3))
    let expr = Expr::binary(
        Operator::Add,
        Expr::binary(Operator::Add, sym("x"), Expr::num(1.0)),
        Expr::binary(
            Operator::Add,
            Expr::num(2.0),
            Expr::binary(Operator::Add, sym("y"), Expr::num(3.0)),
        ),
    );
    let reference = Expr::op(
        Operator::Add,
        vec![sym("x"), Expr::num(1.0), Expr::num(2.0), sym("y"), Expr::num(3.0)],
    )
    .unwrap();
    let flat = flatten(expr);
    assert_eq!(flat, reference);
    assert_eq!(flatten(flat.clone()), flat);
}

#[test]
fn test_flatten_keeps_other_operators() {
    // 2 * (x + (y + z)) * w
    let expr = Expr::binary(
        Operator::Mul,
        Expr::binary(
            Operator::Mul,
            Expr::num(2.0),
            Expr::binary(
                Operator::Add,
                sym("x"),
                Expr::binary(Operator::Add, sym("y"), sym("z")),
            ),
        ),
        sym("w"),
    );
    let reference = Expr::op(
        Operator::Mul,
        vec![
            Expr::num(2.0),
            Expr::op(Operator::Add, vec![sym("x"), sym("y"), sym("z")]).unwrap(),
            sym("w"),
        ],
    )
    .unwrap();
    assert_eq!(flatten(expr), reference);
}

#[test]
fn test_flatten_ordered() {
    for op in [Operator::Sub, Operator::Div, Operator::Pow] {
        let expr = Expr::binary(
            op,
            Expr::num(6.8),
            Expr::binary(op, Expr::num(3.4), Expr::num(6.7)),
        );
        assert_eq!(flatten(expr.clone()), expr);
    }
    let neg = Expr::negation(Expr::negation(sym("x")));
    assert_eq!(flatten(neg.clone()), neg);
    assert_eq!(flatten(Expr::num(1.5)), Expr::num(1.5));
}
