use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{data_type::NumType, exerr, operators::Operator, parser, ExError, ExResult};

pub mod eval;
pub mod flatten;
#[cfg(feature = "serde")]
mod serde;
pub mod symbol;

use symbol::Symbol;

/// Leaf of an expression tree.
#[derive(Clone, PartialEq, Debug)]
pub enum Terminal<T> {
    Num(T),
    Sym(Symbol),
}

/// Inner node of an expression tree. It always has at least one operand. Only a
/// negation, i.e., a unary `-`, has exactly one.
#[derive(Clone, PartialEq, Debug)]
pub struct OpNode<T> {
    op: Operator,
    operands: Vec<Expr<T>>,
}

impl<T> OpNode<T> {
    pub fn op(&self) -> Operator {
        self.op
    }
    pub fn operands(&self) -> &[Expr<T>] {
        &self.operands
    }
    pub fn is_negation(&self) -> bool {
        self.op == Operator::Sub && self.operands.len() == 1
    }
}

/// What a node holds besides its operands. Used to construct nodes with
/// [`Expr::new`](Expr::new) and to inspect them with [`Expr::value`](Expr::value).
#[derive(Clone, PartialEq, Debug)]
pub enum NodeValue<T> {
    Num(T),
    Sym(Symbol),
    Op(Operator),
}

/// A node in an expression tree, either a terminal or an operator with its operands.
/// Each node owns its operands.
///
/// Equality is structural. The trees of `2*(x+1)` and `2*x+2` are different, even though
/// they evaluate to the same numbers.
///
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use symexpr::{parse, Expr, Operator};
/// let expr = parse::<f64>("2.5x")?;
/// let reference = Expr::op(Operator::Mul, vec![Expr::num(2.5), Expr::sym("x")?])?;
/// assert_eq!(expr, reference);
/// #
/// #     Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Debug)]
pub enum Expr<T = f64> {
    Terminal(Terminal<T>),
    Op(OpNode<T>),
}

impl<T: NumType> Expr<T> {
    /// Creates a node from a value and optional operands.
    ///
    /// # Errors
    ///
    /// A [`Construction`](crate::ExErrorKind::Construction) error is returned if an operator
    /// comes without operands or with an empty list of operands, or if a number or a
    /// symbol comes with operands.
    pub fn new(value: NodeValue<T>, operands: Option<Vec<Expr<T>>>) -> ExResult<Self> {
        match (value, operands) {
            (NodeValue::Op(op), Some(operands)) => Self::op(op, operands),
            (NodeValue::Op(op), None) => Err(exerr!(
                Construction,
                "an expression with the operator {} as value must have operands",
                op
            )),
            (NodeValue::Num(_) | NodeValue::Sym(_), Some(_)) => Err(exerr!(
                Construction,
                "an expression without an operator as value cannot have operands"
            )),
            (NodeValue::Num(x), None) => Ok(Self::num(x)),
            (NodeValue::Sym(s), None) => Ok(Self::from_symbol(s)),
        }
    }

    /// Like [`Expr::new`](Expr::new) for operator nodes but with the operator given by its
    /// representation, e.g., `"+"`. Unknown representations are construction errors.
    pub fn from_tag(tag: &str, operands: Option<Vec<Expr<T>>>) -> ExResult<Self> {
        Self::new(NodeValue::Op(tag.parse::<Operator>()?), operands)
    }

    pub fn num(x: T) -> Self {
        Expr::Terminal(Terminal::Num(x))
    }

    pub fn from_symbol(s: Symbol) -> Self {
        Expr::Terminal(Terminal::Sym(s))
    }

    /// Creates a symbol terminal, see [`Symbol::new`](Symbol::new) for the errors.
    pub fn sym(name: &str) -> ExResult<Self> {
        Ok(Self::from_symbol(Symbol::new(name)?))
    }

    /// Creates an operator node.
    ///
    /// # Errors
    ///
    /// A [`Construction`](crate::ExErrorKind::Construction) error is returned if there are
    /// no operands, or if there is exactly one and the operator is not `-`.
    pub fn op(op: Operator, operands: Vec<Expr<T>>) -> ExResult<Self> {
        match operands.len() {
            0 => Err(exerr!(
                Construction,
                "an expression with the operator {} as value must have operands",
                op
            )),
            1 if op != Operator::Sub => Err(exerr!(
                Construction,
                "only {} can be unary, not {}",
                Operator::Sub,
                op
            )),
            _ => Ok(Expr::Op(OpNode { op, operands })),
        }
    }

    pub fn negation(operand: Expr<T>) -> Self {
        Expr::Op(OpNode {
            op: Operator::Sub,
            operands: vec![operand],
        })
    }

    pub fn binary(op: Operator, left: Expr<T>, right: Expr<T>) -> Self {
        Expr::Op(OpNode {
            op,
            operands: vec![left, right],
        })
    }

    pub fn value(&self) -> NodeValue<T> {
        match self {
            Expr::Terminal(Terminal::Num(x)) => NodeValue::Num(*x),
            Expr::Terminal(Terminal::Sym(s)) => NodeValue::Sym(s.clone()),
            Expr::Op(node) => NodeValue::Op(node.op),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Expr::Terminal(_))
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            Expr::Op(node) => Some(node.op),
            Expr::Terminal(_) => None,
        }
    }

    /// Operands of the node, empty for terminals.
    pub fn operands(&self) -> &[Expr<T>] {
        match self {
            Expr::Op(node) => &node.operands,
            Expr::Terminal(_) => &[],
        }
    }

    pub fn as_num(&self) -> Option<T> {
        match self {
            Expr::Terminal(Terminal::Num(x)) => Some(*x),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Expr::Terminal(Terminal::Sym(s)) => Some(s),
            _ => None,
        }
    }

    /// Appends operands to an operator node.
    ///
    /// # Errors
    ///
    /// Terminals cannot have operands, so an [`Operand`](crate::ExErrorKind::Operand)
    /// error is returned if `self` is one.
    pub fn add_operands(&mut self, new_operands: Vec<Expr<T>>) -> ExResult<()> {
        match self {
            Expr::Op(node) => {
                node.operands.extend(new_operands);
                Ok(())
            }
            Expr::Terminal(_) => Err(exerr!(Operand, "cannot add operands to terminal {}", self)),
        }
    }

    /// Removes the operand at `index` and returns it.
    ///
    /// # Errors
    ///
    /// An [`Operand`](crate::ExErrorKind::Operand) error is returned if `self` is a terminal,
    /// if the index is out of range, or if fewer than two operands would remain. A binary
    /// operation does not silently turn into a unary one.
    pub fn remove_operand(&mut self, index: usize) -> ExResult<Expr<T>> {
        match self {
            Expr::Op(node) => {
                let n_operands = node.operands.len();
                if index >= n_operands {
                    Err(exerr!(
                        Operand,
                        "index {} out of range for {} operands",
                        index,
                        n_operands
                    ))
                } else if n_operands <= 2 {
                    Err(exerr!(
                        Operand,
                        "cannot remove an operand of operator {} with {} operands",
                        node.op,
                        n_operands
                    ))
                } else {
                    Ok(node.operands.remove(index))
                }
            }
            Expr::Terminal(_) => Err(exerr!(
                Operand,
                "cannot remove operands from terminal {}",
                self
            )),
        }
    }

    /// Returns the names of the symbols in the tree in alphabetical order without duplicates.
    pub fn var_names(&self) -> Vec<&str> {
        fn collect<'a, T>(expr: &'a Expr<T>, names: &mut Vec<&'a str>) {
            match expr {
                Expr::Terminal(Terminal::Sym(s)) => names.push(s.name()),
                Expr::Terminal(Terminal::Num(_)) => (),
                Expr::Op(node) => node.operands.iter().for_each(|o| collect(o, names)),
            }
        }
        let mut names = vec![];
        collect(self, &mut names);
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Merges nested chains of the same unordered operator, see [`flatten`](flatten::flatten).
    pub fn flatten(self) -> Self {
        flatten::flatten(self)
    }
}

impl<T: NumType> FromStr for Expr<T> {
    type Err = ExError;
    fn from_str(text: &str) -> ExResult<Self> {
        parser::parse(text)
    }
}

fn write_operand<T: Display>(f: &mut Formatter, operand: &Expr<T>) -> fmt::Result {
    match operand {
        Expr::Op(_) => write!(f, "({})", operand),
        Expr::Terminal(_) => write!(f, "{}", operand),
    }
}

/// Writes an infix string that parses back to an equal tree. Nested operator nodes
/// are parenthesized.
impl<T: Display> Display for Expr<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Terminal(Terminal::Num(x)) => write!(f, "{x}"),
            Expr::Terminal(Terminal::Sym(s)) => write!(f, "{s}"),
            Expr::Op(node) if node.operands.len() == 1 => {
                write!(f, "{}", node.op)?;
                write_operand(f, &node.operands[0])
            }
            Expr::Op(node) => {
                for (i, operand) in node.operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", node.op)?;
                    }
                    write_operand(f, operand)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
use crate::ExErrorKind;

#[cfg(test)]
fn x() -> Expr<f64> {
    Expr::sym("x").unwrap()
}

#[test]
fn test_new() {
    assert_eq!(Expr::new(NodeValue::Num(2.7), None).unwrap().as_num(), Some(2.7));
    assert_eq!(Expr::new(NodeValue::Num(0.0), None).unwrap().as_num(), Some(0.0));
    let s = Symbol::new("x").unwrap();
    let expr = Expr::<f64>::new(NodeValue::Sym(s.clone()), None).unwrap();
    assert_eq!(expr.as_symbol(), Some(&s));
    assert_eq!(expr.value(), NodeValue::Sym(s));

    let err = Expr::new(NodeValue::Num(2.7), Some(vec![Expr::num(5.8), x()])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let err = Expr::new(NodeValue::Num(2.7), Some(vec![])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);

    for op in [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Pow,
    ] {
        let err = Expr::<f64>::new(NodeValue::Op(op), None).unwrap_err();
        assert_eq!(err.kind, ExErrorKind::Construction);
        assert!(err.msg.contains("must have operands"));
        let err = Expr::<f64>::op(op, vec![]).unwrap_err();
        assert_eq!(err.kind, ExErrorKind::Construction);
        let unary = Expr::<f64>::op(op, vec![x()]);
        if op == Operator::Sub {
            assert_eq!(unary.unwrap(), Expr::negation(x()));
        } else {
            let err = unary.unwrap_err();
            assert_eq!(err.kind, ExErrorKind::Construction);
            assert!(err.msg.contains("can be unary"));
            let err = Expr::<f64>::new(NodeValue::Op(op), Some(vec![x()])).unwrap_err();
            assert_eq!(err.kind, ExErrorKind::Construction);
        }
    }
    let expr = Expr::new(NodeValue::Op(Operator::Add), Some(vec![Expr::num(1.0), x()])).unwrap();
    assert_eq!(expr.operator(), Some(Operator::Add));
    assert_eq!(expr.operands().len(), 2);
}

#[test]
fn test_from_tag() {
    let expr = Expr::from_tag("*", Some(vec![Expr::num(2.0), x()])).unwrap();
    assert_eq!(expr, Expr::binary(Operator::Mul, Expr::num(2.0), x()));
    let err = Expr::from_tag("%", Some(vec![Expr::num(2.0), x()])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let err = Expr::<f64>::from_tag("^", None).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
}

#[test]
fn test_equality() {
    let a = Expr::binary(Operator::Add, Expr::num(1.0), x());
    let b = Expr::binary(Operator::Add, Expr::num(1.0), x());
    assert_eq!(a, a);
    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_ne!(a, Expr::binary(Operator::Add, x(), Expr::num(1.0)));
    assert_ne!(a, Expr::binary(Operator::Mul, Expr::num(1.0), x()));
    assert_ne!(a, Expr::op(Operator::Add, vec![Expr::num(1.0), x(), x()]).unwrap());
    assert_ne!(Expr::num(1.0), x());
    assert_ne!(Expr::<f64>::negation(Expr::num(3.0)), Expr::num(-3.0));
}

#[test]
fn test_add_remove_operands() {
    let mut expr = Expr::binary(Operator::Add, Expr::num(1.0), x());
    expr.add_operands(vec![Expr::num(2.0), Expr::sym("y").unwrap()])
        .unwrap();
    assert_eq!(expr.operands().len(), 4);
    let removed = expr.remove_operand(1).unwrap();
    assert_eq!(removed, x());
    assert_eq!(
        expr,
        Expr::op(
            Operator::Add,
            vec![Expr::num(1.0), Expr::num(2.0), Expr::sym("y").unwrap()]
        )
        .unwrap()
    );
    assert_eq!(expr.remove_operand(3).unwrap_err().kind, ExErrorKind::Operand);
    assert_eq!(expr.remove_operand(2).unwrap(), Expr::sym("y").unwrap());
    // a binary node keeps both operands
    assert_eq!(expr.remove_operand(0).unwrap_err().kind, ExErrorKind::Operand);
    assert_eq!(expr, Expr::binary(Operator::Add, Expr::num(1.0), Expr::num(2.0)));
    let mut diff = Expr::binary(Operator::Sub, x(), Expr::sym("y").unwrap());
    assert_eq!(diff.remove_operand(0).unwrap_err().kind, ExErrorKind::Operand);
    assert_eq!(diff.operands().len(), 2);
    assert!(format!("{diff}").parse::<Expr>().is_ok());

    let mut neg = Expr::negation(Expr::num(3.0));
    assert_eq!(neg.remove_operand(0).unwrap_err().kind, ExErrorKind::Operand);
    assert_eq!(neg.operands().len(), 1);

    let mut terminal = Expr::num(3.0);
    let err = terminal.add_operands(vec![x()]).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Operand);
    assert_eq!(terminal.remove_operand(0).unwrap_err().kind, ExErrorKind::Operand);
    assert_eq!(terminal, Expr::num(3.0));
}

#[test]
fn test_var_names() {
    let expr = Expr::op(
        Operator::Add,
        vec![
            Expr::sym("y").unwrap(),
            Expr::binary(Operator::Mul, x(), Expr::sym("theta").unwrap()),
            x(),
            Expr::num(1.0),
        ],
    )
    .unwrap();
    assert_eq!(expr.var_names(), vec!["theta", "x", "y"]);
    assert!(Expr::<f64>::num(1.0).var_names().is_empty());
}

#[test]
fn test_display() {
    let expr = Expr::op(
        Operator::Add,
        vec![
            Expr::num(2.54),
            Expr::binary(Operator::Sub, x(), Expr::sym("y").unwrap()),
            Expr::negation(Expr::num(3.0)),
        ],
    )
    .unwrap();
    assert_eq!(format!("{expr}"), "2.54+(x-y)+(-3)");
    assert_eq!(
        format!("{}", Expr::negation(Expr::binary(Operator::Pow, x(), Expr::num(2.0)))),
        "-(x^2)"
    );
    assert_eq!(format!("{}", Expr::<f64>::negation(x())), "-x");
}
