use crate::{exerr, ExResult};
use num::Float;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The closed set of operators an expression can be built from.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Static knowledge about one operator.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct OperatorInfo {
    pub op: Operator,
    /// Representation of the operator in the string to be parsed, e.g., `-`.
    pub repr: char,
    /// A binary operation with a higher number binds tighter. An opening paren
    /// on the parser stack counts as priority 0.
    pub prio: i32,
    /// Whether grouping or order of the operands changes the result. Operands of
    /// unordered operators can be merged freely.
    pub is_ordered: bool,
}

/// One table consulted by the parser for precedences and by the evaluator for folding.
pub static OPERATOR_TABLE: [OperatorInfo; 5] = [
    OperatorInfo {
        op: Operator::Add,
        repr: '+',
        prio: 1,
        is_ordered: false,
    },
    OperatorInfo {
        op: Operator::Sub,
        repr: '-',
        prio: 1,
        is_ordered: true,
    },
    OperatorInfo {
        op: Operator::Mul,
        repr: '*',
        prio: 2,
        is_ordered: false,
    },
    OperatorInfo {
        op: Operator::Div,
        repr: '/',
        prio: 2,
        is_ordered: true,
    },
    OperatorInfo {
        op: Operator::Pow,
        repr: '^',
        prio: 3,
        is_ordered: true,
    },
];

impl Operator {
    pub fn info(&self) -> &'static OperatorInfo {
        // the table is ordered like the variants
        &OPERATOR_TABLE[*self as usize]
    }

    pub fn repr(&self) -> char {
        self.info().repr
    }

    pub fn prio(&self) -> i32 {
        self.info().prio
    }

    pub fn is_ordered(&self) -> bool {
        self.info().is_ordered
    }

    /// Returns the operator represented by `c`, if any.
    pub fn from_char(c: char) -> Option<Operator> {
        OPERATOR_TABLE
            .iter()
            .find(|info| info.repr == c)
            .map(|info| info.op)
    }

    pub fn is_operator(c: char) -> bool {
        Self::from_char(c).is_some()
    }

    /// Applies the binary operation, e.g., `a - b` for [`Operator::Sub`].
    pub fn apply<T: Float>(&self, a: T, b: T) -> T {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => a / b,
            Operator::Pow => a.powf(b),
        }
    }

    /// Folds the operands from left to right with the binary operation. Exponentiation
    /// is folded base-then-exponent, i.e., `[2, 3, 2]` becomes `(2^3)^2`.
    ///
    /// Returns `None` if there are no operands.
    pub fn fold<T: Float, I: IntoIterator<Item = T>>(&self, operands: I) -> Option<T> {
        operands.into_iter().reduce(|acc, x| self.apply(acc, x))
    }
}

impl FromStr for Operator {
    type Err = crate::ExError;
    fn from_str(repr: &str) -> ExResult<Operator> {
        let mut chars = repr.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Operator::from_char(c).ok_or_else(|| exerr!(Construction, "unknown operator {}", repr))
            }
            _ => Err(exerr!(Construction, "unknown operator {}", repr)),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

#[cfg(test)]
use crate::{util::assert_float_eq_f64, ExErrorKind};

#[test]
fn test_table() {
    for (i, info) in OPERATOR_TABLE.iter().enumerate() {
        assert_eq!(info.op as usize, i);
        assert_eq!(Operator::from_char(info.repr), Some(info.op));
    }
    assert!(Operator::Pow.prio() > Operator::Mul.prio());
    assert_eq!(Operator::Mul.prio(), Operator::Div.prio());
    assert!(Operator::Div.prio() > Operator::Sub.prio());
    assert_eq!(Operator::Add.prio(), Operator::Sub.prio());
    assert!(!Operator::Add.is_ordered());
    assert!(!Operator::Mul.is_ordered());
    assert!(Operator::Sub.is_ordered());
    assert!(Operator::Div.is_ordered());
    assert!(Operator::Pow.is_ordered());
    assert!(!Operator::is_operator('('));
    assert!(!Operator::is_operator('%'));
}

#[test]
fn test_from_str() {
    assert_eq!("^".parse::<Operator>().unwrap(), Operator::Pow);
    assert_eq!("/".parse::<Operator>().unwrap(), Operator::Div);
    for repr in ["%", "", "++", "sin"] {
        let err = repr.parse::<Operator>().unwrap_err();
        assert_eq!(err.kind, ExErrorKind::Construction);
    }
}

#[test]
fn test_fold() {
    assert_float_eq_f64(Operator::Add.fold([1.0, 2.0, 3.5]).unwrap(), 6.5);
    assert_float_eq_f64(Operator::Sub.fold([10.0, 2.0, 3.0]).unwrap(), 5.0);
    assert_float_eq_f64(Operator::Mul.fold([2.0, 3.0, 4.0]).unwrap(), 24.0);
    assert_float_eq_f64(Operator::Div.fold([12.0, 2.0, 3.0]).unwrap(), 2.0);
    assert_float_eq_f64(Operator::Pow.fold([2.0, 3.0, 2.0]).unwrap(), 64.0);
    assert_float_eq_f64(Operator::Sub.fold([7.0]).unwrap(), 7.0);
    assert!(Operator::Mul.fold(Vec::<f64>::new()).is_none());
}
