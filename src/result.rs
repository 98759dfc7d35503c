use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// What went wrong, coarsely.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ExErrorKind {
    /// Arguments to a constructor of [`Expr`](crate::Expr) or [`Symbol`](crate::Symbol) do not
    /// describe a valid node, e.g., an operator without operands.
    Construction,
    /// The text passed to [`parse`](crate::parse) is not a valid expression.
    Syntax,
    /// An operand could not be attached to or detached from a node, or a numeric
    /// result was requested from an unresolved evaluation.
    Operand,
}

impl Display for ExErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            ExErrorKind::Construction => "construction error",
            ExErrorKind::Syntax => "syntax error",
            ExErrorKind::Operand => "operand error",
        };
        write!(f, "{name}")
    }
}

/// This will be thrown at you if something within Symexpr went wrong. Ok, obviously it is not an
/// exception, so thrown needs to be understood figuratively.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ExError {
    pub kind: ExErrorKind,
    pub msg: String,
}
impl ExError {
    pub fn new(kind: ExErrorKind, msg: &str) -> ExError {
        ExError {
            kind,
            msg: msg.to_string(),
        }
    }
    pub fn is_syntax(&self) -> bool {
        self.kind == ExErrorKind::Syntax
    }
}
impl Display for ExError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}
impl Error for ExError {}

/// Creates an [`ExError`](ExError) from a kind and a format string.
///
/// ```rust
/// use symexpr::{exerr, ExErrorKind};
/// let e = exerr!(Syntax, "invalid number {}", "1.2.3");
/// assert_eq!(e.kind, ExErrorKind::Syntax);
/// assert_eq!(e.msg, "invalid number 1.2.3");
/// ```
#[macro_export]
macro_rules! exerr {
    ($kind:ident, $s:literal $(, $exps:expr)*) => {
        $crate::ExError::new($crate::ExErrorKind::$kind, format!($s $(, $exps)*).as_str())
    };
}

/// Symexpr' result type with [`ExError`](ExError) as error type.
pub type ExResult<U> = Result<U, ExError>;

#[test]
fn test_display() {
    let err = exerr!(Operand, "index {} out of range", 3);
    assert_eq!(format!("{err}"), "operand error: index 3 out of range");
    assert!(!err.is_syntax());
    assert!(exerr!(Syntax, "mismatched parentheses").is_syntax());
}
