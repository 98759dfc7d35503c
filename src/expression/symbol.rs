use crate::{exerr, ExResult};
use std::fmt::{self, Display, Formatter};

/// A variable like `x` or `theta` that is treated symbolically. Two symbols are
/// equal if their names are.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Symbol {
    name: String,
}

impl Symbol {
    /// Creates a symbol.
    ///
    /// # Errors
    ///
    /// The name must be a non-empty sequence of ASCII letters, otherwise a
    /// [`Construction`](crate::ExErrorKind::Construction) error is returned.
    pub fn new(name: &str) -> ExResult<Symbol> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(exerr!(Construction, "invalid symbol name '{}'", name));
        }
        Ok(Symbol {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
use crate::ExErrorKind;

#[test]
fn test_symbol() {
    let x = Symbol::new("x").unwrap();
    assert_eq!(x, Symbol::new("x").unwrap());
    assert_ne!(x, Symbol::new("y").unwrap());
    assert_eq!(Symbol::new("theta").unwrap().name(), "theta");
    assert_eq!(format!("{}", Symbol::new("Ab").unwrap()), "Ab");
    for invalid in ["", "x1", "x y", "_", "ä"] {
        assert_eq!(
            Symbol::new(invalid).unwrap_err().kind,
            ExErrorKind::Construction
        );
    }
}
