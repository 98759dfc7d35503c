use num::Float;
use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

/// Gathers `Float`, `FromStr`, `Debug`, and `Display` in one trait.
/// Every type that is used as numeric value of an expression needs to implement this.
/// `f32` and `f64` do.
pub trait NumType: Float + FromStr + Debug + Display {}
impl<T: Float + FromStr + Debug + Display> NumType for T {}
