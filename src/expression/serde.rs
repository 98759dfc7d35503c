use std::{fmt, marker::PhantomData};

use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

use crate::{data_type::NumType, parse, Expr, Symbol};

impl<T: NumType> Serialize for Expr<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, T: NumType> Deserialize<'de> for Expr<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ExprVisitor {
            num_dummy: PhantomData,
        })
    }
}

#[derive(Debug)]
struct ExprVisitor<T> {
    num_dummy: PhantomData<T>,
}

impl<'de, T: NumType> Visitor<'de> for ExprVisitor<T> {
    type Value = Expr<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a &str that can be parsed by `symexpr` crate")
    }

    fn visit_str<E>(self, unparsed: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse(unparsed).map_err(|epe| E::custom(format!("Parse error - {}", epe.msg)))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(SymbolVisitor)
    }
}

struct SymbolVisitor;

impl<'de> Visitor<'de> for SymbolVisitor {
    type Value = Symbol;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a non-empty &str of ASCII letters")
    }

    fn visit_str<E>(self, name: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Symbol::new(name).map_err(|e| E::custom(e.msg))
    }
}

#[cfg(test)]
use serde_test::Token;

#[test]
fn test_ser_de() {
    let test = |s, reference| {
        let expr = parse::<f64>(s).unwrap();
        serde_test::assert_ser_tokens(&expr, &[Token::Str(reference)]);
        let serialized = serde_json::to_string(&expr).unwrap();
        let deserialized = serde_json::from_str::<Expr<f64>>(serialized.as_str()).unwrap();
        assert_eq!(deserialized, expr);
        assert_eq!(reference, format!("{}", deserialized));
    };

    test("2.54 + x + y", "2.54+x+y");
    test("2.5x", "2.5*x");
    test("6.8-3.4-6.7", "6.8-(3.4-6.7)");
    test("-(x+1)^2", "-((x+1)^2)");
    test("4x^3+3x^2+2x+1", "(4*(x^3))+(3*(x^2))+(2*x)+1");
}

#[test]
fn test_de_errors() {
    assert!(serde_json::from_str::<Expr<f64>>("\"2+\"").is_err());
    assert!(serde_json::from_str::<Expr<f64>>("3").is_err());
}

#[test]
fn test_symbol_ser_de() {
    let theta = Symbol::new("theta").unwrap();
    serde_test::assert_tokens(&theta, &[Token::Str("theta")]);
    assert!(serde_json::from_str::<Symbol>("\"x1\"").is_err());
}
