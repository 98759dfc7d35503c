#[cfg(test)]
mod utils;
use itertools::{iproduct, Itertools};
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufRead};
use std::str::FromStr;
use symexpr::{
    flatten, parse, Evaluated, ExErrorKind, ExResult, Expr, NodeValue, Operator, Symbol,
};
use utils::assert_float_eq_f64;

fn num(x: f64) -> Expr {
    Expr::num(x)
}
fn sym(name: &str) -> Expr {
    Expr::sym(name).unwrap()
}
fn op(op: Operator, operands: Vec<Expr>) -> Expr {
    Expr::op(op, operands).unwrap()
}

#[test]
fn test_version() {
    // make sure the version strings in the Cargo.toml and lib.rs coincide
    let file = File::open("src/lib.rs").unwrap();
    let version_line_lib = io::BufReader::new(file)
        .lines()
        .find(|line| line.as_ref().unwrap().contains("html_root_url"))
        .unwrap()
        .unwrap();
    let re_version = Regex::new(r#"[0-9]{1,4}\.[0-9]{1,4}\.[0-9]{1,4}"#).unwrap();
    let match_lib = re_version.find(&version_line_lib).unwrap().as_str();

    let toml_string = fs::read_to_string("Cargo.toml").unwrap();
    let cargo_toml: toml::Value = toml::from_str(&toml_string).unwrap();
    let package = cargo_toml.get("package").unwrap().as_table().unwrap();
    let version = package.get("version").unwrap().as_str().unwrap();
    assert_eq!(match_lib, version);
}

#[test]
fn test_terminals() -> ExResult<()> {
    for (text, reference) in [
        ("2", 2.0),
        ("259", 259.0),
        ("34.8", 34.8),
        ("0.48", 0.48),
        (".48", 0.48),
        ("5.", 5.0),
        (" 7 ", 7.0),
    ] {
        assert_eq!(parse::<f64>(text)?, num(reference));
    }
    for name in ["x", "y", "theta", "Ab"] {
        assert_eq!(parse::<f64>(name)?, Expr::from_symbol(Symbol::new(name)?));
    }
    assert_eq!(parse::<f32>("0.25")?, Expr::<f32>::num(0.25));
    Ok(())
}

#[test]
fn test_implicit_multiplication() -> ExResult<()> {
    assert_eq!(
        parse::<f64>("2.5x")?,
        op(Operator::Mul, vec![num(2.5), sym("x")])
    );
    // names are consumed greedily
    assert_eq!(
        parse::<f64>("3xy")?,
        op(Operator::Mul, vec![num(3.0), sym("xy")])
    );
    // chains of multiplications are flattened no matter whether explicit or not
    assert_eq!(
        parse::<f64>("2x*y")?,
        op(Operator::Mul, vec![num(2.0), sym("x"), sym("y")])
    );
    // whitespace separates tokens and does not multiply
    assert!(parse::<f64>("2 x").unwrap_err().is_syntax());
    assert_eq!(parse::<f64>("2 * x")?, parse::<f64>("2x")?);
    Ok(())
}

#[test]
fn test_operators() -> ExResult<()> {
    assert_eq!(
        parse::<f64>("2.54 + x")?,
        op(Operator::Add, vec![num(2.54), sym("x")])
    );
    assert_eq!(
        parse::<f64>("2.54 * x")?,
        op(Operator::Mul, vec![num(2.54), sym("x")])
    );
    assert_eq!(
        parse::<f64>("x^13")?,
        op(Operator::Pow, vec![sym("x"), num(13.0)])
    );
    assert_eq!(parse::<f64>("-3")?, op(Operator::Sub, vec![num(3.0)]));
    assert_eq!(
        parse::<f64>("2.54 - x")?,
        op(Operator::Sub, vec![num(2.54), sym("x")])
    );
    assert_eq!(
        parse::<f64>("x/2")?,
        op(Operator::Div, vec![sym("x"), num(2.0)])
    );
    Ok(())
}

#[test]
fn test_only_flatten_unordered() -> ExResult<()> {
    assert_eq!(
        parse::<f64>("2.54 + x + y")?,
        op(Operator::Add, vec![num(2.54), sym("x"), sym("y")])
    );
    assert_eq!(
        parse::<f64>("2.54 * x * y")?,
        op(Operator::Mul, vec![num(2.54), sym("x"), sym("y")])
    );
    assert_eq!(
        parse::<f64>("2.54 + x - y")?,
        op(
            Operator::Add,
            vec![num(2.54), op(Operator::Sub, vec![sym("x"), sym("y")])]
        )
    );
    for (text, o) in [
        ("6.8 - 3.4 - 6.7", Operator::Sub),
        ("6.8/3.4/6.7", Operator::Div),
        ("6.8^3.4^6.7", Operator::Pow),
    ] {
        assert_eq!(
            parse::<f64>(text)?,
            op(o, vec![num(6.8), op(o, vec![num(3.4), num(6.7)])])
        );
    }
    assert_eq!(
        parse::<f64>("2^3^5")?,
        op(
            Operator::Pow,
            vec![num(2.0), op(Operator::Pow, vec![num(3.0), num(5.0)])]
        )
    );
    Ok(())
}

#[test]
fn test_parens() -> ExResult<()> {
    assert_eq!(parse::<f64>("((x))")?, sym("x"));
    assert_eq!(
        parse::<f64>("(2+x)*(y+3)")?,
        op(
            Operator::Mul,
            vec![
                op(Operator::Add, vec![num(2.0), sym("x")]),
                op(Operator::Add, vec![sym("y"), num(3.0)])
            ]
        )
    );
    // flattened operands keep their position
    assert_eq!(
        parse::<f64>("(2+x)+y")?,
        op(Operator::Add, vec![num(2.0), sym("x"), sym("y")])
    );
    assert_eq!(
        parse::<f64>("(6.8-3.4)-6.7")?,
        op(
            Operator::Sub,
            vec![op(Operator::Sub, vec![num(6.8), num(3.4)]), num(6.7)]
        )
    );
    assert_eq!(
        parse::<f64>("-(x+1)")?,
        op(
            Operator::Sub,
            vec![op(Operator::Add, vec![sym("x"), num(1.0)])]
        )
    );
    Ok(())
}

#[test]
fn test_unary_minus() -> ExResult<()> {
    assert_eq!(
        parse::<f64>("-x^2")?,
        op(
            Operator::Sub,
            vec![op(Operator::Pow, vec![sym("x"), num(2.0)])]
        )
    );
    assert_eq!(
        parse::<f64>("-3+2")?,
        op(Operator::Add, vec![op(Operator::Sub, vec![num(3.0)]), num(2.0)])
    );
    assert_eq!(
        parse::<f64>("2*-3")?,
        op(Operator::Mul, vec![num(2.0), op(Operator::Sub, vec![num(3.0)])])
    );
    assert_eq!(
        parse::<f64>("--x")?,
        op(Operator::Sub, vec![op(Operator::Sub, vec![sym("x")])])
    );
    Ok(())
}

#[test]
fn test_syntax_errors() {
    for text in [
        "2 2", "(2+3", "2+", "2+3)", "", "2%3", "1.2.3", "+2", "2*/3", "x y", "()",
    ] {
        let err = parse::<f64>(text).unwrap_err();
        println!("'{}' -> {}", text, err);
        assert_eq!(err.kind, ExErrorKind::Syntax);
    }
    assert!(parse::<f64>("(2+3")
        .unwrap_err()
        .msg
        .contains("mismatched parentheses"));
    assert!(parse::<f64>("1..5")
        .unwrap_err()
        .msg
        .contains("invalid number"));
    assert!(Expr::<f64>::from_str("2 2")
        .unwrap_err()
        .msg
        .contains("malformed expression"));
}

#[test]
fn test_evaluate() -> ExResult<()> {
    let expr = parse::<f64>("4x^3+3x^2+2x+1")?;
    assert_eq!(expr.evaluate("x", 1.0), Evaluated::Num(10.0));
    assert_eq!(expr.evaluate("x", 0.0), Evaluated::Num(1.0));
    assert_eq!(expr.evaluate("x", -1.0), Evaluated::Num(-2.0));
    let x = Symbol::new("x")?;
    assert_eq!(expr.evaluate(&x, 1.0).to_num()?, 10.0);

    fn test(text: &str, value: f64, reference: f64) -> ExResult<()> {
        println!("testing {}...", text);
        let expr = parse::<f64>(text)?;
        assert_float_eq_f64(expr.evaluate("x", value).to_num()?, reference);
        Ok(())
    }
    test("(x+1)*(x-1)", 3.0, 8.0)?;
    test("2^x", 10.0, 1024.0)?;
    test("x/4/2", 16.0, 8.0)?;
    test("(x/4)/2", 16.0, 2.0)?;
    test("-x", 2.5, -2.5)?;
    test("-(x-4)^2+1", 3.0, 0.0)?;
    test("0.5x*x", 4.0, 8.0)?;
    test("2^-x*4", 3.0, 0.5)?;
    test("-x*4", 3.0, -12.0)?;
    let expr = parse::<f64>("1/x")?;
    assert_eq!(expr.evaluate("x", 0.0), Evaluated::Num(f64::INFINITY));
    Ok(())
}

#[test]
fn test_partial_evaluation() -> ExResult<()> {
    let expr = parse::<f64>("2x+3y")?;
    assert_eq!(expr.evaluate("x", 1.0), Evaluated::Num(5.0));
    assert_eq!(expr.evaluate("y", 1.0), Evaluated::Num(5.0));
    let expr = parse::<f64>("a*b")?;
    assert_eq!(expr.evaluate("x", 1.0), Evaluated::Unresolved(expr.clone()));
    assert_eq!(
        expr.evaluate("x", 1.0).to_num().unwrap_err().kind,
        ExErrorKind::Operand
    );
    Ok(())
}

#[test]
fn test_equality() -> ExResult<()> {
    let a = parse::<f64>("2+x*y")?;
    let b = parse::<f64>(" 2 + x * y ")?;
    let c = parse::<f64>("2+(x*y)")?;
    assert_eq!(a, a);
    assert_eq!(a, b);
    assert_eq!(b, a);
    assert_eq!(a, c);

    let d = parse::<f64>("2*(x+1)")?;
    let e = parse::<f64>("2*x+2")?;
    assert_ne!(d, e);
    for value in [-1.0, 0.0, 3.5] {
        assert_eq!(d.evaluate("x", value), e.evaluate("x", value));
    }
    Ok(())
}

#[test]
fn test_construction() {
    let err = Expr::<f64>::new(NodeValue::Op(Operator::Add), None).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let err = Expr::new(NodeValue::Num(1.0), Some(vec![num(2.0)])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let err = Expr::<f64>::from_tag("x", Some(vec![num(2.0)])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let err = Expr::<f64>::sym("").unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);

    // only minus can be unary
    let err = Expr::from_tag("+", Some(vec![num(1.0)])).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Construction);
    let neg = Expr::from_tag("-", Some(vec![num(1.0)])).unwrap();
    assert_eq!(neg, parse::<f64>("-1").unwrap());

    let mut expr = Expr::from_tag("+", Some(vec![num(1.0), sym("x")])).unwrap();
    expr.add_operands(vec![sym("y")]).unwrap();
    assert_eq!(expr, parse::<f64>("1+x+y").unwrap());
    assert_eq!(expr.remove_operand(0).unwrap(), num(1.0));
    assert_eq!(expr, parse::<f64>("x+y").unwrap());
    let err = expr.remove_operand(0).unwrap_err();
    assert_eq!(err.kind, ExErrorKind::Operand);
    assert_eq!(expr, parse::<f64>("x+y").unwrap());

    let mut expr = parse::<f64>("x-y").unwrap();
    assert!(expr.remove_operand(1).is_err());
    assert_eq!(parse::<f64>(&expr.to_string()).unwrap(), expr);
}

#[test]
fn test_flatten_idempotent() -> ExResult<()> {
    for text in [
        "2.54+x+y",
        "2*x*(y*z)",
        "(a+b)+(c+(d+e))",
        "6.8-3.4-6.7",
        "x^2^3+(y-1)*3",
    ] {
        let expr = parse::<f64>(text)?;
        assert_eq!(flatten(expr.clone()), expr);
        assert_eq!(expr.clone().flatten().flatten(), expr);
    }
    Ok(())
}

#[test]
fn test_operator_combinations() -> ExResult<()> {
    let reprs = ['+', '-', '*', '/', '^'];
    for (o1, o2) in iproduct!(reprs, reprs) {
        let text = format!("x{}y{}z", o1, o2);
        let expr = parse::<f64>(&text)?;
        let (p1, p2) = (
            Operator::from_char(o1).unwrap(),
            Operator::from_char(o2).unwrap(),
        );
        let x = sym("x");
        let y = sym("y");
        let z = sym("z");
        // the operator on the left is only reduced first if it binds strictly tighter
        let reference = if p1.prio() > p2.prio() {
            Expr::binary(p2, Expr::binary(p1, x, y), z)
        } else {
            Expr::binary(p1, x, Expr::binary(p2, y, z))
        };
        println!("testing {}...", text);
        assert_eq!(expr, reference.flatten());
    }
    Ok(())
}

fn random_expr_str(rng: &mut StdRng, depth: usize) -> String {
    let vars = ["x", "y", "theta"];
    let num = |rng: &mut StdRng| match rng.gen_range(0..3) {
        0 => format!("{}", rng.gen_range(0..100)),
        1 => format!("{}.{}", rng.gen_range(0..10), rng.gen_range(0..100)),
        _ => format!(".{}", rng.gen_range(1..10)),
    };
    if depth == 0 || rng.gen_bool(0.2) {
        return match rng.gen_range(0..3) {
            0 => num(rng),
            1 => vars[rng.gen_range(0..vars.len())].to_string(),
            _ => format!("{}{}", rng.gen_range(1..10), vars[rng.gen_range(0..vars.len())]),
        };
    }
    match rng.gen_range(0..4) {
        0 => format!("-{}", random_expr_str(rng, depth - 1)),
        1 => format!("({})", random_expr_str(rng, depth - 1)),
        _ => {
            let op = ['+', '-', '*', '/', '^'][rng.gen_range(0..5)];
            format!(
                "{} {} {}",
                random_expr_str(rng, depth - 1),
                op,
                random_expr_str(rng, depth - 1)
            )
        }
    }
}

fn assert_flat(expr: &Expr) {
    if let Some(o) = expr.operator() {
        for operand in expr.operands() {
            if !o.is_ordered() {
                assert_ne!(operand.operator(), Some(o));
            }
            assert_flat(operand);
        }
    }
}

#[test]
fn test_random_roundtrip() -> ExResult<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let text = random_expr_str(&mut rng, 5);
        let expr = parse::<f64>(&text)?;
        assert_flat(&expr);
        let unparsed = format!("{}", expr);
        let reparsed = parse::<f64>(&unparsed)?;
        if reparsed != expr {
            println!("{} -> {} -> {}", text, unparsed, reparsed);
        }
        assert_eq!(reparsed, expr);
        assert_eq!(flatten(expr.clone()), expr);
    }
    Ok(())
}

#[test]
fn test_var_names() -> ExResult<()> {
    let expr = parse::<f64>("theta*x + 2y - x/theta")?;
    assert_eq!(expr.var_names(), vec!["theta", "x", "y"]);
    let joined = expr.var_names().iter().join(",");
    assert_eq!(joined, "theta,x,y");
    Ok(())
}
