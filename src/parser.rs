use crate::{
    data_type::NumType,
    exerr,
    expression::{symbol::Symbol, Expr},
    operators::Operator,
    ExError, ExResult,
};
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use smallvec::SmallVec;

const N_TOKENS_ON_STACK: usize = 32;
const N_PENDING_ON_STACK: usize = 16;

/// Unary minus binds tighter than `+`, `-`, `*`, and `/` but looser than `^`, i.e.,
/// `-x^2 == -(x^2)`.
const NEGATION_PRIO: i32 = 2;

/// Maximal depth of a parsed tree. Flattening, evaluation, and unparsing recurse once per
/// level.
pub const MAX_DEPTH: usize = 512;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Paren {
    Open,
    Close,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedToken<T> {
    Num(T),
    Paren(Paren),
    Op(Operator),
    Var(Symbol),
}

pub type ParsedTokens<T> = SmallVec<[ParsedToken<T>; N_TOKENS_ON_STACK]>;

fn malformed() -> ExError {
    exerr!(Syntax, "malformed expression")
}

fn mismatched_parens() -> ExError {
    exerr!(Syntax, "mismatched parentheses")
}

/// Splits a text into tokens. Whitespace separates tokens and is dropped otherwise.
/// A variable that directly follows a number or a variable is preceded by a
/// multiplication, e.g., `2.5x` is tokenized like `2.5*x`.
///
/// # Errors
///
/// A [`Syntax`](crate::ExErrorKind::Syntax) error is returned if a run of digits and
/// decimal points is not a finite number or if a character is neither a letter, a digit,
/// a decimal point, an operator, nor a parenthesis.
pub fn tokenize<T: NumType>(text: &str) -> ExResult<ParsedTokens<T>> {
    lazy_static! {
        static ref RE_NAME: Regex = Regex::new(r"^[a-zA-Z]+").unwrap();
        static ref RE_NUMBER: Regex = Regex::new(r"^[0-9.]+").unwrap();
    }

    let text = text.trim();
    let mut res = ParsedTokens::<T>::new();
    let mut cur_offset = 0usize;
    // where the last number or variable ended, for implicit multiplication
    let mut operand_end = None;
    while let Some(c) = text[cur_offset..].chars().next() {
        let text_rest = &text[cur_offset..];
        if c.is_whitespace() {
            cur_offset += c.len_utf8();
        } else if let Some(num_match) = RE_NUMBER.find(text_rest) {
            let num_str = num_match.as_str();
            let num = num_str
                .parse::<T>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| exerr!(Syntax, "invalid number {}", num_str))?;
            res.push(ParsedToken::Num(num));
            cur_offset += num_str.len();
            operand_end = Some(cur_offset);
        } else if let Some(name_match) = RE_NAME.find(text_rest) {
            if operand_end == Some(cur_offset) {
                res.push(ParsedToken::Op(Operator::Mul));
            }
            res.push(ParsedToken::Var(Symbol::new(name_match.as_str())?));
            cur_offset += name_match.as_str().len();
            operand_end = Some(cur_offset);
        } else {
            let token = match c {
                '(' => ParsedToken::Paren(Paren::Open),
                ')' => ParsedToken::Paren(Paren::Close),
                _ => match Operator::from_char(c) {
                    Some(op) => ParsedToken::Op(op),
                    None => {
                        return Err(exerr!(
                            Syntax,
                            "malformed expression, how to parse the beginning of {}",
                            text_rest
                        ))
                    }
                },
            };
            res.push(token);
            cur_offset += c.len_utf8();
        }
    }
    Ok(res)
}

/// Entries of the operator stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pending {
    Open,
    Bin(Operator),
    Neg,
}

impl Pending {
    fn prio(&self) -> i32 {
        match self {
            Pending::Open => 0,
            Pending::Bin(op) => op.prio(),
            Pending::Neg => NEGATION_PRIO,
        }
    }

    /// Whether the pending operator is reduced before `incoming` is pushed. Negation
    /// also yields to operators of its own priority, i.e., `-3*4 == (-3)*4`.
    fn binds_tighter(&self, incoming: &Pending) -> bool {
        match self {
            Pending::Open => false,
            Pending::Neg => self.prio() >= incoming.prio(),
            Pending::Bin(_) => self.prio() > incoming.prio(),
        }
    }
}

/// Finished subtrees together with their depths.
type Output<T> = Vec<(Expr<T>, usize)>;

fn pop_operand<T>(output: &mut Output<T>) -> ExResult<(Expr<T>, usize)> {
    output.pop().ok_or_else(malformed)
}

/// Pops operands from the output stack, combines them with the operator, and pushes the
/// result. The right operand of a binary operator is on top of its left operand.
fn reduce<T: NumType>(output: &mut Output<T>, pending: Pending) -> ExResult<()> {
    let (reduced, depth) = match pending {
        Pending::Neg => {
            let (operand, depth) = pop_operand(output)?;
            (Expr::negation(operand), depth + 1)
        }
        Pending::Bin(op) => {
            let (right, depth_right) = pop_operand(output)?;
            let (left, depth_left) = pop_operand(output)?;
            (
                Expr::binary(op, left, right),
                depth_left.max(depth_right) + 1,
            )
        }
        Pending::Open => return Err(mismatched_parens()),
    };
    if depth > MAX_DEPTH {
        return Err(exerr!(
            Syntax,
            "malformed expression, nested deeper than {} levels",
            MAX_DEPTH
        ));
    }
    trace!("reduced to {}", reduced);
    output.push((reduced, depth));
    Ok(())
}

/// Builds a tree from tokens with Dijkstra's shunting-yard algorithm. Besides the
/// output stack of finished subtrees, there is an operator stack of pending
/// operators and opening parens.
///
/// An incoming binary operator first reduces the operators on the stack that bind
/// strictly tighter. Hence, operators of the same priority nest to the right, e.g.,
/// `6.8-3.4-6.7` becomes `6.8-(3.4-6.7)`. An operator at the beginning, after an
/// opening paren, or after another operator is unary, which only `-` can be. Unary
/// minus binds tighter than `*` and `/`, e.g., `2^-3*4` becomes `(2^(-3))*4`.
///
/// Empty parentheses like in `2()` are a syntax error, and so are trees deeper than
/// [`MAX_DEPTH`](MAX_DEPTH).
pub fn make_tree<T: NumType>(parsed_tokens: &[ParsedToken<T>]) -> ExResult<Expr<T>> {
    if parsed_tokens.is_empty() {
        return Err(exerr!(Syntax, "malformed expression, cannot parse empty string"));
    }
    let mut output = Output::<T>::with_capacity(parsed_tokens.len());
    let mut op_stack = SmallVec::<[Pending; N_PENDING_ON_STACK]>::new();
    let mut prev_token: Option<&ParsedToken<T>> = None;

    for token in parsed_tokens {
        match token {
            ParsedToken::Num(x) => output.push((Expr::num(*x), 1)),
            ParsedToken::Var(s) => output.push((Expr::from_symbol(s.clone()), 1)),
            ParsedToken::Paren(Paren::Open) => op_stack.push(Pending::Open),
            ParsedToken::Paren(Paren::Close)
                if matches!(prev_token, Some(ParsedToken::Paren(Paren::Open))) =>
            {
                return Err(exerr!(Syntax, "malformed expression, empty parentheses"));
            }
            ParsedToken::Paren(Paren::Close) => loop {
                match op_stack.pop() {
                    Some(Pending::Open) => break,
                    Some(pending) => reduce(&mut output, pending)?,
                    None => return Err(mismatched_parens()),
                }
            },
            ParsedToken::Op(op) => {
                let is_prefix = matches!(
                    prev_token,
                    None | Some(ParsedToken::Op(_)) | Some(ParsedToken::Paren(Paren::Open))
                );
                if is_prefix {
                    if *op != Operator::Sub {
                        return Err(exerr!(
                            Syntax,
                            "malformed expression, {} cannot be unary",
                            op
                        ));
                    }
                    op_stack.push(Pending::Neg);
                } else {
                    let incoming = Pending::Bin(*op);
                    while let Some(&top) = op_stack.last() {
                        if !top.binds_tighter(&incoming) {
                            break;
                        }
                        op_stack.pop();
                        reduce(&mut output, top)?;
                    }
                    op_stack.push(incoming);
                }
            }
        }
        prev_token = Some(token);
    }
    while let Some(pending) = op_stack.pop() {
        if pending == Pending::Open {
            return Err(mismatched_parens());
        }
        reduce(&mut output, pending)?;
    }
    match (output.pop(), output.is_empty()) {
        (Some((expr, _)), true) => Ok(expr),
        _ => Err(malformed()),
    }
}

/// Parses a string into a flattened expression tree.
///
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use symexpr::{parse, Expr, Operator};
/// let expr = parse::<f64>("2.54 + x - y")?;
/// let reference = Expr::binary(
///     Operator::Add,
///     Expr::num(2.54),
///     Expr::binary(Operator::Sub, Expr::sym("x")?, Expr::sym("y")?),
/// );
/// assert_eq!(expr, reference);
/// #
/// #     Ok(())
/// # }
/// ```
///
/// # Errors
///
/// A [`Syntax`](crate::ExErrorKind::Syntax) error is returned at the first fault, if
/// * a run of digits and decimal points is not a finite number, e.g., `1.2.3`,
/// * a character cannot be parsed, e.g., `2%3`,
/// * the text is empty,
/// * parentheses do not match, e.g., `(2+3` or `2+3)`,
/// * an operator lacks an operand, e.g., `2+`, or an operator other than `-` is unary,
///   e.g., `*2`,
/// * parentheses are empty, e.g., `2()`,
/// * the tree would be nested deeper than [`MAX_DEPTH`](MAX_DEPTH), or
/// * operands are not connected by operators, e.g., `2 2`.
pub fn parse<T: NumType>(text: &str) -> ExResult<Expr<T>> {
    let parsed_tokens = tokenize::<T>(text)?;
    let expr = make_tree(&parsed_tokens)?.flatten();
    debug!("parsed '{}' into {}", text, expr);
    Ok(expr)
}

#[cfg(test)]
use crate::ExErrorKind;

#[test]
fn test_tokenize() {
    let x = || ParsedToken::Var(Symbol::new("x").unwrap());
    let tokens = tokenize::<f64>(" 2.5x^ (13 -theta)").unwrap();
    assert_eq!(
        tokens.as_slice(),
        &[
            ParsedToken::Num(2.5),
            ParsedToken::Op(Operator::Mul),
            x(),
            ParsedToken::Op(Operator::Pow),
            ParsedToken::Paren(Paren::Open),
            ParsedToken::Num(13.0),
            ParsedToken::Op(Operator::Sub),
            ParsedToken::Var(Symbol::new("theta").unwrap()),
            ParsedToken::Paren(Paren::Close),
        ]
    );
    // no implicit multiplication across whitespace
    let tokens = tokenize::<f64>("2 x").unwrap();
    assert_eq!(tokens.as_slice(), &[ParsedToken::Num(2.0), x()]);
    let tokens = tokenize::<f64>(".48").unwrap();
    assert_eq!(tokens.as_slice(), &[ParsedToken::Num(0.48)]);
    assert!(tokenize::<f64>("").unwrap().is_empty());
}

#[test]
fn test_tokenize_errors() {
    fn test(text: &str, msg_part: &str) {
        let err = tokenize::<f64>(text).unwrap_err();
        println!("msg '{}' should contain '{}'", err.msg, msg_part);
        assert_eq!(err.kind, ExErrorKind::Syntax);
        assert!(err.msg.contains(msg_part));
    }
    test("1.2.3", "invalid number 1.2.3");
    test("x+.", "invalid number .");
    test("5\\6", "how to parse the beginning of \\6");
    test("2%3", "how to parse the beginning of %3");
    test("ӭ", "malformed expression");
    test("x_1", "how to parse the beginning of _1");
}

#[test]
fn test_make_tree() {
    let tokens = tokenize::<f64>("2*3+4").unwrap();
    let expr = make_tree(&tokens).unwrap();
    let reference = Expr::binary(
        Operator::Add,
        Expr::binary(Operator::Mul, Expr::num(2.0), Expr::num(3.0)),
        Expr::num(4.0),
    );
    assert_eq!(expr, reference);

    let tokens = tokenize::<f64>("2+x+y").unwrap();
    let expr = make_tree(&tokens).unwrap();
    // not flattened yet
    let reference = Expr::binary(
        Operator::Add,
        Expr::num(2.0),
        Expr::binary(
            Operator::Add,
            Expr::sym("x").unwrap(),
            Expr::sym("y").unwrap(),
        ),
    );
    assert_eq!(expr, reference);
}

#[test]
fn test_parse_errors() {
    fn test(text: &str, msg_part: &str) {
        match parse::<f64>(text) {
            Ok(expr) => panic!("expected an error containing '{msg_part}', got {expr}"),
            Err(e) => {
                println!("msg '{}' should contain '{}'", e.msg, msg_part);
                assert!(e.is_syntax());
                assert!(e.msg.contains(msg_part));
            }
        }
    }
    test("2 2", "malformed expression");
    test("(2+3", "mismatched parentheses");
    test("2+3)", "mismatched parentheses");
    test("((x)", "mismatched parentheses");
    test(")(", "mismatched parentheses");
    test("2+", "malformed expression");
    test("2-", "malformed expression");
    test("*2", "cannot be unary");
    test("2*(+3)", "cannot be unary");
    test("", "empty string");
    test("   ", "empty string");
    test("()", "malformed expression");
    test("2(3)", "malformed expression");
    test("(2)(3)", "malformed expression");
    test("x2", "malformed expression");
    test("3. .4", "malformed expression");
    test("2^^3", "cannot be unary");
    test("2()", "empty parentheses");
    test("(x)()", "empty parentheses");
    test("2*(())", "empty parentheses");
}

#[test]
fn test_negation_precedence() {
    let num = Expr::<f64>::num;
    let neg = |e| Expr::negation(e);
    let x = || Expr::sym("x").unwrap();

    let expr = parse::<f64>("2^-3*4").unwrap();
    let reference = Expr::binary(
        Operator::Mul,
        Expr::binary(Operator::Pow, num(2.0), neg(num(3.0))),
        num(4.0),
    );
    assert_eq!(expr, reference);
    assert_eq!(expr.evaluate("x", 0.0).to_num().unwrap(), 0.5);

    let expr = parse::<f64>("-3*4").unwrap();
    assert_eq!(expr, Expr::binary(Operator::Mul, neg(num(3.0)), num(4.0)));

    let expr = parse::<f64>("x^-2/4").unwrap();
    let reference = Expr::binary(
        Operator::Div,
        Expr::binary(Operator::Pow, x(), neg(num(2.0))),
        num(4.0),
    );
    assert_eq!(expr, reference);

    // exponentiation still binds tighter than negation
    let expr = parse::<f64>("2^-3^2").unwrap();
    let reference = Expr::binary(
        Operator::Pow,
        num(2.0),
        neg(Expr::binary(Operator::Pow, num(3.0), num(2.0))),
    );
    assert_eq!(expr, reference);
    let expr = parse::<f64>("-2-3").unwrap();
    assert_eq!(expr, Expr::binary(Operator::Sub, neg(num(2.0)), num(3.0)));
}

#[test]
fn test_max_depth() {
    // x counts as one level
    let text = format!("{}x", "-".repeat(MAX_DEPTH - 1));
    let expr = parse::<f64>(&text).unwrap();
    assert_eq!(expr.evaluate("x", 2.0).to_num().unwrap(), -2.0);
    assert_eq!(parse::<f64>(&expr.to_string()).unwrap(), expr);

    for text in [
        format!("{}x", "-".repeat(MAX_DEPTH)),
        format!("{}x", "-".repeat(200_000)),
        format!("{}x", "x^".repeat(MAX_DEPTH)),
        format!("{}1{}", "(".repeat(MAX_DEPTH + 1), "+1)".repeat(MAX_DEPTH + 1)),
    ] {
        let err = parse::<f64>(&text).unwrap_err();
        assert!(err.is_syntax());
        assert!(err.msg.contains("nested deeper than"));
    }
    // parentheses alone do not add levels
    let text = format!("{}x{}", "(".repeat(2 * MAX_DEPTH), ")".repeat(2 * MAX_DEPTH));
    assert_eq!(parse::<f64>(&text).unwrap(), Expr::sym("x").unwrap());
}
