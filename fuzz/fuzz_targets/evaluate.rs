#![no_main]
use libfuzzer_sys::fuzz_target;

use symexpr::parse;

fuzz_target!(|input: (&str, f64)| {
    let (text, value) = input;
    if let Ok(expr) = parse::<f64>(text) {
        for name in expr.var_names() {
            let _ = expr.evaluate(name, value);
        }
        let _ = expr.evaluate("x", value);
    }
});
