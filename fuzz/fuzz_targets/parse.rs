#![no_main]
use libfuzzer_sys::fuzz_target;

use symexpr::{parse, Expr};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(expr) = parse::<f64>(s) {
            // unparsing and parsing again must not change the tree
            let reparsed = parse::<f64>(&expr.to_string()).unwrap();
            assert_eq!(reparsed, expr);
            let flattened: Expr = expr.clone().flatten();
            assert_eq!(flattened, expr);
        }
    }
});
