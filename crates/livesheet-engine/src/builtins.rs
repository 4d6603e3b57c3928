//! Built-in math vocabulary for formulas.
//!
//! Conventions:
//! - Built-in names are lowercase (e.g. `sqrt`, `pow`) and are reserved: they
//!   are never collected as free variables and can never name a cell.
//! - Every built-in accepts integer or float arguments and returns a float.
//! - If you add a new built-in, add it to `MATH_BUILTINS`; registration and
//!   the reserved-name check both read from that table.

use rand::Rng;
use rhai::{Engine, Scope};

/// How a built-in maps onto a Rust float function.
#[derive(Clone, Copy)]
pub enum MathFn {
    Nullary(fn() -> f64),
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

pub struct MathBuiltin {
    pub name: &'static str,
    pub func: MathFn,
    #[allow(dead_code)]
    pub description: &'static str,
}

pub const MATH_BUILTINS: &[MathBuiltin] = &[
    MathBuiltin {
        name: "abs",
        func: MathFn::Unary(f64::abs),
        description: "Absolute value",
    },
    MathBuiltin {
        name: "sqrt",
        func: MathFn::Unary(f64::sqrt),
        description: "Square root",
    },
    MathBuiltin {
        name: "cbrt",
        func: MathFn::Unary(f64::cbrt),
        description: "Cube root",
    },
    MathBuiltin {
        name: "exp",
        func: MathFn::Unary(f64::exp),
        description: "e raised to the given power",
    },
    MathBuiltin {
        name: "ln",
        func: MathFn::Unary(f64::ln),
        description: "Natural logarithm",
    },
    MathBuiltin {
        name: "log",
        func: MathFn::Unary(f64::ln),
        description: "Natural logarithm",
    },
    MathBuiltin {
        name: "log",
        func: MathFn::Binary(f64::log),
        description: "Logarithm of x in the given base",
    },
    MathBuiltin {
        name: "log2",
        func: MathFn::Unary(f64::log2),
        description: "Base-2 logarithm",
    },
    MathBuiltin {
        name: "log10",
        func: MathFn::Unary(f64::log10),
        description: "Base-10 logarithm",
    },
    MathBuiltin {
        name: "sin",
        func: MathFn::Unary(f64::sin),
        description: "Sine (radians)",
    },
    MathBuiltin {
        name: "cos",
        func: MathFn::Unary(f64::cos),
        description: "Cosine (radians)",
    },
    MathBuiltin {
        name: "tan",
        func: MathFn::Unary(f64::tan),
        description: "Tangent (radians)",
    },
    MathBuiltin {
        name: "asin",
        func: MathFn::Unary(f64::asin),
        description: "Arc sine",
    },
    MathBuiltin {
        name: "acos",
        func: MathFn::Unary(f64::acos),
        description: "Arc cosine",
    },
    MathBuiltin {
        name: "atan",
        func: MathFn::Unary(f64::atan),
        description: "Arc tangent",
    },
    MathBuiltin {
        name: "atan2",
        func: MathFn::Binary(f64::atan2),
        description: "Four-quadrant arc tangent of y / x",
    },
    MathBuiltin {
        name: "sinh",
        func: MathFn::Unary(f64::sinh),
        description: "Hyperbolic sine",
    },
    MathBuiltin {
        name: "cosh",
        func: MathFn::Unary(f64::cosh),
        description: "Hyperbolic cosine",
    },
    MathBuiltin {
        name: "tanh",
        func: MathFn::Unary(f64::tanh),
        description: "Hyperbolic tangent",
    },
    MathBuiltin {
        name: "floor",
        func: MathFn::Unary(f64::floor),
        description: "Round toward negative infinity",
    },
    MathBuiltin {
        name: "ceil",
        func: MathFn::Unary(f64::ceil),
        description: "Round toward positive infinity",
    },
    MathBuiltin {
        name: "ceiling",
        func: MathFn::Unary(f64::ceil),
        description: "Round toward positive infinity",
    },
    MathBuiltin {
        name: "round",
        func: MathFn::Unary(f64::round),
        description: "Round half away from zero",
    },
    MathBuiltin {
        name: "trunc",
        func: MathFn::Unary(f64::trunc),
        description: "Drop the fractional part",
    },
    MathBuiltin {
        name: "sign",
        func: MathFn::Unary(sign),
        description: "-1, 0 or 1 depending on the sign",
    },
    MathBuiltin {
        name: "pow",
        func: MathFn::Binary(f64::powf),
        description: "x raised to the power y",
    },
    MathBuiltin {
        name: "min",
        func: MathFn::Binary(f64::min),
        description: "Smaller of two values",
    },
    MathBuiltin {
        name: "max",
        func: MathFn::Binary(f64::max),
        description: "Larger of two values",
    },
    MathBuiltin {
        name: "hypot",
        func: MathFn::Binary(f64::hypot),
        description: "Length of the hypotenuse",
    },
    MathBuiltin {
        name: "mod",
        func: MathFn::Binary(modulo),
        description: "Floored modulo (result has the sign of the divisor)",
    },
    MathBuiltin {
        name: "random",
        func: MathFn::Nullary(random),
        description: "Uniform random number in [0, 1)",
    },
];

/// Named constants bound into every evaluation scope.
pub const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
    ("phi", 1.618_033_988_749_895),
];

/// Rhai keywords and reserved words. None of these can be a variable.
const KEYWORDS: &[&str] = &[
    "true", "false", "let", "const", "if", "else", "switch", "do", "while", "loop", "until",
    "for", "in", "continue", "break", "return", "throw", "try", "catch", "import", "export",
    "as", "global", "private", "fn", "Fn", "call", "curry", "this", "is_def_var", "is_def_fn",
    "is_shared", "type_of", "print", "debug", "eval", "var", "static", "shared", "goto", "exit",
    "match", "case", "public", "protected", "new", "use", "with", "module", "package", "super",
    "thread", "spawn", "go", "await", "async", "sync", "yield", "default", "void", "null", "nil",
];

fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

fn modulo(x: f64, y: f64) -> f64 {
    if y == 0.0 { x } else { x - y * (x / y).floor() }
}

fn random() -> f64 {
    rand::thread_rng().r#gen()
}

/// True if `name` belongs to the built-in vocabulary (keyword, constant or function).
pub fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name)
        || CONSTANTS.iter().any(|(constant, _)| *constant == name)
        || MATH_BUILTINS.iter().any(|builtin| builtin.name == name)
}

/// Register every entry of `MATH_BUILTINS` for all int/float argument mixes.
pub fn register_builtins(engine: &mut Engine) {
    for builtin in MATH_BUILTINS {
        let name = builtin.name;
        match builtin.func {
            MathFn::Nullary(f) => {
                engine.register_fn(name, move || -> f64 { f() });
            }
            MathFn::Unary(f) => {
                engine.register_fn(name, move |x: f64| -> f64 { f(x) });
                engine.register_fn(name, move |x: i64| -> f64 { f(x as f64) });
            }
            MathFn::Binary(f) => {
                engine.register_fn(name, move |x: f64, y: f64| -> f64 { f(x, y) });
                engine.register_fn(name, move |x: i64, y: i64| -> f64 { f(x as f64, y as f64) });
                engine.register_fn(name, move |x: f64, y: i64| -> f64 { f(x, y as f64) });
                engine.register_fn(name, move |x: i64, y: f64| -> f64 { f(x as f64, y) });
            }
        }
    }
}

/// Push the named constants onto a fresh evaluation scope.
pub fn push_constants(scope: &mut Scope) {
    for (name, value) in CONSTANTS {
        scope.push_constant(*name, *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("sqrt"));
        assert!(is_reserved("pi"));
        assert!(is_reserved("let"));
        assert!(is_reserved("true"));
        assert!(!is_reserved("total"));
        assert!(!is_reserved("Sqrt"));
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(modulo(7.0, 3.0), 1.0);
        assert_eq!(modulo(-7.0, 3.0), 2.0);
        assert_eq!(modulo(7.0, -3.0), -2.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-4.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(2.5), 1.0);
    }
}
