//! Rhai engine creation and formula evaluation.
//!
//! Creates the Rhai engine with the math built-ins registered and evaluates a
//! compiled formula against a narrowed set of bindings. Bindings are pushed
//! into a fresh Rhai scope per evaluation, so evaluations never share state.

use rhai::{Dynamic, Engine, EvalAltResult, Scope};
use thiserror::Error;

use super::{Bindings, Formula};
use crate::builtins::{push_constants, register_builtins};

/// A cell value. `None` is undefined: not computed yet, missing, or failed.
pub type Value = Option<f64>;

/// Errors raised while evaluating a structurally valid formula.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Rhai error: {0}")]
    Rhai(#[from] Box<EvalAltResult>),

    #[error("formula produced a non-numeric value of type {0}")]
    NonNumeric(String),
}

/// Create a Rhai engine with built-ins registered and resource limits set.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();
    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(64);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(1_000);
    engine.set_max_map_size(500);
    register_builtins(&mut engine);
    engine
}

/// Evaluate a formula against the given bindings.
///
/// Blank formulas evaluate to undefined without touching Rhai. Undefined
/// bindings are pushed as unit, so arithmetic on them fails and surfaces as
/// an [`EvalError`].
pub fn evaluate(engine: &Engine, formula: &Formula, bindings: &Bindings) -> Result<Value, EvalError> {
    let Some(ast) = formula.ast() else {
        return Ok(None);
    };

    let mut scope = Scope::new();
    push_constants(&mut scope);
    for (name, value) in bindings.iter() {
        scope.push_dynamic(name.as_str(), value_to_dynamic(*value));
    }

    let result = engine.eval_ast_with_scope::<Dynamic>(&mut scope, ast)?;
    dynamic_to_value(result)
}

/// Convert a Rhai result into a cell value.
pub fn dynamic_to_value(value: Dynamic) -> Result<Value, EvalError> {
    if value.is_unit() {
        Ok(None)
    } else if let Ok(n) = value.as_float() {
        Ok(Some(n))
    } else if let Ok(n) = value.as_int() {
        Ok(Some(n as f64))
    } else {
        Err(EvalError::NonNumeric(value.type_name().to_string()))
    }
}

fn value_to_dynamic(value: Value) -> Dynamic {
    match value {
        Some(n) => Dynamic::from_float(n),
        None => Dynamic::UNIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_to_value() {
        assert_eq!(dynamic_to_value(Dynamic::UNIT).unwrap(), None);
        assert_eq!(dynamic_to_value(Dynamic::from_float(1.5)).unwrap(), Some(1.5));
        assert_eq!(dynamic_to_value(Dynamic::from_int(3)).unwrap(), Some(3.0));
        assert!(matches!(
            dynamic_to_value(Dynamic::from_bool(true)),
            Err(EvalError::NonNumeric(_))
        ));
    }
}
