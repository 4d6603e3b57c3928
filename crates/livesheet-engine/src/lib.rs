//! livesheet_engine - Formula compilation, evaluation and scope narrowing.

pub(crate) mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    fn scope(entries: &[(&str, Value)]) -> HashMap<String, Value> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn eval_text(text: &str, entries: &[(&str, Value)]) -> Result<Value, EvalError> {
        let engine = FormulaEngine::new();
        let formula = engine.compile(text).unwrap();
        let bindings = narrow(&scope(entries), formula.free_variables());
        engine.evaluate(&formula, &bindings)
    }

    #[test]
    fn test_eval_literal_arithmetic() {
        assert_eq!(eval_text("1 + 2 * 3", &[]).unwrap(), Some(7.0));
        assert_eq!(eval_text("(1 + 2) * 3", &[]).unwrap(), Some(9.0));
    }

    #[test]
    fn test_eval_reads_bindings() {
        assert_eq!(eval_text("a + 1", &[("a", Some(2.0))]).unwrap(), Some(3.0));
        assert_eq!(
            eval_text("a * b", &[("a", Some(2.5)), ("b", Some(4.0))]).unwrap(),
            Some(10.0)
        );
    }

    #[test]
    fn test_eval_mixed_int_and_float() {
        assert_eq!(eval_text("x / 2", &[("x", Some(5.0))]).unwrap(), Some(2.5));
    }

    #[test]
    fn test_eval_builtins_accept_ints() {
        assert_eq!(eval_text("sqrt(16)", &[]).unwrap(), Some(4.0));
        assert_eq!(eval_text("pow(2, 10)", &[]).unwrap(), Some(1024.0));
        assert_eq!(eval_text("max(a, 3)", &[("a", Some(7.0))]).unwrap(), Some(7.0));
        assert_eq!(eval_text("abs(-3)", &[]).unwrap(), Some(3.0));
    }

    #[test]
    fn test_eval_constants() {
        let value = eval_text("2 * pi", &[]).unwrap().unwrap();
        assert!((value - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_eval_undefined_operand_is_error() {
        assert!(eval_text("a + 1", &[]).is_err());
        assert!(eval_text("a + 1", &[("a", None)]).is_err());
    }

    #[test]
    fn test_eval_bare_undefined_reference_is_undefined() {
        assert_eq!(eval_text("a", &[]).unwrap(), None);
    }

    #[test]
    fn test_eval_unknown_function_is_error() {
        assert!(eval_text("nope(1)", &[]).is_err());
    }

    #[test]
    fn test_eval_non_numeric_result_is_error() {
        assert!(matches!(
            eval_text("1 < 2", &[]),
            Err(EvalError::NonNumeric(_))
        ));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "");
        assert_eq!(format_value(Some(3.0)), "3");
        assert_eq!(format_value(Some(2.5)), "2.50");
        assert_eq!(format_value(Some(f64::NAN)), "#NAN!");
        assert_eq!(format_value(Some(f64::INFINITY)), "#INF!");
    }
}
