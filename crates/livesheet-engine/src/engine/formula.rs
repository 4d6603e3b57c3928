//! Formula compilation.
//!
//! A [`Formula`] is the compiled form of a cell's formula text: the Rhai
//! expression AST plus the ordered free variables the expression reads.
//! Compilation either succeeds with a usable formula or fails with a
//! [`FormulaError`]; there is no half-compiled state.

use rhai::{AST, Engine};
use thiserror::Error;

use super::deps::extract_free_variables;
use super::eval::{EvalError, Value, create_engine, evaluate};
use super::Bindings;

/// Formula text that failed to parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("cannot parse formula `{text}`: {message}")]
    Parse { text: String, message: String },
}

/// An accepted, compiled formula.
#[derive(Clone, Debug)]
pub struct Formula {
    text: String,
    ast: Option<AST>,
    free_variables: Vec<String>,
}

impl Formula {
    /// The raw text this formula was compiled from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Names this formula reads, in order of first appearance.
    pub fn free_variables(&self) -> &[String] {
        &self.free_variables
    }

    /// Blank formulas have no expression and always evaluate to undefined.
    pub fn is_blank(&self) -> bool {
        self.ast.is_none()
    }

    pub(crate) fn ast(&self) -> Option<&AST> {
        self.ast.as_ref()
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.free_variables == other.free_variables
    }
}

/// Compiles formula text and evaluates compiled formulas.
///
/// Owns the Rhai engine with the built-in vocabulary registered. One
/// instance is shared by every cell of a sheet.
pub struct FormulaEngine {
    engine: Engine,
}

impl FormulaEngine {
    pub fn new() -> Self {
        FormulaEngine {
            engine: create_engine(),
        }
    }

    /// Compile formula text into a [`Formula`].
    ///
    /// Side-effect free; compiling the same text twice yields equal formulas.
    pub fn compile(&self, text: &str) -> Result<Formula, FormulaError> {
        if text.trim().is_empty() {
            return Ok(Formula {
                text: text.to_string(),
                ast: None,
                free_variables: Vec::new(),
            });
        }

        let ast = self
            .engine
            .compile_expression(text)
            .map_err(|e| FormulaError::Parse {
                text: text.to_string(),
                message: e.to_string(),
            })?;
        let free_variables = extract_free_variables(text);
        log::trace!("compiled `{}` reading {:?}", text, free_variables);

        Ok(Formula {
            text: text.to_string(),
            ast: Some(ast),
            free_variables,
        })
    }

    /// Evaluate a compiled formula against a narrowed snapshot of the scope.
    pub fn evaluate(&self, formula: &Formula, bindings: &Bindings) -> Result<Value, EvalError> {
        evaluate(&self.engine, formula, bindings)
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}
