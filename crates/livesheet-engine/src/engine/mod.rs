//! Formula engine API.
//!
//! This module provides the computation side of a live sheet:
//!
//! - [`FormulaEngine`], [`Formula`] - Compile formula text, evaluate compiled formulas
//! - [`extract_free_variables`] - Names a formula reads from the scope
//! - [`ScopeLens`], [`Bindings`], [`narrow`] - Narrowed views of the shared scope
//! - [`is_reserved`] - Built-in vocabulary that cannot name a cell
//! - [`format_value`] - Format values for display

mod deps;
mod eval;
mod format;
mod formula;
mod lens;

pub use crate::builtins::is_reserved;
pub use deps::extract_free_variables;
pub use eval::{EvalError, Value, create_engine, dynamic_to_value, evaluate};
pub use format::{format_number, format_value};
pub use formula::{Formula, FormulaEngine, FormulaError};
pub use lens::{Bindings, ScopeLens, ScopeSource, narrow};
