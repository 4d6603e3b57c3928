//! Timing configuration for a sheet.

use std::time::Duration;

pub const DEFAULT_NAME_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_FORMULA_DEBOUNCE: Duration = Duration::from_millis(250);
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(100);

/// Quiet periods for edit coalescing and the grace period before a removed
/// cell is torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetConfig {
    pub name_debounce: Duration,
    pub formula_debounce: Duration,
    pub removal_delay: Duration,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            name_debounce: DEFAULT_NAME_DEBOUNCE,
            formula_debounce: DEFAULT_FORMULA_DEBOUNCE,
            removal_delay: DEFAULT_REMOVAL_DELAY,
        }
    }
}
