//! Non-fatal diagnostics raised by cells.
//!
//! Nothing a user types can take the sheet down. Bad formulas, failed
//! evaluations and rejected names are logged and buffered here instead.

use std::collections::VecDeque;
use std::fmt;

use livesheet_engine::engine::FormulaError;

use crate::sheet::CellId;

#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticKind {
    /// Formula text did not parse; the previous formula stays in effect.
    Parse(FormulaError),
    /// Formula failed against the current scope; the value became undefined.
    Eval(String),
    /// A name edit used a built-in name and was dropped.
    ReservedName(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Parse(err) => write!(f, "{}", err),
            DiagnosticKind::Eval(message) => write!(f, "evaluation failed: {}", message),
            DiagnosticKind::ReservedName(name) => write!(f, "`{}` is a reserved name", name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub cell: CellId,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}: {}", self.cell, self.kind)
    }
}

/// Most diagnostics kept between drains. Older ones are dropped (they were
/// already logged).
pub const MAX_BUFFERED_DIAGNOSTICS: usize = 1024;

/// Buffer of diagnostics not yet collected by the host.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    entries: VecDeque<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, cell: CellId, kind: DiagnosticKind) {
        let diagnostic = Diagnostic { cell, kind };
        log::warn!("{}", diagnostic);
        if self.entries.len() == MAX_BUFFERED_DIAGNOSTICS {
            self.entries.pop_front();
        }
        self.entries.push_back(diagnostic);
    }

    pub(crate) fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_keeps_newest() {
        let mut diagnostics = Diagnostics::default();
        for i in 0..MAX_BUFFERED_DIAGNOSTICS + 10 {
            diagnostics.report(CellId::new(i), DiagnosticKind::Eval("boom".to_string()));
        }

        let kept = diagnostics.take();
        assert_eq!(kept.len(), MAX_BUFFERED_DIAGNOSTICS);
        assert_eq!(kept[0].cell, CellId::new(10));
        assert_eq!(
            kept.last().map(|d| d.cell),
            Some(CellId::new(MAX_BUFFERED_DIAGNOSTICS + 9))
        );
        assert!(diagnostics.take().is_empty());
    }
}
