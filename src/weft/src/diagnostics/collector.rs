use parking_lot::Mutex;

use crate::diagnostics::{Diagnostic, DiagnosticSink, Severity};

/// A sink that keeps every diagnostic in report order.
///
/// Contexts running on different threads may share one collector.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drains the collected diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}
