//! Where generators send recoverable problems with individual instances.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// An append-only diagnostics sink.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);

    fn warning(&mut self, message: String) {
        self.report(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.report(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }
}

/// Collects diagnostics in the order they were reported.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> DiagnosticLog {
        DiagnosticLog::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl Reporter for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade, counting errors.
#[derive(Debug, Default)]
pub struct LogReporter {
    pub error_count: usize,
}

impl Reporter for LogReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{}", diagnostic.message),
            Severity::Error => {
                self.error_count += 1;
                log::error!("{}", diagnostic.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_order_and_severity() {
        let mut log = DiagnosticLog::new();
        log.warning("w".to_string());
        log.error("e".to_string());

        assert_eq!(log.diagnostics.len(), 2);
        assert_eq!(log.errors().count(), 1);
        assert_eq!(log.warnings().next().unwrap().message, "w");
        assert!(log.has_errors());
        assert_eq!(log.diagnostics[1].to_string(), "error: e");
    }

    #[test]
    fn log_reporter_counts_errors() {
        let mut reporter = LogReporter::default();
        reporter.warning("w".to_string());
        reporter.error("e".to_string());

        assert_eq!(reporter.error_count, 1);
    }
}
