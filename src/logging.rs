use crate::config::ConfigurationGate;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Severity-gated diagnostics for the loader.
///
/// Every message the orchestrator reports passes through here, so the three
/// logging switches of the configuration gate decide what reaches the
/// subscriber. The gate is read on every call, which lets toggles made while
/// services run take effect immediately.
#[derive(Clone)]
pub struct LogGate {
    gate: Arc<dyn ConfigurationGate>,
}

impl LogGate {
    pub fn new(gate: Arc<dyn ConfigurationGate>) -> Self {
        Self { gate }
    }

    pub fn message(&self, message: impl Display) {
        if self.gate.log_messages() {
            info!("{}", message);
        }
    }

    pub fn warning(&self, message: impl Display) {
        if self.gate.log_warnings() {
            warn!("{}", message);
        }
    }

    pub fn error(&self, message: impl Display) {
        if self.gate.log_errors() {
            error!("{}", message);
        }
    }
}

impl std::fmt::Debug for LogGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGate")
            .field("messages", &self.gate.log_messages())
            .field("warnings", &self.gate.log_warnings())
            .field("errors", &self.gate.log_errors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use parking_lot::Mutex;
    use std::io;

    /// In-memory sink for a test subscriber
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Emit one line per severity through a gate built from `config`
    fn emit_all(config: LoaderConfig) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let log = LogGate::new(Arc::new(config));
        tracing::subscriber::with_default(subscriber, || {
            log.message("gated-message");
            log.warning("gated-warning");
            log.error("gated-error");
        });

        captured.contents()
    }

    #[test]
    fn test_all_gates_open() {
        let output = emit_all(LoaderConfig::default());

        assert!(output.contains("gated-message"));
        assert!(output.contains("gated-warning"));
        assert!(output.contains("gated-error"));
    }

    #[test]
    fn test_messages_gate_only_silences_info() {
        let mut config = LoaderConfig::default();
        config.logging.messages = false;
        let output = emit_all(config);

        assert!(!output.contains("gated-message"));
        assert!(output.contains("gated-warning"));
        assert!(output.contains("gated-error"));
    }

    #[test]
    fn test_warnings_gate_only_silences_warn() {
        let mut config = LoaderConfig::default();
        config.logging.warnings = false;
        let output = emit_all(config);

        assert!(output.contains("gated-message"));
        assert!(!output.contains("gated-warning"));
        assert!(output.contains("gated-error"));
    }

    #[test]
    fn test_errors_gate_only_silences_error() {
        let mut config = LoaderConfig::default();
        config.logging.errors = false;
        let output = emit_all(config);

        assert!(output.contains("gated-message"));
        assert!(output.contains("gated-warning"));
        assert!(!output.contains("gated-error"));
    }

    #[test]
    fn test_shared_gate_toggles_live() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let shared = LoaderConfig::default().into_shared();
        let log = LogGate::new(shared.clone());

        tracing::subscriber::with_default(subscriber, || {
            log.error("before-toggle");
            shared.write().logging.errors = false;
            log.error("after-toggle");
        });

        let output = captured.contents();
        assert!(output.contains("before-toggle"));
        assert!(!output.contains("after-toggle"));
    }
}
