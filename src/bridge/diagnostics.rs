//! Diagnostic output for the bridge.
//!
//! Diagnostics are human-readable only. They are emitted when logging is enabled explicitly or
//! when the hosting tag container runs in preview or debug mode.

use std::sync::Arc;

use serde_json::Value;

use crate::bridge::config::BridgeConfig;
use crate::bridge::constants::{LOGGER_NAME, LOG_PREFIX};
use crate::logger::{log_arg, Logger};

/// Receives a label and a payload for every diagnostic the bridge produces. Must be safe to call
/// unconditionally.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, label: &str, payload: &Value);
}

pub type SharedDiagnosticSink = Arc<dyn DiagnosticSink>;

/// Preview/debug flags reported by the tag container hosting the bridge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContainerVersion {
    pub preview_mode: bool,
    pub debug_mode: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticGate {
    enable_log: bool,
    container: ContainerVersion,
}

impl DiagnosticGate {
    pub fn new(enable_log: bool, container: ContainerVersion) -> Self {
        Self {
            enable_log,
            container,
        }
    }

    pub fn from_config(config: &BridgeConfig, container: ContainerVersion) -> Self {
        Self::new(config.enable_log(), container)
    }

    pub fn is_open(&self) -> bool {
        self.enable_log || self.container.preview_mode || self.container.debug_mode
    }
}

/// Writes gated diagnostics through a [`Logger`], prefixed with the bridge label.
#[derive(Clone, Debug)]
pub struct LoggerSink {
    logger: Logger,
    gate: DiagnosticGate,
}

impl LoggerSink {
    pub fn new(gate: DiagnosticGate) -> Self {
        Self::with_logger(Logger::new(LOGGER_NAME), gate)
    }

    pub fn with_logger(logger: Logger, gate: DiagnosticGate) -> Self {
        Self { logger, gate }
    }
}

impl DiagnosticSink for LoggerSink {
    fn record(&self, label: &str, payload: &Value) {
        if !self.gate.is_open() {
            return;
        }
        self.logger
            .info_with([log_arg(LOG_PREFIX), log_arg(label), log_arg(payload)]);
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::logger::TEST_GUARD;
    use serde_json::json;

    #[test]
    fn gate_opens_for_flag_preview_or_debug() {
        assert!(!DiagnosticGate::default().is_open());
        assert!(DiagnosticGate::new(true, ContainerVersion::default()).is_open());
        assert!(DiagnosticGate::new(
            false,
            ContainerVersion {
                preview_mode: true,
                debug_mode: false
            }
        )
        .is_open());
        assert!(DiagnosticGate::new(
            false,
            ContainerVersion {
                preview_mode: false,
                debug_mode: true
            }
        )
        .is_open());
    }

    #[test]
    fn logger_sink_respects_gate() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(|e| e.into_inner());
        let lines = Arc::new(Mutex::new(Vec::new()));

        let logger = Logger::new("webview-bridge/sink-test");
        let captured = Arc::clone(&lines);
        logger.set_log_handler(move |_, _, args| {
            let fragments: Vec<_> = args
                .iter()
                .filter_map(|arg| arg.to_message_fragment())
                .collect();
            captured.lock().unwrap().push(fragments.join(" "));
        });

        let closed = LoggerSink::with_logger(logger.clone(), DiagnosticGate::default());
        closed.record("interface:", &json!({"android": true}));
        assert!(lines.lock().unwrap().is_empty());

        let open = LoggerSink::with_logger(
            logger,
            DiagnosticGate::from_config(
                &BridgeConfig::new().with_enable_log(true),
                ContainerVersion::default(),
            ),
        );
        open.record("interface:", &json!({"android": true}));
        assert_eq!(
            lines.lock().unwrap().as_slice(),
            [format!("{LOG_PREFIX} interface: {{\"android\":true}}")]
        );
    }
}
