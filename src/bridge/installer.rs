use std::sync::Arc;

use serde_json::json;

use crate::bridge::config::BridgeConfig;
use crate::bridge::diagnostics::{
    ContainerVersion, DiagnosticGate, LoggerSink, SharedDiagnosticSink,
};
use crate::bridge::handler::AnalyticsHandler;
use crate::host::{GlobalPath, GlobalScope, HostError, HostValue, WriteMode};

#[derive(Clone, Debug)]
pub enum InstallOutcome {
    Installed(AnalyticsHandler),
    /// The slot already held a truthy value, which was left untouched.
    AlreadyPresent,
    /// The host refused the write.
    WriteRejected(HostError),
}

impl InstallOutcome {
    pub fn handler(&self) -> Option<&AnalyticsHandler> {
        match self {
            InstallOutcome::Installed(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed(_))
    }
}

/// Publishes a handler under the configured name unless the slot is already taken.
///
/// Diagnostics go to a [`LoggerSink`] gated by `config.enable_log()`.
pub fn install(scope: Arc<dyn GlobalScope>, config: &BridgeConfig) -> InstallOutcome {
    install_in_container(scope, config, ContainerVersion::default())
}

/// Like [`install`], additionally opening diagnostics when the container runs in preview or
/// debug mode.
pub fn install_in_container(
    scope: Arc<dyn GlobalScope>,
    config: &BridgeConfig,
    container: ContainerVersion,
) -> InstallOutcome {
    let sink = Arc::new(LoggerSink::new(DiagnosticGate::from_config(config, container)));
    install_with_sink(scope, config, sink)
}

pub fn install_with_sink(
    scope: Arc<dyn GlobalScope>,
    config: &BridgeConfig,
    sink: SharedDiagnosticSink,
) -> InstallOutcome {
    let name = config.handler_name();
    sink.record("install", &json!("Initializing JS handler global object."));

    let existing = scope.get(&GlobalPath::single(name));
    if existing.as_ref().is_some_and(HostValue::is_truthy) {
        sink.record("install | already present:", &json!(name));
        return InstallOutcome::AlreadyPresent;
    }

    let handler = AnalyticsHandler::new(config, Arc::clone(&scope), Arc::clone(&sink));
    let mode = if config.lock_handler() {
        WriteMode::Locked
    } else {
        WriteMode::Writable
    };
    match scope.set(name, HostValue::Handler(handler.clone()), mode) {
        Ok(()) => {
            sink.record("install", &json!("Initialized global object."));
            InstallOutcome::Installed(handler)
        }
        Err(err) => {
            sink.record("install | write rejected:", &json!(err.to_string()));
            InstallOutcome::WriteRejected(err)
        }
    }
}
