//! Webview analytics bridge: installs a handler into the page's global scope and relays analytics
//! commands to whichever native interface the hosting app injected.

mod config;
pub mod constants;
mod diagnostics;
mod envelope;
pub mod error;
mod handler;
mod installer;
mod relay;
mod transport;

pub use config::BridgeConfig;
pub use diagnostics::{
    ContainerVersion, DiagnosticGate, DiagnosticSink, LoggerSink, SharedDiagnosticSink,
};
pub use envelope::{BridgeCommand, CommandEnvelope};
pub use handler::AnalyticsHandler;
pub use installer::{install, install_in_container, install_with_sink, InstallOutcome};
pub use relay::DispatchOutcome;
pub use transport::{
    android_call, select_transport, CommonForm, InterfaceNames, Transport, TransportKind,
    TransportProbe,
};
