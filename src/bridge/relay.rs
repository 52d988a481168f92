use serde_json::{json, Value};

use crate::bridge::diagnostics::DiagnosticSink;
use crate::bridge::envelope::CommandEnvelope;
use crate::bridge::error::{invalid_argument, transport_unavailable, BridgeError, BridgeResult};
use crate::bridge::transport::{select_transport, Delivery, InterfaceNames, TransportKind, TransportProbe};
use crate::host::GlobalScope;

/// What became of a single handler call. Produced instead of an error so nothing ever propagates
/// into page code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered(TransportKind),
    /// Arguments failed validation; nothing was sent.
    Rejected(BridgeError),
    /// The Android interface has no method for the command.
    Dropped,
    /// No native interface was found.
    NoTransport,
    /// The native call itself failed.
    Failed(BridgeError),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered(_))
    }

    pub fn transport(&self) -> Option<TransportKind> {
        match self {
            DispatchOutcome::Delivered(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn into_result(self) -> BridgeResult<TransportKind> {
        match self {
            DispatchOutcome::Delivered(kind) => Ok(kind),
            DispatchOutcome::Rejected(err) | DispatchOutcome::Failed(err) => Err(err),
            DispatchOutcome::Dropped => Err(invalid_argument(
                "the Android interface has no method for this command",
            )),
            DispatchOutcome::NoTransport => Err(transport_unavailable("No native APIs found.")),
        }
    }
}

/// Probes, selects and invokes a transport for `envelope`. Interfaces are looked up again on
/// every call since the webview may inject them after the handler was installed.
pub(crate) fn relay(
    scope: &dyn GlobalScope,
    names: &InterfaceNames,
    sink: &dyn DiagnosticSink,
    envelope: &CommandEnvelope,
) -> DispatchOutcome {
    let probe = TransportProbe::resolve(scope, names);
    sink.record("relay | interface:", &probe.summary());
    sink.record(
        "relay | command and params:",
        &json!({
            "command": envelope.command(),
            "params": Value::Object(envelope.params().clone()),
        }),
    );

    match select_transport(probe).invoke(scope, envelope) {
        Ok(Delivery::Delivered(kind)) => DispatchOutcome::Delivered(kind),
        Ok(Delivery::Unmapped) => {
            sink.record("relay | unmapped command:", &json!(envelope.command()));
            DispatchOutcome::Dropped
        }
        Ok(Delivery::NoTransport) => {
            sink.record("relay", &json!("No native APIs found."));
            DispatchOutcome::NoTransport
        }
        Err(err) => {
            sink.record("relay | native call failed:", &json!(err.to_string()));
            DispatchOutcome::Failed(err)
        }
    }
}
