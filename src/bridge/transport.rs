//! Native transports and their selection.
//!
//! Probing only reads the global scope, [`select_transport`] is a pure priority choice, and
//! [`Transport::invoke`] is the single step that calls into native code.

use std::fmt::{self, Display, Formatter};

use serde_json::{json, Value};

use crate::bridge::constants::{IOS_MESSAGE_HANDLERS_PATH, POST_MESSAGE_METHOD};
use crate::bridge::envelope::{BridgeCommand, CommandEnvelope};
use crate::bridge::error::BridgeResult;
use crate::host::{GlobalPath, GlobalScope, HostValue};
use crate::util::stringify_optional;

/// Interface names a handler probes for on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceNames {
    pub android: String,
    pub ios: String,
    pub common: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Android,
    Ios,
    Common,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Android => "android",
            TransportKind::Ios => "ios",
            TransportKind::Common => "common",
        }
    }
}

impl Display for TransportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the common entry point takes its string argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommonForm {
    /// The path names a function: `entry(json)`.
    Call,
    /// The path names an object: `entry.postMessage(json)`.
    PostMessage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    Android { interface: GlobalPath },
    Ios { handler: GlobalPath },
    Common { entry: GlobalPath, form: CommonForm },
    None,
}

/// Interfaces found during one probe of the global scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportProbe {
    pub android: Option<GlobalPath>,
    pub ios: Option<GlobalPath>,
    pub common: Option<(GlobalPath, CommonForm)>,
}

impl TransportProbe {
    pub fn resolve(scope: &dyn GlobalScope, names: &InterfaceNames) -> Self {
        let android = GlobalPath::single(names.android.as_str());
        let ios = GlobalPath::parse(IOS_MESSAGE_HANDLERS_PATH).child(names.ios.as_str());

        let common = names
            .common
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(GlobalPath::parse)
            .and_then(|path| {
                let form = match scope.get(&path)? {
                    HostValue::Object | HostValue::Handler(_) => CommonForm::PostMessage,
                    value if value.is_truthy() => CommonForm::Call,
                    _ => return None,
                };
                Some((path, form))
            });

        Self {
            android: present(scope, android),
            ios: present(scope, ios),
            common,
        }
    }

    /// Presence flags, for diagnostics.
    pub fn summary(&self) -> Value {
        json!({
            "androidInterface": self.android.is_some(),
            "iOSInterface": self.ios.is_some(),
            "commonInterface": self.common.is_some(),
        })
    }
}

fn present(scope: &dyn GlobalScope, path: GlobalPath) -> Option<GlobalPath> {
    scope
        .get(&path)
        .filter(HostValue::is_truthy)
        .map(|_| path)
}

/// First match wins: Android, then iOS, then Common.
pub fn select_transport(probe: TransportProbe) -> Transport {
    if let Some(interface) = probe.android {
        Transport::Android { interface }
    } else if let Some(handler) = probe.ios {
        Transport::Ios { handler }
    } else if let Some((entry, form)) = probe.common {
        Transport::Common { entry, form }
    } else {
        Transport::None
    }
}

/// Result of handing an envelope to the selected transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered(TransportKind),
    /// The Android interface has no method for the command.
    Unmapped,
    NoTransport,
}

impl Transport {
    pub fn kind(&self) -> Option<TransportKind> {
        match self {
            Transport::Android { .. } => Some(TransportKind::Android),
            Transport::Ios { .. } => Some(TransportKind::Ios),
            Transport::Common { .. } => Some(TransportKind::Common),
            Transport::None => None,
        }
    }

    pub fn invoke(&self, scope: &dyn GlobalScope, envelope: &CommandEnvelope) -> BridgeResult<Delivery> {
        match self {
            Transport::Android { interface } => {
                let Some((method, args)) = android_call(envelope)? else {
                    return Ok(Delivery::Unmapped);
                };
                scope.call(&interface.child(method), args)?;
                Ok(Delivery::Delivered(TransportKind::Android))
            }
            Transport::Ios { handler } => {
                scope.call(
                    &handler.child(POST_MESSAGE_METHOD),
                    vec![envelope.to_message()],
                )?;
                Ok(Delivery::Delivered(TransportKind::Ios))
            }
            Transport::Common { entry, form } => {
                let target = match form {
                    CommonForm::Call => entry.clone(),
                    CommonForm::PostMessage => entry.child(POST_MESSAGE_METHOD),
                };
                scope.call(&target, vec![Value::String(envelope.to_json()?)])?;
                Ok(Delivery::Delivered(TransportKind::Common))
            }
            Transport::None => Ok(Delivery::NoTransport),
        }
    }
}

/// Maps an envelope onto the Android interface's method and positional arguments. Complex
/// values are passed as JSON strings; primitives are passed through.
pub fn android_call(envelope: &CommandEnvelope) -> BridgeResult<Option<(&'static str, Vec<Value>)>> {
    let Ok(command) = envelope.command().parse::<BridgeCommand>() else {
        return Ok(None);
    };
    let args = match command {
        BridgeCommand::LogEvent => vec![
            positional(envelope, "name"),
            json_string(envelope, "parameters")?,
        ],
        BridgeCommand::SetUserProperty => {
            vec![positional(envelope, "name"), positional(envelope, "value")]
        }
        BridgeCommand::SetDefaultEventParameters => vec![json_string(envelope, "parameters")?],
        BridgeCommand::SetUserId => vec![positional(envelope, "userId")],
        BridgeCommand::SetAnalyticsCollectionEnabled => vec![positional(envelope, "value")],
        BridgeCommand::ResetAnalyticsData => Vec::new(),
        BridgeCommand::SetConsent => vec![json_string(envelope, "consentSettings")?],
    };
    Ok(Some((command.as_str(), args)))
}

fn positional(envelope: &CommandEnvelope, key: &str) -> Value {
    envelope.param(key).cloned().unwrap_or(Value::Null)
}

fn json_string(envelope: &CommandEnvelope, key: &str) -> BridgeResult<Value> {
    Ok(stringify_optional(envelope.param(key))?
        .map(Value::String)
        .unwrap_or(Value::Null))
}
