use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::bridge::config::BridgeConfig;
use crate::bridge::diagnostics::SharedDiagnosticSink;
use crate::bridge::envelope::{BridgeCommand, CommandEnvelope};
use crate::bridge::error::{invalid_argument, BridgeResult};
use crate::bridge::relay::{relay, DispatchOutcome};
use crate::bridge::transport::InterfaceNames;
use crate::host::GlobalScope;
use crate::util::is_truthy;

/// The object published into the page's global scope.
///
/// Every method validates its arguments, wraps them in a [`CommandEnvelope`] and relays it to
/// whichever native interface is present at call time. Invalid arguments are a silent no-op and
/// native failures are only logged; nothing here panics or returns an error to page code.
#[derive(Clone)]
pub struct AnalyticsHandler {
    inner: Arc<HandlerInner>,
}

struct HandlerInner {
    names: InterfaceNames,
    scope: Arc<dyn GlobalScope>,
    sink: SharedDiagnosticSink,
}

impl fmt::Debug for AnalyticsHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsHandler")
            .field("android_interface_name", &self.inner.names.android)
            .field("ios_interface_name", &self.inner.names.ios)
            .field("common_interface_name", &self.inner.names.common)
            .finish()
    }
}

impl AnalyticsHandler {
    pub fn new(
        config: &BridgeConfig,
        scope: Arc<dyn GlobalScope>,
        sink: SharedDiagnosticSink,
    ) -> Self {
        let names = InterfaceNames {
            android: config.android_interface_name().to_string(),
            ios: config.ios_interface_name().to_string(),
            common: config.common_interface_name().map(str::to_owned),
        };
        Self {
            inner: Arc::new(HandlerInner { names, scope, sink }),
        }
    }

    pub fn android_interface_name(&self) -> &str {
        &self.inner.names.android
    }

    pub fn ios_interface_name(&self) -> &str {
        &self.inner.names.ios
    }

    pub fn common_interface_name(&self) -> Option<&str> {
        self.inner.names.common.as_deref()
    }

    /// Whether both values are the same published object.
    pub fn same_instance(&self, other: &AnalyticsHandler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn log_event(&self, name: &str, params: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| {
            require_name(name, "event name")?;
            Ok(CommandEnvelope::for_command(BridgeCommand::LogEvent)
                .field("name", Some(Value::String(name.to_string())))
                .field("parameters", params.into()))
        })
    }

    /// `value` may be any JSON value including `null`; only an absent value is rejected.
    pub fn set_user_property(&self, name: &str, value: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| {
            require_name(name, "user property name")?;
            let value = value
                .into()
                .ok_or_else(|| invalid_argument("user property value is undefined"))?;
            Ok(CommandEnvelope::for_command(BridgeCommand::SetUserProperty)
                .field("name", Some(Value::String(name.to_string())))
                .field("value", Some(value)))
        })
    }

    pub fn set_default_event_parameters(&self, params: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| {
            let params = require_truthy(params.into(), "default event parameters")?;
            Ok(CommandEnvelope::for_command(BridgeCommand::SetDefaultEventParameters)
                .field("parameters", Some(params)))
        })
    }

    /// An empty string or `null` is forwarded so the native side can clear the user id.
    pub fn set_user_id(&self, user_id: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| {
            let user_id = user_id
                .into()
                .ok_or_else(|| invalid_argument("user id is undefined"))?;
            Ok(CommandEnvelope::for_command(BridgeCommand::SetUserId).field("userId", Some(user_id)))
        })
    }

    /// Only a JSON boolean is accepted; `"true"` or `1` are rejected.
    pub fn set_analytics_collection_enabled(&self, value: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| match value.into() {
            Some(Value::Bool(enabled)) => Ok(CommandEnvelope::for_command(
                BridgeCommand::SetAnalyticsCollectionEnabled,
            )
            .field("value", Some(Value::Bool(enabled)))),
            _ => Err(invalid_argument("collection flag must be a boolean")),
        })
    }

    pub fn reset_analytics_data(&self) -> DispatchOutcome {
        self.guarded(|| Ok(CommandEnvelope::for_command(BridgeCommand::ResetAnalyticsData)))
    }

    pub fn set_consent(&self, consent_settings: impl Into<Option<Value>>) -> DispatchOutcome {
        self.guarded(|| {
            let consent = require_truthy(consent_settings.into(), "consent settings")?;
            Ok(CommandEnvelope::for_command(BridgeCommand::SetConsent)
                .field("consentSettings", Some(consent)))
        })
    }

    /// Relays an arbitrary command without validation. Commands the Android interface does not
    /// know are dropped there; iOS and common transports forward them as-is.
    pub fn relay_command(&self, command: &str, params: Map<String, Value>) -> DispatchOutcome {
        self.dispatch(&CommandEnvelope::with_params(command, params))
    }

    fn guarded<F>(&self, build: F) -> DispatchOutcome
    where
        F: FnOnce() -> BridgeResult<CommandEnvelope>,
    {
        match build() {
            Ok(envelope) => self.dispatch(&envelope),
            Err(err) => DispatchOutcome::Rejected(err),
        }
    }

    fn dispatch(&self, envelope: &CommandEnvelope) -> DispatchOutcome {
        relay(
            self.inner.scope.as_ref(),
            &self.inner.names,
            self.inner.sink.as_ref(),
            envelope,
        )
    }
}

fn require_name(name: &str, what: &str) -> BridgeResult<()> {
    if name.is_empty() {
        return Err(invalid_argument(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_truthy(value: Option<Value>, what: &str) -> BridgeResult<Value> {
    match value {
        Some(value) if is_truthy(&value) => Ok(value),
        _ => Err(invalid_argument(format!("{what} must be provided"))),
    }
}
