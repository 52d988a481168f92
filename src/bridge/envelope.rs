use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::bridge::error::{invalid_argument, BridgeError};
use crate::util::{spread, stringify};

/// Commands understood by the native analytics interfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeCommand {
    LogEvent,
    SetUserProperty,
    SetDefaultEventParameters,
    SetUserId,
    SetAnalyticsCollectionEnabled,
    ResetAnalyticsData,
    SetConsent,
}

impl BridgeCommand {
    pub const ALL: [BridgeCommand; 7] = [
        BridgeCommand::LogEvent,
        BridgeCommand::SetUserProperty,
        BridgeCommand::SetDefaultEventParameters,
        BridgeCommand::SetUserId,
        BridgeCommand::SetAnalyticsCollectionEnabled,
        BridgeCommand::ResetAnalyticsData,
        BridgeCommand::SetConsent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeCommand::LogEvent => "logEvent",
            BridgeCommand::SetUserProperty => "setUserProperty",
            BridgeCommand::SetDefaultEventParameters => "setDefaultEventParameters",
            BridgeCommand::SetUserId => "setUserId",
            BridgeCommand::SetAnalyticsCollectionEnabled => "setAnalyticsCollectionEnabled",
            BridgeCommand::ResetAnalyticsData => "resetAnalyticsData",
            BridgeCommand::SetConsent => "setConsent",
        }
    }
}

impl Display for BridgeCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BridgeCommand {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BridgeCommand::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| invalid_argument(format!("unknown bridge command '{s}'")))
    }
}

/// The `{command, ...params}` value handed to a transport.
///
/// Parameters are kept apart from the command tag until [`CommandEnvelope::to_message`] spreads
/// them, so the Android transport can still read them positionally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandEnvelope {
    command: String,
    params: Map<String, Value>,
}

impl CommandEnvelope {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Map::new(),
        }
    }

    pub fn for_command(command: BridgeCommand) -> Self {
        Self::new(command.as_str())
    }

    pub fn with_params(command: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Adds `key` when `value` is present. An absent value leaves the key out, as a JavaScript
    /// `undefined` member would be dropped on serialization.
    pub fn field(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(value) = value {
            self.params.insert(key.to_string(), value);
        }
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// `{command, ...params}`; a `command` parameter overrides the tag.
    pub fn to_message(&self) -> Value {
        let mut message = Map::new();
        message.insert("command".to_string(), Value::String(self.command.clone()));
        spread(&mut message, &self.params);
        Value::Object(message)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        stringify(&self.to_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_names_round_trip_through_from_str() {
        for command in BridgeCommand::ALL {
            assert_eq!(command.as_str().parse::<BridgeCommand>().unwrap(), command);
        }
        let err = "trackPageView".parse::<BridgeCommand>().unwrap_err();
        assert_eq!(err.code_str(), "bridge/invalid-argument");
    }

    #[test]
    fn message_spreads_params_after_command() {
        let envelope = CommandEnvelope::for_command(BridgeCommand::LogEvent)
            .field("name", Some(json!("purchase")))
            .field("parameters", Some(json!({"value": 10})));

        assert_eq!(
            envelope.to_message(),
            json!({"command": "logEvent", "name": "purchase", "parameters": {"value": 10}})
        );
    }

    #[test]
    fn absent_fields_are_omitted_but_null_is_kept() {
        let envelope = CommandEnvelope::for_command(BridgeCommand::SetUserId)
            .field("userId", Some(Value::Null))
            .field("ignored", None);

        assert_eq!(
            envelope.to_json().unwrap(),
            r#"{"command":"setUserId","userId":null}"#
        );
    }

    #[test]
    fn command_param_overrides_tag_like_object_spread() {
        let params = json!({"command": "other"}).as_object().unwrap().clone();
        let envelope = CommandEnvelope::with_params("logEvent", params);
        assert_eq!(envelope.command(), "logEvent");
        assert_eq!(envelope.to_message(), json!({"command": "other"}));
    }
}
