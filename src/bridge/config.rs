use std::env;

use serde::Deserialize;
use serde_json::Value;

use crate::bridge::constants::{
    CONFIG_ENV_VAR, DEFAULT_ANDROID_INTERFACE_NAME, DEFAULT_HANDLER_NAME,
    DEFAULT_IOS_INTERFACE_NAME,
};
use crate::bridge::error::{config_error, BridgeResult};

/// Names the bridge publishes itself under and probes for at dispatch time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    handler_name: String,
    android_interface_name: String,
    ios_interface_name: String,
    common_interface_name: Option<String>,
    enable_log: bool,
    lock_handler: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            handler_name: DEFAULT_HANDLER_NAME.to_string(),
            android_interface_name: DEFAULT_ANDROID_INTERFACE_NAME.to_string(),
            ios_interface_name: DEFAULT_IOS_INTERFACE_NAME.to_string(),
            common_interface_name: None,
            enable_log: false,
            lock_handler: false,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler_name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = or_default(name.into(), DEFAULT_HANDLER_NAME);
        self
    }

    pub fn with_android_interface_name(mut self, name: impl Into<String>) -> Self {
        self.android_interface_name = or_default(name.into(), DEFAULT_ANDROID_INTERFACE_NAME);
        self
    }

    pub fn with_ios_interface_name(mut self, name: impl Into<String>) -> Self {
        self.ios_interface_name = or_default(name.into(), DEFAULT_IOS_INTERFACE_NAME);
        self
    }

    /// Dotted path of a single entry point shared by both platforms, e.g.
    /// `ReactNativeWebView.postMessage`. An empty name leaves the common transport disabled.
    pub fn with_common_interface_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.common_interface_name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn with_enable_log(mut self, enable: bool) -> Self {
        self.enable_log = enable;
        self
    }

    /// Publish the handler as a non-writable global.
    pub fn with_lock_handler(mut self, lock: bool) -> Self {
        self.lock_handler = lock;
        self
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn android_interface_name(&self) -> &str {
        &self.android_interface_name
    }

    pub fn ios_interface_name(&self) -> &str {
        &self.ios_interface_name
    }

    pub fn common_interface_name(&self) -> Option<&str> {
        self.common_interface_name.as_deref()
    }

    pub fn enable_log(&self) -> bool {
        self.enable_log
    }

    pub fn lock_handler(&self) -> bool {
        self.lock_handler
    }

    /// Builds a config from tag-template fields. Missing or empty fields keep their defaults.
    pub fn from_template_fields(fields: &Value) -> BridgeResult<Self> {
        let fields = TemplateFields::deserialize(fields)
            .map_err(|err| config_error(format!("invalid template fields: {err}")))?;
        Ok(fields.into_config())
    }

    pub fn from_json_str(raw: &str) -> BridgeResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| config_error(format!("config is not valid JSON: {err}")))?;
        if !value.is_object() {
            return Err(config_error("config must be a JSON object"));
        }
        Self::from_template_fields(&value)
    }

    /// Reads `WEBVIEW_ANALYTICS_BRIDGE_CONFIG`; an unset variable yields the defaults.
    pub fn from_env() -> BridgeResult<Self> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(raw) if !raw.trim().is_empty() => Self::from_json_str(&raw),
            _ => Ok(Self::default()),
        }
    }
}

fn or_default(name: String, default: &str) -> String {
    if name.is_empty() {
        default.to_string()
    } else {
        name
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TemplateFields {
    firebase_analytics_handler_name: Option<String>,
    firebase_analytics_interface_name_android: Option<String>,
    #[serde(rename = "firebaseAnalyticsInterfaceNameIOS")]
    firebase_analytics_interface_name_ios: Option<String>,
    firebase_analytics_interface_name_common: Option<String>,
    enable_log: Option<bool>,
    lock_handler: Option<bool>,
}

impl TemplateFields {
    fn into_config(self) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        if let Some(name) = self.firebase_analytics_handler_name {
            config = config.with_handler_name(name);
        }
        if let Some(name) = self.firebase_analytics_interface_name_android {
            config = config.with_android_interface_name(name);
        }
        if let Some(name) = self.firebase_analytics_interface_name_ios {
            config = config.with_ios_interface_name(name);
        }
        if let Some(name) = self.firebase_analytics_interface_name_common {
            config = config.with_common_interface_name(name);
        }
        config
            .with_enable_log(self.enable_log.unwrap_or(false))
            .with_lock_handler(self.lock_handler.unwrap_or(false))
    }
}
