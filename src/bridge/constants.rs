/// Global name the handler is published under unless configured otherwise.
pub const DEFAULT_HANDLER_NAME: &str = "firebaseAnalyticsHandler";
/// Name of the interface the Android host registers with `addJavascriptInterface`.
pub const DEFAULT_ANDROID_INTERFACE_NAME: &str = "AnalyticsWebInterface";
/// Name of the WKScriptMessageHandler the iOS host registers.
pub const DEFAULT_IOS_INTERFACE_NAME: &str = "firebase";

/// Parent path of every iOS script message handler.
pub const IOS_MESSAGE_HANDLERS_PATH: &str = "webkit.messageHandlers";
pub const POST_MESSAGE_METHOD: &str = "postMessage";

pub const LOG_PREFIX: &str = "[Webview Analytics Bridge] |";
pub const LOGGER_NAME: &str = "webview-analytics-bridge";

/// Environment variable holding a JSON object in tag-template field shape.
pub const CONFIG_ENV_VAR: &str = "WEBVIEW_ANALYTICS_BRIDGE_CONFIG";
