//! Installs the bridge into an in-memory global scope that mimics an Android webview and shows
//! what the native interface receives.

use std::sync::Arc;

use serde_json::json;
use webview_analytics_bridge::bridge::{install_in_container, BridgeConfig, ContainerVersion};
use webview_analytics_bridge::host::InMemoryGlobalScope;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BridgeConfig::from_env()?.with_enable_log(true);
    let scope = Arc::new(InMemoryGlobalScope::new());
    scope.define_interface(
        config.android_interface_name(),
        &["logEvent", "setUserId", "setConsent"],
    );

    let outcome = install_in_container(scope.clone(), &config, ContainerVersion::default());
    let Some(handler) = outcome.handler() else {
        return Err("handler slot already taken".into());
    };

    handler.set_user_id(json!("user-123"));
    handler.set_consent(json!({"analytics_storage": "granted"}));
    let outcome = handler.log_event("tutorial_begin", json!({"tutorial_name": "first_steps"}));
    println!("last dispatch: {outcome:?}");

    for call in scope.take_calls() {
        println!("native call: {} {:?}", call.path, call.args);
    }
    scope.reset();
    Ok(())
}
