#![cfg(not(target_arch = "wasm32"))]

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use webview_analytics_bridge::bridge::{
    install, install_with_sink, AnalyticsHandler, BridgeConfig, DiagnosticSink, DispatchOutcome,
    InstallOutcome, TransportKind,
};
use webview_analytics_bridge::host::{GlobalScope, InMemoryGlobalScope, NativeCall};

const ANDROID_METHODS: [&str; 7] = [
    "logEvent",
    "setUserProperty",
    "setDefaultEventParameters",
    "setUserId",
    "setAnalyticsCollectionEnabled",
    "resetAnalyticsData",
    "setConsent",
];

#[derive(Default)]
struct CollectingSink {
    labels: Mutex<Vec<String>>,
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, label: &str, _payload: &Value) {
        self.labels.lock().unwrap().push(label.to_string());
    }
}

fn installed(
    config: BridgeConfig,
) -> (Arc<InMemoryGlobalScope>, AnalyticsHandler, Arc<CollectingSink>) {
    let scope = Arc::new(InMemoryGlobalScope::new());
    let sink = Arc::new(CollectingSink::default());
    let outcome = install_with_sink(
        scope.clone() as Arc<dyn GlobalScope>,
        &config,
        sink.clone(),
    );
    let handler = outcome.handler().cloned().expect("handler installed");
    (scope, handler, sink)
}

#[test]
fn install_is_idempotent() {
    let scope = Arc::new(InMemoryGlobalScope::new());
    let config = BridgeConfig::default();

    let first = install(scope.clone(), &config);
    let second = install(scope.clone(), &config);

    assert!(first.is_installed());
    assert!(matches!(second, InstallOutcome::AlreadyPresent));
    let published = scope.handler(config.handler_name()).unwrap();
    assert!(published.same_instance(first.handler().unwrap()));
    assert_eq!(scope.global_names(), vec![config.handler_name().to_string()]);
    scope.reset();
}

#[test]
fn android_wins_when_ios_is_also_present() {
    let (scope, handler, _) = installed(BridgeConfig::default());
    scope.define_interface("AnalyticsWebInterface", &ANDROID_METHODS);
    scope.define_interface("webkit.messageHandlers.firebase", &["postMessage"]);

    let outcome = handler.log_event("purchase", json!({"value": 10}));

    assert_eq!(outcome, DispatchOutcome::Delivered(TransportKind::Android));
    assert_eq!(
        scope.calls(),
        vec![NativeCall {
            path: "AnalyticsWebInterface.logEvent".into(),
            args: vec![json!("purchase"), json!(r#"{"value":10}"#)],
        }]
    );
    scope.reset();
}

#[test]
fn invalid_arguments_never_reach_a_transport() {
    let (scope, handler, _) = installed(BridgeConfig::default());
    scope.define_interface("AnalyticsWebInterface", &ANDROID_METHODS);

    handler.log_event("", json!({}));
    handler.set_user_property("x", None);
    handler.set_analytics_collection_enabled(json!("true"));
    assert!(scope.calls().is_empty());

    handler.set_analytics_collection_enabled(json!(true));
    assert_eq!(scope.calls().len(), 1);
    scope.reset();
}

#[test]
fn common_transport_receives_canonical_json() {
    let (scope, handler, _) =
        installed(BridgeConfig::new().with_common_interface_name("WebviewInterface.postMessage"));
    scope.define_function("WebviewInterface.postMessage");

    handler.log_event("purchase", json!({"value": 10}));

    let calls = scope.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "WebviewInterface.postMessage");
    let sent: Value = serde_json::from_str(calls[0].args[0].as_str().unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({"command": "logEvent", "name": "purchase", "parameters": {"value": 10}})
    );
    scope.reset();
}

#[test]
fn missing_native_layer_is_harmless() {
    let (scope, handler, sink) = installed(BridgeConfig::default());
    let before = scope.global_names();

    let outcomes = [
        handler.log_event("open", None),
        handler.set_user_property("tier", json!("gold")),
        handler.set_default_event_parameters(json!({"a": 1})),
        handler.set_user_id(json!("u-1")),
        handler.set_analytics_collection_enabled(json!(false)),
        handler.reset_analytics_data(),
        handler.set_consent(json!({"ad_storage": "denied"})),
    ];

    assert!(outcomes
        .iter()
        .all(|outcome| *outcome == DispatchOutcome::NoTransport));
    assert_eq!(scope.global_names(), before);
    assert!(scope.calls().is_empty());
    assert!(sink.labels.lock().unwrap().iter().any(|label| label == "relay"));
    scope.reset();
}

#[test]
fn throwing_transport_is_contained() {
    let (scope, handler, _) = installed(BridgeConfig::default());
    scope.define_throwing_function("webkit.messageHandlers.firebase.postMessage", "detached");

    let outcome = handler.set_consent(json!({"analytics_storage": "granted"}));

    assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    assert!(outcome.into_result().is_err());
    scope.reset();
}

#[test]
fn interface_injected_after_install_is_used() {
    let (scope, handler, _) = installed(BridgeConfig::default());
    assert_eq!(handler.reset_analytics_data(), DispatchOutcome::NoTransport);

    scope.define_interface("webkit.messageHandlers.firebase", &["postMessage"]);

    assert_eq!(
        handler.reset_analytics_data().transport(),
        Some(TransportKind::Ios)
    );
    assert_eq!(
        scope.calls()[0].args,
        vec![json!({"command": "resetAnalyticsData"})]
    );
    scope.reset();
}

#[test]
fn detached_interface_falls_back_to_next_transport() {
    let (scope, handler, _) = installed(BridgeConfig::default());
    scope.define_interface("AnalyticsWebInterface", &ANDROID_METHODS);
    scope.define_interface("webkit.messageHandlers.firebase", &["postMessage"]);
    assert_eq!(
        handler.set_user_id(json!("u-1")).transport(),
        Some(TransportKind::Android)
    );

    scope.remove("AnalyticsWebInterface");
    let outcome = handler.set_user_id(json!("u-2"));

    assert_eq!(outcome.transport(), Some(TransportKind::Ios));
    let calls = scope.take_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].path, "webkit.messageHandlers.firebase.postMessage");
    assert_eq!(
        calls[1].args,
        vec![json!({"command": "setUserId", "userId": "u-2"})]
    );

    scope.remove("webkit");
    assert_eq!(handler.set_user_id(json!("u-3")), DispatchOutcome::NoTransport);
    scope.reset();
}
