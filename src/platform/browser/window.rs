//! `window`-backed global scope for pages running inside a webview.

use std::sync::Arc;

use js_sys::{Array, Function, Object, Reflect};
use serde_json::{Map, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::bridge::{install_in_container, AnalyticsHandler, BridgeConfig, ContainerVersion};
use crate::host::{GlobalPath, GlobalScope, HostError, HostResult, HostValue, WriteMode};

/// The page's global object as seen through `js_sys::global()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowScope;

impl GlobalScope for WindowScope {
    fn get(&self, path: &GlobalPath) -> Option<HostValue> {
        resolve(path).map(|value| to_host_value(&value))
    }

    fn set(&self, name: &str, value: HostValue, mode: WriteMode) -> HostResult<()> {
        let js_value = match value {
            HostValue::Data(data) => to_js(&data)?,
            HostValue::Object => Object::new().into(),
            HostValue::Function => Function::new_no_args("").into(),
            HostValue::Handler(handler) => handler_object(handler)?.into(),
        };
        let global = js_sys::global();
        let key = JsValue::from_str(name);
        let written = match mode {
            WriteMode::Writable => Reflect::set(&global, &key, &js_value),
            WriteMode::Locked => {
                let descriptor = Object::new();
                set_property(&descriptor, "value", &js_value)?;
                set_property(&descriptor, "writable", &JsValue::FALSE)?;
                set_property(&descriptor, "configurable", &JsValue::FALSE)?;
                set_property(&descriptor, "enumerable", &JsValue::TRUE)?;
                Reflect::define_property(&global, &key, &descriptor)
            }
        };
        match written {
            Ok(true) => Ok(()),
            Ok(false) => Err(HostError::ReadOnly {
                name: name.to_string(),
            }),
            Err(err) => Err(HostError::Threw {
                path: name.to_string(),
                message: js_error_message(err),
            }),
        }
    }

    fn call(&self, path: &GlobalPath, args: Vec<Value>) -> HostResult<()> {
        let target = resolve(path).ok_or_else(|| HostError::MissingPath {
            path: path.to_string(),
        })?;
        let function = target
            .dyn_into::<Function>()
            .map_err(|_| HostError::NotCallable {
                path: path.to_string(),
            })?;
        let this = match path.parent() {
            Some(parent) => resolve(&parent).unwrap_or(JsValue::UNDEFINED),
            None => js_sys::global().into(),
        };

        let js_args = Array::new();
        for arg in &args {
            js_args.push(&to_js(arg)?);
        }
        function
            .apply(&this, &js_args)
            .map_err(|err| HostError::Threw {
                path: path.to_string(),
                message: js_error_message(err),
            })?;
        Ok(())
    }
}

fn resolve(path: &GlobalPath) -> Option<JsValue> {
    let mut current: JsValue = js_sys::global().into();
    for segment in path.segments() {
        if current.is_null() || current.is_undefined() {
            return None;
        }
        current = Reflect::get(&current, &JsValue::from_str(segment)).ok()?;
    }
    (!current.is_undefined()).then_some(current)
}

fn to_host_value(value: &JsValue) -> HostValue {
    if value.is_function() {
        HostValue::Function
    } else if value.is_object() {
        HostValue::Object
    } else {
        HostValue::Data(from_js(value).unwrap_or(Value::Null))
    }
}

/// `undefined` (and anything `JSON` cannot represent) maps to `None`.
fn from_js(value: &JsValue) -> Option<Value> {
    if value.is_undefined() {
        return None;
    }
    let serialized = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&serialized).ok()
}

/// Falsy values become `""` so validation rejects them; other non-strings are coerced the way
/// `String(value)` would.
fn name_from_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if value.is_falsy() {
        return String::new();
    }
    String::from(value.unchecked_ref::<Object>().to_string())
}

fn to_js(value: &Value) -> HostResult<JsValue> {
    let serialized = serde_json::to_string(value).map_err(|err| HostError::Threw {
        path: "JSON.stringify".into(),
        message: err.to_string(),
    })?;
    js_sys::JSON::parse(&serialized).map_err(|err| HostError::Threw {
        path: "JSON.parse".into(),
        message: js_error_message(err),
    })
}

fn set_property(target: &Object, key: &str, value: &JsValue) -> HostResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| HostError::Threw {
            path: key.to_string(),
            message: js_error_message(err),
        })
}

fn set_method<F>(target: &Object, key: &str, method: F) -> HostResult<()>
where
    F: Fn(JsValue, JsValue) + 'static,
{
    let closure = Closure::wrap(Box::new(method) as Box<dyn Fn(JsValue, JsValue)>);
    set_property(target, key, closure.as_ref())?;
    // The handler lives as long as the page; the closure must too.
    closure.forget();
    Ok(())
}

/// Builds the JavaScript face of a handler: the configured names plus camelCase methods that
/// forward into the Rust handler.
fn handler_object(handler: AnalyticsHandler) -> HostResult<Object> {
    let object = Object::new();
    set_property(
        &object,
        "androidInterfaceName",
        &JsValue::from_str(handler.android_interface_name()),
    )?;
    set_property(
        &object,
        "iOSInterfaceName",
        &JsValue::from_str(handler.ios_interface_name()),
    )?;
    set_property(
        &object,
        "commonInterfaceName",
        &JsValue::from_str(handler.common_interface_name().unwrap_or_default()),
    )?;

    let h = handler.clone();
    set_method(&object, "logEvent", move |name, params| {
        h.log_event(&name_from_js(&name), from_js(&params));
    })?;
    let h = handler.clone();
    set_method(&object, "setUserProperty", move |name, value| {
        h.set_user_property(&name_from_js(&name), from_js(&value));
    })?;
    let h = handler.clone();
    set_method(&object, "setDefaultEventParameters", move |params, _| {
        h.set_default_event_parameters(from_js(&params));
    })?;
    let h = handler.clone();
    set_method(&object, "setUserId", move |user_id, _| {
        h.set_user_id(from_js(&user_id));
    })?;
    let h = handler.clone();
    set_method(&object, "setAnalyticsCollectionEnabled", move |value, _| {
        h.set_analytics_collection_enabled(from_js(&value));
    })?;
    let h = handler.clone();
    set_method(&object, "resetAnalyticsData", move |_, _| {
        h.reset_analytics_data();
    })?;
    let h = handler.clone();
    set_method(&object, "setConsent", move |consent, _| {
        h.set_consent(from_js(&consent));
    })?;
    set_method(&object, "_callNativeMethod", move |command, params| {
        let params = match from_js(&params) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        handler.relay_command(&name_from_js(&command), params);
    })?;
    Ok(object)
}

fn js_error_message(value: JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        String::from(error.message())
    } else if let Some(text) = value.as_string() {
        text
    } else {
        format!("{value:?}")
    }
}

/// Page bootstrap entry point. `fields` uses the tag-template field names and may also carry
/// `previewMode` / `debugMode`. Returns whether a new handler was published.
#[wasm_bindgen(js_name = installAnalyticsHandler)]
pub fn install_analytics_handler(fields: JsValue) -> bool {
    let fields = from_js(&fields).unwrap_or(Value::Null);
    let config = match &fields {
        Value::Object(_) => BridgeConfig::from_template_fields(&fields),
        _ => Ok(BridgeConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            log::debug!("analytics handler not installed: {err}");
            return false;
        }
    };
    let container = ContainerVersion {
        preview_mode: fields.get("previewMode").and_then(Value::as_bool).unwrap_or(false),
        debug_mode: fields.get("debugMode").and_then(Value::as_bool).unwrap_or(false),
    };

    install_in_container(Arc::new(WindowScope), &config, container).is_installed()
}
