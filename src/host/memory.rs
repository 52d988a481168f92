//! Scriptable in-process global scope.
//!
//! Native interfaces are declared up front (or later, to simulate interfaces that attach after the
//! handler is installed) and every successful invocation is recorded as a [`NativeCall`].

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use serde_json::Value;

use crate::bridge::AnalyticsHandler;
use crate::host::{GlobalPath, GlobalScope, HostError, HostResult, HostValue, WriteMode};

#[derive(Clone, Debug, PartialEq)]
pub struct NativeCall {
    pub path: String,
    pub args: Vec<Value>,
}

#[derive(Clone, Debug)]
enum Node {
    Data(Value),
    Object(BTreeMap<String, Node>),
    Function(Behavior),
    Handler(AnalyticsHandler),
}

#[derive(Clone, Debug)]
enum Behavior {
    Record,
    Throw(String),
}

#[derive(Default)]
struct State {
    globals: BTreeMap<String, Node>,
    locked: HashSet<String>,
    calls: Vec<NativeCall>,
}

#[derive(Default)]
pub struct InMemoryGlobalScope {
    state: Mutex<State>,
}

impl std::fmt::Debug for InMemoryGlobalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGlobalScope")
            .field("globals", &self.global_names())
            .finish()
    }
}

impl InMemoryGlobalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an object with recording methods, creating missing parents along `path`.
    pub fn define_interface(&self, path: &str, methods: &[&str]) {
        let path = GlobalPath::parse(path);
        let mut state = self.state.lock().unwrap();
        let object = ensure_object(&mut state.globals, path.segments());
        for method in methods {
            object.insert((*method).to_string(), Node::Function(Behavior::Record));
        }
    }

    /// Declares a recording function at `path`.
    pub fn define_function(&self, path: &str) {
        self.define_node(&GlobalPath::parse(path), Node::Function(Behavior::Record));
    }

    /// Declares a function at `path` that fails with `message` whenever it is invoked.
    pub fn define_throwing_function(&self, path: &str, message: impl Into<String>) {
        self.define_node(
            &GlobalPath::parse(path),
            Node::Function(Behavior::Throw(message.into())),
        );
    }

    pub fn define_data(&self, path: &str, value: Value) {
        self.define_node(&GlobalPath::parse(path), Node::Data(value));
    }

    /// Removes the top-level global `name` and its lock, if any.
    pub fn remove(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.globals.remove(name);
        state.locked.remove(name);
    }

    /// The handler published under `name`, if the slot holds one.
    pub fn handler(&self, name: &str) -> Option<AnalyticsHandler> {
        match self.state.lock().unwrap().globals.get(name) {
            Some(Node::Handler(handler)) => Some(handler.clone()),
            _ => None,
        }
    }

    pub fn global_names(&self) -> Vec<String> {
        self.state.lock().unwrap().globals.keys().cloned().collect()
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.state.lock().unwrap().locked.contains(name)
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<NativeCall> {
        std::mem::take(&mut self.state.lock().unwrap().calls)
    }

    /// Drops every global, lock and recorded call. Published handlers hold a reference back to
    /// their scope, so this also releases them.
    pub fn reset(&self) {
        *self.state.lock().unwrap() = State::default();
    }

    fn define_node(&self, path: &GlobalPath, node: Node) {
        let mut state = self.state.lock().unwrap();
        match path.segments().split_last() {
            Some((last, [])) => {
                state.globals.insert(last.clone(), node);
            }
            Some((last, parents)) => {
                ensure_object(&mut state.globals, parents).insert(last.clone(), node);
            }
            None => {}
        }
    }
}

fn ensure_object<'a>(
    mut map: &'a mut BTreeMap<String, Node>,
    segments: &[String],
) -> &'a mut BTreeMap<String, Node> {
    for segment in segments {
        let entry = map
            .entry(segment.clone())
            .or_insert_with(|| Node::Object(BTreeMap::new()));
        if !matches!(entry, Node::Object(_)) {
            *entry = Node::Object(BTreeMap::new());
        }
        map = match entry {
            Node::Object(children) => children,
            _ => unreachable!("entry was just replaced with an object"),
        };
    }
    map
}

fn lookup<'a>(globals: &'a BTreeMap<String, Node>, path: &GlobalPath) -> Option<Lookup<'a>> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = Lookup::Node(globals.get(first)?);
    for segment in rest {
        current = match current {
            Lookup::Node(Node::Object(children)) => Lookup::Node(children.get(segment)?),
            Lookup::Node(Node::Data(Value::Object(map))) | Lookup::Json(Value::Object(map)) => {
                Lookup::Json(map.get(segment)?)
            }
            _ => return None,
        };
    }
    Some(current)
}

enum Lookup<'a> {
    Node(&'a Node),
    Json(&'a Value),
}

impl Lookup<'_> {
    fn to_host_value(&self) -> HostValue {
        match self {
            Lookup::Node(Node::Data(value)) => HostValue::Data(value.clone()),
            Lookup::Json(value) => HostValue::Data((*value).clone()),
            Lookup::Node(Node::Object(_)) => HostValue::Object,
            Lookup::Node(Node::Function(_)) => HostValue::Function,
            Lookup::Node(Node::Handler(handler)) => HostValue::Handler(handler.clone()),
        }
    }
}

impl GlobalScope for InMemoryGlobalScope {
    fn get(&self, path: &GlobalPath) -> Option<HostValue> {
        let state = self.state.lock().unwrap();
        lookup(&state.globals, path).map(|found| found.to_host_value())
    }

    fn set(&self, name: &str, value: HostValue, mode: WriteMode) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.locked.contains(name) {
            return Err(HostError::ReadOnly {
                name: name.to_string(),
            });
        }
        let node = match value {
            HostValue::Data(value) => Node::Data(value),
            HostValue::Object => Node::Object(BTreeMap::new()),
            HostValue::Function => Node::Function(Behavior::Record),
            HostValue::Handler(handler) => Node::Handler(handler),
        };
        state.globals.insert(name.to_string(), node);
        if mode == WriteMode::Locked {
            state.locked.insert(name.to_string());
        }
        Ok(())
    }

    fn call(&self, path: &GlobalPath, args: Vec<Value>) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        let behavior = match lookup(&state.globals, path) {
            None => {
                return Err(HostError::MissingPath {
                    path: path.to_string(),
                })
            }
            Some(Lookup::Node(Node::Function(behavior))) => behavior.clone(),
            Some(_) => {
                return Err(HostError::NotCallable {
                    path: path.to_string(),
                })
            }
        };
        match behavior {
            Behavior::Record => {
                state.calls.push(NativeCall {
                    path: path.to_string(),
                    args,
                });
                Ok(())
            }
            Behavior::Throw(message) => Err(HostError::Threw {
                path: path.to_string(),
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_segments_resolve_to_none() {
        let scope = InMemoryGlobalScope::new();
        scope.define_interface("webkit.messageHandlers.firebase", &["postMessage"]);

        assert!(scope.get(&GlobalPath::parse("webkit.messageHandlers.firebase")).is_some());
        assert!(scope.get(&GlobalPath::parse("webkit.messageHandlers.other")).is_none());
        assert!(scope.get(&GlobalPath::parse("webkit.nothing.firebase")).is_none());
        assert!(scope.get(&GlobalPath::parse("absent")).is_none());
    }

    #[test]
    fn data_records_can_be_traversed() {
        let scope = InMemoryGlobalScope::new();
        scope.define_data("settings", json!({"nested": {"flag": true}}));

        let found = scope.get(&GlobalPath::parse("settings.nested.flag")).unwrap();
        assert!(matches!(found, HostValue::Data(Value::Bool(true))));
        assert!(scope.get(&GlobalPath::parse("settings.nested.flag.deeper")).is_none());
    }

    #[test]
    fn call_records_arguments() {
        let scope = InMemoryGlobalScope::new();
        scope.define_interface("AnalyticsWebInterface", &["setUserId"]);

        scope
            .call(
                &GlobalPath::parse("AnalyticsWebInterface.setUserId"),
                vec![json!("user-1")],
            )
            .unwrap();

        assert_eq!(
            scope.take_calls(),
            vec![NativeCall {
                path: "AnalyticsWebInterface.setUserId".into(),
                args: vec![json!("user-1")],
            }]
        );
        assert!(scope.calls().is_empty());
    }

    #[test]
    fn call_reports_missing_and_non_callable_targets() {
        let scope = InMemoryGlobalScope::new();
        scope.define_interface("iface", &[]);

        let missing = scope
            .call(&GlobalPath::parse("iface.logEvent"), vec![])
            .unwrap_err();
        assert_eq!(
            missing,
            HostError::MissingPath {
                path: "iface.logEvent".into()
            }
        );
        let not_callable = scope.call(&GlobalPath::parse("iface"), vec![]).unwrap_err();
        assert!(matches!(not_callable, HostError::NotCallable { .. }));
    }

    #[test]
    fn throwing_function_surfaces_message() {
        let scope = InMemoryGlobalScope::new();
        scope.define_throwing_function("bridge.post", "boom");

        let err = scope
            .call(&GlobalPath::parse("bridge.post"), vec![json!("{}")])
            .unwrap_err();
        assert_eq!(err.to_string(), "bridge.post threw: boom");
        assert!(scope.calls().is_empty());
    }

    #[test]
    fn locked_slots_reject_writes() {
        let scope = InMemoryGlobalScope::new();
        scope
            .set("slot", HostValue::Data(json!(1)), WriteMode::Locked)
            .unwrap();

        let err = scope
            .set("slot", HostValue::Data(json!(2)), WriteMode::Writable)
            .unwrap_err();
        assert_eq!(err, HostError::ReadOnly { name: "slot".into() });
        assert!(scope.is_locked("slot"));

        scope.reset();
        assert!(scope.global_names().is_empty());
        assert!(!scope.is_locked("slot"));
    }
}
