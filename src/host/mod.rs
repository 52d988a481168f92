//! Host-environment collaborator: the global scope the bridge reads from, publishes into, and
//! invokes native interfaces through.
//!
//! The bridge never touches a page directly. Everything goes through [`GlobalScope`], which the
//! browser backend implements over `window` and [`memory::InMemoryGlobalScope`] implements for
//! tests and non-browser embedders.

pub mod memory;

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

use crate::bridge::AnalyticsHandler;
use crate::util::is_truthy;

pub use memory::{InMemoryGlobalScope, NativeCall};

/// A global name or a dotted path below the global object, stored as explicit segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlobalPath {
    segments: Vec<String>,
}

impl GlobalPath {
    /// Splits `dotted` on `.`; `"webkit.messageHandlers.firebase"` yields three segments.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_owned).collect(),
        }
    }

    /// A path made of exactly one segment, even when `name` itself contains dots.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path of the object owning the last segment, or `None` for a top-level name.
    pub fn parent(&self) -> Option<GlobalPath> {
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self {
                segments: rest.to_vec(),
            }),
            _ => None,
        }
    }
}

impl Display for GlobalPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// What a global lookup found.
#[derive(Clone, Debug)]
pub enum HostValue {
    /// Plain data as seen through `JSON` (strings, numbers, flags, records).
    Data(Value),
    /// An opaque host object such as a native interface injected by the webview.
    Object,
    /// A callable.
    Function,
    /// A bridge handler published by the installer.
    Handler(AnalyticsHandler),
}

impl HostValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            HostValue::Data(value) => is_truthy(value),
            HostValue::Object | HostValue::Function | HostValue::Handler(_) => true,
        }
    }
}

/// How a global write treats later writers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Writable,
    /// The slot rejects any further write.
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    MissingPath { path: String },
    NotCallable { path: String },
    ReadOnly { name: String },
    Threw { path: String, message: String },
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HostError::MissingPath { path } => write!(f, "{path} is not defined"),
            HostError::NotCallable { path } => write!(f, "{path} is not a function"),
            HostError::ReadOnly { name } => write!(f, "{name} is read-only"),
            HostError::Threw { path, message } => write!(f, "{path} threw: {message}"),
        }
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = Result<T, HostError>;

/// Read, write and invoke access to the page's global scope.
///
/// Implementations must never panic on missing paths: [`GlobalScope::get`] answers `None` as soon
/// as any segment is absent.
pub trait GlobalScope: Send + Sync {
    fn get(&self, path: &GlobalPath) -> Option<HostValue>;

    fn set(&self, name: &str, value: HostValue, mode: WriteMode) -> HostResult<()>;

    /// Calls the function at `path` with `this` bound to its parent object.
    fn call(&self, path: &GlobalPath, args: Vec<Value>) -> HostResult<()>;
}
