use std::fmt::{Display, Formatter};

use crate::host::HostError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeErrorCode {
    InvalidArgument,
    TransportUnavailable,
    InvocationFailed,
    Serialization,
    Config,
}

impl BridgeErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeErrorCode::InvalidArgument => "bridge/invalid-argument",
            BridgeErrorCode::TransportUnavailable => "bridge/transport-unavailable",
            BridgeErrorCode::InvocationFailed => "bridge/invocation-failed",
            BridgeErrorCode::Serialization => "bridge/serialization",
            BridgeErrorCode::Config => "bridge/config",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeError {
    pub code: BridgeErrorCode,
    message: String,
}

impl BridgeError {
    pub fn new(code: BridgeErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for BridgeError {}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        invocation_failed(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        serialization_error(err.to_string())
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

pub fn invalid_argument(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::InvalidArgument, message)
}

pub fn transport_unavailable(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::TransportUnavailable, message)
}

pub fn invocation_failed(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::InvocationFailed, message)
}

pub fn serialization_error(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::Serialization, message)
}

pub fn config_error(message: impl Into<String>) -> BridgeError {
    BridgeError::new(BridgeErrorCode::Config, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_become_invocation_failures() {
        let err: BridgeError = HostError::NotCallable {
            path: "bridge.post".into(),
        }
        .into();
        assert_eq!(err.code, BridgeErrorCode::InvocationFailed);
        assert_eq!(
            err.to_string(),
            "bridge.post is not a function (bridge/invocation-failed)"
        );
    }
}
