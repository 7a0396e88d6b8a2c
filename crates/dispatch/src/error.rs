use shared::{domain::ComponentRef, error::ApiError};
use thiserror::Error;

/// Failure raised by a callback body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// The positional arguments did not have the shape the callback expects.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

impl CallbackError {
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }
}

/// Errors raised while registering or dispatching callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Setup-time: a callback already targets this output.
    #[error("a callback is already registered for output '{0}'")]
    DuplicateTarget(ComponentRef),

    #[error("no callback registered for output '{0}'")]
    UnknownTarget(ComponentRef),

    #[error("request carries no value for dependency '{0}'")]
    MissingValue(ComponentRef),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("arguments for '{target}' were rejected by its callback: {reason}")]
    HandlerArguments { target: ComponentRef, reason: String },

    #[error("callback for '{target}' failed: {reason}")]
    HandlerFailed { target: ComponentRef, reason: String },

    #[error("codec error: {0}")]
    Codec(String),
}

impl DispatchError {
    pub(crate) fn from_callback(target: &ComponentRef, err: CallbackError) -> Self {
        match err {
            CallbackError::InvalidArguments(reason) => Self::HandlerArguments {
                target: target.clone(),
                reason,
            },
            CallbackError::Failed(reason) => Self::HandlerFailed {
                target: target.clone(),
                reason,
            },
        }
    }

    /// True when the caller sent something the server cannot act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTarget(_)
                | Self::MissingValue(_)
                | Self::MalformedRequest(_)
                | Self::HandlerArguments { .. }
        )
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::UnknownTarget(_) => ApiError::not_found(self.to_string()),
            Self::MissingValue(_) | Self::MalformedRequest(_) | Self::HandlerArguments { .. } => {
                ApiError::validation(self.to_string())
            }
            Self::DuplicateTarget(_) | Self::HandlerFailed { .. } | Self::Codec(_) => {
                ApiError::internal(self.to_string())
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(value: DispatchError) -> Self {
        value.to_api_error()
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
