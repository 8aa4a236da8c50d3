use thiserror::Error;

use crate::parse::ParseError;
use crate::pointer::PointerError;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("target not found: {pointer}")]
    TargetNotFound { pointer: String },

    #[error("unsupported edit: {message}")]
    UnsupportedEdit { message: String },

    #[error("pointer error: {0}")]
    Pointer(#[from] PointerError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("payload serialization error: {message}")]
    Payload { message: String },
}

impl PlanError {
    pub(crate) fn target_not_found(pointer: impl Into<String>) -> Self {
        PlanError::TargetNotFound {
            pointer: pointer.into(),
        }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        PlanError::UnsupportedEdit {
            message: message.into(),
        }
    }
}
