use crate::model::TaskId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("not_found - task {0} not found")]
    NotFound(TaskId),
    #[error("invariant_violation - {0}")]
    InvariantViolation(String),
    #[error("malformed_input - line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn invariant<M: Into<String>>(message: M) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub fn malformed<M: Into<String>>(line: usize, reason: M) -> Self {
        Self::MalformedInput {
            line,
            reason: reason.into(),
        }
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::NotFound(_) => "not_found",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::MalformedInput { .. } => "malformed_input",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::InvariantViolation(message)
            | Self::Io(message) => message.clone(),
            Self::NotFound(id) => format!("task {id} not found"),
            Self::MalformedInput { line, reason } => format!("line {line}: {reason}"),
        }
    }
}
