use std::fmt;

use crate::action::Action;
use crate::validate::ValidationError;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingField,
    MissingSessionInfo,
    SessionNotLoaded,
    UnknownEntity,
    ModalClosed,
    InvalidDate,
    RequestRejected,
    TransportFailed,
    MalformedResponse,
    ConfigParseError,
    ConfigWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingField => "E1001",
            Self::MissingSessionInfo => "E1002",
            Self::SessionNotLoaded => "E1003",
            Self::UnknownEntity => "E1004",
            Self::ModalClosed => "E1005",
            Self::InvalidDate => "E1006",
            Self::RequestRejected => "E2001",
            Self::TransportFailed => "E2002",
            Self::MalformedResponse => "E2003",
            Self::ConfigParseError => "E3001",
            Self::ConfigWriteFailed => "E3002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingField => "Required field is empty",
            Self::MissingSessionInfo => "Session info not set",
            Self::SessionNotLoaded => "Session not loaded",
            Self::UnknownEntity => "Entity not found in session",
            Self::ModalClosed => "No editor is open",
            Self::InvalidDate => "Date is not in YYYY-MM-DD form",
            Self::RequestRejected => "Collaborator rejected the request",
            Self::TransportFailed => "Collaborator unreachable",
            Self::MalformedResponse => "Malformed collaborator response",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigWriteFailed => "Config file write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to the tester.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MissingField => None,
            Self::MissingSessionInfo => {
                Some("Run `qat info set --website <url> --date <YYYY-MM-DD>` first.")
            }
            Self::SessionNotLoaded => Some("Load the session before editing it."),
            Self::UnknownEntity => Some("Run `qat show` to list current ids."),
            Self::ModalClosed => Some("Open an editor before submitting."),
            Self::InvalidDate => Some("Use a date like 2024-01-31."),
            Self::RequestRejected => Some("Retry once. The server log has the details."),
            Self::TransportFailed => {
                Some("Check that the server is running and --server / QAT_SERVER is correct.")
            }
            Self::MalformedResponse => Some("Check that the server speaks the qatrack API."),
            Self::ConfigParseError => Some("Fix syntax in qatrack/config.toml and retry."),
            Self::ConfigWriteFailed => Some("Check write permissions on the config directory."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure talking to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Any non-success HTTP status; the body is not inspected.
    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Status(_) => ErrorCode::RequestRejected,
            Self::Transport(_) => ErrorCode::TransportFailed,
            Self::Decode(_) => ErrorCode::MalformedResponse,
        }
    }
}

/// Error returned by every synchronizer operation.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Required input missing; detected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-success response or transport failure, detected after the call.
    #[error("failed to {action}: {source}")]
    Request {
        action: Action,
        #[source]
        source: ApiError,
    },

    #[error("no session loaded yet")]
    NotLoaded,

    #[error("{kind} {id} is not in the current session")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("no editor is open")]
    ModalClosed,
}

impl SyncError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => err.code,
            Self::Request { source, .. } => source.error_code(),
            Self::NotLoaded => ErrorCode::SessionNotLoaded,
            Self::UnknownEntity { .. } => ErrorCode::UnknownEntity,
            Self::ModalClosed => ErrorCode::ModalClosed,
        }
    }

    /// Message shown to the tester; request failures name the failed action.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Request { action, .. } => action.failure_message(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
