use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type tag the API uses when a second-factor check failed upstream.
pub const BAD_2FA: &str = "BAD_2FA";

pub const NO_INIT_SWAP_FORM_VALUES: &str = "NO_INIT_SWAP_FORM_VALUES";
pub const NO_SWAP_AMOUNT_FORM_VALUES: &str = "NO_SWAP_AMOUNT_FORM_VALUES";
pub const NO_SWAP_QUOTE: &str = "NO_SWAP_QUOTE";
pub const NO_QUOTE: &str = "NO_QUOTE";

/// Structured failure returned by the remote API.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn is_bad_2fa(&self) -> bool {
        self.kind == BAD_2FA
    }
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid coin type: {0}")]
    InvalidCoinType(String),
    #[error("Payment error: {0}")]
    Payment(String),
    #[error("Second password prompt cancelled")]
    SecondFactorCancelled,
    #[error("Wallet is not linked to Exchange")]
    ExchangeNotLinked,
    #[error("State store closed")]
    StoreClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowError {
    pub fn validation(reason: &str) -> Self {
        Self::Validation(reason.to_string())
    }

    pub fn payment(reason: impl Into<String>) -> Self {
        Self::Payment(reason.into())
    }

    /// Returns the API error carried by this failure, if any.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Normalizes any flow failure into the string stored by failure events.
///
/// API errors surface their message, falling back to the type tag when the
/// server sent none.
pub fn error_handler(err: &FlowError) -> String {
    match err {
        FlowError::Api(api) if !api.message.is_empty() => api.message.clone(),
        FlowError::Api(api) => api.kind.clone(),
        other => other.to_string(),
    }
}
