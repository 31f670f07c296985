//! Error Types for the Strategy Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The balance source could not resolve a wallet identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Every blend weight was zero
    #[error("Undefined blend: at least one profile weight must be positive")]
    UndefinedBlend,

    /// An amount, LTV, APR or weight outside its declared domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::UndefinedBlend => "UNDEFINED_BLEND",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::UnknownProfile(_) => "UNKNOWN_PROFILE",
            Self::InvalidProfile(_) => "INVALID_PROFILE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether the caller supplied bad input (as opposed to a local failure)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_)
                | Self::UndefinedBlend
                | Self::InvalidInput(_)
                | Self::UnknownProfile(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidIdentifier(id) => format!("'{}' is not a valid EVM address.", id),
            Self::UndefinedBlend => "Give at least one of SAFE, MID or DEGEN a positive weight.".into(),
            Self::InvalidInput(msg) => format!("Invalid input: {}", msg),
            Self::UnknownProfile(name) => format!("Unknown profile '{}'. Use SAFE, MID or DEGEN.", name),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
