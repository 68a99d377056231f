use thiserror::Error;

use crate::core::signer::SignerError;

/// SDK error taxonomy for vault reads and mutations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultSdkError {
    /// No wallet connected. Raised before any network call.
    #[error("Wallet not connected")]
    NotConnected,

    /// Local validation failed. Never reaches the network.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signing or submission failed before a signature was obtained
    #[error("Submission failed: {message}")]
    SubmissionFailed { message: String, logs: Vec<String> },

    /// A signature was obtained but did not confirm
    #[error("Confirmation failed: {message}")]
    ConfirmationFailed { message: String },

    /// A read could not determine vault state
    #[error("Vault state unavailable: {0}")]
    ReadUnavailable(String),

    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid account data or deserialization error
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl VaultSdkError {
    /// Program logs attached to a failed submission, if any
    pub fn logs(&self) -> &[String] {
        match self {
            Self::SubmissionFailed { logs, .. } => logs,
            _ => &[],
        }
    }
}

impl From<SignerError> for VaultSdkError {
    fn from(err: SignerError) -> Self {
        Self::SubmissionFailed {
            message: err.message,
            logs: err.logs,
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, VaultSdkError>;
