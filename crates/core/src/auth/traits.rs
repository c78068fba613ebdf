use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication token missing")]
    MissingToken,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

pub trait Authenticator: Send + Sync {
    /// Check the token carried by an invocation.
    fn authenticate(&self, token: &str) -> Result<(), AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}
