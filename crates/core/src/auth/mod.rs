mod shared_secret;
mod traits;

pub use shared_secret::*;
pub use traits::*;

use crate::config::AuthConfig;

/// Factory function to create the invocation authenticator from config.
///
/// There is no pass-through mode: a missing or empty secret is an error,
/// so a misconfigured host rejects every job instead of accepting all of them.
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    let secret = config
        .secret_token
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AuthError::ConfigurationError("auth.secret_token must be set".to_string())
        })?;
    Ok(Box::new(SharedSecretAuthenticator::new(secret)))
}
