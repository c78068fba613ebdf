//! Shared-secret authentication.

use super::{AuthError, Authenticator};

/// Authenticator that compares the invocation token against a configured secret.
pub struct SharedSecretAuthenticator {
    expected: String,
}

impl SharedSecretAuthenticator {
    pub fn new(secret: String) -> Self {
        Self { expected: secret }
    }
}

impl Authenticator for SharedSecretAuthenticator {
    fn authenticate(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        // Constant-time comparison to prevent timing attacks
        if constant_time_eq(token.as_bytes(), self.expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    fn method_name(&self) -> &'static str {
        "shared_secret"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_token() {
        let auth = SharedSecretAuthenticator::new("secret-key-123".to_string());
        assert!(auth.authenticate("secret-key-123").is_ok());
    }

    #[test]
    fn test_wrong_token() {
        let auth = SharedSecretAuthenticator::new("secret-key-123".to_string());
        let result = auth.authenticate("wrong-key");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_empty_token() {
        let auth = SharedSecretAuthenticator::new("secret-key-123".to_string());
        let result = auth.authenticate("");
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_method_name() {
        let auth = SharedSecretAuthenticator::new("test".to_string());
        assert_eq!(auth.method_name(), "shared_secret");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }
}
