use super::{types::Config, ConfigError};
use crate::storage::MIN_MULTIPART_PART_BYTES;

/// Validate configuration
/// Currently validates:
/// - A shared secret is configured
/// - Fan-out limits are non-zero
/// - Multipart part size meets the store minimum
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config
        .auth
        .secret_token
        .as_deref()
        .is_none_or(|s| s.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.secret_token must be set (or SECRET_TOKEN)".to_string(),
        ));
    }

    if config.pipeline.download_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.download_concurrency cannot be 0".to_string(),
        ));
    }

    if config.pipeline.notification_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.notification_concurrency cannot be 0".to_string(),
        ));
    }

    if config.storage.multipart_part_bytes < MIN_MULTIPART_PART_BYTES {
        return Err(ConfigError::ValidationError(format!(
            "storage.multipart_part_bytes must be at least {}",
            MIN_MULTIPART_PART_BYTES
        )));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
