//! Header validation: a sequential metadata pass over every source.

use tracing::{debug, info};

use super::config::ProcessorConfig;
use super::error::JobError;
use crate::job::ObjectRef;
use crate::storage::ObjectStore;

/// Optional size bounds applied while validating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeLimits {
    pub max_file_bytes: Option<u64>,
    pub max_total_bytes: Option<u64>,
}

impl From<&ProcessorConfig> for SizeLimits {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
            max_total_bytes: config.max_total_bytes,
        }
    }
}

/// Looks up every source one at a time and returns their total size.
///
/// Stops at the first lookup failure or exceeded limit, before any data
/// is transferred.
pub async fn validate_sources(
    store: &dyn ObjectStore,
    sources: &[ObjectRef],
    limits: &SizeLimits,
) -> Result<u64, JobError> {
    info!("Validating {} sources", sources.len());
    let mut total = 0u64;

    for source in sources {
        let meta = store
            .head(source)
            .await
            .map_err(|e| JobError::SourceUnavailable {
                address: source.full_key(),
                source: e,
            })?;
        debug!("{} is {} bytes", source, meta.size_bytes);

        if let Some(max) = limits.max_file_bytes {
            if meta.size_bytes > max {
                return Err(JobError::SizeLimitExceeded {
                    message: format!(
                        "{} is {} bytes, limit is {}",
                        source, meta.size_bytes, max
                    ),
                });
            }
        }

        total += meta.size_bytes;

        if let Some(max) = limits.max_total_bytes {
            if total > max {
                return Err(JobError::SizeLimitExceeded {
                    message: format!("sources exceed {} bytes in total", max),
                });
            }
        }
    }

    info!("All sources available, {} bytes in total", total);
    Ok(total)
}
