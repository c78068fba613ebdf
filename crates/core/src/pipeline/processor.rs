//! Job processor: runs the stages of one job in order.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::config::ProcessorConfig;
use super::download::download_sources;
use super::error::JobError;
use super::report::report_archive;
use super::types::{JobOutcome, JobStage, PipelineState};
use super::upload::upload_archive;
use super::validate::{validate_sources, SizeLimits};
use crate::archiver::{Archiver, ZipArchiver};
use crate::auth::{create_authenticator, Authenticator};
use crate::config::{Config, ConfigError};
use crate::job::{JobDescriptor, JobEvent};
use crate::metrics;
use crate::notifier::{NotificationDispatcher, NotifierRegistry, ResultPayload};
use crate::scratch::{Invocation, ScratchConfig, ScratchSpace};
use crate::storage::{ObjectStoreFactory, PutOptions, S3ObjectStoreFactory};

/// Runs jobs against a fixed set of collaborators.
///
/// Each call to [`JobProcessor::handle`] is one independent invocation; the
/// processor itself holds no per-job state and can be shared.
pub struct JobProcessor {
    authenticator: Arc<dyn Authenticator>,
    stores: Arc<dyn ObjectStoreFactory>,
    archiver: Arc<dyn Archiver>,
    dispatcher: NotificationDispatcher,
    scratch: ScratchConfig,
    config: ProcessorConfig,
}

impl JobProcessor {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        stores: Arc<dyn ObjectStoreFactory>,
        archiver: Arc<dyn Archiver>,
        dispatcher: NotificationDispatcher,
        scratch: ScratchConfig,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            authenticator,
            stores,
            archiver,
            dispatcher,
            scratch,
            config,
        }
    }

    /// Builds a processor with the S3 store, the zip archiver and the
    /// built-in notification strategies.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let authenticator = create_authenticator(&config.auth)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        let registry = NotifierRegistry::with_defaults(&config.notifier)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(Self::new(
            Arc::from(authenticator),
            Arc::new(S3ObjectStoreFactory::new(config.storage.clone())),
            Arc::new(ZipArchiver::new(config.archiver.clone())),
            NotificationDispatcher::new(
                Arc::new(registry),
                config.pipeline.notification_concurrency,
            ),
            config.scratch.clone(),
            config.pipeline.clone(),
        ))
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Runs one job. Records metrics and applies the scratch cleanup policy
    /// whatever the result.
    pub async fn handle(
        &self,
        event: JobEvent,
        invocation: &Invocation,
    ) -> Result<JobOutcome, JobError> {
        let start = Instant::now();
        let mut scratch = None;

        let result = self.run(event, invocation, start, &mut scratch).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                info!(
                    job_id = outcome.job_id.as_deref().unwrap_or("-"),
                    location = %outcome.location,
                    "Job finished in {} ms",
                    outcome.duration_ms
                );
                metrics::JOBS_TOTAL
                    .with_label_values(&["success", JobStage::Notify.as_str()])
                    .inc();
                metrics::JOB_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed);
            }
            Err(e) => {
                error!(stage = e.stage().as_str(), "Job failed: {}", e);
                metrics::JOBS_TOTAL
                    .with_label_values(&["failure", e.stage().as_str()])
                    .inc();
                metrics::JOB_DURATION
                    .with_label_values(&["failure"])
                    .observe(elapsed);
            }
        }

        if let Some(scratch) = scratch {
            if self.scratch.cleanup.applies(result.is_ok()) {
                scratch.remove().await;
            }
        }

        result
    }

    async fn run(
        &self,
        event: JobEvent,
        invocation: &Invocation,
        start: Instant,
        scratch_slot: &mut Option<ScratchSpace>,
    ) -> Result<JobOutcome, JobError> {
        let mut state = PipelineState::default();

        self.authenticator.authenticate(&event.auth)?;
        info!("Authenticated via {}", self.authenticator.method_name());

        let job = JobDescriptor::from_payload(event.data)?;
        info!(
            job_id = job.log_id(),
            "Job has {} sources, archive {}",
            job.sources.len(),
            job.destination
        );

        let store = self
            .stores
            .connect(&job.credentials)
            .map_err(JobError::StoreUnavailable)?;

        if self.config.validate_sources {
            let limits = SizeLimits::from(&self.config);
            state.validated_bytes =
                Some(validate_sources(store.as_ref(), &job.sources, &limits).await?);
        }

        let scratch = self.create_scratch(invocation).await?;
        state.scratch_dir = Some(scratch.path().to_path_buf());
        let scratch = scratch_slot.insert(scratch);

        state.source_bytes = download_sources(
            Arc::clone(&store),
            &job.sources,
            scratch,
            self.config.download_concurrency,
        )
        .await?;
        metrics::SOURCE_BYTES.inc_by(state.source_bytes);

        if let Some(validated) = state.validated_bytes {
            if validated != state.source_bytes {
                warn!(
                    "Header check reported {} bytes but {} were downloaded",
                    validated, state.source_bytes
                );
            }
        }

        let archive = self
            .archiver
            .archive(scratch.path(), &job.destination.name)
            .await
            .map_err(JobError::archive_failed)?;
        state.archive_path = Some(archive.path.clone());

        let (archive_bytes, ratio) = report_archive(&archive.path, state.source_bytes).await?;
        state.archive_bytes = archive_bytes;
        state.compression_ratio = ratio;

        let options = PutOptions {
            acl: job.acl.clone(),
            storage_class: job.storage_class.clone(),
        };
        let receipt =
            upload_archive(store.as_ref(), &archive.path, &job.destination, &options).await?;
        metrics::ARCHIVE_BYTES.inc_by(state.archive_bytes);
        metrics::ARCHIVE_SIZE
            .with_label_values(&[])
            .observe(state.archive_bytes as f64);
        state.location = Some(receipt.location.clone());

        let payload = ResultPayload::success(receipt.location.clone(), state.archive_bytes);
        let notifications = self.dispatcher.dispatch(&job, &payload).await;

        Ok(JobOutcome {
            job_id: job.id.clone(),
            location: receipt.location,
            archive_bytes: state.archive_bytes,
            source_bytes: state.source_bytes,
            compression_ratio: state.compression_ratio,
            notifications,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn create_scratch(&self, invocation: &Invocation) -> Result<ScratchSpace, JobError> {
        let path = ScratchSpace::resolve(&self.scratch, invocation).map_err(|e| {
            JobError::ScratchSpaceUnavailable {
                path: self.scratch.root.clone(),
                source: e,
            }
        })?;

        ScratchSpace::create(&self.scratch, invocation)
            .await
            .map_err(|e| JobError::ScratchSpaceUnavailable { path, source: e })
    }
}
