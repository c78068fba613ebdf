//! Pipeline module: one job from event to notifications.
//!
//! Stages run strictly in order and the first failure aborts the rest:
//! 1. authenticate the shared secret
//! 2. parse the job descriptor
//! 3. validate source headers (optional)
//! 4. create the scratch directory
//! 5. download all sources with bounded fan-out
//! 6. archive the scratch directory
//! 7. report archive size and compression ratio
//! 8. upload the archive
//! 9. send notifications (failures never fail the job)
//!
//! # Example
//!
//! ```ignore
//! use archivist_core::pipeline::JobProcessor;
//! use archivist_core::scratch::Invocation;
//!
//! let processor = JobProcessor::from_config(&config)?;
//! let outcome = processor.handle(event, &Invocation::ephemeral("req-1")).await?;
//! println!("Uploaded {} bytes to {}", outcome.archive_bytes, outcome.location);
//! ```

mod config;
mod download;
mod error;
mod processor;
mod report;
mod types;
mod upload;
mod validate;

pub use config::ProcessorConfig;
pub use download::download_sources;
pub use error::JobError;
pub use processor::JobProcessor;
pub use report::{compression_ratio, report_archive};
pub use types::{JobOutcome, JobStage, PipelineState};
pub use upload::upload_archive;
pub use validate::{validate_sources, SizeLimits};
