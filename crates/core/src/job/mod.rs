//! Job descriptor module.
//!
//! Turns the inbound job event into a normalized [`JobDescriptor`]:
//! - `"bucket/key/.../name"` strings become [`ObjectRef`] triples
//! - defaults are applied for ACL and storage class
//! - local filename collisions are rejected before any I/O happens
//!
//! # Example
//!
//! ```ignore
//! use archivist_core::job::{JobEvent, JobDescriptor};
//!
//! let event: JobEvent = serde_json::from_str(raw)?;
//! let job = JobDescriptor::from_payload(event.data)?;
//! println!("{} sources -> {}", job.sources.len(), job.destination);
//! ```

mod address;
mod error;
mod types;

pub use address::ObjectRef;
pub use error::AddressError;
pub use types::{
    Credentials, JobDescriptor, JobEvent, JobPayload, NotificationSpec, DEFAULT_ACL,
    DEFAULT_STORAGE_CLASS,
};
