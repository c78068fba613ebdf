//! Notifier module for reporting job results.
//!
//! After a successful upload every configured notification is resolved to
//! a [`NotificationStrategy`] by its lowercased `type` tag and delivered with
//! bounded concurrency. Unknown types are skipped and failed deliveries are
//! logged; neither affects the job result.

mod config;
mod dispatch;
mod error;
mod http;
mod registry;
mod traits;
mod types;

pub use config::NotifierConfig;
pub use dispatch::NotificationDispatcher;
pub use error::NotifierError;
pub use http::{render_url, HttpNotificationParams, HttpNotifier};
pub use registry::NotifierRegistry;
pub use traits::NotificationStrategy;
pub use types::{DeliveryReceipt, DispatchSummary, NotificationBody, ResultPayload, ResultStatus};
