pub mod archiver;
pub mod auth;
pub mod config;
pub mod job;
pub mod metrics;
pub mod notifier;
pub mod pipeline;
pub mod scratch;
pub mod storage;
pub mod testing;

pub use archiver::{ArchiveOutput, Archiver, ArchiverConfig, ArchiverError, ZipArchiver};
pub use auth::{create_authenticator, AuthError, Authenticator, SharedSecretAuthenticator};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, AuthConfig, Config,
    ConfigError, SanitizedConfig, ServerConfig,
};
pub use job::{AddressError, Credentials, JobDescriptor, JobEvent, JobPayload, ObjectRef};
pub use notifier::{
    DispatchSummary, HttpNotifier, NotificationDispatcher, NotificationStrategy, NotifierConfig,
    NotifierError, NotifierRegistry, ResultPayload,
};
pub use pipeline::{JobError, JobOutcome, JobProcessor, JobStage, ProcessorConfig};
pub use scratch::{CleanupPolicy, Invocation, ScratchConfig, ScratchSpace};
pub use storage::{
    ObjectStore, ObjectStoreFactory, PutOptions, S3ObjectStore, S3ObjectStoreFactory,
    StorageConfig, StorageError,
};
