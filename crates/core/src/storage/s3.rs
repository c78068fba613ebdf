//! S3 object store implementation on top of `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials as AwsCredentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl, StorageClass};
use aws_sdk_s3::Client;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::{ObjectStore, ObjectStoreFactory};
use super::types::{ObjectMeta, ObjectStream, PutOptions, UploadProgress, UploadReceipt};
use crate::job::{Credentials, ObjectRef};

/// Builds the canonical URL of an object.
///
/// Follows the addressing the client uses: path-style puts the bucket in the
/// path, virtual-hosted puts it in the host. Without an endpoint override the
/// host is the AWS regional endpoint.
pub fn object_url(
    endpoint: Option<&str>,
    region: &str,
    path_style: bool,
    object: &ObjectRef,
) -> String {
    let key = object
        .key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let endpoint = endpoint
        .map(|e| e.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", region));

    if path_style {
        return format!("{}/{}/{}", endpoint, object.bucket, key);
    }

    match endpoint.split_once("://") {
        Some((scheme, host)) => format!("{}://{}.{}/{}", scheme, object.bucket, host, key),
        None => format!("https://{}.{}/{}", object.bucket, endpoint, key),
    }
}

fn request_error<E: std::error::Error>(
    operation: &'static str,
    object: &ObjectRef,
    err: E,
) -> StorageError {
    StorageError::request(
        operation,
        object.full_key(),
        DisplayErrorContext(err).to_string(),
    )
}

fn send_progress(tx: &Option<mpsc::Sender<UploadProgress>>, address: &str, sent: u64, total: u64) {
    if let Some(tx) = tx {
        // Non-blocking send
        let _ = tx.try_send(UploadProgress {
            address: address.to_string(),
            bytes_sent: sent,
            total_bytes: total,
        });
    }
}

/// S3-backed object store.
pub struct S3ObjectStore {
    client: Client,
    config: StorageConfig,
    region: String,
}

impl S3ObjectStore {
    /// Creates a store for the given credentials.
    pub fn new(config: StorageConfig, credentials: &Credentials) -> Result<Self, StorageError> {
        if credentials.region.is_empty() {
            return Err(StorageError::Configuration(
                "credentials.region is empty".to_string(),
            ));
        }

        let aws_credentials = AwsCredentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "job-payload",
        );

        let timeouts = TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build();

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(aws_credentials)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts.max(1)))
            .timeout_config(timeouts)
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            config,
            region: credentials.region.clone(),
        })
    }

    fn url_for(&self, object: &ObjectRef) -> String {
        object_url(
            self.config.endpoint.as_deref(),
            &self.region,
            self.config.force_path_style,
            object,
        )
    }

    async fn put_single(
        &self,
        object: &ObjectRef,
        path: &Path,
        options: &PutOptions,
        total: u64,
        progress_tx: &Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<UploadReceipt, StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        self.client
            .put_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .acl(ObjectCannedAcl::from(options.acl.as_str()))
            .storage_class(StorageClass::from(options.storage_class.as_str()))
            .content_length(total as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| request_error("PutObject", object, e))?;

        send_progress(progress_tx, &object.full_key(), total, total);

        Ok(UploadReceipt {
            location: self.url_for(object),
            size_bytes: total,
        })
    }

    async fn put_multipart(
        &self,
        object: &ObjectRef,
        path: &Path,
        options: &PutOptions,
        total: u64,
        progress_tx: &Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<UploadReceipt, StorageError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&object.bucket)
            .key(&object.key)
            .acl(ObjectCannedAcl::from(options.acl.as_str()))
            .storage_class(StorageClass::from(options.storage_class.as_str()))
            .send()
            .await
            .map_err(|e| request_error("CreateMultipartUpload", object, e))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| {
                StorageError::request(
                    "CreateMultipartUpload",
                    object.full_key(),
                    "response carried no upload id",
                )
            })?
            .to_string();

        debug!("Started multipart upload {} for {}", upload_id, object);

        let result = match self
            .upload_parts(object, path, &upload_id, total, progress_tx)
            .await
        {
            Ok(parts) => self.complete_multipart(object, &upload_id, parts).await,
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.abort_multipart(object, &upload_id).await;
        }

        result.map(|location| UploadReceipt {
            location,
            size_bytes: total,
        })
    }

    async fn upload_parts(
        &self,
        object: &ObjectRef,
        path: &Path,
        upload_id: &str,
        total: u64,
        progress_tx: &Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<Vec<CompletedPart>, StorageError> {
        let mut file = tokio::fs::File::open(path).await?;
        let address = object.full_key();
        let mut parts = Vec::new();
        let mut sent = 0u64;
        let mut part_number = 1i32;

        loop {
            let mut buffer = Vec::with_capacity(self.config.multipart_part_bytes as usize);
            (&mut file)
                .take(self.config.multipart_part_bytes)
                .read_to_end(&mut buffer)
                .await?;

            if buffer.is_empty() {
                break;
            }

            let len = buffer.len() as u64;
            let response = self
                .client
                .upload_part()
                .bucket(&object.bucket)
                .key(&object.key)
                .upload_id(upload_id)
                .part_number(part_number)
                .content_length(len as i64)
                .body(ByteStream::from(buffer))
                .send()
                .await
                .map_err(|e| request_error("UploadPart", object, e))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(response.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );

            sent += len;
            part_number += 1;
            send_progress(progress_tx, &address, sent, total);
        }

        Ok(parts)
    }

    async fn complete_multipart(
        &self,
        object: &ObjectRef,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<String, StorageError> {
        let completed = self
            .client
            .complete_multipart_upload()
            .bucket(&object.bucket)
            .key(&object.key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| request_error("CompleteMultipartUpload", object, e))?;

        Ok(completed
            .location()
            .map(str::to_string)
            .unwrap_or_else(|| self.url_for(object)))
    }

    async fn abort_multipart(&self, object: &ObjectRef, upload_id: &str) {
        warn!("Aborting multipart upload {} for {}", upload_id, object);
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(&object.bucket)
            .key(&object.key)
            .upload_id(upload_id)
            .send()
            .await
        {
            warn!(
                "Failed to abort multipart upload {}: {}",
                upload_id,
                DisplayErrorContext(e)
            );
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn head(&self, object: &ObjectRef) -> Result<ObjectMeta, StorageError> {
        let output = self
            .client
            .head_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_not_found() => StorageError::NotFound {
                    address: object.full_key(),
                },
                _ => request_error("HeadObject", object, e),
            })?;

        Ok(ObjectMeta {
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
        })
    }

    async fn get(&self, object: &ObjectRef) -> Result<ObjectStream, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_no_such_key() => StorageError::NotFound {
                    address: object.full_key(),
                },
                _ => request_error("GetObject", object, e),
            })?;

        let address = object.full_key();
        let stream = futures::stream::unfold(output.body, move |mut body| {
            let address = address.clone();
            async move {
                match body.next().await {
                    Some(Ok(chunk)) => Some((Ok(chunk), body)),
                    Some(Err(e)) => Some((
                        Err(StorageError::Stream {
                            address,
                            message: e.to_string(),
                        }),
                        body,
                    )),
                    None => None,
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn put_file(
        &self,
        object: &ObjectRef,
        path: &Path,
        options: &PutOptions,
        progress_tx: Option<mpsc::Sender<UploadProgress>>,
    ) -> Result<UploadReceipt, StorageError> {
        let total = tokio::fs::metadata(path).await?.len();

        if total >= self.config.multipart_threshold_bytes {
            info!(
                "Uploading {} bytes to {} in parts of {} bytes",
                total, object, self.config.multipart_part_bytes
            );
            self.put_multipart(object, path, options, total, &progress_tx)
                .await
        } else {
            self.put_single(object, path, options, total, &progress_tx)
                .await
        }
    }
}

/// Factory producing [`S3ObjectStore`]s from job credentials.
pub struct S3ObjectStoreFactory {
    config: StorageConfig,
}

impl S3ObjectStoreFactory {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

impl ObjectStoreFactory for S3ObjectStoreFactory {
    fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn ObjectStore>, StorageError> {
        Ok(Arc::new(S3ObjectStore::new(
            self.config.clone(),
            credentials,
        )?))
    }
}
