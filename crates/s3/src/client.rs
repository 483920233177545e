//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3p-core.
//! The SDK's own retry is disabled; every request goes through the
//! `[retry]` policy instead, so `max_attempts` is the real request count.

use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types::ObjectCannedAcl;

use s3p_core::{
    Error, ListOptions, ObjectInfo, ObjectStore, RemotePath, Result, RetryConfig, StoreConfig,
    is_retryable_error, retry_with_backoff,
};

/// Largest page S3 returns from ListObjectsV2
const MAX_PAGE_SIZE: i32 = 1000;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    retry: RetryConfig,
    acl: Option<ObjectCannedAcl>,
}

impl S3Client {
    /// Create a client from store settings
    ///
    /// Unset settings fall back to the AWS default chain (environment,
    /// shared config/credentials files, instance metadata).
    pub async fn new(store: &StoreConfig, retry: RetryConfig) -> Result<Self> {
        let acl = canned_acl(&store.acl)?;
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .retry_config(aws_config::retry::RetryConfig::disabled());

        if let Some(profile) = &store.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &store.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(endpoint) = &store.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some((access_key, secret_key)) = store.static_credentials() {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "s3p-static-credentials",
            ));
        }

        let config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(store.force_path_style)
            .build();

        tracing::debug!(
            region = ?config.region(),
            endpoint = ?store.endpoint,
            path_style = store.force_path_style,
            acl = ?acl,
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            retry,
            acl,
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E: ProvideErrorMetadata + std::fmt::Display>(
        error: &SdkError<E>,
    ) -> String {
        match error {
            SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                match err.code() {
                    Some(code) => format!("Service error: {err} (code: {code})"),
                    None => format!("Service error: {err}"),
                }
            }
            SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {err:?}")
            }
            SdkError::TimeoutError(_) => "Request timeout".to_string(),
            SdkError::DispatchFailure(err) => format!("Network dispatch error: {err:?}"),
            SdkError::ResponseError(err) => format!("Response error: {err:?}"),
            _ => error.to_string(),
        }
    }

    /// Map an SDK failure onto the store error taxonomy
    fn map_sdk_error<E: ProvideErrorMetadata + std::fmt::Display>(
        error: SdkError<E>,
        subject: &str,
    ) -> Error {
        let status = error.raw_response().map(|r| r.status().as_u16());
        let detail = Self::format_sdk_error(&error);

        match (error.code(), status) {
            (Some("NoSuchKey" | "NoSuchBucket" | "NotFound"), _) | (_, Some(404)) => {
                Error::NotFound(subject.to_string())
            }
            (
                Some(
                    "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"
                    | "ExpiredToken",
                ),
                _,
            )
            | (_, Some(401 | 403)) => Error::Auth(format!("{subject}: {detail}")),
            (_, Some(status)) => Error::Network(format!("{subject}: {detail} (HTTP {status})")),
            _ => Error::Network(format!("{subject}: {detail}")),
        }
    }

    async fn list_page(
        &self,
        path: &RemotePath,
        page_size: i32,
        continuation_token: Option<String>,
    ) -> Result<aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output> {
        retry_with_backoff(
            &self.retry,
            || {
                let mut request = self
                    .inner
                    .list_objects_v2()
                    .bucket(&path.bucket)
                    .max_keys(page_size)
                    .fetch_owner(true);
                if !path.key.is_empty() {
                    request = request.prefix(&path.key);
                }
                if let Some(token) = &continuation_token {
                    request = request.continuation_token(token);
                }
                async move {
                    request
                        .send()
                        .await
                        .map_err(|e| Self::map_sdk_error(e, &path.to_string()))
                }
            },
            is_retryable_error,
        )
        .await
    }
}

/// Parse the configured canned ACL; an empty string means none
fn canned_acl(value: &str) -> Result<Option<ObjectCannedAcl>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if !ObjectCannedAcl::values().contains(&value) {
        return Err(Error::Config(format!(
            "Unknown store.acl '{value}' (expected one of: {})",
            ObjectCannedAcl::values().join(", ")
        )));
    }
    Ok(Some(ObjectCannedAcl::from(value)))
}

/// `bucket/key` with each key segment percent-encoded
fn copy_source(src: &RemotePath) -> String {
    let key = src
        .key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{key}", src.bucket)
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(
        &self,
        path: &RemotePath,
        options: ListOptions,
    ) -> Result<Vec<ObjectInfo>> {
        let page_size = options
            .page_size
            .unwrap_or(MAX_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        if options.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self.list_page(path, page_size, continuation_token).await?;

            for object in response.contents() {
                let key = object.key().unwrap_or_default().to_string();
                let mut info = ObjectInfo::file(key, object.size().unwrap_or(0));

                if let Some(modified) = object.last_modified() {
                    info.last_modified = jiff::Timestamp::from_second(modified.secs()).ok();
                }
                if let Some(etag) = object.e_tag() {
                    info.etag = Some(etag.trim_matches('"').to_string());
                }
                info.owner = object
                    .owner()
                    .and_then(|o| o.display_name().or(o.id()))
                    .map(str::to_string);

                items.push(info);
                if options.limit.is_some_and(|limit| items.len() >= limit) {
                    return Ok(items);
                }
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(prefix = %path, count = items.len(), "Listed objects");
        Ok(items)
    }

    async fn copy_object(&self, src: &RemotePath, dst: &RemotePath) -> Result<()> {
        let source = copy_source(src);
        let source = source.as_str();
        retry_with_backoff(
            &self.retry,
            || async move {
                self.inner
                    .copy_object()
                    .copy_source(source)
                    .bucket(&dst.bucket)
                    .key(&dst.key)
                    .set_acl(self.acl.clone())
                    .send()
                    .await
                    .map_err(|e| Self::map_sdk_error(e, &src.to_string()))
            },
            is_retryable_error,
        )
        .await?;

        Ok(())
    }

    async fn delete_object(&self, path: &RemotePath) -> Result<()> {
        retry_with_backoff(
            &self.retry,
            || async move {
                self.inner
                    .delete_object()
                    .bucket(&path.bucket)
                    .key(&path.key)
                    .send()
                    .await
                    .map_err(|e| Self::map_sdk_error(e, &path.to_string()))
            },
            is_retryable_error,
        )
        .await?;

        Ok(())
    }

    async fn put_object(&self, path: &RemotePath, body: Vec<u8>) -> Result<()> {
        let body = &body;
        retry_with_backoff(
            &self.retry,
            || async move {
                self.inner
                    .put_object()
                    .bucket(&path.bucket)
                    .key(&path.key)
                    .set_acl(self.acl.clone())
                    .body(aws_sdk_s3::primitives::ByteStream::from(body.clone()))
                    .send()
                    .await
                    .map_err(|e| Self::map_sdk_error(e, &path.to_string()))
            },
            is_retryable_error,
        )
        .await?;

        Ok(())
    }
}
