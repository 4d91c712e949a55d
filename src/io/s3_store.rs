use async_trait::async_trait;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use super::ObjectStore;
use crate::error::StoreError;

/// S3-backed implementation of [`ObjectStore`].
///
/// Works against AWS S3 and S3-compatible services (MinIO, GCS interop).
/// Errors are classified into [`StoreError`] variants at this boundary so
/// the publisher's retry logic never has to look at SDK types.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Create a new store wrapping the given S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying S3 client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, bucket, key))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();

        debug!(bucket, key, bytes = data.len(), "Fetched object");
        Ok(data)
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        let len = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, bucket, key))?;

        debug!(bucket, key, bytes = len, "Wrote object");
        Ok(())
    }
}

/// Map an SDK error onto the [`StoreError`] taxonomy.
///
/// Classification falls back to string matching on the rendered error since
/// the SDK's typed service errors differ per operation.
fn classify_sdk_error<E, R>(
    err: &aws_sdk_s3::error::SdkError<E, R>,
    bucket: &str,
    key: &str,
) -> StoreError
where
    E: std::error::Error,
    R: std::fmt::Debug,
{
    use aws_sdk_s3::error::SdkError;

    let location = format!("s3://{}/{}", bucket, key);

    match err {
        SdkError::TimeoutError(_) => StoreError::Timeout(location),
        SdkError::DispatchFailure(_) => StoreError::Connection(format!("{}: {:?}", location, err)),
        _ => {
            let rendered = format!("{:?}", err);
            if rendered.contains("NoSuchKey")
                || rendered.contains("NoSuchBucket")
                || rendered.contains("NotFound")
                || rendered.contains("404")
            {
                StoreError::NotFound(location)
            } else if rendered.contains("AccessDenied")
                || rendered.contains("InvalidAccessKeyId")
                || rendered.contains("SignatureDoesNotMatch")
                || rendered.contains("403")
            {
                StoreError::AccessDenied(location)
            } else if rendered.contains("SlowDown")
                || rendered.contains("ServiceUnavailable")
                || rendered.contains("503")
            {
                StoreError::Throttled(location)
            } else if rendered.contains("RequestTimeout") {
                StoreError::Timeout(location)
            } else {
                StoreError::Service(format!("{}: {}", location, rendered))
            }
        }
    }
}

/// Create an S3 client with optional custom endpoint.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint.
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally require path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
