use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::range_reader::{check_bounds, RangeReader};
use super::http_reader::range_header;
use crate::error::IoError;

/// S3-backed implementation of RangeReader.
///
/// Reads byte ranges from an object with ranged `GetObject` calls. The
/// object's size is fetched once on creation via `HeadObject`, which also
/// serves as the existence check.
#[derive(Debug, Clone)]
pub struct S3RangeReader {
    client: Client,
    bucket: String,
    key: String,
    size: u64,
    identifier: String,
}

impl S3RangeReader {
    /// Create a reader for `s3://bucket/key`.
    ///
    /// Returns `IoError::NotFound` if the object does not exist.
    pub async fn new(client: Client, bucket: String, key: String) -> Result<Self, IoError> {
        let identifier = format!("s3://{}/{}", bucket, key);

        let head = client
            .head_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| head_error(e, &identifier))?;

        let size = object_size(head.content_length())?;

        Ok(Self {
            client,
            bucket,
            key,
            size,
            identifier,
        })
    }

    /// Object size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Object size from a `HeadObject` Content-Length.
fn object_size(content_length: Option<i64>) -> Result<u64, IoError> {
    content_length
        .map(|len| len.max(0) as u64)
        .ok_or_else(|| IoError::S3("HeadObject returned no Content-Length".to_string()))
}

fn head_error(err: SdkError<HeadObjectError>, identifier: &str) -> IoError {
    let not_found = err
        .as_service_error()
        .map(|se| se.is_not_found())
        .unwrap_or(false)
        || err
            .raw_response()
            .map(|r| r.status().as_u16() == 404)
            .unwrap_or(false);

    if not_found {
        return IoError::NotFound(identifier.to_string());
    }

    match err.code() {
        Some(code) => IoError::S3(format!("{}: {}", code, err)),
        None => IoError::S3(err.to_string()),
    }
}

#[async_trait]
impl RangeReader for S3RangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_bounds(offset, len, self.size)?;

        if len == 0 {
            return Ok(Bytes::new());
        }

        let range = range_header(offset, len).ok_or(IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size: self.size,
        })?;

        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .range(range)
            .send()
            .await
            .map_err(|e| IoError::S3(e.to_string()))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?
            .into_bytes();

        if data.len() != len {
            return Err(IoError::ShortRead {
                offset,
                expected: len,
                actual: data.len(),
            });
        }

        Ok(data)
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Create an S3 client for `region`, optionally against a custom endpoint.
///
/// A custom endpoint (MinIO and other S3-compatible services) switches the
/// client to path-style addressing.
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(endpoint_url.is_some())
        .build();

    Client::from_conf(s3_config)
}
