use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::RANGE;
use reqwest::{Client, RequestBuilder, StatusCode};

use super::range_reader::RangeReader;
use crate::error::IoError;

/// HTTP basic-auth credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: Option<String>,
}

/// HTTP-backed implementation of RangeReader.
///
/// Issues one `GET` with a `Range: bytes=start-end` header per read and
/// requires the server to answer `206 Partial Content`. Existence is checked
/// once with a `HEAD` request on creation.
#[derive(Debug, Clone)]
pub struct HttpRangeReader {
    client: Client,
    url: String,
    auth: Option<BasicAuth>,
}

impl HttpRangeReader {
    /// Create a reader for `url`.
    ///
    /// Returns `IoError::NotFound` if the `HEAD` request does not succeed.
    pub async fn new(client: Client, url: String, auth: Option<BasicAuth>) -> Result<Self, IoError> {
        let reader = Self { client, url, auth };

        let resp = reader
            .authorize(reader.client.head(&reader.url))
            .send()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(IoError::NotFound(format!(
                "{} (HTTP {})",
                reader.url,
                resp.status().as_u16()
            )));
        }

        Ok(reader)
    }

    /// The resource URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(auth) => request.basic_auth(&auth.user, auth.password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl RangeReader for HttpRangeReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        if len == 0 {
            return Ok(Bytes::new());
        }

        // Remote size is unknown, so only an unaddressable end is rejected here
        let range = range_header(offset, len).ok_or(IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size: u64::MAX,
        })?;

        let resp = self
            .authorize(self.client.get(&self.url))
            .header(RANGE, range)
            .send()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?;

        if resp.status() != StatusCode::PARTIAL_CONTENT {
            return Err(IoError::HttpStatus {
                status: resp.status().as_u16(),
                offset,
                len,
            });
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| IoError::Http(e.to_string()))?;

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
        &self.url
    }
}

/// Build the `Range` header value for `len` bytes at `offset`.
///
/// HTTP ranges are inclusive on both ends. Returns `None` for an empty
/// range or one whose last byte lies past `u64::MAX`.
pub fn range_header(offset: u64, len: usize) -> Option<String> {
    let last = offset.checked_add((len as u64).checked_sub(1)?)?;
    Some(format!("bytes={}-{}", offset, last))
}

/// Compose a resource URL from a server root, an optional path and a
/// resource name: `server/path/resource` or `server/resource`.
pub fn build_url(server: &str, path: Option<&str>, resource: &str) -> String {
    let server = server.trim_end_matches('/');
    let resource = resource.trim_start_matches('/');
    match path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(path) => format!("{}/{}/{}", server, path, resource),
        None => format!("{}/{}", server, resource),
    }
}
