use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, ApiError>;

pub type ByteStream = BoxStream<'static, Result<bytes::Bytes>>;

/// Thin wrapper over a shared `reqwest::Client` for plain document GETs.
#[derive(Clone, Default)]
pub struct DocumentClient {
    http: Client,
}

impl DocumentClient {
    /// Starts a GET and hands back the body as a byte stream.
    /// Returns (status_code, content_length, stream); anything but 200 is an error.
    pub async fn open_stream(&self, url: &str) -> Result<(u16, Option<u64>, ByteStream)> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status(status.as_u16()));
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::Request).boxed();

        Ok((status.as_u16(), total_size, stream))
    }
}
