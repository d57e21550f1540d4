//! Drive artifact retrieval.
//!
//! Recordings are fetched as raw media bytes (`alt=media`) and transcripts
//! as Docs exports in a requested output format. Both come back as explicit
//! async byte streams - completion and failure are a single `Result` per
//! chunk - and the `_to` variants drain a stream into a caller-supplied
//! sink, awaiting each write so a slow sink backpressures the download.

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::auth::GoogleAuth;
use crate::error::{GoogleError, GoogleResult, status_error, transport_error};

/// Base URL for the Drive REST API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Export MIME type for Markdown transcripts.
pub const MARKDOWN_EXPORT: &str = "text/markdown";

/// Export MIME type for plain-text transcripts.
pub const PLAIN_TEXT_EXPORT: &str = "text/plain";

/// A stream of downloaded byte chunks.
pub type ByteStream = BoxStream<'static, GoogleResult<Bytes>>;

/// Client for Drive file downloads and document exports.
///
/// Requires a handle scoped to read-only Meet artifact access.
#[derive(Debug)]
pub struct DriveClient {
    http: reqwest::Client,
    auth: GoogleAuth,
    base_url: String,
}

impl DriveClient {
    /// Creates a client using the production endpoint.
    pub fn new(auth: GoogleAuth) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Streams the raw media bytes of a stored file.
    pub async fn download(&self, file_id: &str) -> GoogleResult<ByteStream> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{}", self.base_url, file_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| transport_error("drive", e))?;
        if !response.status().is_success() {
            return Err(status_error("drive", response).await);
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| {
                GoogleError::network(format!("download stream failed: {}", e))
                    .with_service("drive")
            })
            .boxed())
    }

    /// Streams a file's media bytes into a sink.
    ///
    /// Returns the number of bytes written. A stream or sink failure is
    /// terminal for this artifact but leaves the client usable.
    pub async fn download_to<W>(&self, file_id: &str, sink: &mut W) -> GoogleResult<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let stream = self.download(file_id).await?;
        let written = drain(stream, sink).await?;
        debug!("downloaded {} bytes of drive file {}", written, file_id);
        Ok(written)
    }

    /// Streams a document export in the given output format.
    pub async fn export_stream(&self, document_id: &str, mime_type: &str) -> GoogleResult<ByteStream> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/files/{}/export", self.base_url, document_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("mimeType", mime_type)])
            .send()
            .await
            .map_err(|e| transport_error("drive", e))?;
        if !response.status().is_success() {
            return Err(status_error("drive", response).await);
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| {
                GoogleError::network(format!("export stream failed: {}", e)).with_service("drive")
            })
            .boxed())
    }

    /// Exports a document, buffered into a string.
    pub async fn export(&self, document_id: &str, mime_type: &str) -> GoogleResult<String> {
        let stream = self.export_stream(document_id, mime_type).await?;
        let chunks: Vec<Bytes> = stream.try_collect().await?;
        let mut buffer = Vec::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in chunks {
            buffer.extend_from_slice(&chunk);
        }
        String::from_utf8(buffer).map_err(|e| {
            GoogleError::invalid_response(format!("export was not valid UTF-8: {}", e))
                .with_service("drive")
        })
    }

    /// Streams a document export into a sink.
    pub async fn export_to<W>(
        &self,
        document_id: &str,
        mime_type: &str,
        sink: &mut W,
    ) -> GoogleResult<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let stream = self.export_stream(document_id, mime_type).await?;
        let written = drain(stream, sink).await?;
        debug!(
            "exported {} bytes of document {} as {}",
            written, document_id, mime_type
        );
        Ok(written)
    }
}

/// Drains a byte stream into a sink, one awaited write per chunk.
async fn drain<W>(mut stream: ByteStream, sink: &mut W) -> GoogleResult<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk).await.map_err(|e| {
            GoogleError::internal(format!("failed to write to sink: {}", e)).with_service("drive")
        })?;
        written += chunk.len() as u64;
    }
    sink.flush().await.map_err(|e| {
        GoogleError::internal(format!("failed to flush sink: {}", e)).with_service("drive")
    })?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoogleErrorCode;
    use crate::testing::{Route, StubServer};

    fn client(server: &StubServer) -> DriveClient {
        DriveClient::new(GoogleAuth::with_static_token("test-token"))
            .with_base_url(format!("{}/drive/v3", server.url()))
    }

    #[tokio::test]
    async fn download_to_writes_media_bytes() {
        let server =
            StubServer::start(vec![Route::media("/drive/v3/files/video-1", "video-bytes")]).await;

        let mut sink = Vec::new();
        let written = client(&server).download_to("video-1", &mut sink).await.unwrap();

        assert_eq!(written, "video-bytes".len() as u64);
        assert_eq!(sink, b"video-bytes");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].query().unwrap().contains("alt=media"));
    }

    #[tokio::test]
    async fn export_returns_document_text() {
        let server = StubServer::start(vec![Route::media(
            "/drive/v3/files/doc-1/export",
            "# Transcript\n\nhello",
        )])
        .await;

        let text = client(&server).export("doc-1", MARKDOWN_EXPORT).await.unwrap();
        assert_eq!(text, "# Transcript\n\nhello");

        let requests = server.requests();
        assert!(requests[0].query().unwrap().contains("mimeType=text%2Fmarkdown"));
    }

    #[tokio::test]
    async fn export_to_streams_into_sink() {
        let server = StubServer::start(vec![Route::media(
            "/drive/v3/files/doc-1/export",
            "transcript text",
        )])
        .await;

        let mut sink = Vec::new();
        let written = client(&server)
            .export_to("doc-1", PLAIN_TEXT_EXPORT, &mut sink)
            .await
            .unwrap();
        assert_eq!(written, "transcript text".len() as u64);
        assert_eq!(sink, b"transcript text");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let server = StubServer::start(vec![]).await;

        let err = client(&server).download("absent").await.err().unwrap();
        assert_eq!(err.code(), GoogleErrorCode::NotFound);
    }
}
