//! Serve negotiation and the pipeline entry point
//!
//! The hosting framework hands over a raw parameter string, a resolved
//! source path and the inbound `If-Modified-Since` value; it gets back an
//! [`ImageResponse`] to translate onto the wire. Everything between those
//! two points lives here: preset enforcement, parsing, the serve-original
//! short-circuit, at-most-once artifact creation and conditional-request
//! negotiation.

use bytes::Bytes;
use std::path::{Path, PathBuf};

use chrono::{Duration, TimeZone, Utc};

use crate::cache::{CacheKey, CacheStore};
use crate::config::Options;
use crate::engine::TransformEngine;
use crate::error::ImageflyError;
use crate::params::TransformRequest;
use crate::primitives::{ImageCodec, ImagePrimitives};

/// HTTP-shaped result of one variant request
#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub status: u16,
    /// Header name/value pairs in emission order
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

/// The transformation-and-cache pipeline
pub struct Imagefly<P: ImagePrimitives = ImageCodec> {
    options: Options,
    store: CacheStore,
    primitives: P,
}

impl Imagefly<ImageCodec> {
    pub fn new(options: Options) -> Self {
        Self::with_primitives(options, ImageCodec)
    }
}

impl<P: ImagePrimitives> Imagefly<P> {
    /// Construct with a custom image-primitives collaborator
    pub fn with_primitives(options: Options, primitives: P) -> Self {
        let store = CacheStore::new(&options);
        Self {
            options,
            store,
            primitives,
        }
    }

    /// Handle one variant request.
    ///
    /// Decides between serving the source untouched (requested box equals
    /// the natural size), a cached artifact, or a freshly rendered one,
    /// then applies conditional-request semantics to whichever file wins.
    pub async fn handle(
        &self,
        raw_params: &str,
        source: &Path,
        if_modified_since: Option<&str>,
    ) -> Result<ImageResponse, ImageflyError> {
        if self.options.enforce_presets
            && !self.options.presets.iter().any(|p| p == raw_params)
        {
            return Err(ImageflyError::PresetRejected(raw_params.to_string()));
        }

        let (src_width, src_height, handle) = self.primitives.decode(source)?;
        let request =
            TransformRequest::parse(raw_params, source, src_width, src_height, &self.options)?;

        // No transform required, serve the source file untouched and
        // leave the cache out of it entirely.
        if request.width == Some(src_width) && request.height == Some(src_height) {
            tracing::debug!(source = %source.display(), "requested box equals natural size, serving original");
            return self.respond(source, if_modified_since).await;
        }

        let source_modified = modified_epoch(source).await?;
        let key = CacheKey::derive(&request, source_modified);
        if self.store.exists(&key, source).await {
            tracing::debug!(key = %key, "cache hit");
        } else {
            tracing::debug!(key = %key, "cache miss, rendering variant");
            let engine = TransformEngine::new(&self.primitives, &self.options);
            let artifact = engine.render(handle, src_width, src_height, &request)?;
            self.store.write(&key, source, &artifact).await?;
        }

        self.respond_cached(&key, source, if_modified_since).await
    }

    /// Emit the source file with caching headers, or a bodyless 304
    /// when the inbound conditional value matches its Last-Modified.
    async fn respond(
        &self,
        path: &Path,
        if_modified_since: Option<&str>,
    ) -> Result<ImageResponse, ImageflyError> {
        let last_modified = http_date(modified_epoch(path).await?);

        if if_modified_since == Some(last_modified.as_str()) {
            tracing::debug!(path = %path.display(), "not modified since last request");
            return Ok(not_modified());
        }

        let body = Bytes::from(tokio::fs::read(path).await?);
        Ok(self.ok_response(path, last_modified, body))
    }

    /// Same negotiation for a cached artifact, with the body read
    /// through the store.
    async fn respond_cached(
        &self,
        key: &CacheKey,
        source: &Path,
        if_modified_since: Option<&str>,
    ) -> Result<ImageResponse, ImageflyError> {
        let entry = self.store.entry_path(key, source);
        let last_modified = http_date(modified_epoch(&entry).await?);

        if if_modified_since == Some(last_modified.as_str()) {
            tracing::debug!(key = %key, "not modified since last request");
            return Ok(not_modified());
        }

        let body = self.store.read(key, source).await?;
        Ok(self.ok_response(&entry, last_modified, body))
    }

    fn ok_response(&self, path: &Path, last_modified: String, body: Bytes) -> ImageResponse {
        let expires = Utc::now() + Duration::seconds(self.options.cache_expire as i64);
        ImageResponse {
            status: 200,
            headers: vec![
                ("Last-Modified", last_modified),
                ("Content-Type", self.primitives.mime_type(path)),
                ("Content-Length", body.len().to_string()),
                ("Expires", expires.format(HTTP_DATE_FORMAT).to_string()),
                (
                    "Cache-Control",
                    format!("max-age={}, public", self.options.cache_expire),
                ),
                ("Connection", "close".to_string()),
            ],
            body,
        }
    }
}

fn not_modified() -> ImageResponse {
    ImageResponse {
        status: 304,
        headers: vec![("Connection", "close".to_string())],
        body: Bytes::new(),
    }
}

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// RFC 1123 date for an epoch-seconds timestamp
fn http_date(epoch: u64) -> String {
    Utc.timestamp_opt(epoch as i64, 0)
        .single()
        .map(|t| t.format(HTTP_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Last-modified time of a file as epoch seconds
async fn modified_epoch(path: &Path) -> Result<u64, ImageflyError> {
    let metadata =
        tokio::fs::metadata(path)
            .await
            .map_err(|_| ImageflyError::SourceNotFound {
                path: PathBuf::from(path),
            })?;
    let modified = metadata.modified()?;
    Ok(modified
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}
