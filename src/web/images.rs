//! Generated asset responses with validators for conditional requests

use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::header::{
    CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use httpdate::{fmt_http_date, parse_http_date};

use crate::constants::ASSET_CACHE_CONTROL;
use crate::error::CampaignError;

/// Validators for one asset file, derived from its size and mtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AssetValidators {
    etag: String,
    modified_at: Option<SystemTime>,
}

impl AssetValidators {
    pub(crate) fn new(size: u64, modified_at: Option<SystemTime>) -> Self {
        // HTTP dates only carry whole seconds
        let modified_at = modified_at
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|since_epoch| UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs()));
        let stamp = modified_at
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |since_epoch| since_epoch.as_secs());
        Self {
            etag: format!("W/\"{size:x}-{stamp:x}\""),
            modified_at,
        }
    }

    fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self::new(metadata.len(), metadata.modified().ok())
    }

    /// True when the client's cached copy is still current.
    ///
    /// `If-None-Match` takes precedence, `If-Modified-Since` is only consulted
    /// without it.
    pub(crate) fn is_fresh(&self, request: &HeaderMap) -> bool {
        if let Some(if_none_match) = request.get(IF_NONE_MATCH) {
            return if_none_match
                .to_str()
                .is_ok_and(|tags| etag_listed(tags, &self.etag));
        }
        match (request.get(IF_MODIFIED_SINCE), self.modified_at) {
            (Some(since), Some(modified_at)) => since
                .to_str()
                .ok()
                .and_then(|value| parse_http_date(value).ok())
                .is_some_and(|since| modified_at <= since),
            _ => false,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(ASSET_CACHE_CONTROL.as_str()) {
            headers.insert(CACHE_CONTROL, value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.etag) {
            headers.insert(ETAG, value);
        }
        if let Some(value) = self
            .modified_at
            .and_then(|time| HeaderValue::from_str(&fmt_http_date(time)).ok())
        {
            headers.insert(LAST_MODIFIED, value);
        }
        headers
    }
}

/// Weak comparison against an `If-None-Match` list.
fn etag_listed(tags: &str, etag: &str) -> bool {
    let opaque = |tag: &str| tag.trim().trim_start_matches("W/").to_string();
    let wanted = opaque(etag);
    tags.split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || opaque(tag) == wanted)
}

/// Content type for an asset file name.
pub(crate) fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Serves the file at `path`, answering 304 when the request's validators match.
pub(crate) async fn asset_response(
    path: &Path,
    request: &HeaderMap,
) -> Result<Response, CampaignError> {
    let not_found = || CampaignError::NotFound("Asset not found".to_string());
    let failed = |err: std::io::Error| {
        CampaignError::InternalServerError(format!("Error serving asset: {err}"))
    };

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(not_found()),
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(err) => return Err(failed(err)),
    };

    let validators = AssetValidators::from_metadata(&metadata);
    let mut headers = validators.headers();
    if validators.is_fresh(request) {
        return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(err) => return Err(failed(err)),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(filename)),
    );
    Ok((StatusCode::OK, headers, Body::from(bytes)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64, nanos: u32) -> SystemTime {
        UNIX_EPOCH + Duration::new(secs, nanos)
    }

    fn request(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).expect("header value"));
        headers
    }

    #[test]
    fn etag_tracks_size_and_mtime() {
        let validators = AssetValidators::new(4096, Some(at(1_700_000_000, 0)));
        assert_eq!(validators.etag, "W/\"1000-6553f100\"");
        assert_ne!(validators, AssetValidators::new(4097, Some(at(1_700_000_000, 0))));
        assert_ne!(validators, AssetValidators::new(4096, Some(at(1_700_000_001, 0))));
    }

    #[test]
    fn if_none_match_uses_weak_comparison() {
        let validators = AssetValidators::new(10, Some(at(1_700_000_000, 0)));
        let etag = validators.etag.clone();
        let strong = etag.trim_start_matches("W/").to_string();

        assert!(validators.is_fresh(&request(IF_NONE_MATCH, &format!("\"other\", {etag}"))));
        assert!(validators.is_fresh(&request(IF_NONE_MATCH, &strong)));
        assert!(validators.is_fresh(&request(IF_NONE_MATCH, "*")));
        assert!(!validators.is_fresh(&request(IF_NONE_MATCH, "\"other\"")));
    }

    #[test]
    fn if_none_match_wins_over_if_modified_since() {
        let validators = AssetValidators::new(10, Some(at(1_700_000_000, 0)));
        let mut headers = request(IF_NONE_MATCH, "\"stale\"");
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_str(&fmt_http_date(at(1_800_000_000, 0))).expect("header value"),
        );
        assert!(!validators.is_fresh(&headers));
    }

    #[test]
    fn if_modified_since_ignores_subsecond_mtime() {
        let validators = AssetValidators::new(10, Some(at(1_700_000_000, 750_000_000)));
        let last_modified = validators
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .expect("last-modified header");

        // echoing Last-Modified back must count as fresh
        assert!(validators.is_fresh(&request(IF_MODIFIED_SINCE, &last_modified)));
        let earlier = fmt_http_date(at(1_699_999_999, 0));
        assert!(!validators.is_fresh(&request(IF_MODIFIED_SINCE, &earlier)));
        assert!(!validators.is_fresh(&request(IF_MODIFIED_SINCE, "not a date")));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a_1x1.PNG"), "image/png");
        assert_eq!(content_type_for("shot.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert_eq!(content_type_for("png"), "application/octet-stream");
    }

    #[tokio::test]
    async fn serves_file_then_not_modified() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shoes_1x1.png");
        std::fs::write(&path, b"png bytes").expect("write asset");

        let response = asset_response(&path, &HeaderMap::new()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            ASSET_CACHE_CONTROL.as_str()
        );
        let etag = response.headers().get(ETAG).cloned().expect("etag");

        let mut conditional = HeaderMap::new();
        conditional.insert(IF_NONE_MATCH, etag);
        let response = asset_response(&path, &conditional).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().get(CONTENT_TYPE).is_none());

        let missing = asset_response(&dir.path().join("gone.png"), &HeaderMap::new()).await;
        assert!(matches!(missing, Err(CampaignError::NotFound(_))));
        let directory = asset_response(dir.path(), &HeaderMap::new()).await;
        assert!(matches!(directory, Err(CampaignError::NotFound(_))));
    }
}
