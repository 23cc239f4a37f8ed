use std::time::Duration;

use bytes::BytesMut;
use charsearch_logging::search_debug;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::{FailureKind, FetchError, FetchedImage, ResultPage, ResultRecord, TOTAL_ITEMS_HEADER};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Cap for JSON bodies (result pages, character list).
    pub max_json_bytes: u64,
    /// Cap for downloaded image bodies.
    pub max_image_bytes: u64,
    /// Content-type prefixes accepted for image downloads.
    pub allowed_image_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_json_bytes: 4 * 1024 * 1024,
            max_image_bytes: 32 * 1024 * 1024,
            allowed_image_types: vec!["image/".to_string()],
        }
    }
}

#[async_trait::async_trait]
pub trait SearchFetcher: Send + Sync {
    /// GET one page of results and decode the JSON array.
    async fn fetch_page(&self, url: &str) -> Result<ResultPage, FetchError>;

    /// GET the list of indexed character names.
    async fn fetch_characters(&self, url: &str) -> Result<Vec<String>, FetchError>;

    /// GET raw image bytes.
    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

struct RawResponse {
    bytes: Vec<u8>,
    headers: HeaderMap,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn get(&self, url: &str, max_bytes: u64) -> Result<RawResponse, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let headers = response.headers().clone();
        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        search_debug!("GET {} -> {} bytes", url, bytes.len());

        Ok(RawResponse {
            bytes: bytes.to_vec(),
            headers,
        })
    }

    fn is_image_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings.allowed_image_types.iter().any(|allowed| {
            ct.get(..allowed.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(allowed))
        })
    }
}

#[async_trait::async_trait]
impl SearchFetcher for ReqwestFetcher {
    async fn fetch_page(&self, url: &str) -> Result<ResultPage, FetchError> {
        let raw = self.get(url, self.settings.max_json_bytes).await?;
        let items: Vec<ResultRecord> = decode_array(&raw.bytes)?;
        let total = raw
            .headers
            .get(TOTAL_ITEMS_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        Ok(ResultPage { items, total })
    }

    async fn fetch_characters(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let raw = self.get(url, self.settings.max_json_bytes).await?;
        decode_array(&raw.bytes)
    }

    async fn fetch_image(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let raw = self.get(url, self.settings.max_image_bytes).await?;
        let content_type = raw
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_image_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        Ok(FetchedImage {
            bytes: raw.bytes,
            content_type,
        })
    }
}

/// Decode a body that must be a JSON array; anything else is a format error.
fn decode_array<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Format, format!("invalid JSON: {err}")))?;
    if !value.is_array() {
        return Err(FetchError::new(
            FailureKind::Format,
            format!("expected a JSON array, got {}", json_kind(&value)),
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| FetchError::new(FailureKind::Format, format!("unexpected item: {err}")))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode_array, FetchSettings, ReqwestFetcher};
    use crate::{FailureKind, ResultRecord};

    #[test]
    fn page_decodes_known_fields_and_ignores_extras() {
        let body = br#"[{"img_id":"1","source_site":"danbooru","source_id":"9",
            "cache_path":"image/1.png","imhash":"AAAA","sfw_rating":"safe"}]"#;
        let items: Vec<ResultRecord> = decode_array(body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source_site, "danbooru");
        assert_eq!(items[0].sfw_rating.as_deref(), Some("safe"));
        assert!(items[0].source_tags.is_empty());
    }

    #[test]
    fn object_body_is_format_error() {
        let err = decode_array::<String>(br#"{"error":"nope"}"#).unwrap_err();
        assert_eq!(err.kind, FailureKind::Format);
        assert!(err.message.contains("an object"));
    }

    #[test]
    fn item_missing_fields_is_format_error() {
        let err = decode_array::<ResultRecord>(br#"[{"img_id":"1"}]"#).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn image_types_match_by_prefix() {
        let fetcher = ReqwestFetcher::new(FetchSettings::default()).unwrap();
        assert!(fetcher.is_image_type_allowed("image/png"));
        assert!(fetcher.is_image_type_allowed("IMAGE/JPEG; charset=binary"));
        assert!(!fetcher.is_image_type_allowed("text/html"));
        assert!(!fetcher.is_image_type_allowed("ima"));
    }
}
