use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub type Generation = u64;

/// Response header carrying the total hit count for a filter.
pub const TOTAL_ITEMS_HEADER: &str = "x-total-items";

/// One element of the `api/characters/{character}` JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultRecord {
    pub img_id: String,
    pub source_site: String,
    pub source_id: String,
    pub cache_path: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub sfw_rating: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub source_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<ResultRecord>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageFetched {
        generation: Generation,
        page: u32,
        result: Result<ResultPage, FetchError>,
    },
    CharactersFetched(Result<Vec<String>, FetchError>),
    RetryDue {
        generation: Generation,
        page: u32,
    },
    ImageSaved {
        img_id: String,
        result: Result<PathBuf, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the body arrived but did not have the expected shape.
    pub fn is_format(&self) -> bool {
        self.kind == FailureKind::Format
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Format,
    Persist,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Format => write!(f, "malformed response"),
            FailureKind::Persist => write!(f, "could not write file"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
