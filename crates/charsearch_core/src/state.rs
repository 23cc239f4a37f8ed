use std::fmt;
use std::time::Duration;

use url::Url;

use crate::view_model::AppViewModel;
use crate::{render_card, ResultCard, ResultItem, SearchFilter};

pub type Generation = u64;

pub const DEFAULT_API_BASE: &str = "http://localhost:8090/api/";

/// Distance (in viewport units) from the document bottom that triggers the next page.
pub const SCROLL_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub api_base: Url,
    pub page_size: u32,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url"),
            page_size: 20,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Exhausted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationState {
    pub current_page: u32,
    pub phase: LoadPhase,
}

impl PaginationState {
    pub fn no_more_results(&self) -> bool {
        self.phase == LoadPhase::Exhausted
    }
}

/// Why a page could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The request could not be sent, timed out or got a non-success status.
    Network(String),
    /// The body was not a JSON array of results.
    Format(String),
    /// No request URL could be built from the active filter.
    Query(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(message) => write!(f, "network error: {message}"),
            LoadError::Format(message) => write!(f, "unexpected response: {message}"),
            LoadError::Query(message) => write!(f, "invalid query: {message}"),
        }
    }
}

/// User-facing status line. Exhaustion and failure are always distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SearchNeedsCharacter,
    EndOfResults,
    Retrying { page: u32, attempt: u32, max_retries: u32 },
    LoadFailed { page: u32, error: LoadError },
    CharactersUnavailable(String),
    NoSuchCard { index: usize },
    ImageSaved { img_id: String, path: String },
    ImageSaveFailed { img_id: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultEntry {
    item: ResultItem,
    card: ResultCard,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: SearchSettings,
    generation: Generation,
    active_filter: Option<SearchFilter>,
    pagination: PaginationState,
    retry_attempt: u32,
    results: Vec<ResultEntry>,
    total: Option<u64>,
    characters: Vec<String>,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SearchSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            generation: self.generation,
            active_filter: self.active_filter.clone(),
            cards: self.results.iter().map(|entry| entry.card.clone()).collect(),
            current_page: self.pagination.current_page,
            phase: self.pagination.phase,
            total: self.total,
            characters: self.characters.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn active_filter(&self) -> Option<&SearchFilter> {
        self.active_filter.as_ref()
    }

    pub fn card_count(&self) -> usize {
        self.results.len()
    }

    pub(crate) fn retry_attempt(&self) -> u32 {
        self.retry_attempt
    }

    /// The API record behind card `index`.
    pub fn result_item(&self, index: usize) -> Option<&ResultItem> {
        self.results.get(index).map(|entry| &entry.item)
    }

    pub(crate) fn has_searchable_filter(&self) -> bool {
        self.active_filter
            .as_ref()
            .is_some_and(SearchFilter::has_character)
    }

    /// Clears the container and pagination, and moves to a fresh generation.
    pub(crate) fn start_search(&mut self, filter: SearchFilter) {
        self.generation += 1;
        self.results.clear();
        self.pagination = PaginationState::default();
        self.retry_attempt = 0;
        self.total = None;
        self.notice = None;
        self.active_filter = Some(filter);
        self.dirty = true;
    }

    pub(crate) fn advance_page(&mut self) {
        self.pagination.current_page += 1;
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: LoadPhase) {
        if self.pagination.phase != phase {
            self.pagination.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn set_retry_attempt(&mut self, attempt: u32) {
        self.retry_attempt = attempt;
    }

    pub(crate) fn append_results(&mut self, items: Vec<ResultItem>) {
        self.results.extend(items.into_iter().map(|item| ResultEntry {
            card: render_card(&item),
            item,
        }));
        self.dirty = true;
    }

    pub(crate) fn set_total(&mut self, total: Option<u64>) {
        if total.is_some() && self.total != total {
            self.total = total;
            self.dirty = true;
        }
    }

    pub(crate) fn set_characters(&mut self, mut names: Vec<String>) {
        names.sort();
        names.dedup();
        self.characters = names;
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        if self.notice != notice {
            self.notice = notice;
            self.dirty = true;
        }
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}
