use crate::{Generation, LoadError, ResultItem, SearchFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The view came up; populate the character selector.
    Started,
    /// User submitted the filter form; starts a new search.
    SearchSubmitted(SearchFilter),
    /// Viewport moved. Both values share the same unit (pixels or rows).
    Scrolled {
        viewport_bottom: u32,
        document_height: u32,
    },
    /// Engine returned a page of results.
    PageLoaded {
        generation: Generation,
        page: u32,
        items: Vec<ResultItem>,
        total: Option<u64>,
    },
    /// Engine could not load a page.
    PageFailed {
        generation: Generation,
        page: u32,
        error: LoadError,
    },
    /// Backoff delay for a failed page elapsed.
    RetryDue { generation: Generation, page: u32 },
    /// User asked to retry after retries were spent.
    RetryRequested,
    /// User asked to reload the character list.
    CharactersRequested,
    CharactersLoaded(Vec<String>),
    CharactersFailed(String),
    /// User asked to download the image behind a card (zero-based).
    SaveCardRequested { index: usize },
    ImageSaved { img_id: String, path: String },
    ImageSaveFailed { img_id: String, message: String },
    NoticeDismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}
