//! Charsearch core: pure search-view state machine and view-model helpers.
mod card;
mod effect;
mod filter;
mod msg;
mod query;
mod state;
mod update;
mod view_model;

pub use card::{render_card, ResultCard, ResultItem};
pub use effect::Effect;
pub use filter::{ParseRatingError, Rating, SearchFilter};
pub use msg::Msg;
pub use query::{build_query_url, parse_api_base, QueryError};
pub use state::{
    AppState, Generation, LoadError, LoadPhase, Notice, PaginationState, SearchSettings,
    DEFAULT_API_BASE, SCROLL_THRESHOLD,
};
pub use update::update;
pub use view_model::AppViewModel;
