//! Charsearch engine: HTTP fetching, effect execution and downloads.
mod engine;
mod fetch;
mod filename;
mod persist;
mod types;

pub use engine::{EngineConfig, EngineHandle};
pub use fetch::{FetchSettings, ReqwestFetcher, SearchFetcher};
pub use filename::image_filename;
pub use persist::{AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchedImage, Generation, ResultPage, ResultRecord,
    TOTAL_ITEMS_HEADER,
};
