use std::time::Duration;

use crate::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchPage {
        generation: Generation,
        page: u32,
        url: String,
    },
    ScheduleRetry {
        generation: Generation,
        page: u32,
        delay: Duration,
    },
    FetchCharacters { url: String },
    SaveImage {
        img_id: String,
        url: String,
        file_stem: String,
    },
}
