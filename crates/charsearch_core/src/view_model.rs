use crate::{Generation, LoadPhase, Notice, ResultCard, SearchFilter};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub generation: Generation,
    pub active_filter: Option<SearchFilter>,
    pub cards: Vec<ResultCard>,
    pub current_page: u32,
    pub phase: LoadPhase,
    pub total: Option<u64>,
    pub characters: Vec<String>,
    pub notice: Option<Notice>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}
