use charsearch_logging::{search_debug, search_info, search_warn};

use crate::{
    build_query_url, AppState, Effect, Generation, LoadError, LoadPhase, Msg, Notice,
    SCROLL_THRESHOLD,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started | Msg::CharactersRequested => characters_effect(&mut state),
        Msg::SearchSubmitted(filter) => {
            state.start_search(filter);
            if state.has_searchable_filter() {
                search_info!("new search generation {}", state.generation());
                load_next_page(&mut state)
            } else {
                state.set_notice(Some(Notice::SearchNeedsCharacter));
                Vec::new()
            }
        }
        Msg::Scrolled {
            viewport_bottom,
            document_height,
        } => {
            let near_bottom = document_height.saturating_sub(viewport_bottom) <= SCROLL_THRESHOLD;
            if near_bottom
                && state.has_searchable_filter()
                && state.pagination().phase == LoadPhase::Idle
            {
                state.advance_page();
                load_next_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::PageLoaded {
            generation,
            page,
            items,
            total,
        } => {
            if is_current_fetch(&state, generation, page) {
                state.set_retry_attempt(0);
                state.set_total(total);
                if items.is_empty() {
                    search_info!("page {} empty; results exhausted", page);
                    state.set_phase(LoadPhase::Exhausted);
                    state.set_notice(Some(Notice::EndOfResults));
                } else {
                    search_debug!("page {} appended {} cards", page, items.len());
                    state.append_results(items);
                    state.set_phase(LoadPhase::Idle);
                    if matches!(state.notice(), Some(Notice::Retrying { .. })) {
                        state.set_notice(None);
                    }
                }
            } else {
                search_debug!("dropping stale page {} from generation {}", page, generation);
            }
            Vec::new()
        }
        Msg::PageFailed {
            generation,
            page,
            error,
        } => {
            if is_current_fetch(&state, generation, page) {
                handle_failure(&mut state, page, error)
            } else {
                search_debug!("dropping stale failure for page {} ({})", page, error);
                Vec::new()
            }
        }
        Msg::RetryDue { generation, page } => {
            if is_current_fetch(&state, generation, page) {
                fetch_current_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::RetryRequested => {
            if state.pagination().phase == LoadPhase::Failed {
                state.set_retry_attempt(0);
                state.set_phase(LoadPhase::Idle);
                state.set_notice(None);
                load_next_page(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::CharactersLoaded(names) => {
            state.set_characters(names);
            Vec::new()
        }
        Msg::CharactersFailed(message) => {
            search_warn!("character list unavailable: {}", message);
            state.set_notice(Some(Notice::CharactersUnavailable(message)));
            Vec::new()
        }
        Msg::SaveCardRequested { index } => save_effect(&mut state, index),
        Msg::ImageSaved { img_id, path } => {
            state.set_notice(Some(Notice::ImageSaved { img_id, path }));
            Vec::new()
        }
        Msg::ImageSaveFailed { img_id, message } => {
            state.set_notice(Some(Notice::ImageSaveFailed { img_id, message }));
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.set_notice(None);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Requests the current page unless a load is running or results are exhausted.
fn load_next_page(state: &mut AppState) -> Vec<Effect> {
    if !state.has_searchable_filter() {
        return Vec::new();
    }
    match state.pagination().phase {
        LoadPhase::Idle => fetch_current_page(state),
        LoadPhase::Loading | LoadPhase::Exhausted | LoadPhase::Failed => Vec::new(),
    }
}

fn fetch_current_page(state: &mut AppState) -> Vec<Effect> {
    let page = state.pagination().current_page;
    let settings = state.settings();
    let built = match state.active_filter() {
        Some(filter) => build_query_url(&settings.api_base, filter, settings.page_size, page),
        None => return Vec::new(),
    };
    match built {
        Ok(url) => {
            state.set_phase(LoadPhase::Loading);
            vec![Effect::FetchPage {
                generation: state.generation(),
                page,
                url: url.into(),
            }]
        }
        Err(err) => {
            search_warn!("cannot build query for page {}: {}", page, err);
            state.set_phase(LoadPhase::Failed);
            state.set_notice(Some(Notice::LoadFailed {
                page,
                error: LoadError::Query(err.to_string()),
            }));
            Vec::new()
        }
    }
}

/// Failed pages are retried at the same index with doubling delays; once the
/// retries are spent the search stops in `Failed` until the user retries.
fn handle_failure(state: &mut AppState, page: u32, error: LoadError) -> Vec<Effect> {
    let attempt = state.retry_attempt() + 1;
    let max_retries = state.settings().max_retries;
    if attempt <= max_retries {
        let delay = state
            .settings()
            .retry_base_delay
            .saturating_mul(1 << (attempt - 1).min(16));
        search_warn!(
            "page {} failed ({}); retry {}/{} in {:?}",
            page,
            error,
            attempt,
            max_retries,
            delay
        );
        state.set_retry_attempt(attempt);
        state.set_notice(Some(Notice::Retrying {
            page,
            attempt,
            max_retries,
        }));
        vec![Effect::ScheduleRetry {
            generation: state.generation(),
            page,
            delay,
        }]
    } else {
        search_warn!("page {} failed after {} retries: {}", page, max_retries, error);
        state.set_phase(LoadPhase::Failed);
        state.set_notice(Some(Notice::LoadFailed { page, error }));
        Vec::new()
    }
}

fn is_current_fetch(state: &AppState, generation: Generation, page: u32) -> bool {
    generation == state.generation()
        && page == state.pagination().current_page
        && state.pagination().phase == LoadPhase::Loading
}

fn characters_effect(state: &mut AppState) -> Vec<Effect> {
    match state.settings().api_base.join("characters") {
        Ok(url) => vec![Effect::FetchCharacters { url: url.into() }],
        Err(err) => {
            state.set_notice(Some(Notice::CharactersUnavailable(err.to_string())));
            Vec::new()
        }
    }
}

fn save_effect(state: &mut AppState, index: usize) -> Vec<Effect> {
    let Some(item) = state.result_item(index) else {
        state.set_notice(Some(Notice::NoSuchCard { index }));
        return Vec::new();
    };
    match state.settings().api_base.join(&item.cache_path) {
        Ok(url) => vec![Effect::SaveImage {
            img_id: item.img_id.clone(),
            url: url.into(),
            file_stem: format!("{}_{}", item.source_site, item.source_id),
        }],
        Err(err) => {
            let img_id = item.img_id.clone();
            state.set_notice(Some(Notice::ImageSaveFailed {
                img_id,
                message: err.to_string(),
            }));
            Vec::new()
        }
    }
}
