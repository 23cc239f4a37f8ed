use std::sync::mpsc;
use std::thread;

use charsearch_core::{Effect, LoadError, Msg, ResultItem};
use charsearch_engine::{EngineConfig, EngineEvent, EngineHandle, FetchError, ResultRecord};
use charsearch_logging::{search_debug, search_info, search_warn};

use super::app::AppEvent;

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, app_tx: mpsc::Sender<AppEvent>) -> Result<Self, FetchError> {
        let (engine, events) = EngineHandle::spawn(config)?;
        spawn_event_loop(events, app_tx);
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    generation,
                    page,
                    url,
                } => {
                    search_info!("FetchPage generation={} page={} url={}", generation, page, url);
                    self.engine.fetch_page(generation, page, url);
                }
                Effect::ScheduleRetry {
                    generation,
                    page,
                    delay,
                } => {
                    search_debug!("ScheduleRetry page={} delay={:?}", page, delay);
                    self.engine.schedule_retry(generation, page, delay);
                }
                Effect::FetchCharacters { url } => {
                    self.engine.fetch_characters(url);
                }
                Effect::SaveImage {
                    img_id,
                    url,
                    file_stem,
                } => {
                    search_info!("SaveImage img_id={} url={}", img_id, url);
                    self.engine.save_image(img_id, url, file_stem);
                }
            }
        }
    }
}

fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if app_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                break;
            }
        }
    });
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PageFetched {
            generation,
            page,
            result,
        } => match result {
            Ok(fetched) => Msg::PageLoaded {
                generation,
                page,
                items: fetched.items.into_iter().map(map_record).collect(),
                total: fetched.total,
            },
            Err(err) => {
                search_warn!("Page {} of generation {} failed: {}", page, generation, err);
                Msg::PageFailed {
                    generation,
                    page,
                    error: load_error(err),
                }
            }
        },
        EngineEvent::CharactersFetched(Ok(names)) => Msg::CharactersLoaded(names),
        EngineEvent::CharactersFetched(Err(err)) => Msg::CharactersFailed(err.to_string()),
        EngineEvent::RetryDue { generation, page } => Msg::RetryDue { generation, page },
        EngineEvent::ImageSaved { img_id, result } => match result {
            Ok(path) => Msg::ImageSaved {
                img_id,
                path: path.display().to_string(),
            },
            Err(err) => Msg::ImageSaveFailed {
                img_id,
                message: err.to_string(),
            },
        },
    }
}

fn map_record(record: ResultRecord) -> ResultItem {
    ResultItem {
        img_id: record.img_id,
        source_site: record.source_site,
        source_id: record.source_id,
        cache_path: record.cache_path,
        source_url: record.source_url,
        rating: record.sfw_rating,
        characters: record.characters,
        authors: record.authors,
        source_tags: record.source_tags,
    }
}

fn load_error(err: FetchError) -> LoadError {
    if err.is_format() {
        LoadError::Format(err.message)
    } else {
        LoadError::Network(err.to_string())
    }
}
