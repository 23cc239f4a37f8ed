use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use charsearch_logging::{search_debug, search_warn};

use crate::fetch::{FetchSettings, ReqwestFetcher, SearchFetcher};
use crate::{
    image_filename, AtomicFileWriter, EngineEvent, FailureKind, FetchError, Generation,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_downloads(download_dir: PathBuf) -> Self {
        Self {
            fetch: FetchSettings::default(),
            download_dir,
        }
    }
}

enum EngineCommand {
    FetchPage {
        generation: Generation,
        page: u32,
        url: String,
    },
    FetchCharacters {
        url: String,
    },
    ScheduleRetry {
        generation: Generation,
        page: u32,
        delay: Duration,
    },
    SaveImage {
        img_id: String,
        url: String,
        file_stem: String,
    },
}

/// Command side of the engine. Events come back on the receiver returned by
/// [`EngineHandle::spawn`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn spawn(config: EngineConfig) -> Result<(Self, mpsc::Receiver<EngineEvent>), FetchError> {
        let fetcher: Arc<dyn SearchFetcher> = Arc::new(ReqwestFetcher::new(config.fetch)?);
        Self::spawn_with_fetcher(fetcher, config.download_dir)
    }

    pub fn spawn_with_fetcher(
        fetcher: Arc<dyn SearchFetcher>,
        download_dir: PathBuf,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), FetchError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let writer = AtomicFileWriter::new(download_dir);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), &writer, command, event_tx).await;
                });
            }
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn fetch_page(&self, generation: Generation, page: u32, url: impl Into<String>) {
        self.send(EngineCommand::FetchPage {
            generation,
            page,
            url: url.into(),
        });
    }

    pub fn fetch_characters(&self, url: impl Into<String>) {
        self.send(EngineCommand::FetchCharacters { url: url.into() });
    }

    pub fn schedule_retry(&self, generation: Generation, page: u32, delay: Duration) {
        self.send(EngineCommand::ScheduleRetry {
            generation,
            page,
            delay,
        });
    }

    pub fn save_image(
        &self,
        img_id: impl Into<String>,
        url: impl Into<String>,
        file_stem: impl Into<String>,
    ) {
        self.send(EngineCommand::SaveImage {
            img_id: img_id.into(),
            url: url.into(),
            file_stem: file_stem.into(),
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            search_warn!("engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    fetcher: &dyn SearchFetcher,
    writer: &AtomicFileWriter,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchPage {
            generation,
            page,
            url,
        } => {
            search_debug!("fetching page {} of generation {}: {}", page, generation, url);
            let result = fetcher.fetch_page(&url).await;
            EngineEvent::PageFetched {
                generation,
                page,
                result,
            }
        }
        EngineCommand::FetchCharacters { url } => {
            EngineEvent::CharactersFetched(fetcher.fetch_characters(&url).await)
        }
        EngineCommand::ScheduleRetry {
            generation,
            page,
            delay,
        } => {
            tokio::time::sleep(delay).await;
            EngineEvent::RetryDue { generation, page }
        }
        EngineCommand::SaveImage {
            img_id,
            url,
            file_stem,
        } => {
            let result = save_image(fetcher, writer, &url, &file_stem).await;
            EngineEvent::ImageSaved { img_id, result }
        }
    };
    let _ = event_tx.send(event);
}

async fn save_image(
    fetcher: &dyn SearchFetcher,
    writer: &AtomicFileWriter,
    url: &str,
    file_stem: &str,
) -> Result<PathBuf, FetchError> {
    let image = fetcher.fetch_image(url).await?;
    let filename = image_filename(file_stem, url, image.content_type.as_deref());
    writer
        .write(&filename, &image.bytes)
        .map_err(|err| FetchError::new(FailureKind::Persist, err.to_string()))
}
