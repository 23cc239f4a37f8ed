use std::fs;
use std::path::{Path, PathBuf};

use charsearch_core::{Rating, SearchFilter};
use charsearch_engine::AtomicFileWriter;
use charsearch_logging::{search_error, search_info, search_warn};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".charsearch_state.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedFilter {
    character: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    sites: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    last_search: Option<PersistedFilter>,
}

pub(crate) fn load_last_search(state_dir: &Path) -> Option<SearchFilter> {
    let path = state_dir.join(STATE_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            search_warn!("Failed to read persisted state from {:?}: {}", path, err);
            return None;
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            search_warn!("Failed to parse persisted state from {:?}: {}", path, err);
            return None;
        }
    };

    let persisted = state.last_search?;
    let rating = persisted
        .rating
        .as_deref()
        .and_then(|raw| match raw.parse::<Rating>() {
            Ok(rating) => Some(rating),
            Err(err) => {
                search_warn!("Ignoring persisted rating: {}", err);
                None
            }
        });
    let mut filter = SearchFilter::new(persisted.character)
        .with_tags(persisted.tags)
        .with_authors(persisted.authors)
        .with_sites(persisted.sites);
    filter.rating = rating;

    search_info!("Restored last search for {:?} from {:?}", filter.character, path);
    Some(filter)
}

pub(crate) fn save_last_search(state_dir: &Path, filter: &SearchFilter) {
    let state = PersistedState {
        last_search: Some(PersistedFilter {
            character: filter.character.clone(),
            tags: filter.query_tags().map(ToOwned::to_owned).collect(),
            rating: filter.rating.map(|rating| rating.as_str().to_string()),
            authors: filter.query_authors().map(ToOwned::to_owned).collect(),
            sites: filter.query_sites().map(ToOwned::to_owned).collect(),
        }),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            search_error!("Failed to serialize persisted state: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(PathBuf::from(state_dir));
    if let Err(err) = writer.write(STATE_FILENAME, content.as_bytes()) {
        search_error!("Failed to write persisted state to {:?}: {}", state_dir, err);
    }
}
