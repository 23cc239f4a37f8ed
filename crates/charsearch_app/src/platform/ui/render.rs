use charsearch_core::{AppViewModel, LoadPhase, Notice, ResultItem, SearchFilter};

use super::viewport::Viewport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub header: String,
    pub cards: Vec<String>,
    pub notice: Option<String>,
}

pub fn render(view: &AppViewModel, viewport: &Viewport) -> Screen {
    let search_label = match &view.active_filter {
        Some(filter) if filter.has_character() => describe_filter(filter),
        _ => "No search".to_string(),
    };
    let phase_label = match view.phase {
        LoadPhase::Idle => "Idle",
        LoadPhase::Loading => "Loading",
        LoadPhase::Exhausted => "End",
        LoadPhase::Failed => "Failed",
    };
    let count_label = match view.total {
        Some(total) => format!("{} of {}", view.cards.len(), total),
        None => format!("{} results", view.cards.len()),
    };
    let header = format!(
        "{search_label} | {count_label} | page {} | {phase_label}",
        view.current_page
    );

    let visible = viewport.visible_range(view.cards.len());
    let cards = view.cards[visible.clone()]
        .iter()
        .enumerate()
        .map(|(offset, card)| {
            let number = visible.start + offset + 1;
            format!(
                "{number:>4}. {:<28} {} (alt {})",
                card.label, card.image_src, card.image_alt
            )
        })
        .collect();

    Screen {
        header,
        cards,
        notice: view.notice.as_ref().map(notice_text),
    }
}

pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SearchNeedsCharacter => "Enter a character name to search.".to_string(),
        Notice::EndOfResults => "End of results.".to_string(),
        Notice::Retrying {
            page,
            attempt,
            max_retries,
        } => format!("Page {page} failed to load; retrying ({attempt}/{max_retries})..."),
        Notice::LoadFailed { page, error } => {
            format!("Could not load page {page}: {error}. Type `retry` to try again.")
        }
        Notice::CharactersUnavailable(message) => {
            format!("Character list unavailable: {message}")
        }
        Notice::NoSuchCard { index } => format!("There is no card {}.", index + 1),
        Notice::ImageSaved { img_id, path } => format!("Saved image {img_id} to {path}"),
        Notice::ImageSaveFailed { img_id, message } => {
            format!("Could not save image {img_id}: {message}")
        }
    }
}

/// Multi-line detail block for the `show` command; `number` is 1-based.
pub fn card_details(number: usize, item: &ResultItem) -> String {
    let mut lines = vec![format!(
        "{number}. {}#{} (image {})",
        item.source_site, item.source_id, item.img_id
    )];
    lines.push(format!(
        "   rating:     {}",
        item.rating.as_deref().unwrap_or("unrated")
    ));
    if let Some(url) = &item.source_url {
        lines.push(format!("   source:     {url}"));
    }
    for (label, values) in [
        ("characters", &item.characters),
        ("authors", &item.authors),
        ("tags", &item.source_tags),
    ] {
        if !values.is_empty() {
            lines.push(format!("   {label:<11} {}", values.join(", ")));
        }
    }
    lines.join("\n")
}

pub fn character_list(characters: &[String]) -> String {
    if characters.is_empty() {
        "No characters loaded yet.".to_string()
    } else {
        format!("Characters: {}", characters.join(", "))
    }
}

fn describe_filter(filter: &SearchFilter) -> String {
    let mut parts = vec![filter.character.clone()];
    if let Some(rating) = filter.rating {
        parts.push(format!("[{rating}]"));
    }
    let tags: Vec<_> = filter.query_tags().collect();
    if !tags.is_empty() {
        parts.push(format!("tags: {}", tags.join(" ")));
    }
    parts.join(" ")
}
