/// One search hit as returned by the API. The view never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultItem {
    pub img_id: String,
    pub source_site: String,
    pub source_id: String,
    pub cache_path: String,
    pub source_url: Option<String>,
    pub rating: Option<String>,
    pub characters: Vec<String>,
    pub authors: Vec<String>,
    pub source_tags: Vec<String>,
}

/// A rendered result card: an image plus a `site#id` label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub image_src: String,
    pub image_alt: String,
    pub label: String,
}

pub fn render_card(item: &ResultItem) -> ResultCard {
    ResultCard {
        image_src: item.cache_path.clone(),
        image_alt: item.img_id.clone(),
        label: format!("{}#{}", item.source_site, item.source_id),
    }
}
