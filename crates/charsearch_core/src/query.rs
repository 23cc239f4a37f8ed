use url::Url;

use crate::SearchFilter;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("a character name is required to search")]
    EmptyCharacter,
    #[error("api base {0} cannot carry path segments")]
    InvalidBase(String),
}

/// Parse an API base URL, normalising it to end with `/` so relative
/// paths such as `characters` and `image/..` resolve beneath it.
pub fn parse_api_base(raw: &str) -> Result<Url, QueryError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|err| QueryError::InvalidBase(format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(QueryError::InvalidBase(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Build `{base}characters/{character}?count=..&page=..[&rating=..][&tag=..]*`.
///
/// The character is percent-encoded as a single path segment; query values
/// are form-encoded. Blank tags, authors and sites are dropped.
pub fn build_query_url(
    base: &Url,
    filter: &SearchFilter,
    count: u32,
    page: u32,
) -> Result<Url, QueryError> {
    if !filter.has_character() {
        return Err(QueryError::EmptyCharacter);
    }

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| QueryError::InvalidBase(base.to_string()))?
        .pop_if_empty()
        .push("characters")
        .push(&filter.character);

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("count", &count.to_string());
        pairs.append_pair("page", &page.to_string());
        if let Some(rating) = filter.rating {
            pairs.append_pair("rating", rating.as_str());
        }
        for tag in filter.query_tags() {
            pairs.append_pair("tag", tag);
        }
        for author in filter.query_authors() {
            pairs.append_pair("author", author);
        }
        for site in filter.query_sites() {
            pairs.append_pair("site", site);
        }
    }

    Ok(url)
}
