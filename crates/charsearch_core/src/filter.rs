use std::fmt;
use std::str::FromStr;

/// Content rating assigned by the indexer to every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rating {
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Safe, Rating::Questionable, Rating::Explicit];

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rating {0:?} (expected safe, questionable or explicit)")]
pub struct ParseRatingError(pub String);

impl FromStr for Rating {
    type Err = ParseRatingError;

    /// Accepts the full names and the single-letter booru shorthands.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "safe" | "s" => Ok(Rating::Safe),
            "questionable" | "q" => Ok(Rating::Questionable),
            "explicit" | "e" => Ok(Rating::Explicit),
            _ => Err(ParseRatingError(raw.to_string())),
        }
    }
}

/// Filter inputs for one search. Replaced wholesale when a new search starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilter {
    pub character: String,
    pub tags: Vec<String>,
    pub rating: Option<Rating>,
    pub authors: Vec<String>,
    pub sites: Vec<String>,
}

impl SearchFilter {
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sites<I, S>(mut self, sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sites = sites.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a filter from raw form inputs: a character name box, an
    /// optional rating choice and a whitespace-delimited tags box.
    pub fn from_inputs(character: &str, rating: Option<Rating>, tags_text: &str) -> Self {
        Self {
            character: character.trim().to_string(),
            tags: tags_text.split_whitespace().map(ToOwned::to_owned).collect(),
            rating,
            ..Self::default()
        }
    }

    pub fn has_character(&self) -> bool {
        !self.character.trim().is_empty()
    }

    /// Tags as sent to the API: trimmed, blanks dropped, original order kept.
    pub fn query_tags(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.tags)
    }

    pub fn query_authors(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.authors)
    }

    pub fn query_sites(&self) -> impl Iterator<Item = &str> {
        non_blank(&self.sites)
    }
}

fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Rating, SearchFilter};

    #[test]
    fn rating_parses_names_and_shorthands() {
        assert_eq!("explicit".parse::<Rating>(), Ok(Rating::Explicit));
        assert_eq!(" Q ".parse::<Rating>(), Ok(Rating::Questionable));
        assert_eq!("s".parse::<Rating>(), Ok(Rating::Safe));
        assert!("nsfw".parse::<Rating>().is_err());
    }

    #[test]
    fn from_inputs_splits_tags_on_whitespace() {
        let filter = SearchFilter::from_inputs("  monika ", None, " smile\t outdoors \n");
        assert_eq!(filter.character, "monika");
        assert_eq!(filter.tags, vec!["smile", "outdoors"]);
        assert!(filter.has_character());
    }

    #[test]
    fn query_tags_drop_blank_entries() {
        let filter = SearchFilter::new("sayori").with_tags(["", "  ", " bow ", "ribbon"]);
        let tags: Vec<_> = filter.query_tags().collect();
        assert_eq!(tags, vec!["bow", "ribbon"]);
    }

    #[test]
    fn whitespace_character_is_not_searchable() {
        assert!(!SearchFilter::new("   ").has_character());
    }
}
