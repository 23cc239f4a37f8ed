use charsearch_core::{Rating, SearchFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollMove {
    Down,
    Up,
    Top,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SearchFilter),
    Scroll(ScrollMove),
    Retry,
    Save(usize),
    Show(usize),
    Characters,
    Status,
    Dismiss,
    Help,
    Quit,
}

/// Parse one line of user input. An empty line scrolls down.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match word.to_ascii_lowercase().as_str() {
        "" | "down" | "d" | "more" => Ok(Command::Scroll(ScrollMove::Down)),
        "up" | "u" => Ok(Command::Scroll(ScrollMove::Up)),
        "top" => Ok(Command::Scroll(ScrollMove::Top)),
        "end" => Ok(Command::Scroll(ScrollMove::End)),
        "search" | "s" => parse_search(rest).map(Command::Search),
        "retry" | "r" => Ok(Command::Retry),
        "save" => parse_card_number(rest, "save").map(Command::Save),
        "show" => parse_card_number(rest, "show").map(Command::Show),
        "characters" | "chars" => Ok(Command::Characters),
        "status" => Ok(Command::Status),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}` (try `help`)")),
    }
}

const SEARCH_USAGE: &str =
    "usage: search <character> [rating=<r>] [author=<a>]... [site=<s>]... [tags...]";

/// The first word is the character input; `rating=`, `author=` and `site=`
/// words fill those filters, everything else is the tags box.
fn parse_search(rest: &str) -> Result<SearchFilter, String> {
    let mut words = rest.split_whitespace();
    let character = words.next().ok_or_else(|| SEARCH_USAGE.to_string())?;

    let mut rating = None;
    let mut authors = Vec::new();
    let mut sites = Vec::new();
    let mut tags = Vec::new();
    for word in words {
        if let Some(value) = word.strip_prefix("rating=") {
            rating = Some(value.parse::<Rating>().map_err(|err| err.to_string())?);
        } else if let Some(value) = word.strip_prefix("author=") {
            authors.push(value);
        } else if let Some(value) = word.strip_prefix("site=") {
            sites.push(value);
        } else {
            tags.push(word);
        }
    }
    Ok(SearchFilter::from_inputs(character, rating, &tags.join(" "))
        .with_authors(authors)
        .with_sites(sites))
}

fn parse_card_number(rest: &str, command: &str) -> Result<usize, String> {
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("usage: {command} <card number>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_line_scrolls_down() {
        assert_eq!(parse_command("   "), Ok(Command::Scroll(ScrollMove::Down)));
    }

    #[test]
    fn search_reads_character_rating_and_tags() {
        let command = parse_command("search monika rating=e smile  outdoors").unwrap();
        assert_eq!(
            command,
            Command::Search(
                SearchFilter::new("monika")
                    .with_tags(["smile", "outdoors"])
                    .with_rating(Rating::Explicit)
            )
        );
    }

    #[test]
    fn search_reads_author_and_site_words() {
        let command = parse_command("search monika author=dan site=danbooru smile").unwrap();
        let Command::Search(filter) = command else {
            panic!("expected a search, got {command:?}");
        };
        assert_eq!(filter.authors, vec!["dan".to_string()]);
        assert_eq!(filter.sites, vec!["danbooru".to_string()]);
        assert_eq!(filter.tags, vec!["smile".to_string()]);
    }

    #[test]
    fn blank_author_is_dropped_from_query() {
        let Ok(Command::Search(filter)) = parse_command("search yuri author= site=gelbooru") else {
            panic!("expected a search");
        };
        assert_eq!(filter.query_authors().count(), 0);
        assert_eq!(filter.query_sites().collect::<Vec<_>>(), vec!["gelbooru"]);
    }

    #[test]
    fn search_without_character_is_rejected() {
        assert!(parse_command("search").is_err());
    }

    #[test]
    fn bad_rating_is_rejected() {
        let err = parse_command("search yuri rating=spicy").unwrap_err();
        assert!(err.contains("spicy"));
    }

    #[test]
    fn save_needs_positive_number() {
        assert_eq!(parse_command("save 3"), Ok(Command::Save(3)));
        assert!(parse_command("save 0").is_err());
        assert!(parse_command("save x").is_err());
        assert_eq!(parse_command("show 2"), Ok(Command::Show(2)));
        assert!(parse_command("show").unwrap_err().starts_with("usage: show"));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(parse_command("frobnicate").unwrap_err().contains("frobnicate"));
    }
}
