pub const PROMPT: &str = "charsearch> ";

/// Terminal rows a rendered card occupies.
pub const CARD_ROWS: u32 = 1;

pub const HELP_TEXT: &str = "\
Commands:
  search <character> [rating=safe|questionable|explicit]
         [author=<name>]... [site=<site>]... [tag ...]
                        start a new search (tags are whitespace separated)
  down | <enter>        scroll down; loads the next page at the bottom
  up | top | end        move the viewport
  retry                 retry a page that failed to load
  save <n>              download the image of card n
  show <n>              rating, source and tags of card n
  characters            list indexed characters
  status                redraw the current view
  dismiss               clear the status message
  help                  show this text
  quit                  exit";
