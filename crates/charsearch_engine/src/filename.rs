use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 80;

/// Portable, deterministic download name: `{sanitized_stem}--{short_hash(url)}.{ext}`.
///
/// The extension comes from the content type, then the URL path, then `bin`.
pub fn image_filename(stem: &str, url: &str, content_type: Option<&str>) -> String {
    let sanitized = sanitize_stem(stem);
    let hash = short_hash(url);
    let ext = content_type
        .and_then(extension_for_content_type)
        .or_else(|| extension_from_url(url))
        .unwrap_or("bin");
    format!("{sanitized}--{hash}.{ext}")
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut cleaned = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "image".to_string();
    }
    if cleaned.len() > MAX_STEM_LEN {
        let mut end = MAX_STEM_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

fn extension_from_url(url: &str) -> Option<&'static str> {
    let path = url::Url::parse(url).ok()?.path().to_ascii_lowercase();
    let (_, ext) = path.rsplit_once('.')?;
    match ext {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "bmp" => Some("bmp"),
        _ => None,
    }
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::image_filename;

    #[test]
    fn content_type_wins_over_url_extension() {
        let name = image_filename("danbooru_42", "http://h/api/image/42.jpg", Some("image/png"));
        assert!(name.starts_with("danbooru_42--"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn url_extension_used_without_content_type() {
        let name = image_filename("gelbooru_7", "http://h/api/image/7.JPEG", None);
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn unknown_type_falls_back_to_bin() {
        let name = image_filename("x", "http://h/api/image/7", Some("application/octet-stream"));
        assert!(name.ends_with(".bin"));
    }

    #[test]
    fn forbidden_characters_are_collapsed() {
        let name = image_filename("site:/?id", "http://h/a.png", None);
        assert!(name.starts_with("site_id--"));
    }

    #[test]
    fn same_inputs_give_same_name() {
        let a = image_filename("s_1", "http://h/a.png", None);
        let b = image_filename("s_1", "http://h/a.png", None);
        let c = image_filename("s_1", "http://h/b.png", None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reserved_names_get_suffix() {
        let name = image_filename("con", "http://h/a.png", None);
        assert!(name.starts_with("con_--"));
    }
}
