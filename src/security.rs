use std::sync::OnceLock;

use regex::Regex;

const MAX_FILENAME_LEN: usize = 255;
const FALLBACK_FILENAME: &str = "image";

fn unsafe_chars() -> &'static Regex {
    static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();
    UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("static filename regex is valid")
    })
}

/// Make a file name safe to send as a multipart `filename`
///
/// Path separators, quotes and control characters are replaced with `_`.
/// The result is never empty and is cut to 255 bytes on a char boundary.
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized = unsafe_chars().replace_all(filename.trim(), "_");

    if sanitized.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    if sanitized.len() > MAX_FILENAME_LEN {
        let mut end = MAX_FILENAME_LEN - 3;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &sanitized[..end])
    } else {
        sanitized.to_string()
    }
}
