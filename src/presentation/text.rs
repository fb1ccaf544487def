//! Text helpers for terminal output.

/// Shortens inline data URIs to `max_chars` characters plus their byte size.
///
/// Network URLs are returned unchanged. The cut always lands on a
/// character boundary.
#[must_use]
pub fn preview_url(url: &str, max_chars: usize) -> String {
    if !url.starts_with("data:") {
        return url.to_string();
    }
    match url.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}... ({} bytes)", &url[..cut], url.len()),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_urls_untouched() {
        let url = format!("https://img.example.org/{}.jpg", "a".repeat(200));
        assert_eq!(preview_url(&url, 10), url);
    }

    #[test]
    fn test_short_data_uri_untouched() {
        assert_eq!(preview_url("data:image/png;base64,AA==", 72), "data:image/png;base64,AA==");
    }

    #[test]
    fn test_long_data_uri_truncated() {
        let url = format!("data:image/svg+xml;base64,{}", "A".repeat(100));
        let preview = preview_url(&url, 20);
        assert_eq!(preview, format!("data:image/svg+xml;b... ({} bytes)", url.len()));
    }

    #[test]
    fn test_multibyte_text_cut_on_char_boundary() {
        let url = format!("data:image/svg+xml,<svg>x{}", "é".repeat(60));
        let preview = preview_url(&url, 72);

        let kept = preview.split("... (").next().unwrap();
        assert_eq!(kept.chars().count(), 72);
        assert!(kept.ends_with('é'));
        assert!(preview.ends_with(&format!("({} bytes)", url.len())));
    }
}
