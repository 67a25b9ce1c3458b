//! Snippet redaction for evidence excerpts.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").ok());

static SECRET: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(password|passwd|secret|token|api[_-]?key)\s*[=:]\s*\S+").ok()
});

static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

fn replace(re: &LazyLock<Option<Regex>>, text: String, with: &str) -> String {
    match &**re {
        Some(re) => re.replace_all(&text, with).into_owned(),
        None => text,
    }
}

/// Lossy-decode, collapse whitespace, mask e-mail addresses and
/// `key=value` secrets, and cut to `max_chars` characters.
pub fn snippet(bytes: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    let text = replace(&WHITESPACE, text, " ");
    let text = replace(&EMAIL, text, "[email]");
    let text = replace(&SECRET, text, "$1=[redacted]");

    if text.chars().count() <= max_chars {
        return text;
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_emails_and_secrets() {
        let s = snippet(b"mail bob@example.com\n\tpassword = hunter2 ok", 200);
        assert_eq!(s, "mail [email] password=[redacted] ok");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let s = snippet("héllo wörld".as_bytes(), 8);
        assert_eq!(s, "héllo...");
        assert_eq!(s.chars().count(), 8);
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let s = snippet(&[b'a', 0xff, b'b'], 10);
        assert_eq!(s, "a\u{fffd}b");
    }
}
