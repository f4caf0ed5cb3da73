use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Number of key characters kept visible when an API key is redacted.
const VISIBLE_KEY_CHARS: usize = 8;

/// Agent API keys: `ra_` followed by URL-safe base64.
fn api_key_regex() -> &'static Regex {
    static API_KEY: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\bra_[A-Za-z0-9_-]{16,}").unwrap()
    });
    &API_KEY
}

/// Bearer credentials in raw header dumps.
fn bearer_regex() -> &'static Regex {
    static BEARER: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"(?i)\bbearer\s+\S+").unwrap()
    });
    &BEARER
}

/// Long hex runs (stored key hashes).
fn hex_token_regex() -> &'static Regex {
    static HEX_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Fa-f0-9]{32,}\b").unwrap()
    });
    &HEX_TOKEN
}

/// Masks credentials in free text before it reaches a log line.
///
/// API keys keep their public prefix (the part already shown to the
/// agent at registration) so operators can still correlate them.
pub fn redact(input: &str) -> String {
    let bearer = bearer_regex().replace_all(input, "Bearer [REDACTED]");
    let keys = api_key_regex().replace_all(&bearer, |caps: &regex::Captures| {
        let key = &caps[0];
        let visible: String = key.chars().take(VISIBLE_KEY_CHARS).collect();
        format!("{visible}…[REDACTED]")
    });
    hex_token_regex()
        .replace_all(&keys, "[REDACTED_TOKEN]")
        .into_owned()
}

/// A wrapper that redacts credentials when displayed.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
