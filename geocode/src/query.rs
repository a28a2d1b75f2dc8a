//! Query text and its case-insensitive cache key.

/// Lowercases `text` into the key used by the geocode cache.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// A caller-supplied address with its normalized key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    text: String,
    key: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let key = normalize(&text);
        Self { text, key }
    }

    /// Original casing, stamped onto results.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}
