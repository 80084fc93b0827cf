use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &str;
}

/// Standard Unicode tokenizer: lowercase word segmentation, empty and
/// oversized tokens discarded. Indexing and query-side lookups share one
/// instance so the same text always produces the same tokens.
#[derive(Debug, Clone)]
pub struct StandardTokenizer {
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .unicode_words()
            .filter(|word| !word.is_empty() && word.len() <= self.max_token_length)
            .map(String::from)
            .collect()
    }

    fn name(&self) -> &str {
        "standard"
    }
}

/// Normalization applied to authors, tags, and query keys before they touch
/// an index or a cache. Lookups and indexing must agree on this, otherwise
/// case or whitespace variance produces false misses.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
