//! Stable digests for text that cannot appear verbatim in a class name.

use std::fmt;

/// XXH3-128 digest of a piece of text, such as a raw selector condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes `text`.
    pub fn from_text(text: &str) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(text.as_bytes()))
    }

    /// The leading eight hex digits, used as a class-name prefix.
    pub fn short(&self) -> String {
        format!("{:08x}", self.0 >> 96)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_selector_same_prefix() {
        assert_eq!(
            ContentHash::from_text("& > span").short(),
            ContentHash::from_text("& > span").short()
        );
        assert_ne!(
            ContentHash::from_text("& > span"),
            ContentHash::from_text("& > div")
        );
    }

    #[test]
    fn short_is_display_prefix() {
        let h = ContentHash::from_text("@media print");
        let short = h.short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(h.to_string().starts_with(&short));
    }
}
