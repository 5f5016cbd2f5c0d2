use wordcount_core::CoreError;

/// Lower-cased search text. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle(String);

impl Needle {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "search text must not be empty".to_string(),
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-overlapping, case-insensitive occurrences in `text`.
    pub fn count_in(&self, text: &str) -> u64 {
        count_occurrences(text, &self.0)
    }
}

impl std::fmt::Display for Needle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counts non-overlapping occurrences of `needle` in `text`, ignoring case.
/// An empty needle matches nothing.
pub fn count_occurrences(text: &str, needle: &str) -> u64 {
    if needle.is_empty() || text.is_empty() {
        return 0;
    }
    let needle = needle.to_lowercase();
    text.to_lowercase().matches(needle.as_str()).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_count() {
        let needle = Needle::new("hello").unwrap();
        assert_eq!(needle.count_in("Hello HELLO hello"), 3);
    }

    #[test]
    fn test_needle_is_trimmed_and_lowered() {
        let needle = Needle::new("  Cat ").unwrap();
        assert_eq!(needle.as_str(), "cat");
        assert_eq!(needle.count_in("CAT cat Cat"), 3);
    }

    #[test]
    fn test_counts_are_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("ababab", "aba"), 1);
    }

    #[test]
    fn test_substring_matches_inside_words() {
        assert_eq!(count_occurrences("concatenate the cat", "cat"), 2);
    }

    #[test]
    fn test_empty_needle_matches_nothing() {
        assert_eq!(count_occurrences("anything at all", ""), 0);
        assert!(matches!(
            Needle::new("   "),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_multi_word_needle() {
        let needle = Needle::new("Good Bot").unwrap();
        assert_eq!(needle.count_in("good bot! GOOD BOT. goodbot"), 2);
    }
}
