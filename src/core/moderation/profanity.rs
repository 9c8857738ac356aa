// Profanity matching - case-insensitive substring containment against a
// word list loaded once at startup.
//
// The matching is deliberately crude: a list entry matches if it appears
// anywhere inside the lower-cased message, including inside longer tokens
// ("ass" matches "passenger"). This mirrors what the bots have always done;
// tokenized matching would change moderation behavior for existing groups.

use super::moderation_models::ModerationError;
use serde::Deserialize;
use std::path::Path;

/// On-disk format: `{"words": ["...", ...]}`.
#[derive(Debug, Deserialize)]
struct ProfanityFile {
    words: Vec<String>,
}

/// An immutable set of lowercase words/phrases checked against every message.
#[derive(Debug, Clone)]
pub struct ProfanityList {
    words: Vec<String>,
}

impl ProfanityList {
    /// Build a list from raw entries. Entries are lower-cased so the
    /// substring test only has to normalize the message side.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load the list from a JSON file.
    ///
    /// A missing or malformed file is a hard error: silently moderating
    /// with an empty list would look like the bot is working while it
    /// filters nothing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModerationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| {
            ModerationError::ListUnreadable {
                path: path.display().to_string(),
                source,
            }
        })?;
        let file: ProfanityFile =
            serde_json::from_str(&raw).map_err(|source| ModerationError::ListMalformed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self::from_words(file.words))
    }

    /// True iff any list entry is a substring of the lower-cased message.
    /// An empty list never matches.
    pub fn contains_profanity(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.words.iter().any(|word| lowered.contains(word.as_str()))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn matches_case_insensitively() {
        let list = ProfanityList::from_words(["damn"]);
        assert!(list.contains_profanity("DAMN it"));
        assert!(list.contains_profanity("well... Damn."));
        assert!(!list.contains_profanity("perfectly fine message"));
    }

    #[test]
    fn matches_inside_longer_tokens() {
        // Crude containment is intended behavior: "ass" inside "passenger".
        let list = ProfanityList::from_words(["ass"]);
        assert!(list.contains_profanity("the passenger boarded"));
    }

    #[test]
    fn mixed_case_list_entries_are_normalized() {
        let list = ProfanityList::from_words(["DaMn"]);
        assert!(list.contains_profanity("damn"));
    }

    #[test]
    fn empty_list_never_matches() {
        let list = ProfanityList::from_words(Vec::<String>::new());
        assert!(!list.contains_profanity("anything at all"));
        assert!(!list.contains_profanity(""));
    }

    #[test]
    fn empty_message_does_not_match() {
        let list = ProfanityList::from_words(["damn"]);
        assert!(!list.contains_profanity(""));
    }

    #[test]
    fn loads_words_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"words": ["damn", "crap"]}}"#).unwrap();

        let list = ProfanityList::load(file.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains_profanity("oh CRAP"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ProfanityList::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ModerationError::ListUnreadable { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ProfanityList::load(file.path()).unwrap_err();
        assert!(matches!(err, ModerationError::ListMalformed { .. }));
    }
}
