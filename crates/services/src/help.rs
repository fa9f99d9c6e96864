use std::collections::HashMap;

use lesson_core::model::{HelpEntry, HelpKey, HelpTopic};
use tracing::debug;

/// Keyed help dialog content with a catch-all entry.
///
/// Lookups never fail: an exercise without a help key, or with a key that has
/// no topic, gets the fallback entry.
#[derive(Debug, Clone)]
pub struct HelpCatalog {
    topics: HashMap<HelpKey, HelpEntry>,
    fallback: HelpEntry,
}

impl Default for HelpCatalog {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl HelpCatalog {
    #[must_use]
    pub fn new(topics: Vec<HelpTopic>, fallback: Option<HelpEntry>) -> Self {
        let topics = topics
            .into_iter()
            .map(|topic| (topic.key, topic.entry))
            .collect();
        Self {
            topics,
            fallback: fallback.unwrap_or_else(generic_entry),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &HelpKey) -> bool {
        self.topics.contains_key(key)
    }

    #[must_use]
    pub fn fallback(&self) -> &HelpEntry {
        &self.fallback
    }

    #[must_use]
    pub fn lookup(&self, key: Option<&HelpKey>) -> &HelpEntry {
        match key.and_then(|k| self.topics.get(k)) {
            Some(entry) => entry,
            None => {
                debug!(key = ?key.map(HelpKey::as_str), "help topic missing, using fallback");
                &self.fallback
            }
        }
    }
}

fn generic_entry() -> HelpEntry {
    HelpEntry {
        theory: "Hebrew is read from right to left. Look closely at each letter's shape and \
                 sound, then try again."
            .to_owned(),
        examples: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(key: &str, theory: &str) -> HelpTopic {
        HelpTopic {
            key: HelpKey::new(key),
            entry: HelpEntry {
                theory: theory.to_owned(),
                examples: Vec::new(),
            },
        }
    }

    #[test]
    fn known_key_returns_its_topic() {
        let catalog = HelpCatalog::new(vec![topic("final-forms", "Five letters change")], None);
        let entry = catalog.lookup(Some(&HelpKey::new("final-forms")));
        assert_eq!(entry.theory, "Five letters change");
    }

    #[test]
    fn unknown_or_missing_key_uses_fallback() {
        let fallback = HelpEntry {
            theory: "Default".into(),
            examples: vec!["שָׁלוֹם".into()],
        };
        let catalog = HelpCatalog::new(vec![topic("a", "A")], Some(fallback.clone()));
        assert_eq!(catalog.lookup(Some(&HelpKey::new("single-select-hebrew-sounds"))), &fallback);
        assert_eq!(catalog.lookup(None), &fallback);
    }

    #[test]
    fn empty_catalog_still_answers() {
        let catalog = HelpCatalog::default();
        assert!(!catalog.lookup(None).theory.is_empty());
    }
}
