use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A learner's submission for one exercise.
///
/// The shape mirrors the exercise kind it answers:
/// - `Choice`: single-select
/// - `Choices`: multiple-select (order and duplicates are irrelevant)
/// - `Sequence`: construct (order matters)
/// - `Pairs`: match-pairs, as `(left, right)` tuples
/// - `Placements`: sort-boxes, category to the items dropped into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    Choice(String),
    Choices(Vec<String>),
    Sequence(Vec<String>),
    Pairs(Vec<(String, String)>),
    Placements(BTreeMap<String, Vec<String>>),
}

impl Answer {
    #[must_use]
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    #[must_use]
    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn sequence<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn pairs<I, L, R>(values: I) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: Into<String>,
    {
        Self::Pairs(
            values
                .into_iter()
                .map(|(l, r)| (l.into(), r.into()))
                .collect(),
        )
    }

    #[must_use]
    pub fn placements<I, C, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<S>)>,
        C: Into<String>,
        S: Into<String>,
    {
        Self::Placements(
            values
                .into_iter()
                .map(|(c, items)| (c.into(), items.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Whether the learner has actually provided something to grade.
    ///
    /// Blank choices and empty collections do not count; submit stays
    /// disabled for them.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Answer::Choice(value) => !value.trim().is_empty(),
            Answer::Choices(values) | Answer::Sequence(values) => !values.is_empty(),
            Answer::Pairs(pairs) => !pairs.is_empty(),
            Answer::Placements(map) => map.values().any(|items| !items.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answers_are_not_present() {
        assert!(!Answer::choice("").is_present());
        assert!(!Answer::Choices(Vec::new()).is_present());
        assert!(!Answer::Sequence(Vec::new()).is_present());
        assert!(!Answer::Pairs(Vec::new()).is_present());
        assert!(!Answer::placements([("Final", Vec::<String>::new())]).is_present());
    }

    #[test]
    fn filled_answers_are_present() {
        assert!(Answer::choice("ב (Bet)").is_present());
        assert!(Answer::choices(["א"]).is_present());
        assert!(Answer::pairs([("א", "Alef")]).is_present());
        assert!(Answer::placements([("Final", vec!["ם"])]).is_present());
    }

    #[test]
    fn answer_json_is_tagged_by_kind() {
        let json = serde_json::to_string(&Answer::sequence(["ש", "ל"])).unwrap();
        assert_eq!(json, r#"{"kind":"sequence","value":["ש","ל"]}"#);
    }
}
