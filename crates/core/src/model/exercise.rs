use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ExerciseId, HelpKey};

/// Message shown for a correct answer when the exercise does not define one.
pub const DEFAULT_CORRECT_MESSAGE: &str = "Correct! Well done!";
/// Message shown for an incorrect answer when the exercise does not define one.
pub const DEFAULT_INCORRECT_MESSAGE: &str = "Try again!";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Raised when an exercise definition cannot be graded reliably.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise id cannot be empty")]
    EmptyId,

    #[error("exercise {id}: question cannot be empty")]
    EmptyQuestion { id: String },

    #[error("exercise {id}: unsupported exercise type `{kind}`")]
    UnsupportedType { id: String, kind: String },

    #[error("exercise {id}: missing field `{field}` for {kind}")]
    MissingField {
        id: String,
        kind: ExerciseKind,
        field: &'static str,
    },

    #[error("exercise {id}: invalid definition: {reason}")]
    InvalidDefinition { id: String, reason: String },
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Discriminant of the five supported exercise shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    SingleSelect,
    MultipleSelect,
    Construct,
    MatchPairs,
    SortBoxes,
}

impl ExerciseKind {
    /// Wire tag used in curriculum bundles.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::SingleSelect => "single-select",
            ExerciseKind::MultipleSelect => "multiple-select",
            ExerciseKind::Construct => "construct",
            ExerciseKind::MatchPairs => "match-pairs",
            ExerciseKind::SortBoxes => "sort-boxes",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire tag names no known exercise kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for ExerciseKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single-select" => Ok(Self::SingleSelect),
            "multiple-select" => Ok(Self::MultipleSelect),
            "construct" => Ok(Self::Construct),
            "match-pairs" => Ok(Self::MatchPairs),
            "sort-boxes" => Ok(Self::SortBoxes),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

//
// ─── BODY ──────────────────────────────────────────────────────────────────────
//

/// Learner-facing feedback strings attached to an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub correct: String,
    pub incorrect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// A left/right pair for match-pairs exercises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub left: String,
    pub right: String,
}

impl Pair {
    #[must_use]
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Variant-specific content and answer key of an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseBody {
    SingleSelect {
        options: Vec<String>,
        correct_answer: String,
    },
    MultipleSelect {
        options: Vec<String>,
        correct_answers: Vec<String>,
    },
    Construct {
        available_blocks: Vec<String>,
        correct_sequence: Vec<String>,
    },
    MatchPairs {
        pairs: Vec<Pair>,
    },
    SortBoxes {
        items: Vec<String>,
        categories: Vec<String>,
        correct_placements: BTreeMap<String, Vec<String>>,
    },
}

impl ExerciseBody {
    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExerciseBody::SingleSelect { .. } => ExerciseKind::SingleSelect,
            ExerciseBody::MultipleSelect { .. } => ExerciseKind::MultipleSelect,
            ExerciseBody::Construct { .. } => ExerciseKind::Construct,
            ExerciseBody::MatchPairs { .. } => ExerciseKind::MatchPairs,
            ExerciseBody::SortBoxes { .. } => ExerciseKind::SortBoxes,
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            ExerciseBody::SingleSelect {
                options,
                correct_answer,
            } => {
                require_non_empty(options, "options")?;
                require_unique(options, "option")?;
                if !options.contains(correct_answer) {
                    return Err(format!("correct answer `{correct_answer}` is not an option"));
                }
                Ok(())
            }
            ExerciseBody::MultipleSelect {
                options,
                correct_answers,
            } => {
                require_non_empty(options, "options")?;
                require_unique(options, "option")?;
                require_non_empty(correct_answers, "correct answers")?;
                require_unique(correct_answers, "correct answer")?;
                if let Some(stray) = correct_answers.iter().find(|a| !options.contains(*a)) {
                    return Err(format!("correct answer `{stray}` is not an option"));
                }
                Ok(())
            }
            ExerciseBody::Construct {
                available_blocks,
                correct_sequence,
            } => {
                require_non_empty(available_blocks, "available blocks")?;
                require_non_empty(correct_sequence, "correct sequence")?;
                let mut stock: HashMap<&str, usize> = HashMap::new();
                for block in available_blocks {
                    *stock.entry(block.as_str()).or_default() += 1;
                }
                for block in correct_sequence {
                    match stock.get_mut(block.as_str()) {
                        Some(left) if *left > 0 => *left -= 1,
                        _ => {
                            return Err(format!(
                                "sequence uses block `{block}` more often than it is available"
                            ));
                        }
                    }
                }
                Ok(())
            }
            ExerciseBody::MatchPairs { pairs } => {
                require_non_empty(pairs, "pairs")?;
                let lefts: Vec<&String> = pairs.iter().map(|p| &p.left).collect();
                let rights: Vec<&String> = pairs.iter().map(|p| &p.right).collect();
                require_unique(&lefts, "left value")?;
                require_unique(&rights, "right value")?;
                Ok(())
            }
            ExerciseBody::SortBoxes {
                items,
                categories,
                correct_placements,
            } => {
                require_non_empty(items, "items")?;
                require_non_empty(categories, "categories")?;
                require_unique(items, "item")?;
                require_unique(categories, "category")?;
                if let Some(stray) = correct_placements
                    .keys()
                    .find(|category| !categories.contains(*category))
                {
                    return Err(format!("placement category `{stray}` is not declared"));
                }
                let mut seen: BTreeSet<&str> = BTreeSet::new();
                for placed in correct_placements.values().flatten() {
                    if !items.contains(placed) {
                        return Err(format!("placed item `{placed}` is not in the item list"));
                    }
                    if !seen.insert(placed.as_str()) {
                        return Err(format!("item `{placed}` is placed in more than one category"));
                    }
                }
                if let Some(orphan) = items.iter().find(|item| !seen.contains(item.as_str())) {
                    return Err(format!("item `{orphan}` has no category"));
                }
                Ok(())
            }
        }
    }
}

fn require_non_empty<T>(values: &[T], what: &str) -> Result<(), String> {
    if values.is_empty() {
        return Err(format!("{what} cannot be empty"));
    }
    Ok(())
}

fn require_unique<T: AsRef<str>>(values: &[T], what: &str) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    for value in values {
        if !seen.insert(value.as_ref()) {
            return Err(format!("duplicate {what} `{}`", value.as_ref()));
        }
    }
    Ok(())
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// One gradable question of a skill.
///
/// Always constructed through [`Exercise::new`] or [`ExerciseDraft::validate`],
/// so the answer key is consistent with the presented content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    id: ExerciseId,
    question: String,
    help_key: Option<HelpKey>,
    feedback: Option<Feedback>,
    body: ExerciseBody,
}

impl Exercise {
    /// Build a validated exercise.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError` if the id/question are blank or the body breaks
    /// its variant invariants.
    pub fn new(
        id: ExerciseId,
        question: impl Into<String>,
        body: ExerciseBody,
    ) -> Result<Self, ExerciseError> {
        let question = question.into().trim().to_owned();
        if id.as_str().trim().is_empty() {
            return Err(ExerciseError::EmptyId);
        }
        if question.is_empty() {
            return Err(ExerciseError::EmptyQuestion {
                id: id.to_string(),
            });
        }
        body.check()
            .map_err(|reason| ExerciseError::InvalidDefinition {
                id: id.to_string(),
                reason,
            })?;

        Ok(Self {
            id,
            question,
            help_key: None,
            feedback: None,
            body,
        })
    }

    #[must_use]
    pub fn with_help_key(mut self, key: HelpKey) -> Self {
        self.help_key = Some(key);
        self
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn help_key(&self) -> Option<&HelpKey> {
        self.help_key.as_ref()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn body(&self) -> &ExerciseBody {
        &self.body
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.body.kind()
    }

    /// Message to show after grading, falling back to the generic strings.
    #[must_use]
    pub fn feedback_message(&self, correct: bool) -> &str {
        match (&self.feedback, correct) {
            (Some(fb), true) => &fb.correct,
            (Some(fb), false) => &fb.incorrect,
            (None, true) => DEFAULT_CORRECT_MESSAGE,
            (None, false) => DEFAULT_INCORRECT_MESSAGE,
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Loose wire shape of an exercise as found in curriculum bundles.
///
/// Every variant-specific field is optional here; [`ExerciseDraft::validate`]
/// picks the ones the `type` tag requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_content_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_blocks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_sequence: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<Pair>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_placements: Option<BTreeMap<String, Vec<String>>>,
}

impl ExerciseDraft {
    /// Validate the draft into an [`Exercise`].
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::UnsupportedType` for an unknown `type` tag,
    /// `ExerciseError::MissingField` when a required variant field is absent,
    /// and any error of [`Exercise::new`].
    pub fn validate(self) -> Result<Exercise, ExerciseError> {
        let id = self.id.trim().to_owned();
        if id.is_empty() {
            return Err(ExerciseError::EmptyId);
        }
        let kind = ExerciseKind::from_str(&self.kind).map_err(|UnknownKind(kind)| {
            ExerciseError::UnsupportedType {
                id: id.clone(),
                kind,
            }
        })?;
        let missing = |field: &'static str| ExerciseError::MissingField {
            id: id.clone(),
            kind,
            field,
        };

        let body = match kind {
            ExerciseKind::SingleSelect => ExerciseBody::SingleSelect {
                options: self.options.ok_or_else(|| missing("options"))?,
                correct_answer: self.correct_answer.ok_or_else(|| missing("correctAnswer"))?,
            },
            ExerciseKind::MultipleSelect => ExerciseBody::MultipleSelect {
                options: self.options.ok_or_else(|| missing("options"))?,
                correct_answers: self
                    .correct_answers
                    .ok_or_else(|| missing("correctAnswers"))?,
            },
            ExerciseKind::Construct => ExerciseBody::Construct {
                available_blocks: self
                    .available_blocks
                    .ok_or_else(|| missing("availableBlocks"))?,
                correct_sequence: self
                    .correct_sequence
                    .ok_or_else(|| missing("correctSequence"))?,
            },
            ExerciseKind::MatchPairs => ExerciseBody::MatchPairs {
                pairs: self.pairs.ok_or_else(|| missing("pairs"))?,
            },
            ExerciseKind::SortBoxes => ExerciseBody::SortBoxes {
                items: self.items.ok_or_else(|| missing("items"))?,
                categories: self.categories.ok_or_else(|| missing("categories"))?,
                correct_placements: self
                    .correct_placements
                    .ok_or_else(|| missing("correctPlacements"))?,
            },
        };

        let mut exercise = Exercise::new(ExerciseId::new(id), self.question, body)?;
        if let Some(key) = self.help_content_key.filter(|k| !k.trim().is_empty()) {
            exercise = exercise.with_help_key(HelpKey::new(key.trim()));
        }
        if let Some(feedback) = self.feedback {
            exercise = exercise.with_feedback(feedback);
        }
        Ok(exercise)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    fn single_select_draft() -> ExerciseDraft {
        ExerciseDraft {
            id: "1".into(),
            kind: "single-select".into(),
            question: "Which letter makes a \"b\" sound?".into(),
            help_content_key: Some("hebrew-sounds".into()),
            options: Some(strings(&["א (Alef)", "ב (Bet)", "ג (Gimel)"])),
            correct_answer: Some("ב (Bet)".into()),
            ..ExerciseDraft::default()
        }
    }

    #[test]
    fn draft_validates_into_exercise() {
        let exercise = single_select_draft().validate().unwrap();
        assert_eq!(exercise.id().as_str(), "1");
        assert_eq!(exercise.kind(), ExerciseKind::SingleSelect);
        assert_eq!(exercise.help_key(), Some(&HelpKey::new("hebrew-sounds")));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let draft = ExerciseDraft {
            kind: "fill-in-the-blank".into(),
            ..single_select_draft()
        };
        let err = draft.validate().unwrap_err();
        assert!(matches!(
            err,
            ExerciseError::UnsupportedType { ref kind, .. } if kind == "fill-in-the-blank"
        ));
    }

    #[test]
    fn missing_answer_key_is_reported() {
        let draft = ExerciseDraft {
            correct_answer: None,
            ..single_select_draft()
        };
        let err = draft.validate().unwrap_err();
        assert!(matches!(
            err,
            ExerciseError::MissingField {
                field: "correctAnswer",
                ..
            }
        ));
    }

    #[test]
    fn single_select_answer_must_be_an_option() {
        let draft = ExerciseDraft {
            correct_answer: Some("ד (Dalet)".into()),
            ..single_select_draft()
        };
        assert!(matches!(
            draft.validate().unwrap_err(),
            ExerciseError::InvalidDefinition { .. }
        ));
    }

    #[test]
    fn blank_question_is_rejected() {
        let draft = ExerciseDraft {
            question: "  ".into(),
            ..single_select_draft()
        };
        assert!(matches!(
            draft.validate().unwrap_err(),
            ExerciseError::EmptyQuestion { .. }
        ));
    }

    #[test]
    fn multiple_select_answers_must_be_subset() {
        let body = ExerciseBody::MultipleSelect {
            options: strings(&["א", "ב"]),
            correct_answers: strings(&["א", "ג"]),
        };
        assert!(Exercise::new(ExerciseId::new("m"), "Pick", body).is_err());
    }

    #[test]
    fn construct_sequence_may_use_a_subset_of_blocks() {
        let body = ExerciseBody::Construct {
            available_blocks: strings(&["ם", "ו", "ל", "ש", "א"]),
            correct_sequence: strings(&["ש", "ל", "ו", "ם"]),
        };
        assert!(Exercise::new(ExerciseId::new("c"), "Spell", body).is_ok());
    }

    #[test]
    fn construct_sequence_cannot_reuse_blocks() {
        let body = ExerciseBody::Construct {
            available_blocks: strings(&["ל", "ו"]),
            correct_sequence: strings(&["ל", "ל"]),
        };
        assert!(Exercise::new(ExerciseId::new("c"), "Spell", body).is_err());
    }

    #[test]
    fn match_pairs_reject_duplicate_sides() {
        let body = ExerciseBody::MatchPairs {
            pairs: vec![Pair::new("א", "Alef"), Pair::new("א", "Bet")],
        };
        assert!(Exercise::new(ExerciseId::new("p"), "Match", body).is_err());

        let body = ExerciseBody::MatchPairs {
            pairs: vec![Pair::new("א", "Alef"), Pair::new("ב", "Alef")],
        };
        assert!(Exercise::new(ExerciseId::new("p"), "Match", body).is_err());
    }

    #[test]
    fn sort_boxes_require_every_item_in_exactly_one_category() {
        let mut placements = BTreeMap::new();
        placements.insert("Regular".to_owned(), strings(&["מ"]));
        placements.insert("Final".to_owned(), strings(&["ם"]));
        let valid = ExerciseBody::SortBoxes {
            items: strings(&["מ", "ם"]),
            categories: strings(&["Regular", "Final"]),
            correct_placements: placements.clone(),
        };
        assert!(Exercise::new(ExerciseId::new("s"), "Sort", valid).is_ok());

        let orphan = ExerciseBody::SortBoxes {
            items: strings(&["מ", "ם", "נ"]),
            categories: strings(&["Regular", "Final"]),
            correct_placements: placements.clone(),
        };
        assert!(Exercise::new(ExerciseId::new("s"), "Sort", orphan).is_err());

        let mut twice = placements;
        twice.insert("Final".to_owned(), strings(&["ם", "מ"]));
        let doubled = ExerciseBody::SortBoxes {
            items: strings(&["מ", "ם"]),
            categories: strings(&["Regular", "Final"]),
            correct_placements: twice,
        };
        assert!(Exercise::new(ExerciseId::new("s"), "Sort", doubled).is_err());
    }

    #[test]
    fn feedback_message_falls_back_to_defaults() {
        let plain = single_select_draft().validate().unwrap();
        assert_eq!(plain.feedback_message(true), DEFAULT_CORRECT_MESSAGE);
        assert_eq!(plain.feedback_message(false), DEFAULT_INCORRECT_MESSAGE);

        let custom = plain.with_feedback(Feedback {
            correct: "Yes".into(),
            incorrect: "No".into(),
            hint: None,
        });
        assert_eq!(custom.feedback_message(true), "Yes");
        assert_eq!(custom.feedback_message(false), "No");
    }

    #[test]
    fn draft_parses_from_camel_case_json() {
        let json = r#"{
            "id": "4",
            "type": "construct",
            "helpContentKey": "word-construction",
            "question": "Arrange these letters to spell \"shalom\":",
            "availableBlocks": ["ם", "ו", "ל", "ש"],
            "correctSequence": ["ש", "ל", "ו", "ם"]
        }"#;
        let draft: ExerciseDraft = serde_json::from_str(json).unwrap();
        let exercise = draft.validate().unwrap();
        assert_eq!(exercise.kind(), ExerciseKind::Construct);
    }
}
