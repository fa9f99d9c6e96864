//! Answer checking for every exercise kind.
//!
//! Evaluation is a pure function of the exercise definition and the submitted
//! answer. A missing answer, or one whose shape does not fit the exercise kind,
//! is simply incorrect.

use std::collections::{BTreeSet, HashMap};

use crate::model::{Answer, Exercise, ExerciseBody, ExerciseId, Pair};

/// Graded outcome of one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub exercise_id: ExerciseId,
    pub correct: bool,
    pub message: String,
}

/// Returns true if `answer` satisfies the answer key of `exercise`.
#[must_use]
pub fn is_correct(exercise: &Exercise, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match (exercise.body(), answer) {
        (ExerciseBody::SingleSelect { correct_answer, .. }, Answer::Choice(choice)) => {
            choice == correct_answer
        }
        (ExerciseBody::MultipleSelect { correct_answers, .. }, Answer::Choices(choices)) => {
            same_set(choices, correct_answers)
        }
        (ExerciseBody::Construct { correct_sequence, .. }, Answer::Sequence(sequence)) => {
            sequence == correct_sequence
        }
        (ExerciseBody::MatchPairs { pairs }, Answer::Pairs(submitted)) => {
            covers_pairs(pairs, submitted)
        }
        (
            ExerciseBody::SortBoxes {
                correct_placements, ..
            },
            Answer::Placements(placed),
        ) => correct_placements.iter().all(|(category, expected)| {
            let current = placed.get(category).map_or(&[][..], Vec::as_slice);
            same_multiset(current, expected)
        }),
        _ => false,
    }
}

/// Grade `answer` and attach the learner-facing feedback message.
#[must_use]
pub fn evaluate(exercise: &Exercise, answer: Option<&Answer>) -> Evaluation {
    let correct = is_correct(exercise, answer);
    Evaluation {
        exercise_id: exercise.id().clone(),
        correct,
        message: exercise.feedback_message(correct).to_owned(),
    }
}

fn same_set(submitted: &[String], expected: &[String]) -> bool {
    let submitted: BTreeSet<&str> = submitted.iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
    submitted == expected
}

fn same_multiset(current: &[String], expected: &[String]) -> bool {
    if current.len() != expected.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for item in expected {
        *counts.entry(item.as_str()).or_default() += 1;
    }
    for item in current {
        *counts.entry(item.as_str()).or_default() -= 1;
    }
    counts.values().all(|n| *n == 0)
}

// Extra submitted pairs beyond the required set are tolerated.
fn covers_pairs(required: &[Pair], submitted: &[(String, String)]) -> bool {
    required
        .iter()
        .all(|pair| submitted.iter().any(|(l, r)| *l == pair.left && *r == pair.right))
}
