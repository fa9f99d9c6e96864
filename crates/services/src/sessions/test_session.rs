use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lesson_core::model::{Answer, Exercise, ExerciseId, LessonSettings};
use lesson_core::{Clock, Evaluation, evaluate};
use tracing::{debug, info, warn};

use super::progress::FlowProgress;
use crate::error::FlowError;

/// Final grading of a test attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub score: u32,
    pub total: usize,
    pub passed: bool,
    pub results: Vec<Evaluation>,
    pub graded_at: DateTime<Utc>,
}

/// Deferred-grading quiz over a skill's canonical exercises.
///
/// The learner moves freely between exercises and may change answers until
/// everything is answered and submitted. Grading happens once; afterwards the
/// answers are frozen and per-question results are available.
#[derive(Debug, Clone)]
pub struct TestSession {
    exercises: Vec<Exercise>,
    answers: HashMap<ExerciseId, Answer>,
    current: usize,
    settings: LessonSettings,
    outcome: Option<TestOutcome>,
    clock: Clock,
    started_at: DateTime<Utc>,
}

impl TestSession {
    /// # Errors
    ///
    /// Returns `FlowError::Empty` if no exercises are provided.
    pub fn new(
        exercises: Vec<Exercise>,
        settings: &LessonSettings,
        clock: Clock,
    ) -> Result<Self, FlowError> {
        if exercises.is_empty() {
            return Err(FlowError::Empty);
        }
        let pass_mark = settings.pass_mark();
        if usize::try_from(pass_mark).unwrap_or(usize::MAX) > exercises.len() {
            warn!(
                pass_mark,
                exercises = exercises.len(),
                "pass mark exceeds the number of test exercises; the test cannot be passed"
            );
        }
        Ok(Self {
            exercises,
            answers: HashMap::new(),
            current: 0,
            settings: settings.clone(),
            outcome: None,
            started_at: clock.now(),
            clock,
        })
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.exercises.get(self.current)
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn pass_mark(&self) -> u32 {
        self.settings.pass_mark()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn answer(&self) -> Option<&Answer> {
        self.answer_at(self.current)
    }

    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<&Answer> {
        self.exercises
            .get(index)
            .and_then(|exercise| self.answers.get(exercise.id()))
    }

    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&TestOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> FlowProgress {
        FlowProgress::at(self.current, self.exercises.len(), self.is_graded())
    }

    /// Number of exercises still lacking a usable answer.
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.exercises
            .iter()
            .filter(|exercise| {
                !self
                    .answers
                    .get(exercise.id())
                    .is_some_and(Answer::is_present)
            })
            .count()
    }

    #[must_use]
    pub fn all_answered(&self) -> bool {
        self.unanswered() == 0
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Jump to the exercise at `index`.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::OutOfRange` if `index` is past the end.
    pub fn go_to(&mut self, index: usize) -> Result<usize, FlowError> {
        if index >= self.exercises.len() {
            return Err(FlowError::OutOfRange {
                index,
                len: self.exercises.len(),
            });
        }
        self.current = index;
        Ok(index)
    }

    /// # Errors
    ///
    /// Returns `FlowError::OutOfRange` on the last exercise.
    pub fn next(&mut self) -> Result<usize, FlowError> {
        self.go_to(self.current + 1)
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` on the first exercise.
    pub fn previous(&mut self) -> Result<usize, FlowError> {
        let index = self
            .current
            .checked_sub(1)
            .ok_or(FlowError::InvalidTransition {
                action: "go back",
                state: "on the first exercise",
            })?;
        self.go_to(index)
    }

    //
    // ─── ANSWERING ─────────────────────────────────────────────────────────────
    //

    /// Store or replace the answer for the current exercise. Nothing is graded.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::AlreadyGraded` once the test was submitted.
    pub fn record_answer(&mut self, answer: Answer) -> Result<(), FlowError> {
        if self.is_graded() {
            return Err(FlowError::AlreadyGraded);
        }
        let exercise = self
            .exercises
            .get(self.current)
            .ok_or(FlowError::OutOfRange {
                index: self.current,
                len: self.exercises.len(),
            })?;
        self.answers.insert(exercise.id().clone(), answer);
        Ok(())
    }

    /// Grade every exercise and settle the outcome.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Unanswered` while any exercise lacks an answer and
    /// `FlowError::AlreadyGraded` on a second submit.
    pub fn submit(&mut self) -> Result<&TestOutcome, FlowError> {
        if self.is_graded() {
            return Err(FlowError::AlreadyGraded);
        }
        let remaining = self.unanswered();
        if remaining > 0 {
            return Err(FlowError::Unanswered { remaining });
        }

        let results: Vec<Evaluation> = self
            .exercises
            .iter()
            .map(|exercise| evaluate(exercise, self.answers.get(exercise.id())))
            .collect();
        let correct = results.iter().filter(|r| r.correct).count();
        let score = u32::try_from(correct).unwrap_or(u32::MAX);
        let passed = self.settings.passes(score);

        for result in &results {
            debug!(exercise = %result.exercise_id, correct = result.correct, "test answer graded");
        }
        info!(score, total = results.len(), passed, "test graded");

        Ok(&*self.outcome.insert(TestOutcome {
            score,
            total: results.len(),
            passed,
            results,
            graded_at: self.clock.now(),
        }))
    }

    /// Correctness of the exercise at `index`, once graded.
    #[must_use]
    pub fn result_for(&self, index: usize) -> Option<bool> {
        self.outcome
            .as_ref()
            .and_then(|outcome| outcome.results.get(index))
            .map(|result| result.correct)
    }
}
