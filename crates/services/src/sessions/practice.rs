use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lesson_core::model::{Answer, Exercise, ExerciseId, HelpKey, LessonSettings};
use lesson_core::{Clock, Evaluation, evaluate};
use tracing::{debug, info};

use super::progress::FlowProgress;
use crate::error::FlowError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Observable state of a practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeState {
    Presenting { index: usize },
    AwaitingSubmit { index: usize },
    Feedback { index: usize, correct: bool },
    HelpOpen { index: usize },
    Completed,
}

/// Result of moving past a correctly answered exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeStep {
    Advanced { index: usize },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Presenting,
    AwaitingSubmit,
    Feedback(bool),
    HelpOpen,
    Completed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Presenting => "presenting",
            Phase::AwaitingSubmit => "awaiting submit",
            Phase::Feedback(true) => "showing correct feedback",
            Phase::Feedback(false) => "showing incorrect feedback",
            Phase::HelpOpen => "help is open",
            Phase::Completed => "completed",
        }
    }
}

/// One graded submission in practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub exercise_id: ExerciseId,
    pub correct: bool,
    pub at: DateTime<Utc>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Feedback-driven walk through a skill's exercises.
///
/// Every exercise must be answered correctly before the learner may move on;
/// a wrong answer can be retried any number of times. Once the tail is reached
/// the session is completed and can either be extended with the supplementary
/// set or handed over to the test.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    exercises: Vec<Exercise>,
    supplementary: Vec<Exercise>,
    answers: HashMap<ExerciseId, Answer>,
    current: usize,
    phase: Phase,
    last: Option<Evaluation>,
    attempts: Vec<Attempt>,
    extensions: u32,
    keep_practicing_enabled: bool,
    clock: Clock,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PracticeSession {
    /// Start practicing `exercises`, with `supplementary` held back for
    /// keep-practicing rounds.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Empty` if no exercises are provided.
    pub fn new(
        exercises: Vec<Exercise>,
        supplementary: Vec<Exercise>,
        settings: &LessonSettings,
        clock: Clock,
    ) -> Result<Self, FlowError> {
        if exercises.is_empty() {
            return Err(FlowError::Empty);
        }
        Ok(Self {
            exercises,
            supplementary,
            answers: HashMap::new(),
            current: 0,
            phase: Phase::Presenting,
            last: None,
            attempts: Vec::new(),
            extensions: 0,
            keep_practicing_enabled: settings.keep_practicing_enabled(),
            started_at: clock.now(),
            clock,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> PracticeState {
        let index = self.current;
        match self.phase {
            Phase::Presenting => PracticeState::Presenting { index },
            Phase::AwaitingSubmit => PracticeState::AwaitingSubmit { index },
            Phase::Feedback(correct) => PracticeState::Feedback { index, correct },
            Phase::HelpOpen => PracticeState::HelpOpen { index },
            Phase::Completed => PracticeState::Completed,
        }
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

    /// Answer recorded for the current exercise, if any.
    #[must_use]
    pub fn answer(&self) -> Option<&Answer> {
        self.current_exercise()
            .and_then(|exercise| self.answers.get(exercise.id()))
    }

    /// Evaluation shown while in feedback.
    #[must_use]
    pub fn feedback(&self) -> Option<&Evaluation> {
        match self.phase {
            Phase::Feedback(_) => self.last.as_ref(),
            _ => None,
        }
    }

    /// Every submission so far, in order.
    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Number of keep-practicing rounds appended.
    #[must_use]
    pub fn extensions(&self) -> u32 {
        self.extensions
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn progress(&self) -> FlowProgress {
        FlowProgress::at(self.current, self.exercises.len(), self.is_complete())
    }

    /// Whether a submit would be accepted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Presenting | Phase::AwaitingSubmit)
            && self.answer().is_some_and(Answer::is_present)
    }

    /// Store or replace the answer for the current exercise.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless the session is presenting,
    /// awaiting submit, or showing incorrect feedback.
    pub fn record_answer(&mut self, answer: Answer) -> Result<(), FlowError> {
        match self.phase {
            Phase::Presenting | Phase::AwaitingSubmit | Phase::Feedback(false) => {}
            phase => return Err(invalid("record an answer", phase)),
        }
        let id = self.current_id()?;
        self.answers.insert(id, answer);
        self.last = None;
        self.phase = Phase::AwaitingSubmit;
        Ok(())
    }

    /// Grade the current answer and show feedback.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoAnswer` when nothing usable was recorded and
    /// `FlowError::InvalidTransition` outside presenting or awaiting submit.
    pub fn submit(&mut self) -> Result<&Evaluation, FlowError> {
        if !matches!(self.phase, Phase::Presenting | Phase::AwaitingSubmit) {
            return Err(invalid("submit", self.phase));
        }
        let exercise = self
            .exercises
            .get(self.current)
            .ok_or(FlowError::OutOfRange {
                index: self.current,
                len: self.exercises.len(),
            })?;
        let answer = self
            .answers
            .get(exercise.id())
            .filter(|answer| answer.is_present())
            .ok_or(FlowError::NoAnswer)?;

        let evaluation = evaluate(exercise, Some(answer));
        debug!(
            exercise = %evaluation.exercise_id,
            correct = evaluation.correct,
            "practice answer graded"
        );
        self.attempts.push(Attempt {
            exercise_id: evaluation.exercise_id.clone(),
            correct: evaluation.correct,
            at: self.clock.now(),
        });
        self.phase = Phase::Feedback(evaluation.correct);
        Ok(&*self.last.insert(evaluation))
    }

    /// Move past a correctly answered exercise.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless showing correct feedback.
    pub fn next(&mut self) -> Result<PracticeStep, FlowError> {
        if self.phase != Phase::Feedback(true) {
            return Err(invalid("continue", self.phase));
        }
        self.last = None;
        if self.current + 1 < self.exercises.len() {
            self.current += 1;
            self.present_current()?;
            return Ok(PracticeStep::Advanced {
                index: self.current,
            });
        }
        self.phase = Phase::Completed;
        self.completed_at = Some(self.clock.now());
        info!(
            exercises = self.exercises.len(),
            attempts = self.attempts.len(),
            "practice completed"
        );
        Ok(PracticeStep::Completed)
    }

    /// Go back to the question after a wrong answer, keeping the answer.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless showing incorrect feedback.
    pub fn try_again(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::Feedback(false) {
            return Err(invalid("try again", self.phase));
        }
        self.last = None;
        self.phase = Phase::Presenting;
        Ok(())
    }

    /// Open the help dialog for the current exercise.
    ///
    /// Returns the exercise's help key, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` after correct feedback, while
    /// help is already open, or once completed.
    pub fn open_help(&mut self) -> Result<Option<&HelpKey>, FlowError> {
        match self.phase {
            Phase::Presenting | Phase::AwaitingSubmit | Phase::Feedback(false) => {}
            phase => return Err(invalid("open help", phase)),
        }
        self.last = None;
        self.phase = Phase::HelpOpen;
        Ok(self
            .exercises
            .get(self.current)
            .and_then(Exercise::help_key))
    }

    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` unless help is open.
    pub fn close_help(&mut self) -> Result<(), FlowError> {
        if self.phase != Phase::HelpOpen {
            return Err(invalid("close help", self.phase));
        }
        self.phase = Phase::Presenting;
        Ok(())
    }

    /// Append the supplementary set and resume at its first exercise.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::KeepPracticingDisabled` when switched off,
    /// `FlowError::NoSupplementary` without supplementary exercises and
    /// `FlowError::InvalidTransition` before completion.
    pub fn keep_practicing(&mut self) -> Result<usize, FlowError> {
        if self.phase != Phase::Completed {
            return Err(invalid("keep practicing", self.phase));
        }
        if !self.keep_practicing_enabled {
            return Err(FlowError::KeepPracticingDisabled);
        }
        if self.supplementary.is_empty() {
            return Err(FlowError::NoSupplementary);
        }

        let resume_at = self.exercises.len();
        self.exercises.extend(self.supplementary.iter().cloned());
        self.extensions += 1;
        self.current = resume_at;
        self.completed_at = None;
        self.present_current()?;
        debug!(
            resume_at,
            total = self.exercises.len(),
            "practice extended"
        );
        Ok(resume_at)
    }

    /// Check that the session may hand over to the test.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidTransition` before completion.
    pub fn start_test(&self) -> Result<(), FlowError> {
        if self.phase != Phase::Completed {
            return Err(invalid("start the test", self.phase));
        }
        Ok(())
    }

    fn current_id(&self) -> Result<ExerciseId, FlowError> {
        self.exercises
            .get(self.current)
            .map(|exercise| exercise.id().clone())
            .ok_or(FlowError::OutOfRange {
                index: self.current,
                len: self.exercises.len(),
            })
    }

    // Supplementary ids repeat across rounds, so the slot starts empty.
    fn present_current(&mut self) -> Result<(), FlowError> {
        let id = self.current_id()?;
        self.answers.remove(&id);
        self.phase = Phase::Presenting;
        Ok(())
    }
}

fn invalid(action: &'static str, phase: Phase) -> FlowError {
    FlowError::InvalidTransition {
        action,
        state: phase.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{ExerciseBody, LessonSettingsDraft};
    use lesson_core::time::{fixed_clock, fixed_now};

    fn single(id: &str, correct: &str) -> Exercise {
        Exercise::new(
            ExerciseId::new(id),
            format!("Question {id}"),
            ExerciseBody::SingleSelect {
                options: vec!["א".into(), "ב".into(), "ג".into()],
                correct_answer: correct.into(),
            },
        )
        .unwrap()
        .with_help_key(HelpKey::new("hebrew-sounds"))
    }

    fn session(count: usize, extras: usize) -> PracticeSession {
        let exercises = (1..=count).map(|i| single(&i.to_string(), "ב")).collect();
        let supplementary = (1..=extras)
            .map(|i| single(&format!("extra{i}"), "א"))
            .collect();
        PracticeSession::new(exercises, supplementary, &LessonSettings::default(), fixed_clock())
            .unwrap()
    }

    fn answer_correctly(session: &mut PracticeSession) -> PracticeStep {
        let correct = match session.current_exercise().unwrap().body() {
            ExerciseBody::SingleSelect { correct_answer, .. } => correct_answer.clone(),
            _ => unreachable!(),
        };
        session.record_answer(Answer::choice(correct)).unwrap();
        assert!(session.submit().unwrap().correct);
        session.next().unwrap()
    }

    #[test]
    fn empty_session_is_rejected() {
        let settings = LessonSettings::default();
        let err = PracticeSession::new(Vec::new(), Vec::new(), &settings, fixed_clock()).unwrap_err();
        assert_eq!(err, FlowError::Empty);
    }

    #[test]
    fn submit_is_disabled_until_an_answer_is_recorded() {
        let mut s = session(2, 0);
        assert_eq!(s.state(), PracticeState::Presenting { index: 0 });
        assert!(!s.can_submit());
        assert_eq!(s.submit().unwrap_err(), FlowError::NoAnswer);

        s.record_answer(Answer::Choices(Vec::new())).unwrap();
        assert!(!s.can_submit());

        s.record_answer(Answer::choice("א")).unwrap();
        assert_eq!(s.state(), PracticeState::AwaitingSubmit { index: 0 });
        assert!(s.can_submit());
    }

    #[test]
    fn correct_answer_advances_only_through_feedback() {
        let mut s = session(2, 0);
        s.record_answer(Answer::choice("ב")).unwrap();
        let evaluation = s.submit().unwrap();
        assert!(evaluation.correct);
        assert_eq!(evaluation.message, "Correct! Well done!");
        assert_eq!(s.state(), PracticeState::Feedback { index: 0, correct: true });
        assert!(!s.can_submit());

        assert_eq!(s.next().unwrap(), PracticeStep::Advanced { index: 1 });
        assert_eq!(s.state(), PracticeState::Presenting { index: 1 });
        assert!(s.answer().is_none());
    }

    #[test]
    fn wrong_answer_blocks_next_until_retried() {
        let mut s = session(2, 0);
        s.record_answer(Answer::choice("ג")).unwrap();
        assert!(!s.submit().unwrap().correct);
        assert_eq!(s.feedback().unwrap().message, "Try again!");

        assert!(matches!(
            s.next().unwrap_err(),
            FlowError::InvalidTransition { action: "continue", .. }
        ));

        s.try_again().unwrap();
        assert_eq!(s.state(), PracticeState::Presenting { index: 0 });
        assert_eq!(s.answer(), Some(&Answer::choice("ג")));

        s.record_answer(Answer::choice("ב")).unwrap();
        assert!(s.submit().unwrap().correct);
        assert_eq!(s.attempts().len(), 2);
        assert!(!s.attempts()[0].correct);
        assert_eq!(s.attempts()[1].at, fixed_now());
    }

    #[test]
    fn answer_can_be_changed_while_wrong_feedback_is_shown() {
        let mut s = session(1, 0);
        s.record_answer(Answer::choice("ג")).unwrap();
        s.submit().unwrap();
        s.record_answer(Answer::choice("ב")).unwrap();
        assert_eq!(s.state(), PracticeState::AwaitingSubmit { index: 0 });
        assert!(s.feedback().is_none());
    }

    #[test]
    fn help_opens_and_closes_to_presenting() {
        let mut s = session(1, 0);
        assert_eq!(
            s.open_help().unwrap().map(HelpKey::as_str),
            Some("hebrew-sounds")
        );
        assert_eq!(s.state(), PracticeState::HelpOpen { index: 0 });
        assert!(s.record_answer(Answer::choice("ב")).is_err());
        s.close_help().unwrap();
        assert_eq!(s.state(), PracticeState::Presenting { index: 0 });

        s.record_answer(Answer::choice("ב")).unwrap();
        s.submit().unwrap();
        assert!(s.open_help().is_err());
    }

    #[test]
    fn last_exercise_completes_the_session() {
        let mut s = session(3, 0);
        assert_eq!(s.progress().percent, 33);
        answer_correctly(&mut s);
        answer_correctly(&mut s);
        assert_eq!(answer_correctly(&mut s), PracticeStep::Completed);
        assert!(s.is_complete());
        assert_eq!(s.state(), PracticeState::Completed);
        assert_eq!(s.completed_at(), Some(fixed_now()));
        assert!(s.progress().is_complete);
        s.start_test().unwrap();
    }

    #[test]
    fn start_test_requires_completion() {
        let s = session(1, 0);
        assert!(s.start_test().is_err());
    }

    #[test]
    fn keep_practicing_appends_the_supplementary_set() {
        let mut s = session(2, 3);
        while answer_correctly(&mut s) != PracticeStep::Completed {}

        assert_eq!(s.keep_practicing().unwrap(), 2);
        assert_eq!(s.total(), 5);
        assert_eq!(s.state(), PracticeState::Presenting { index: 2 });
        assert_eq!(s.current_exercise().unwrap().id().as_str(), "extra1");

        while answer_correctly(&mut s) != PracticeStep::Completed {}
        assert_eq!(s.keep_practicing().unwrap(), 5);
        assert_eq!(s.total(), 8);
        assert!(s.answer().is_none());
        assert_eq!(s.extensions(), 2);
    }

    #[test]
    fn keep_practicing_errors() {
        let mut s = session(1, 0);
        assert!(matches!(
            s.keep_practicing().unwrap_err(),
            FlowError::InvalidTransition { .. }
        ));
        answer_correctly(&mut s);
        assert_eq!(s.keep_practicing().unwrap_err(), FlowError::NoSupplementary);

        let settings = LessonSettingsDraft {
            keep_practicing_enabled: Some(false),
            ..LessonSettingsDraft::default()
        }
        .validate()
        .unwrap();
        let mut disabled = PracticeSession::new(
            vec![single("1", "ב")],
            vec![single("x", "א")],
            &settings,
            fixed_clock(),
        )
        .unwrap();
        answer_correctly(&mut disabled);
        assert_eq!(
            disabled.keep_practicing().unwrap_err(),
            FlowError::KeepPracticingDisabled
        );
    }

    #[test]
    fn completed_session_rejects_answers() {
        let mut s = session(1, 0);
        answer_correctly(&mut s);
        assert!(s.record_answer(Answer::choice("ב")).is_err());
        assert!(s.submit().is_err());
    }
}
