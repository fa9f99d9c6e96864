//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{SkillId, Stage};
use storage::repository::StorageError;

/// Errors emitted by practice and test sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlowError {
    #[error("no exercises available for session")]
    Empty,
    #[error("no answer recorded for the current exercise")]
    NoAnswer,
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("exercise index {index} is out of range for {len} exercises")]
    OutOfRange { index: usize, len: usize },
    #[error("{remaining} exercise(s) still unanswered")]
    Unanswered { remaining: usize },
    #[error("test already graded")]
    AlreadyGraded,
    #[error("no supplementary exercises available")]
    NoSupplementary,
    #[error("keep practicing is disabled")]
    KeepPracticingDisabled,
}

/// Errors emitted by the lesson state machine and lesson orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonError {
    #[error("skill {0} not found")]
    UnknownSkill(SkillId),
    #[error("skill {0} has no exercises")]
    NoExercises(SkillId),
    #[error("{0} stage is locked")]
    StageLocked(Stage),
    #[error("cannot {action} during the {stage} stage")]
    WrongStage { action: &'static str, stage: Stage },
    #[error("learning section {index} is out of range for {len} sections")]
    SectionOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
