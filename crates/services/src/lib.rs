#![forbid(unsafe_code)]

pub mod error;
pub mod help;
pub mod lesson;
pub mod sessions;
pub mod workflow;

pub use lesson_core::Clock;

pub use error::{FlowError, LessonError};
pub use help::HelpCatalog;
pub use lesson::{
    ActiveView, LearningTracker, Lesson, LessonEvent, LessonMachine, LessonMaterial,
};
pub use sessions::{
    Attempt, FlowProgress, PracticeSession, PracticeState, PracticeStep, TestOutcome, TestSession,
};
pub use workflow::LessonService;
