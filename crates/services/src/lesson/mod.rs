mod flow;
mod learning;
mod machine;

pub use crate::error::LessonError;
pub use flow::{ActiveView, Lesson, LessonMaterial};
pub use learning::LearningTracker;
pub use machine::{LessonEvent, LessonMachine};
