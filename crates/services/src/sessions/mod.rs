mod practice;
mod progress;
mod test_session;

// Public API of the flow subsystem.
pub use crate::error::FlowError;
pub use practice::{Attempt, PracticeSession, PracticeState, PracticeStep};
pub use progress::FlowProgress;
pub use test_session::{TestOutcome, TestSession};
