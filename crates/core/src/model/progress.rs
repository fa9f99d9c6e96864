use std::fmt;

use serde::{Deserialize, Serialize};

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

/// The three gated stages every skill walks through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Learn,
    Practice,
    Test,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Learn, Stage::Practice, Stage::Test];

    /// The stage that must be completed before this one unlocks.
    #[must_use]
    pub fn predecessor(self) -> Option<Stage> {
        match self {
            Stage::Learn => None,
            Stage::Practice => Some(Stage::Learn),
            Stage::Test => Some(Stage::Practice),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::Learn => "Learn",
            Stage::Practice => "Practice",
            Stage::Test => "Test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a stage is shown in the step header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    Current,
    Locked,
    Upcoming,
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Completion flag plus a 0..=100 progress gauge for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageProgress {
    completed: bool,
    progress: u8,
}

impl StageProgress {
    #[must_use]
    pub fn done() -> Self {
        Self {
            completed: true,
            progress: 100,
        }
    }

    /// Progress is clamped to 100.
    #[must_use]
    pub fn new(completed: bool, progress: u8) -> Self {
        Self {
            completed,
            progress: progress.min(100),
        }
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }
}

/// Per-skill progress across the three stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LessonProgress {
    pub learn: StageProgress,
    pub practice: StageProgress,
    pub test: StageProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_score: Option<u32>,
}

impl LessonProgress {
    /// Starting point for a skill the learner already mastered.
    ///
    /// Learn and Test are shown as done while Practice stays open.
    #[must_use]
    pub fn mastered() -> Self {
        Self {
            learn: StageProgress::done(),
            practice: StageProgress::default(),
            test: StageProgress::done(),
            test_score: None,
        }
    }

    #[must_use]
    pub fn stage(&self, stage: Stage) -> StageProgress {
        match stage {
            Stage::Learn => self.learn,
            Stage::Practice => self.practice,
            Stage::Test => self.test,
        }
    }

    pub fn set(&mut self, stage: Stage, value: StageProgress) {
        match stage {
            Stage::Learn => self.learn = value,
            Stage::Practice => self.practice = value,
            Stage::Test => self.test = value,
        }
    }

    /// Step-header status of `stage` given the currently active one.
    #[must_use]
    pub fn status(&self, stage: Stage, active: Stage) -> StageStatus {
        if self.stage(stage).completed() {
            return StageStatus::Completed;
        }
        if stage == active {
            return StageStatus::Current;
        }
        match stage.predecessor() {
            Some(prev) if !self.stage(prev).completed() => StageStatus::Locked,
            _ => StageStatus::Upcoming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_progress_locks_later_stages() {
        let progress = LessonProgress::default();
        assert_eq!(progress.status(Stage::Learn, Stage::Learn), StageStatus::Current);
        assert_eq!(progress.status(Stage::Practice, Stage::Learn), StageStatus::Locked);
        assert_eq!(progress.status(Stage::Test, Stage::Learn), StageStatus::Locked);
    }

    #[test]
    fn completed_stage_unlocks_its_successor() {
        let mut progress = LessonProgress::default();
        progress.set(Stage::Learn, StageProgress::done());
        assert_eq!(progress.status(Stage::Learn, Stage::Practice), StageStatus::Completed);
        assert_eq!(progress.status(Stage::Practice, Stage::Learn), StageStatus::Upcoming);
        assert_eq!(progress.status(Stage::Test, Stage::Practice), StageStatus::Locked);
    }

    #[test]
    fn mastered_progress_marks_learn_and_test() {
        let progress = LessonProgress::mastered();
        assert!(progress.learn.completed());
        assert!(!progress.practice.completed());
        assert!(progress.test.completed());
        assert_eq!(progress.test.progress(), 100);
    }

    #[test]
    fn stage_progress_is_clamped() {
        assert_eq!(StageProgress::new(false, 250).progress(), 100);
    }
}
