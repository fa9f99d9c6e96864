use lesson_core::model::{LessonProgress, Skill, SkillId, Stage, StageProgress, StageStatus};
use tracing::{debug, info};

use crate::error::LessonError;

/// Signals raised by the learning, practice and test flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonEvent {
    LearnCompleted,
    SkipToPractice,
    PracticeCompleted,
    StartTest,
    TestGraded { score: u32, passed: bool },
    Retry,
}

/// Gates a skill's Learn, Practice and Test stages.
///
/// Exactly one stage is active at a time. A skill that was already completed
/// starts in Practice with Learn and Test shown as done, so the learner can
/// review without redoing the lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonMachine {
    skill_id: SkillId,
    progress: LessonProgress,
    active: Stage,
}

impl LessonMachine {
    #[must_use]
    pub fn for_skill(skill: &Skill) -> Self {
        let (progress, active) = if skill.is_completed() {
            (LessonProgress::mastered(), Stage::Practice)
        } else {
            (LessonProgress::default(), Stage::Learn)
        };
        Self {
            skill_id: skill.id().clone(),
            progress,
            active,
        }
    }

    #[must_use]
    pub fn skill_id(&self) -> &SkillId {
        &self.skill_id
    }

    #[must_use]
    pub fn active(&self) -> Stage {
        self.active
    }

    #[must_use]
    pub fn progress(&self) -> &LessonProgress {
        &self.progress
    }

    #[must_use]
    pub fn stage_status(&self, stage: Stage) -> StageStatus {
        self.progress.status(stage, self.active)
    }

    /// Status of every stage in display order.
    #[must_use]
    pub fn statuses(&self) -> [(Stage, StageStatus); 3] {
        Stage::ALL.map(|stage| (stage, self.stage_status(stage)))
    }

    /// The test was passed and the skill is mastered.
    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.progress.test.completed()
    }

    /// Update the progress gauge of an unfinished stage.
    pub fn report_progress(&mut self, stage: Stage, percent: u8) {
        let current = self.progress.stage(stage);
        if !current.completed() {
            self.progress.set(stage, StageProgress::new(false, percent));
        }
    }

    /// Apply a flow signal and return the resulting active stage.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` when the event does not belong to the
    /// active stage and `LessonError::StageLocked` when starting the test
    /// before practice is complete.
    pub fn apply(&mut self, event: LessonEvent) -> Result<Stage, LessonError> {
        match event {
            LessonEvent::LearnCompleted | LessonEvent::SkipToPractice => {
                self.require(Stage::Learn, "finish learning")?;
                self.progress.learn = StageProgress::done();
                self.active = Stage::Practice;
            }
            LessonEvent::PracticeCompleted => {
                self.require(Stage::Practice, "complete practice")?;
                self.progress.practice = StageProgress::done();
            }
            LessonEvent::StartTest => {
                self.require(Stage::Practice, "start the test")?;
                if !self.progress.practice.completed() {
                    return Err(LessonError::StageLocked(Stage::Test));
                }
                self.active = Stage::Test;
            }
            LessonEvent::TestGraded { score, passed } => {
                self.require(Stage::Test, "grade the test")?;
                self.progress.test = StageProgress::new(passed, 100);
                self.progress.test_score = Some(score);
                if passed {
                    info!(skill = %self.skill_id, score, "skill mastered");
                } else {
                    self.active = Stage::Practice;
                }
            }
            LessonEvent::Retry => {
                self.require(Stage::Test, "retry the test")?;
                self.progress.test = StageProgress::default();
                self.progress.test_score = None;
                self.active = Stage::Practice;
            }
        }
        debug!(skill = %self.skill_id, ?event, active = %self.active, "lesson event applied");
        Ok(self.active)
    }

    /// Switch to `stage` from the step header.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::StageLocked` if the stage is locked.
    pub fn select(&mut self, stage: Stage) -> Result<Stage, LessonError> {
        if self.stage_status(stage) == StageStatus::Locked {
            return Err(LessonError::StageLocked(stage));
        }
        self.active = stage;
        debug!(skill = %self.skill_id, active = %stage, "stage selected");
        Ok(stage)
    }

    fn require(&self, stage: Stage, action: &'static str) -> Result<(), LessonError> {
        if self.active == stage {
            Ok(())
        } else {
            Err(LessonError::WrongStage {
                action,
                stage: self.active,
            })
        }
    }
}
