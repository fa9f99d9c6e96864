use lesson_core::model::{
    Answer, Exercise, HelpEntry, LearningContent, LessonSettings, Skill, Stage, StageStatus,
};
use lesson_core::{Clock, Evaluation};
use tracing::{debug, info};

use super::learning::LearningTracker;
use super::machine::{LessonEvent, LessonMachine};
use crate::error::LessonError;
use crate::help::HelpCatalog;
use crate::sessions::{PracticeSession, PracticeStep, TestOutcome, TestSession};

//
// ─── INPUTS ────────────────────────────────────────────────────────────────────
//

/// Everything a lesson needs, as loaded from the curriculum.
#[derive(Debug, Clone)]
pub struct LessonMaterial {
    pub skill: Skill,
    pub learning: Option<LearningContent>,
    pub exercises: Vec<Exercise>,
    pub supplementary: Vec<Exercise>,
    pub help: HelpCatalog,
}

/// The one flow currently shown to the learner.
#[derive(Debug, Clone)]
pub enum ActiveView {
    Learning(LearningTracker),
    Practice(PracticeSession),
    Test(TestSession),
}

impl ActiveView {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            ActiveView::Learning(_) => Stage::Learn,
            ActiveView::Practice(_) => Stage::Practice,
            ActiveView::Test(_) => Stage::Test,
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A skill's lesson: the stage machine plus the active flow.
///
/// Flow signals (learning finished, practice completed, test graded) are
/// forwarded to the [`LessonMachine`] and the active view is rebuilt whenever
/// the stage changes. Switching skills means opening a new `Lesson`.
#[derive(Debug, Clone)]
pub struct Lesson {
    skill: Skill,
    learning: Option<LearningContent>,
    exercises: Vec<Exercise>,
    supplementary: Vec<Exercise>,
    help: HelpCatalog,
    settings: LessonSettings,
    clock: Clock,
    machine: LessonMachine,
    view: ActiveView,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `LessonError::NoExercises` if the skill has no exercises.
    pub fn open(
        material: LessonMaterial,
        settings: LessonSettings,
        clock: Clock,
    ) -> Result<Self, LessonError> {
        let LessonMaterial {
            skill,
            learning,
            exercises,
            supplementary,
            help,
        } = material;
        if exercises.is_empty() {
            return Err(LessonError::NoExercises(skill.id().clone()));
        }

        let machine = LessonMachine::for_skill(&skill);
        let mut lesson = Self {
            view: ActiveView::Learning(LearningTracker::new(section_count(learning.as_ref()))),
            skill,
            learning,
            exercises,
            supplementary,
            help,
            settings,
            clock,
            machine,
        };
        lesson.rebuild_view()?;
        info!(
            skill = %lesson.skill.id(),
            stage = %lesson.machine.active(),
            exercises = lesson.exercises.len(),
            "lesson opened"
        );
        Ok(lesson)
    }

    #[must_use]
    pub fn skill(&self) -> &Skill {
        &self.skill
    }

    #[must_use]
    pub fn learning(&self) -> Option<&LearningContent> {
        self.learning.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &LessonSettings {
        &self.settings
    }

    #[must_use]
    pub fn help(&self) -> &HelpCatalog {
        &self.help
    }

    #[must_use]
    pub fn machine(&self) -> &LessonMachine {
        &self.machine
    }

    #[must_use]
    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    #[must_use]
    pub fn active_stage(&self) -> Stage {
        self.machine.active()
    }

    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.machine.is_mastered()
    }

    #[must_use]
    pub fn learning_tracker(&self) -> Option<&LearningTracker> {
        match &self.view {
            ActiveView::Learning(tracker) => Some(tracker),
            _ => None,
        }
    }

    #[must_use]
    pub fn practice(&self) -> Option<&PracticeSession> {
        match &self.view {
            ActiveView::Practice(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn test(&self) -> Option<&TestSession> {
        match &self.view {
            ActiveView::Test(session) => Some(session),
            _ => None,
        }
    }

    //
    // ─── LEARN ─────────────────────────────────────────────────────────────────
    //

    /// Visit a learning section; visiting the last unseen one finishes Learn.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Learn and
    /// `LessonError::SectionOutOfRange` for an unknown section.
    pub fn visit_section(&mut self, index: usize) -> Result<Stage, LessonError> {
        let stage = self.view.stage();
        let ActiveView::Learning(tracker) = &mut self.view else {
            return Err(LessonError::WrongStage {
                action: "visit a section",
                stage,
            });
        };
        let complete = tracker.visit(index)?;
        let percent = tracker.progress();
        self.machine.report_progress(Stage::Learn, percent);
        if complete {
            self.advance(LessonEvent::LearnCompleted)?;
        }
        Ok(self.machine.active())
    }

    /// Mark every section as read and move straight to Practice.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Learn.
    pub fn skip_to_practice(&mut self) -> Result<Stage, LessonError> {
        let stage = self.view.stage();
        let ActiveView::Learning(tracker) = &mut self.view else {
            return Err(LessonError::WrongStage {
                action: "skip to practice",
                stage,
            });
        };
        tracker.skip_to_practice();
        self.advance(LessonEvent::SkipToPractice)
    }

    //
    // ─── PRACTICE ──────────────────────────────────────────────────────────────
    //

    /// Record an answer in the active practice or test flow.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` during Learn and `LessonError::Flow`
    /// when the flow rejects the answer.
    pub fn record_answer(&mut self, answer: Answer) -> Result<(), LessonError> {
        let stage = self.view.stage();
        match &mut self.view {
            ActiveView::Practice(session) => Ok(session.record_answer(answer)?),
            ActiveView::Test(session) => Ok(session.record_answer(answer)?),
            ActiveView::Learning(_) => Err(LessonError::WrongStage {
                action: "record an answer",
                stage,
            }),
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        match &self.view {
            ActiveView::Practice(session) => session.can_submit(),
            ActiveView::Test(session) => !session.is_graded() && session.all_answered(),
            ActiveView::Learning(_) => false,
        }
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` when the practice flow rejects the submit.
    pub fn submit_practice(&mut self) -> Result<Evaluation, LessonError> {
        let session = self.practice_mut("submit an answer")?;
        Ok(session.submit()?.clone())
    }

    /// Continue after correct feedback, completing Practice at the tail.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` unless correct feedback is shown.
    pub fn next_exercise(&mut self) -> Result<PracticeStep, LessonError> {
        let session = self.practice_mut("continue")?;
        let step = session.next()?;
        let percent = session.progress().percent;
        self.machine.report_progress(Stage::Practice, percent);
        if step == PracticeStep::Completed {
            self.machine.apply(LessonEvent::PracticeCompleted)?;
        }
        Ok(step)
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` unless incorrect feedback is shown.
    pub fn try_again(&mut self) -> Result<(), LessonError> {
        self.practice_mut("try again")?.try_again()?;
        Ok(())
    }

    /// Open the help dialog and return its content.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` when help cannot be opened right now.
    pub fn open_help(&mut self) -> Result<&HelpEntry, LessonError> {
        let key = self.practice_mut("open help")?.open_help()?.cloned();
        Ok(self.help.lookup(key.as_ref()))
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` unless help is open.
    pub fn close_help(&mut self) -> Result<(), LessonError> {
        self.practice_mut("close help")?.close_help()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` when practice cannot be extended.
    pub fn keep_practicing(&mut self) -> Result<usize, LessonError> {
        Ok(self.practice_mut("keep practicing")?.keep_practicing()?)
    }

    /// Hand a completed practice session over to the test.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Practice and
    /// `LessonError::Flow` before practice is completed.
    pub fn start_test(&mut self) -> Result<Stage, LessonError> {
        self.practice_mut("start the test")?.start_test()?;
        self.advance(LessonEvent::StartTest)
    }

    //
    // ─── TEST ──────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Test and
    /// `LessonError::Flow` on the last exercise.
    pub fn test_next(&mut self) -> Result<usize, LessonError> {
        Ok(self.test_mut("move to the next exercise")?.next()?)
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Test and
    /// `LessonError::Flow` on the first exercise.
    pub fn test_previous(&mut self) -> Result<usize, LessonError> {
        Ok(self.test_mut("move to the previous exercise")?.previous()?)
    }

    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Test and
    /// `LessonError::Flow` for an out-of-range index.
    pub fn test_go_to(&mut self, index: usize) -> Result<usize, LessonError> {
        Ok(self.test_mut("jump to an exercise")?.go_to(index)?)
    }

    /// Grade the test. A failed test routes back to a fresh practice session.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Test and
    /// `LessonError::Flow` while exercises are unanswered.
    pub fn submit_test(&mut self) -> Result<TestOutcome, LessonError> {
        let outcome = self.test_mut("submit the test")?.submit()?.clone();
        self.advance(LessonEvent::TestGraded {
            score: outcome.score,
            passed: outcome.passed,
        })?;
        Ok(outcome)
    }

    /// Abandon or reset the test and go back to practice.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::WrongStage` outside Test.
    pub fn retry(&mut self) -> Result<Stage, LessonError> {
        self.advance(LessonEvent::Retry)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Switch stage from the step header.
    ///
    /// An unpassed Test also stays closed while a practice session is running
    /// and not yet complete, as after a failed attempt.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::StageLocked` for a locked stage.
    pub fn select_stage(&mut self, stage: Stage) -> Result<Stage, LessonError> {
        if stage == Stage::Test
            && self.machine.stage_status(Stage::Test) != StageStatus::Completed
            && self.practice().is_some_and(|session| !session.is_complete())
        {
            return Err(LessonError::StageLocked(Stage::Test));
        }
        self.machine.select(stage)?;
        if self.view.stage() != stage {
            self.rebuild_view()?;
        }
        Ok(stage)
    }

    fn advance(&mut self, event: LessonEvent) -> Result<Stage, LessonError> {
        let stage = self.machine.apply(event)?;
        if self.view.stage() != stage {
            self.rebuild_view()?;
        }
        Ok(stage)
    }

    fn rebuild_view(&mut self) -> Result<(), LessonError> {
        self.view = match self.machine.active() {
            Stage::Learn => {
                ActiveView::Learning(LearningTracker::new(section_count(self.learning.as_ref())))
            }
            Stage::Practice => ActiveView::Practice(PracticeSession::new(
                self.exercises.clone(),
                self.supplementary.clone(),
                &self.settings,
                self.clock,
            )?),
            Stage::Test => ActiveView::Test(TestSession::new(
                self.exercises.clone(),
                &self.settings,
                self.clock,
            )?),
        };
        debug!(skill = %self.skill.id(), stage = %self.view.stage(), "view rebuilt");
        Ok(())
    }

    fn practice_mut(&mut self, action: &'static str) -> Result<&mut PracticeSession, LessonError> {
        let stage = self.view.stage();
        match &mut self.view {
            ActiveView::Practice(session) => Ok(session),
            _ => Err(LessonError::WrongStage { action, stage }),
        }
    }

    fn test_mut(&mut self, action: &'static str) -> Result<&mut TestSession, LessonError> {
        let stage = self.view.stage();
        match &mut self.view {
            ActiveView::Test(session) => Ok(session),
            _ => Err(LessonError::WrongStage { action, stage }),
        }
    }
}

fn section_count(learning: Option<&LearningContent>) -> usize {
    learning.map_or(0, LearningContent::section_count)
}
