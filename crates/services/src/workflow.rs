use std::sync::Arc;

use lesson_core::Clock;
use lesson_core::model::{LessonSettings, Level, Skill, SkillId, total_points};
use storage::repository::{CurriculumRepository, HelpRepository, Storage, StorageError};
use tracing::{debug, info};

use crate::error::LessonError;
use crate::help::HelpCatalog;
use crate::lesson::{Lesson, LessonMaterial};

/// Loads lesson material from the repositories and opens lessons.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    settings: LessonSettings,
    curriculum: Arc<dyn CurriculumRepository>,
    help: Arc<dyn HelpRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        clock: Clock,
        curriculum: Arc<dyn CurriculumRepository>,
        help: Arc<dyn HelpRepository>,
    ) -> Self {
        Self {
            clock,
            settings: LessonSettings::default(),
            curriculum,
            help,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(clock, storage.curriculum.clone(), storage.help.clone())
    }

    #[must_use]
    pub fn with_settings(mut self, settings: LessonSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &LessonSettings {
        &self.settings
    }

    /// Skills in curriculum order.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Storage` if the repository fails.
    pub async fn list_skills(&self) -> Result<Vec<Skill>, LessonError> {
        Ok(self.curriculum.list_skills().await?)
    }

    /// # Errors
    ///
    /// Returns `LessonError::Storage` if the repository fails.
    pub async fn list_levels(&self) -> Result<Vec<Level>, LessonError> {
        Ok(self.curriculum.list_levels().await?)
    }

    /// Sum of the scores of every completed skill.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Storage` if the repository fails.
    pub async fn total_points(&self) -> Result<u32, LessonError> {
        let skills = self.curriculum.list_skills().await?;
        Ok(total_points(&skills))
    }

    /// Load everything a skill's lesson needs and open it.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::UnknownSkill` for an unknown skill,
    /// `LessonError::NoExercises` when the skill has no exercises and
    /// `LessonError::Storage` for other repository failures.
    pub async fn open_lesson(&self, skill_id: &SkillId) -> Result<Lesson, LessonError> {
        let skill = match self.curriculum.get_skill(skill_id).await {
            Ok(skill) => skill,
            Err(StorageError::NotFound) => return Err(LessonError::UnknownSkill(skill_id.clone())),
            Err(err) => return Err(err.into()),
        };
        let exercises = self.curriculum.exercises(skill_id).await?;
        if exercises.is_empty() {
            return Err(LessonError::NoExercises(skill_id.clone()));
        }
        let supplementary = self.curriculum.supplementary_exercises(skill_id).await?;
        let learning = self.curriculum.learning_content(skill_id).await?;
        let help = HelpCatalog::new(
            self.help.help_topics().await?,
            self.help.default_help().await?,
        );
        debug!(
            skill = %skill_id,
            exercises = exercises.len(),
            supplementary = supplementary.len(),
            sections = learning.as_ref().map_or(0, |l| l.section_count()),
            "lesson material loaded"
        );

        let lesson = Lesson::open(
            LessonMaterial {
                skill,
                learning,
                exercises,
                supplementary,
                help,
            },
            self.settings.clone(),
            self.clock,
        )?;
        info!(skill = %skill_id, "lesson ready");
        Ok(lesson)
    }
}
