use async_trait::async_trait;
use lesson_core::model::{
    Exercise, ExerciseError, HelpEntry, HelpTopic, LearningContent, Level, Skill, SkillError,
    SkillId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by curriculum providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    InvalidExercise(#[from] ExerciseError),

    #[error(transparent)]
    InvalidSkill(#[from] SkillError),

    #[error("skill {0} is referenced by lesson content but not declared")]
    UnknownSkill(SkillId),
}

/// Read side of the curriculum: skills, their exercises and learning material.
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    /// All skills ordered by level, then by their order within the level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_skills(&self) -> Result<Vec<Skill>, StorageError>;

    /// Fetch a skill by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_skill(&self, id: &SkillId) -> Result<Skill, StorageError>;

    /// All levels in curriculum order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_levels(&self) -> Result<Vec<Level>, StorageError>;

    /// Ordered practice/test exercises of a skill.
    ///
    /// An empty list means the skill has no lesson content yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn exercises(&self, id: &SkillId) -> Result<Vec<Exercise>, StorageError>;

    /// Fixed extra set appended when the learner chooses to keep practicing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn supplementary_exercises(&self, id: &SkillId) -> Result<Vec<Exercise>, StorageError>;

    /// Learn-stage material, if the skill has any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn learning_content(&self, id: &SkillId)
    -> Result<Option<LearningContent>, StorageError>;
}

/// Static theory/example text for the help dialog.
#[async_trait]
pub trait HelpRepository: Send + Sync {
    /// Every keyed help topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn help_topics(&self) -> Result<Vec<HelpTopic>, StorageError>;

    /// Entry shown when an exercise has no (known) help key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn default_help(&self) -> Result<Option<HelpEntry>, StorageError>;
}

#[derive(Debug, Default, Clone)]
struct LessonRecord {
    exercises: Vec<Exercise>,
    supplementary: Vec<Exercise>,
    learning: Option<LearningContent>,
}

/// Simple in-memory repository used for built-in content and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    skills: Arc<Mutex<HashMap<SkillId, Skill>>>,
    levels: Arc<Mutex<Vec<Level>>>,
    lessons: Arc<Mutex<HashMap<SkillId, LessonRecord>>>,
    help: Arc<Mutex<Vec<HelpTopic>>>,
    default_help: Arc<Mutex<Option<HelpEntry>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a skill.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store is poisoned.
    pub fn upsert_skill(&self, skill: Skill) -> Result<(), StorageError> {
        lock(&self.skills)?.insert(skill.id().clone(), skill);
        Ok(())
    }

    /// Append a level.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store is poisoned.
    pub fn push_level(&self, level: Level) -> Result<(), StorageError> {
        lock(&self.levels)?.push(level);
        Ok(())
    }

    /// Set the exercise list of a declared skill.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownSkill` if the skill was not inserted first.
    pub fn set_exercises(
        &self,
        id: &SkillId,
        exercises: Vec<Exercise>,
    ) -> Result<(), StorageError> {
        self.with_lesson(id, |lesson| lesson.exercises = exercises)
    }

    /// Set the keep-practicing set of a declared skill.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownSkill` if the skill was not inserted first.
    pub fn set_supplementary(
        &self,
        id: &SkillId,
        exercises: Vec<Exercise>,
    ) -> Result<(), StorageError> {
        self.with_lesson(id, |lesson| lesson.supplementary = exercises)
    }

    /// Set the learn-stage material of a declared skill.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownSkill` if the skill was not inserted first.
    pub fn set_learning(&self, id: &SkillId, content: LearningContent) -> Result<(), StorageError> {
        self.with_lesson(id, |lesson| lesson.learning = Some(content))
    }

    /// Insert or replace a help topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store is poisoned.
    pub fn upsert_help(&self, topic: HelpTopic) -> Result<(), StorageError> {
        let mut guard = lock(&self.help)?;
        guard.retain(|existing| existing.key != topic.key);
        guard.push(topic);
        Ok(())
    }

    /// Set the fallback help entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store is poisoned.
    pub fn set_default_help(&self, entry: HelpEntry) -> Result<(), StorageError> {
        *lock(&self.default_help)? = Some(entry);
        Ok(())
    }

    fn with_lesson(
        &self,
        id: &SkillId,
        apply: impl FnOnce(&mut LessonRecord),
    ) -> Result<(), StorageError> {
        if !lock(&self.skills)?.contains_key(id) {
            return Err(StorageError::UnknownSkill(id.clone()));
        }
        let mut guard = lock(&self.lessons)?;
        apply(guard.entry(id.clone()).or_default());
        Ok(())
    }

    fn lesson(&self, id: &SkillId) -> Result<Option<LessonRecord>, StorageError> {
        Ok(lock(&self.lessons)?.get(id).cloned())
    }
}

#[async_trait]
impl CurriculumRepository for InMemoryRepository {
    async fn list_skills(&self) -> Result<Vec<Skill>, StorageError> {
        let mut skills: Vec<Skill> = lock(&self.skills)?.values().cloned().collect();
        skills.sort_by(|a, b| {
            (a.level(), a.order(), a.id()).cmp(&(b.level(), b.order(), b.id()))
        });
        Ok(skills)
    }

    async fn get_skill(&self, id: &SkillId) -> Result<Skill, StorageError> {
        lock(&self.skills)?
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_levels(&self) -> Result<Vec<Level>, StorageError> {
        Ok(lock(&self.levels)?.clone())
    }

    async fn exercises(&self, id: &SkillId) -> Result<Vec<Exercise>, StorageError> {
        Ok(self.lesson(id)?.map(|l| l.exercises).unwrap_or_default())
    }

    async fn supplementary_exercises(&self, id: &SkillId) -> Result<Vec<Exercise>, StorageError> {
        Ok(self.lesson(id)?.map(|l| l.supplementary).unwrap_or_default())
    }

    async fn learning_content(
        &self,
        id: &SkillId,
    ) -> Result<Option<LearningContent>, StorageError> {
        Ok(self.lesson(id)?.and_then(|l| l.learning))
    }
}

#[async_trait]
impl HelpRepository for InMemoryRepository {
    async fn help_topics(&self) -> Result<Vec<HelpTopic>, StorageError> {
        Ok(lock(&self.help)?.clone())
    }

    async fn default_help(&self) -> Result<Option<HelpEntry>, StorageError> {
        Ok(lock(&self.default_help)?.clone())
    }
}

/// Aggregates curriculum and help providers behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub curriculum: Arc<dyn CurriculumRepository>,
    pub help: Arc<dyn HelpRepository>,
}

impl Storage {
    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let curriculum: Arc<dyn CurriculumRepository> = Arc::new(repo.clone());
        let help: Arc<dyn HelpRepository> = Arc::new(repo);
        Self { curriculum, help }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }
}
