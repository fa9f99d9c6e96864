//! JSON curriculum bundles.
//!
//! A bundle declares skills, levels, per-skill lesson content and help topics.
//! Skills and exercises are read as drafts and validated on load, so a
//! malformed definition fails here instead of being misgraded later.

use std::path::Path;

use lesson_core::model::{
    Exercise, ExerciseDraft, HelpEntry, HelpTopic, LearningContent, Level, SkillDraft, SkillId,
};
use serde::{Deserialize, Serialize};

use crate::repository::{InMemoryRepository, StorageError};

/// Lesson material for one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonBundle {
    pub skill_id: SkillId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning: Option<LearningContent>,
    #[serde(default)]
    pub exercises: Vec<ExerciseDraft>,
    #[serde(default)]
    pub supplementary: Vec<ExerciseDraft>,
}

/// Top-level shape of a curriculum file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumBundle {
    #[serde(default)]
    pub skills: Vec<SkillDraft>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub lessons: Vec<LessonBundle>,
    #[serde(default)]
    pub help: Vec<HelpTopic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_help: Option<HelpEntry>,
}

impl CurriculumBundle {
    /// Parse a bundle from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the text is not a valid bundle.
    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        serde_json::from_str(text).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Read and parse a bundle file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the file cannot be read and
    /// `StorageError::Serialization` if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Validate every skill and exercise and load the bundle into a fresh
    /// repository.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSkill` or `StorageError::InvalidExercise`
    /// for the first malformed definition and `StorageError::UnknownSkill` for
    /// lessons of undeclared skills.
    pub fn into_repository(self) -> Result<InMemoryRepository, StorageError> {
        let repo = InMemoryRepository::new();
        for draft in self.skills {
            repo.upsert_skill(draft.validate()?)?;
        }
        for level in self.levels {
            repo.push_level(level)?;
        }
        for lesson in self.lessons {
            let exercises = validate_all(lesson.exercises)?;
            let supplementary = validate_all(lesson.supplementary)?;
            repo.set_exercises(&lesson.skill_id, exercises)?;
            repo.set_supplementary(&lesson.skill_id, supplementary)?;
            if let Some(learning) = lesson.learning {
                repo.set_learning(&lesson.skill_id, learning)?;
            }
        }
        for topic in self.help {
            repo.upsert_help(topic)?;
        }
        if let Some(entry) = self.default_help {
            repo.set_default_help(entry)?;
        }
        Ok(repo)
    }
}

fn validate_all(drafts: Vec<ExerciseDraft>) -> Result<Vec<Exercise>, StorageError> {
    drafts
        .into_iter()
        .map(|draft| draft.validate().map_err(StorageError::from))
        .collect()
}

/// Parse and load a JSON bundle in one step.
///
/// # Errors
///
/// See [`CurriculumBundle::from_json`] and [`CurriculumBundle::into_repository`].
pub fn load_bundle(text: &str) -> Result<InMemoryRepository, StorageError> {
    CurriculumBundle::from_json(text)?.into_repository()
}
