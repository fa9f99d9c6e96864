use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LevelId, SkillId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SkillError {
    #[error("skill title cannot be empty")]
    EmptyTitle,

    #[error("skill {0} lists itself as a prerequisite")]
    SelfPrerequisite(SkillId),
}

/// Externally tracked status of a skill on the curriculum map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillStatus {
    #[default]
    Locked,
    Available,
    Completed,
}

/// One unit of curriculum with Learn/Practice/Test stages.
///
/// Built through [`Skill::new`] or [`SkillDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    id: SkillId,
    title: String,
    #[serde(default)]
    description: String,
    level: LevelId,
    order: u32,
    #[serde(default)]
    status: SkillStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    prerequisites: Vec<SkillId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
}

impl Skill {
    /// Creates a new skill.
    ///
    /// # Errors
    ///
    /// Returns `SkillError::EmptyTitle` if the title is blank.
    pub fn new(
        id: SkillId,
        title: impl Into<String>,
        level: LevelId,
        order: u32,
        status: SkillStatus,
    ) -> Result<Self, SkillError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(SkillError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: String::new(),
            level,
            order,
            status,
            prerequisites: Vec::new(),
            score: None,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach prerequisite skills.
    ///
    /// # Errors
    ///
    /// Returns `SkillError::SelfPrerequisite` if the skill depends on itself.
    pub fn with_prerequisites(mut self, prerequisites: Vec<SkillId>) -> Result<Self, SkillError> {
        if prerequisites.contains(&self.id) {
            return Err(SkillError::SelfPrerequisite(self.id));
        }
        self.prerequisites = prerequisites;
        Ok(self)
    }

    #[must_use]
    pub fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }

    #[must_use]
    pub fn id(&self) -> &SkillId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn level(&self) -> LevelId {
        self.level
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn status(&self) -> SkillStatus {
        self.status
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[SkillId] {
        &self.prerequisites
    }

    #[must_use]
    pub fn score(&self) -> Option<u32> {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SkillStatus::Completed
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Wire shape of a skill as found in curriculum bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDraft {
    pub id: SkillId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub level: LevelId,
    pub order: u32,
    #[serde(default)]
    pub status: SkillStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<SkillId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl SkillDraft {
    /// Validate the draft into a [`Skill`].
    ///
    /// # Errors
    ///
    /// Returns `SkillError::EmptyTitle` for a blank title and
    /// `SkillError::SelfPrerequisite` if the skill depends on itself.
    pub fn validate(self) -> Result<Skill, SkillError> {
        let skill = Skill::new(self.id, self.title, self.level, self.order, self.status)?
            .with_description(self.description)
            .with_prerequisites(self.prerequisites)?;
        Ok(match self.score {
            Some(score) => skill.with_score(score),
            None => skill,
        })
    }
}

/// Ordered group of skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub skills: Vec<SkillId>,
}

impl Level {
    /// Percentage (0..=100) of this level's skills that are completed.
    ///
    /// Skills not found in `catalog` count as not completed.
    #[must_use]
    pub fn progress_percent(&self, catalog: &[Skill]) -> u8 {
        if self.skills.is_empty() {
            return 0;
        }
        let completed = self
            .skills
            .iter()
            .filter(|id| catalog.iter().any(|s| s.id() == *id && s.is_completed()))
            .count();
        let percent = completed * 100 / self.skills.len();
        u8::try_from(percent).unwrap_or(100)
    }
}

/// Sum of scores across completed skills.
#[must_use]
pub fn total_points(skills: &[Skill]) -> u32 {
    skills
        .iter()
        .filter(|skill| skill.is_completed())
        .map(|skill| skill.score().unwrap_or(0))
        .fold(0_u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: &str, status: SkillStatus, score: Option<u32>) -> Skill {
        let skill = Skill::new(SkillId::new(id), id, LevelId::new(1), 1, status).unwrap();
        match score {
            Some(score) => skill.with_score(score),
            None => skill,
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Skill::new(
            SkillId::new("x"),
            "  ",
            LevelId::new(1),
            1,
            SkillStatus::Locked,
        )
        .unwrap_err();
        assert_eq!(err, SkillError::EmptyTitle);
    }

    #[test]
    fn self_prerequisite_is_rejected() {
        let err = skill("basic-reading", SkillStatus::Available, None)
            .with_prerequisites(vec![SkillId::new("basic-reading")])
            .unwrap_err();
        assert!(matches!(err, SkillError::SelfPrerequisite(_)));
    }

    fn draft(id: &str, title: &str) -> SkillDraft {
        SkillDraft {
            id: SkillId::new(id),
            title: title.into(),
            description: "Master fundamental Hebrew reading skills".into(),
            level: LevelId::new(1),
            order: 2,
            status: SkillStatus::Available,
            prerequisites: vec![SkillId::new("letter-recognition")],
            score: None,
        }
    }

    #[test]
    fn draft_validates_into_skill() {
        let skill = draft("basic-reading", " Basic Reading ").validate().unwrap();
        assert_eq!(skill.title(), "Basic Reading");
        assert_eq!(skill.description(), "Master fundamental Hebrew reading skills");
        assert_eq!(skill.prerequisites(), [SkillId::new("letter-recognition")]);
        assert_eq!(skill.score(), None);
    }

    #[test]
    fn draft_runs_skill_checks() {
        let err = draft("basic-reading", "   ").validate().unwrap_err();
        assert_eq!(err, SkillError::EmptyTitle);

        let mut looped = draft("basic-reading", "Basic Reading");
        looped.prerequisites.push(SkillId::new("basic-reading"));
        assert_eq!(
            looped.validate().unwrap_err(),
            SkillError::SelfPrerequisite(SkillId::new("basic-reading"))
        );
    }

    #[test]
    fn total_points_counts_completed_skills_only() {
        let skills = vec![
            skill("a", SkillStatus::Completed, Some(90)),
            skill("b", SkillStatus::Completed, None),
            skill("c", SkillStatus::Available, Some(70)),
        ];
        assert_eq!(total_points(&skills), 90);
    }

    #[test]
    fn level_progress_is_share_of_completed_skills() {
        let skills = vec![
            skill("a", SkillStatus::Completed, None),
            skill("b", SkillStatus::Available, None),
            skill("c", SkillStatus::Locked, None),
            skill("d", SkillStatus::Completed, None),
        ];
        let level = Level {
            id: LevelId::new(1),
            title: "Hebrew Foundations".into(),
            description: String::new(),
            skills: skills.iter().map(|s| s.id().clone()).collect(),
        };
        assert_eq!(level.progress_percent(&skills), 50);
    }

    #[test]
    fn status_parses_from_kebab_case() {
        let status: SkillStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, SkillStatus::Completed);
    }
}
