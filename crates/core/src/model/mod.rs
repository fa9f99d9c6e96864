mod answer;
mod exercise;
mod ids;
mod learning;
mod progress;
mod settings;
mod skill;

pub use answer::Answer;
pub use exercise::{
    DEFAULT_CORRECT_MESSAGE, DEFAULT_INCORRECT_MESSAGE, Exercise, ExerciseBody, ExerciseDraft,
    ExerciseError, ExerciseKind, Feedback, Pair, UnknownKind,
};
pub use ids::{ExerciseId, HelpKey, LevelId, ParseIdError, SkillId};
pub use learning::{HelpEntry, HelpTopic, LearningContent, LearningSection};
pub use progress::{LessonProgress, Stage, StageProgress, StageStatus};
pub use settings::{DEFAULT_PASS_MARK, LessonSettings, LessonSettingsDraft, SettingsError};
pub use skill::{Level, Skill, SkillDraft, SkillError, SkillStatus, total_points};
