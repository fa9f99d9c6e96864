use thiserror::Error;

/// Number of correct answers required to pass a skill test.
///
/// This is an absolute count (4 of the 5 canonical exercises), not a ratio.
pub const DEFAULT_PASS_MARK: u32 = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("pass mark must be > 0")]
    InvalidPassMark,
}

/// Tunables for lesson flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSettings {
    pass_mark: u32,
    keep_practicing_enabled: bool,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            pass_mark: DEFAULT_PASS_MARK,
            keep_practicing_enabled: true,
        }
    }
}

impl LessonSettings {
    #[must_use]
    pub fn pass_mark(&self) -> u32 {
        self.pass_mark
    }

    #[must_use]
    pub fn keep_practicing_enabled(&self) -> bool {
        self.keep_practicing_enabled
    }

    /// Whether `score` correct answers pass the test.
    #[must_use]
    pub fn passes(&self, score: u32) -> bool {
        score >= self.pass_mark
    }
}

/// Unvalidated settings, e.g. assembled from CLI flags or environment.
#[derive(Debug, Clone, Default)]
pub struct LessonSettingsDraft {
    pub pass_mark: Option<u32>,
    pub keep_practicing_enabled: Option<bool>,
}

impl LessonSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset values with defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidPassMark` if the pass mark is zero.
    pub fn validate(self) -> Result<LessonSettings, SettingsError> {
        let defaults = LessonSettings::default();
        let pass_mark = self.pass_mark.unwrap_or(defaults.pass_mark);
        if pass_mark == 0 {
            return Err(SettingsError::InvalidPassMark);
        }
        Ok(LessonSettings {
            pass_mark,
            keep_practicing_enabled: self
                .keep_practicing_enabled
                .unwrap_or(defaults.keep_practicing_enabled),
        })
    }
}
