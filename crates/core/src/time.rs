use chrono::{DateTime, Duration, Utc};

/// Where practice attempts, test grading and lesson completion get their
/// timestamps from.
///
/// The binary runs on [`Clock::System`]. Tests pin every stamp to one instant
/// with [`Clock::Fixed`] so attempt logs and outcomes compare exactly.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Seconds after the Unix epoch at which fixed lesson clocks stand.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// The instant a [`fixed_clock`] reports (2023-11-14T22:13:20Z).
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(FIXED_TEST_TIMESTAMP)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
