use crate::error::LessonError;

/// Tracks which learning sections the learner has visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningTracker {
    visited: Vec<bool>,
    current: usize,
}

impl LearningTracker {
    #[must_use]
    pub fn new(section_count: usize) -> Self {
        Self {
            visited: vec![false; section_count],
            current: 0,
        }
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.get(index).copied().unwrap_or(false)
    }

    /// Every section has been visited. A lesson without sections is trivially
    /// complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.visited.iter().all(|v| *v)
    }

    /// Share of visited sections, 0..=100.
    #[must_use]
    pub fn progress(&self) -> u8 {
        if self.visited.is_empty() {
            return 100;
        }
        let seen = self.visited.iter().filter(|v| **v).count();
        u8::try_from(seen * 100 / self.visited.len()).unwrap_or(100)
    }

    /// Mark the section at `index` as visited and make it current.
    ///
    /// Returns true once every section has been visited.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::SectionOutOfRange` for an unknown section.
    pub fn visit(&mut self, index: usize) -> Result<bool, LessonError> {
        let len = self.visited.len();
        let slot = self
            .visited
            .get_mut(index)
            .ok_or(LessonError::SectionOutOfRange { index, len })?;
        *slot = true;
        self.current = index;
        Ok(self.is_complete())
    }

    /// Mark every section as visited.
    pub fn skip_to_practice(&mut self) {
        self.visited.fill(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_every_section_is_visited() {
        let mut tracker = LearningTracker::new(3);
        assert!(!tracker.visit(0).unwrap());
        assert!(!tracker.visit(2).unwrap());
        assert!(tracker.is_visited(2));
        assert!(!tracker.is_visited(1));
        assert!(!tracker.is_visited(7));
        assert_eq!(tracker.progress(), 66);
        assert!(tracker.visit(1).unwrap());
        assert!(tracker.is_complete());
        assert_eq!(tracker.current(), 1);
    }

    #[test]
    fn revisiting_does_not_double_count() {
        let mut tracker = LearningTracker::new(2);
        tracker.visit(0).unwrap();
        tracker.visit(0).unwrap();
        assert_eq!(tracker.progress(), 50);
    }

    #[test]
    fn out_of_range_section_is_an_error() {
        let mut tracker = LearningTracker::new(2);
        assert!(matches!(
            tracker.visit(2),
            Err(LessonError::SectionOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn skip_marks_everything() {
        let mut tracker = LearningTracker::new(4);
        tracker.skip_to_practice();
        assert!(tracker.is_complete());
        assert_eq!(tracker.progress(), 100);
    }
}
