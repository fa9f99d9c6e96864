/// Aggregated view of flow progress, useful for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowProgress {
    pub total: usize,
    /// 1-based position of the current exercise.
    pub position: usize,
    pub percent: u8,
    pub is_complete: bool,
}

impl FlowProgress {
    /// Progress while showing the exercise at `index` of `total`.
    #[must_use]
    pub fn at(index: usize, total: usize, is_complete: bool) -> Self {
        let position = if total == 0 { 0 } else { (index + 1).min(total) };
        let percent = if total == 0 {
            0
        } else {
            u8::try_from(position * 100 / total).unwrap_or(100)
        };
        Self {
            total,
            position,
            percent,
            is_complete,
        }
    }
}
