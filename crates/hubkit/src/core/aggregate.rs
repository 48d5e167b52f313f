use crate::data::{AggregateProgress, FILE_WEIGHT};

/// Accumulates per-file fractions into a single [`AggregateProgress`].
///
/// Files are processed one at a time. A file's in-flight contribution stops
/// one unit short of its weight; only [`finish_file`](Self::finish_file)
/// grants the last unit, so `completed == total` is reached once, when the
/// final file lands.
#[derive(Debug, Clone)]
pub struct ProgressAggregator {
    progress: AggregateProgress,
    current: u64,
}

impl ProgressAggregator {
    pub fn new(file_count: usize) -> Self {
        Self {
            progress: AggregateProgress::new(file_count),
            current: 0,
        }
    }

    pub fn progress(&self) -> AggregateProgress {
        self.progress
    }

    /// Record the current file's fraction. Returns the updated aggregate.
    ///
    /// Regressions are ignored.
    pub fn advance(&mut self, fraction: f64) -> AggregateProgress {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let units = ((fraction * FILE_WEIGHT as f64).floor() as u64).min(FILE_WEIGHT - 1);
        if units > self.current {
            self.add(units - self.current);
            self.current = units;
        }
        self.progress
    }

    /// Pin the current file to its full weight and move on to the next one.
    pub fn finish_file(&mut self) -> AggregateProgress {
        self.add(FILE_WEIGHT - self.current);
        self.current = 0;
        self.progress
    }

    fn add(&mut self, units: u64) {
        self.progress.completed = (self.progress.completed + units).min(self.progress.total);
    }
}
