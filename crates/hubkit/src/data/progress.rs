use std::fmt;
use std::sync::Arc;

/// Weight units contributed by a single file to an [`AggregateProgress`].
pub const FILE_WEIGHT: u64 = 100;

/// Progress of a single file transfer.
///
/// Exists only for the duration of one fetch call. `Completed` and `Failed`
/// are terminal.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransferProgress {
    #[default]
    NotStarted,

    /// Fraction of the file received, in `[0, 1]`.
    InProgress(f64),

    Completed,

    Failed(String),
}

impl TransferProgress {
    /// Build an in-progress value, clamping the fraction into `[0, 1]`.
    pub fn in_progress(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        TransferProgress::InProgress(fraction)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferProgress::Completed | TransferProgress::Failed(_))
    }

    pub fn fraction(&self) -> Option<f64> {
        match self {
            TransferProgress::NotStarted => Some(0.0),
            TransferProgress::InProgress(f) => Some(*f),
            TransferProgress::Completed => Some(1.0),
            TransferProgress::Failed(_) => None,
        }
    }
}

/// Weighted progress across every file selected by one snapshot call.
///
/// `total` is the number of selected files times [`FILE_WEIGHT`]. `completed`
/// never decreases and never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateProgress {
    pub total: u64,
    pub completed: u64,
}

impl AggregateProgress {
    pub fn new(file_count: usize) -> Self {
        Self {
            total: file_count as u64 * FILE_WEIGHT,
            completed: 0,
        }
    }

    /// Number of files the aggregate covers.
    pub fn file_count(&self) -> u64 {
        self.total / FILE_WEIGHT
    }

    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl fmt::Display for AggregateProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.1}%)", self.completed, self.total, self.fraction() * 100.0)
    }
}

/// Callback receiving per-file transfer updates.
pub type TransferCallback = Arc<dyn Fn(&TransferProgress) + Send + Sync>;

/// Callback receiving aggregate snapshot updates.
pub type ProgressCallback = Arc<dyn Fn(&AggregateProgress) + Send + Sync>;
