use hubkit::AggregateProgress;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait Tracker {
    type Ctx: Clone;
    type Update: Clone;
    fn new(ctx: Self::Ctx) -> Self;
    fn update(&self, update: Self::Update) -> &Self;
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str =
    "{spinner:.blue} {msg:.cyan} [{elapsed_precise}] {wide_bar:.cyan/blue} {percent:>3}% ({eta})";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Renders the aggregate progress of one snapshot.
#[derive(Clone)]
pub struct SnapshotTracker {
    pub pb: ProgressBar,
}

#[derive(Debug, Clone)]
pub struct SnapshotTrackerConfig {
    pub msg: String,
    pub hidden: bool,
}

impl Tracker for SnapshotTracker {
    type Ctx = SnapshotTrackerConfig;
    type Update = AggregateProgress;

    fn new(ctx: Self::Ctx) -> Self {
        let pb = if ctx.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::no_length()
        };

        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        SnapshotTracker {
            pb: pb.with_message(ctx.msg),
        }
    }

    fn update(&self, progress: AggregateProgress) -> &Self {
        // The total is only known once the file list has been filtered.
        if self.pb.length() != Some(progress.total) {
            self.pb.set_length(progress.total);
        }
        self.pb.set_position(progress.completed);
        self
    }

    fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}
