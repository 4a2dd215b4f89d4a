//! Progress reporting for index builds.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Stage of an index build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexPhase {
    Reading,
    Embedding { chunks: u64 },
    Writing,
}

impl IndexPhase {
    fn label(self) -> &'static str {
        match self {
            IndexPhase::Reading => "reading documents",
            IndexPhase::Embedding { .. } => "embedding chunks",
            IndexPhase::Writing => "writing index",
        }
    }
}

/// Observer for [`crate::build_index`]; every hook defaults to a no-op.
pub trait Progress: Send + Sync {
    fn phase(&self, _phase: IndexPhase) {}
    /// One chunk of `source` got its vector.
    fn chunk_embedded(&self, _source: &str) {}
    fn finished(&self, _chunks: usize) {}
}

/// Silent reporter for servers and tests.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Terminal spinner for the `index` command; becomes a bar while embedding.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn phase(&self, phase: IndexPhase) {
        if let IndexPhase::Embedding { chunks } = phase {
            self.pb.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            self.pb.set_length(chunks);
            self.pb.set_position(0);
        }
        self.pb.set_message(phase.label());
    }

    fn chunk_embedded(&self, source: &str) {
        self.pb.inc(1);
        self.pb.set_message(source.to_string());
    }

    fn finished(&self, chunks: usize) {
        self.pb
            .finish_with_message(format!("index complete, {chunks} chunk(s)"));
    }
}
