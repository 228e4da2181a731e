/// Receives coarse progress updates from a resolution run.
///
/// Updates are emitted between top-level steps (per root descriptor, per
/// expanded coordinate), so implementations don't need to be cheap enough
/// for tight loops. `percentage` is absent for phases with no known bound.
pub trait ProgressSink {
    fn report(&self, percentage: Option<u32>, message: &str);
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percentage: Option<u32>, _message: &str) {}
}
