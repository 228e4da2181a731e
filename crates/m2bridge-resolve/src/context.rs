use std::collections::HashSet;
use std::path::PathBuf;

use m2bridge_pom::ArtifactCoordinate;
use tokio_util::sync::CancellationToken;

use crate::{CoordinateCollector, LocalRepo, NoProgress, ProgressSink};

static NO_PROGRESS: NoProgress = NoProgress;

/// Mutable state for one resolution run.
///
/// Owned exclusively by that run: the visited set guarantees each coordinate
/// is expanded at most once no matter how many edges reach it, and nothing
/// here is shared across concurrent runs.
pub struct ResolveContext<'a> {
    pub(crate) repo: LocalRepo,
    pub(crate) visited: HashSet<(String, String, String)>,
    pub(crate) expanded_paths: HashSet<PathBuf>,
    pub(crate) collector: CoordinateCollector,
    pub(crate) cancel: CancellationToken,
    pub(crate) progress: &'a dyn ProgressSink,
    pub(crate) stats: ResolveStats,
}

/// Diagnostics counters for a run. The consumer surfaces counts, not
/// per-failure detail.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStats {
    /// Descriptors that could not be read or parsed.
    pub skipped_descriptors: usize,
    /// Dependencies/plugins dropped for a missing or unresolved version.
    pub dropped: usize,
}

impl ResolveContext<'static> {
    pub fn new(repo: LocalRepo) -> Self {
        Self::with_progress(repo, &NO_PROGRESS)
    }
}

impl<'a> ResolveContext<'a> {
    pub fn with_progress(repo: LocalRepo, progress: &'a dyn ProgressSink) -> Self {
        Self {
            repo,
            visited: HashSet::new(),
            expanded_paths: HashSet::new(),
            collector: CoordinateCollector::new(),
            cancel: CancellationToken::new(),
            progress,
            stats: ResolveStats::default(),
        }
    }

    /// Replace the run's cancellation token with a caller-owned one.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn repo(&self) -> &LocalRepo {
        &self.repo
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    pub fn coordinates(&self) -> &[ArtifactCoordinate] {
        self.collector.as_slice()
    }

    pub fn into_coordinates(self) -> Vec<ArtifactCoordinate> {
        self.collector.into_vec()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
