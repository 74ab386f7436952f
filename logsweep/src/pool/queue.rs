use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed list of paths handed out exactly once each.
///
/// Claiming is a single atomic increment, so concurrent workers can never
/// receive the same path or skip one.
#[derive(Debug)]
pub(crate) struct WorkQueue {
    paths: Vec<PathBuf>,
    next: AtomicUsize,
}

impl WorkQueue {
    pub(crate) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            next: AtomicUsize::new(0),
        }
    }

    /// Pops the next unclaimed path, or `None` once the queue is drained
    pub(crate) fn claim(&self) -> Option<&Path> {
        let index = self.next.fetch_add(1, Ordering::AcqRel);
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub(crate) fn len(&self) -> usize {
        self.paths.len()
    }

    /// Paths not yet claimed
    pub(crate) fn remaining(&self) -> usize {
        self.paths
            .len()
            .saturating_sub(self.next.load(Ordering::Acquire))
    }
}
