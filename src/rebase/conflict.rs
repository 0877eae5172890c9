//! Deciding whether a rebase stopped on conflicts

/// Text git prints when a rebase stops on conflicts
pub const CONFLICT_MARKER: &str = "Resolve all conflicts manually";

/// Rule for spotting a conflicted rebase in its output
pub trait ConflictDetector: Send + Sync {
    /// True if `output` says the rebase stopped on conflicts
    fn is_conflict_signal(&self, output: &str) -> bool;
}

/// Matches a literal substring, [`CONFLICT_MARKER`] by default
#[derive(Debug, Clone)]
pub struct SubstringConflictDetector {
    marker: String,
}

impl SubstringConflictDetector {
    /// Detector for a custom marker
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for SubstringConflictDetector {
    fn default() -> Self {
        Self::new(CONFLICT_MARKER)
    }
}

impl ConflictDetector for SubstringConflictDetector {
    fn is_conflict_signal(&self, output: &str) -> bool {
        output.contains(&self.marker)
    }
}
