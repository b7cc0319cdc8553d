//! Scoped progress reporting for lifecycle operations

use tracing::{debug, info};

/// How lifecycle operations announce what they are doing
///
/// Chosen once at stack construction. Affects observability only; outcomes
/// are identical in either mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Progress {
    /// Log each phase as it starts and finishes
    #[default]
    Announce,
    /// No progress output
    Quiet,
}

impl Progress {
    /// Open a reporting bracket around one phase
    ///
    /// The start is announced immediately; completion is reported when the
    /// returned guard is dropped, whether the phase succeeded or not.
    pub(crate) fn task(self, phrase: &'static str) -> ProgressGuard {
        let announce = self == Progress::Announce;
        if announce {
            info!("{phrase}...");
        }
        ProgressGuard { phrase, announce }
    }
}

/// Guard closing a progress bracket on drop
pub(crate) struct ProgressGuard {
    phrase: &'static str,
    announce: bool,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if self.announce {
            debug!("{} finished", self.phrase);
        }
    }
}
