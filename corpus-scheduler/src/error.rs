use corpus_core::AxisId;
use thiserror::Error;

/// Scheduler failures are configuration bugs, not runtime conditions: a
/// well-formed axis-share table always leaves at least one eligible
/// bucket per axis once compatibility rules are applied.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("axis {axis:?} has no bucket with a positive target share")]
    NoEligibleBucket { axis: AxisId },
}
