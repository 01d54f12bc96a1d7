// ─────────────────────────────────────────────────────────────────────
// Emotion Constellation — Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all kernel failures.
///
/// Every variant is a caller contract violation; the kernel has no
/// transient or retryable failure modes.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input handed to a kernel operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Offsets and placement targets do not line up.
    #[error("placement mismatch: {offsets} offsets for {targets} targets")]
    PlacementMismatch { offsets: usize, targets: usize },

    /// Numerical error (NaN/Inf in a position).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type ClusterResult<T> = Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = ClusterError::PlacementMismatch {
            offsets: 2,
            targets: 3,
        };
        assert_eq!(err.to_string(), "placement mismatch: 2 offsets for 3 targets");
    }

    #[test]
    fn test_config_message() {
        let err = ClusterError::Config("bad radius".into());
        assert!(err.to_string().starts_with("config error"));
    }
}
