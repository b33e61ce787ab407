/// Errors raised while rebuilding the community hierarchy.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("a hierarchy rebuild is already in progress")]
    RebuildInProgress,

    #[error("invalid graph at level {level}: {reason}")]
    InvalidGraph { level: u32, reason: String },

    #[error("failed to persist hierarchy ({communities} communities): {reason}")]
    PersistFailed { communities: usize, reason: String },
}
