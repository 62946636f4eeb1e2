//! NPC store errors.

/// Reasons the NPC store refuses an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Global population cap reached
    #[display("Global NPC cap of {} reached", _0)]
    GlobalCapReached(usize),

    /// Player already owns the maximum number of NPCs
    #[display("Player {} already owns {} NPC(s)", player, cap)]
    PlayerCapReached {
        /// Owning player id
        player: String,
        /// Configured per-player cap
        cap: usize,
    },

    /// The store was shut down by `despawn_all`
    #[display("NPC store is shut down")]
    Closed,
}

/// Store error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The error kind
    pub kind: StoreErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl StoreError {
    /// Create a new StoreError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True for either population cap.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self.kind,
            StoreErrorKind::GlobalCapReached(_) | StoreErrorKind::PlayerCapReached { .. }
        )
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
