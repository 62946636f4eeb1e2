//! Identifier newtypes.

use serde::{Deserialize, Serialize};

/// Process-unique NPC identifier, assigned monotonically by the store.
///
/// # Examples
///
/// ```
/// use parley_core::NpcId;
///
/// let id = NpcId::from(7);
/// assert_eq!(id.to_string(), "7");
/// assert!(NpcId(3) < NpcId(4));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct NpcId(pub u64);

/// Engine-assigned player identifier (opaque string, usually a UUID).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an engine player id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
