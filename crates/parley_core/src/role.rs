//! Role types for transcript participants.

use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
///
/// # Examples
///
/// ```
/// use parley_core::Role;
///
/// assert_ne!(Role::User, Role::Assistant);
/// assert_eq!(format!("{}", Role::System), "System");
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
)]
pub enum Role {
    /// Framing instructions for the model
    System,
    /// The player speaking to the NPC
    User,
    /// The NPC's own earlier replies
    Assistant,
}
