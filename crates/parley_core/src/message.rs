//! Transcript messages sent to providers.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single transcript entry.
///
/// # Examples
///
/// ```
/// use parley_core::{Message, Role};
///
/// let message = Message::user("Where can I find iron?");
/// assert_eq!(message.role, Role::User);
/// assert!(message.content.contains("iron"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author
    pub role: Role,
    /// Plain text content
    pub content: String,
}

impl Message {
    /// System framing message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Player message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// NPC reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
