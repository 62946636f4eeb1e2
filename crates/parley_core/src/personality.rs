//! NPC personalities: display names, greetings and prompt traits.

use serde::{Deserialize, Serialize};

/// Personality tags used when the configuration supplies none.
pub const DEFAULT_PERSONALITIES: [&str; 5] = ["friendly", "grumpy", "wise", "mysterious", "cheerful"];

/// Greeting for personalities without a dedicated line. `{player}` is replaced.
pub const GENERIC_GREETING: &str = "Hello there, {player}.";

/// A personality tag such as `"grumpy"`.
///
/// Tags are normalised to trimmed lowercase. Unknown tags are allowed; they get
/// a derived display name and the generic greeting.
///
/// # Examples
///
/// ```
/// use parley_core::Personality;
///
/// let grumpy = Personality::new(" Grumpy ");
/// assert_eq!(grumpy.as_str(), "grumpy");
/// assert_eq!(grumpy.display_name(), "Grumpy Miner");
/// assert!(grumpy.greeting("Alex").contains("Alex"));
///
/// let pirate = Personality::new("pirate");
/// assert_eq!(pirate.display_name(), "Pirate Villager");
/// assert_eq!(pirate.greeting("Alex"), "Hello there, Alex.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub struct Personality(String);

impl Personality {
    /// Normalise a tag into a personality.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    /// The normalised tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this tag is one of the built-in personalities.
    pub fn is_known(&self) -> bool {
        DEFAULT_PERSONALITIES.contains(&self.0.as_str())
    }

    /// Name shown above the NPC's head.
    pub fn display_name(&self) -> String {
        match self.0.as_str() {
            "friendly" => "Friendly Villager".to_string(),
            "grumpy" => "Grumpy Miner".to_string(),
            "wise" => "Wise Elder".to_string(),
            "mysterious" => "Mysterious Wanderer".to_string(),
            "cheerful" => "Cheerful Farmer".to_string(),
            other => {
                let mut chars = other.chars();
                match chars.next() {
                    Some(first) => format!("{}{} Villager", first.to_uppercase(), chars.as_str()),
                    None => "Villager".to_string(),
                }
            }
        }
    }

    /// Line spoken when the NPC first appears.
    pub fn greeting(&self, player_name: &str) -> String {
        let template = match self.0.as_str() {
            "friendly" => "Well met, {player}! Lovely day for an adventure, isn't it?",
            "grumpy" => "Hmph. You again, {player}? Make it quick.",
            "wise" => "Greetings, {player}. Every long road begins with a single block.",
            "mysterious" => "Ah, {player}... I wondered when you would arrive.",
            "cheerful" => "Hi hi, {player}! Oh, I'm so glad you're here!",
            _ => GENERIC_GREETING,
        };
        template.replace("{player}", player_name)
    }

    /// Short character description used in the system instruction.
    pub fn traits(&self) -> &str {
        match self.0.as_str() {
            "friendly" => "warm, helpful and eager to chat",
            "grumpy" => "curt, sarcastic and secretly kind-hearted",
            "wise" => "calm, thoughtful and fond of proverbs",
            "mysterious" => "cryptic, quiet and full of hints",
            "cheerful" => "bubbly, upbeat and easily excited",
            other => other,
        }
    }
}
