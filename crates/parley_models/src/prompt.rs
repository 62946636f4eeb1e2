//! Transcript construction shared by every backend.

use parley_core::{ChatTurn, Message, NpcContext};

/// Prior turns replayed to the model when the caller does not say otherwise.
pub const DEFAULT_TRANSCRIPT_TURNS: usize = 10;

/// The role-scoped framing that keeps the model in character.
///
/// # Examples
///
/// ```
/// use parley_core::{NpcContext, NpcId, Personality};
/// use parley_models::system_instruction;
///
/// let context = NpcContext::new(NpcId(1), "Grumpy Miner", Personality::new("grumpy"), "Alex");
/// let instruction = system_instruction(&context);
/// assert!(instruction.starts_with("You are Grumpy Miner"));
/// assert!(instruction.contains("Alex"));
/// ```
pub fn system_instruction(context: &NpcContext) -> String {
    format!(
        "You are {}, a {} villager in a blocky voxel world, talking with {}. \
         Stay in character, answer in under three sentences and never mention being an AI.",
        context.display_name(),
        context.personality().traits(),
        context.player_name()
    )
}

/// Build the message list sent to a backend.
///
/// The result is the system framing, then at most `max_turns` of the most
/// recent prior turns as user/assistant pairs, then the new player message.
pub fn build_transcript(
    context: &NpcContext,
    history: &[ChatTurn],
    message: &str,
    max_turns: usize,
) -> Vec<Message> {
    let skip = history.len().saturating_sub(max_turns);
    let mut transcript = Vec::with_capacity(2 + 2 * (history.len() - skip));

    transcript.push(Message::system(system_instruction(context)));
    for turn in &history[skip..] {
        transcript.push(Message::user(turn.player_message().as_str()));
        transcript.push(Message::assistant(turn.npc_reply().as_str()));
    }
    transcript.push(Message::user(message));

    transcript
}
