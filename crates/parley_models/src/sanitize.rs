//! Strips model reasoning from replies before they are spoken.

use regex::Regex;
use std::sync::LazyLock;

static TAG_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<reasoning>.*?</reasoning>").expect("Valid reasoning tag regex")
});

static BRACKET_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[reasoning\].*?\[/reasoning\]").expect("Valid reasoning bracket regex")
});

static REASONING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(reasoning|thought|analysis):").expect("Valid reasoning line regex")
});

/// Remove reasoning blocks and lines starting with `reasoning:`, `thought:`
/// or `analysis:` (any case).
///
/// Remaining lines are trimmed and blank lines dropped. If nothing survives,
/// the block-stripped text is returned trimmed so the NPC never goes silent
/// because of the filter.
///
/// # Examples
///
/// ```
/// use parley_models::sanitize_reply;
///
/// let raw = "<reasoning>the player wants ore</reasoning>\nThought: be brief\n  Try the caves.  ";
/// assert_eq!(sanitize_reply(raw), "Try the caves.");
/// ```
pub fn sanitize_reply(raw: &str) -> String {
    let without_tags = TAG_BLOCK.replace_all(raw, "");
    let stripped = BRACKET_BLOCK.replace_all(&without_tags, "");

    let kept: Vec<&str> = stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !REASONING_LINE.is_match(line))
        .collect();

    if kept.is_empty() {
        stripped.trim().to_string()
    } else {
        kept.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_multiline_blocks_of_both_styles() {
        let raw = "[REASONING]\nstep one\nstep two\n[/reasoning]Hello!\n<Reasoning>x\ny</reasoning>";
        assert_eq!(sanitize_reply(raw), "Hello!");
    }

    #[test]
    fn drops_prefixed_lines_case_insensitively() {
        let raw = "ANALYSIS: greet them\nGood morning!\nreasoning:none\n\nNice hat.";
        assert_eq!(sanitize_reply(raw), "Good morning!\nNice hat.");
    }

    #[test]
    fn keeps_lines_where_the_colon_is_not_adjacent() {
        let raw = "Reasoning : that is what scholars do.\nThought about it, yes.";
        assert_eq!(sanitize_reply(raw), raw);
    }

    #[test]
    fn falls_back_when_everything_is_filtered() {
        let raw = "  Thought: I should wave  ";
        assert_eq!(sanitize_reply(raw), "Thought: I should wave");
    }

    #[test]
    fn plain_reply_is_unchanged() {
        assert_eq!(sanitize_reply("Hmph. Go away."), "Hmph. Go away.");
    }
}
