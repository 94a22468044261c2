use crate::domain::chat::ChatTurn;

/// Number of most recent turns considered when rendering history
pub const HISTORY_WINDOW: usize = 6;

/// Rendered in place of history when no turn qualifies
pub const NO_PREVIOUS_CONVERSATION: &str = "No previous conversation.";

/// Render the tail of the conversation as `User: ...` / `Assistant: ...` lines
///
/// Only the last [`HISTORY_WINDOW`] turns are looked at. Within that window, turns
/// with an unknown role or empty content are dropped and the rest keep their
/// original order.
pub fn render_chat_history(history: &[ChatTurn]) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW);

    let lines: Vec<String> = history[start..]
        .iter()
        .filter_map(|turn| {
            let speaker = turn.speaker()?;
            let content = turn.content.as_deref()?;
            Some(format!("{}: {}", speaker, content))
        })
        .collect();

    if lines.is_empty() {
        NO_PREVIOUS_CONVERSATION.to_string()
    } else {
        lines.join("\n")
    }
}
