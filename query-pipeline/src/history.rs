//! Flat transcript of the earlier conversation turns.

use crate::conversation::ConversationTurn;

/// `"<role>: <content>"`
pub fn format_turn(turn: &ConversationTurn) -> String {
    format!("{}: {}", turn.role, turn.content)
}

/// One line per turn, in order, joined with `\n`. Empty input gives an empty
/// string.
///
/// # Example
/// ```
/// use query_pipeline::{ConversationTurn, format_history};
/// let turns = [
///     ConversationTurn::user("Who teaches BIO 201?"),
///     ConversationTurn::assistant("Dr. Samantha Lee."),
/// ];
/// assert_eq!(
///     format_history(&turns),
///     "user: Who teaches BIO 201?\nassistant: Dr. Samantha Lee."
/// );
/// ```
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns.iter().map(format_turn).collect::<Vec<_>>().join("\n")
}
