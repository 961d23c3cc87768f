use query_pipeline::ConversationTurn;
use serde::Deserialize;

/// Request payload for /api/profReviews.
#[derive(Debug, Deserialize)]
pub struct ProfReviewsRequest {
    /// The whole conversation so far; the last entry is the question.
    pub messages: Vec<ConversationTurn>,
}
