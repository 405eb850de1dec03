use serde::{Deserialize, Serialize};

/// One selectable answer to a question, with a running vote count.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}
