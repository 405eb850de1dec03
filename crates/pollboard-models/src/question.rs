use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A poll prompt with text and a publish timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// True when `pub_date` falls within the 24-hour window ending now.
    /// Future-dated questions are never considered recent.
    pub fn was_published_recently(&self) -> bool {
        let now = Utc::now();
        self.pub_date >= now - Duration::days(1) && self.pub_date <= now
    }
}
