use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::identity::Identity;

/// One completed session's score. Write-once.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizResult {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub quiz_id: String,
    pub score: u32,
    pub total_possible: u32,
    pub timestamp: DateTime<Utc>,
}

impl QuizResult {
    pub fn new(identity: &Identity, quiz_id: &str, score: u32, total_possible: u32) -> Self {
        QuizResult {
            id: Uuid::new_v4().to_string(),
            user_id: identity.id.clone(),
            user_name: identity.display_name.clone(),
            quiz_id: quiz_id.to_string(),
            score,
            total_possible,
            timestamp: Utc::now(),
        }
    }
}
