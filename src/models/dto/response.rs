use serde::Serialize;

use crate::{
    models::domain::QuizResult,
    services::quiz_session::{AnswerFeedback, SessionSnapshot},
};

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub feedback: AnswerFeedback,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultListResponse {
    pub items: Vec<QuizResult>,
    pub total: usize,
}

impl From<Vec<QuizResult>> for ResultListResponse {
    fn from(items: Vec<QuizResult>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
