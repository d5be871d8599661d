use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::domain::question::Question,
};

/// Points awarded for each correctly answered question.
pub const POINTS_PER_QUESTION: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>, // play order
    pub is_active: bool,
}

impl Quiz {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * POINTS_PER_QUESTION
    }

    /// Checks that the quiz can be played: at least one question, each with
    /// two or more options and a correct index pointing at one of them.
    pub fn ensure_playable(&self) -> AppResult<()> {
        if self.questions.is_empty() {
            return Err(AppError::NoActiveQuiz);
        }

        for question in &self.questions {
            question.validate().map_err(|e| {
                AppError::LoadFailure(format!("invalid question '{}': {}", question.id, e))
            })?;
        }

        Ok(())
    }
}

/// The question list as the quizzes collection stores it: either an embedded
/// array or a JSON string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StoredQuestions {
    Structured(Vec<Question>),
    Serialized(String),
}

impl StoredQuestions {
    pub fn decode(self) -> AppResult<Vec<Question>> {
        match self {
            StoredQuestions::Structured(questions) => Ok(questions),
            StoredQuestions::Serialized(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }
}

/// Raw document shape of the quizzes collection. Seeded documents carry a
/// string `id`; documents inserted by hand may only have Mongo's `_id`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub questions: StoredQuestions,
    #[serde(default)]
    pub is_active: bool,
}

impl QuizDocument {
    /// The quiz id: the string `id` field when present, otherwise `_id`.
    pub fn quiz_id(&self) -> AppResult<String> {
        if let Some(id) = self.id.as_ref().filter(|id| !id.is_empty()) {
            return Ok(id.clone());
        }

        match &self.object_id {
            Some(Bson::ObjectId(oid)) => Ok(oid.to_hex()),
            Some(Bson::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Bson::Int32(n)) => Ok(n.to_string()),
            Some(Bson::Int64(n)) => Ok(n.to_string()),
            _ => Err(AppError::LoadFailure(format!(
                "quiz '{}' has no usable id",
                self.title
            ))),
        }
    }
}

impl TryFrom<QuizDocument> for Quiz {
    type Error = AppError;

    fn try_from(doc: QuizDocument) -> AppResult<Self> {
        Ok(Quiz {
            id: doc.quiz_id()?,
            questions: doc.questions.decode()?,
            title: doc.title,
            is_active: doc.is_active,
        })
    }
}
