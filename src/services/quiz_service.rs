use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Identity, Quiz, QuizResult},
    repositories::{QuizRepository, QuizResultRepository},
};

/// What a quiz session needs from the backing store.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// The single active quiz, decoded and ready to play.
    ///
    /// Fails with [`AppError::NoActiveQuiz`] when nothing is active or the
    /// active quiz has no questions, and [`AppError::LoadFailure`] for any
    /// transport or decoding problem.
    async fn fetch_active_quiz(&self) -> AppResult<Quiz>;

    /// Appends one result record for `identity`. Fails with
    /// [`AppError::Unauthenticated`] when there is no identity.
    async fn submit_result(
        &self,
        identity: Option<&Identity>,
        quiz_id: &str,
        score: u32,
        max_score: u32,
    ) -> AppResult<QuizResult>;
}

pub struct QuizService {
    quiz_repository: Arc<dyn QuizRepository>,
    result_repository: Arc<dyn QuizResultRepository>,
}

impl QuizService {
    pub fn new(
        quiz_repository: Arc<dyn QuizRepository>,
        result_repository: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            quiz_repository,
            result_repository,
        }
    }

    pub async fn results_for(&self, identity: &Identity) -> AppResult<Vec<QuizResult>> {
        self.result_repository.find_by_user(&identity.id).await
    }
}

#[async_trait]
impl QuizProvider for QuizService {
    async fn fetch_active_quiz(&self) -> AppResult<Quiz> {
        let quiz = self
            .quiz_repository
            .find_active()
            .await
            .map_err(|e| match e {
                AppError::LoadFailure(_) => e,
                other => AppError::LoadFailure(other.to_string()),
            })?
            .ok_or(AppError::NoActiveQuiz)?;

        quiz.ensure_playable()?;
        Ok(quiz)
    }

    async fn submit_result(
        &self,
        identity: Option<&Identity>,
        quiz_id: &str,
        score: u32,
        max_score: u32,
    ) -> AppResult<QuizResult> {
        let identity = identity.ok_or_else(|| {
            AppError::Unauthenticated("a signed-in user is required to save results".to_string())
        })?;

        let result = QuizResult::new(identity, quiz_id, score, max_score);
        self.result_repository
            .create(result)
            .await
            .map_err(|e| AppError::SubmissionFailure(e.to_string()))
    }
}
