//! One user's walk through the active quiz.
//!
//! `QuizSession` owns all per-session state and only moves forward:
//! `Loading -> Failed | Ready`, then per question `unanswered -> answered`,
//! and finally `Submitting -> Finished`. Every mutating call takes
//! `&mut self`, so while a load or the final submission is awaiting I/O
//! nothing else can touch the session.
//!
//! The result write runs on its own task. The session leaves `Ready` before
//! the write is awaited and keeps the task handle while `Submitting`, so a
//! caller that goes away mid-write neither cancels it nor gets a second one.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Identity, Question, Quiz, QuizResult, POINTS_PER_QUESTION},
    services::quiz_service::QuizProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Loading,
    Failed,
    Ready,
    Submitting,
    Finished,
}

/// What happened to the result write at the end of the session. A failed
/// write does not stop the session from finishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Saved { result_id: String },
    Failed { reason: String },
}

impl SubmissionOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmissionOutcome::Saved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_index: usize,
    pub score: u32,
}

#[derive(Debug)]
struct Progress {
    quiz: Quiz,
    current_index: usize,
    selected_answer: Option<usize>,
    score: u32,
}

impl Progress {
    fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            current_index: 0,
            selected_answer: None,
            score: 0,
        }
    }

    fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current_index]
    }

    fn is_revealed(&self) -> bool {
        self.selected_answer.is_some()
    }

    fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.quiz.question_count()
    }
}

#[derive(Debug)]
enum SessionState {
    Loading,
    Failed(AppError),
    Ready(Progress),
    Submitting(Progress, JoinHandle<AppResult<QuizResult>>),
    Finished(Progress, SubmissionOutcome),
}

pub struct QuizSession {
    provider: Arc<dyn QuizProvider>,
    identity: Option<Identity>,
    state: SessionState,
}

impl QuizSession {
    /// A fresh session in the `Loading` phase. `identity` is who the result
    /// will be saved for; `None` plays anonymously and the final write fails.
    pub fn new(provider: Arc<dyn QuizProvider>, identity: Option<Identity>) -> Self {
        Self {
            provider,
            identity,
            state: SessionState::Loading,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Anonymous sessions are open to anyone; owned ones only to a caller
    /// with the owner's user id.
    pub fn is_visible_to(&self, caller: Option<&Identity>) -> bool {
        match &self.identity {
            None => true,
            Some(owner) => caller.is_some_and(|caller| caller.id == owner.id),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            SessionState::Loading => SessionPhase::Loading,
            SessionState::Failed(_) => SessionPhase::Failed,
            SessionState::Ready(_) => SessionPhase::Ready,
            SessionState::Submitting(..) => SessionPhase::Submitting,
            SessionState::Finished(..) => SessionPhase::Finished,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.progress().map(|p| p.score).unwrap_or(0)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.progress().map(|p| p.current_index)
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.progress().and_then(|p| p.selected_answer)
    }

    pub fn submission(&self) -> Option<&SubmissionOutcome> {
        match &self.state {
            SessionState::Finished(_, outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Fetches the active quiz. Allowed from `Loading` and, as a manual
    /// retry, from `Failed`.
    pub async fn load_quiz(&mut self) -> AppResult<()> {
        if matches!(
            self.state,
            SessionState::Ready(_) | SessionState::Submitting(..) | SessionState::Finished(..)
        ) {
            return Err(AppError::InvalidAction("quiz is already loaded".to_string()));
        }

        self.state = SessionState::Loading;

        let loaded = self
            .provider
            .fetch_active_quiz()
            .await
            .and_then(|quiz| quiz.ensure_playable().map(|_| quiz));

        match loaded {
            Ok(quiz) => {
                log::info!(
                    "Loaded quiz '{}' ({}) with {} questions",
                    quiz.title,
                    quiz.id,
                    quiz.question_count()
                );
                self.state = SessionState::Ready(Progress::new(quiz));
                Ok(())
            }
            Err(err) => {
                let err = match err {
                    AppError::NoActiveQuiz | AppError::LoadFailure(_) => err,
                    other => AppError::LoadFailure(other.to_string()),
                };
                log::warn!("Quiz load failed: {}", err);
                self.state = SessionState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Records the answer to the current question and reveals whether it was
    /// right. A question can be answered once; later calls change nothing.
    pub fn answer(&mut self, option_index: usize) -> AppResult<AnswerFeedback> {
        let progress = self.progress_mut()?;

        if progress.is_revealed() {
            return Err(AppError::InvalidAction(format!(
                "question {} has already been answered",
                progress.current_index + 1
            )));
        }

        let question = progress.current_question();
        if !question.has_option(option_index) {
            return Err(AppError::InvalidAction(format!(
                "option {} is out of range for a question with {} options",
                option_index,
                question.options.len()
            )));
        }

        let correct = question.is_correct(option_index);
        let correct_index = question.correct_index;

        progress.selected_answer = Some(option_index);
        if correct {
            progress.score += POINTS_PER_QUESTION;
        }

        Ok(AnswerFeedback {
            correct,
            correct_index,
            score: progress.score,
        })
    }

    /// Moves past the answered question. After the last question the result
    /// is submitted and the session finishes, whether or not the write worked.
    /// Calling it again while `Submitting` waits for the pending write.
    pub async fn advance(&mut self) -> AppResult<SessionPhase> {
        if let SessionState::Submitting(..) = self.state {
            return self.finish_submission().await;
        }

        let progress = self.progress_mut()?;

        if !progress.is_revealed() {
            return Err(AppError::InvalidAction(
                "answer the current question before moving on".to_string(),
            ));
        }

        if !progress.is_last_question() {
            progress.current_index += 1;
            progress.selected_answer = None;
            return Ok(SessionPhase::Ready);
        }

        self.state = match std::mem::replace(&mut self.state, SessionState::Loading) {
            SessionState::Ready(progress) => {
                let write = self.submit_result(&progress);
                SessionState::Submitting(progress, write)
            }
            other => other,
        };

        self.finish_submission().await
    }

    fn submit_result(&self, progress: &Progress) -> JoinHandle<AppResult<QuizResult>> {
        let provider = Arc::clone(&self.provider);
        let identity = self.identity.clone();
        let quiz_id = progress.quiz.id.clone();
        let score = progress.score;
        let max_score = progress.quiz.max_score();

        tokio::spawn(async move {
            provider
                .submit_result(identity.as_ref(), &quiz_id, score, max_score)
                .await
        })
    }

    async fn finish_submission(&mut self) -> AppResult<SessionPhase> {
        let SessionState::Submitting(progress, write) = &mut self.state else {
            return Err(AppError::InvalidAction(
                "no result is being submitted".to_string(),
            ));
        };

        let quiz_id = progress.quiz.id.clone();
        let outcome = match write.await {
            Ok(Ok(result)) => SubmissionOutcome::Saved {
                result_id: result.id,
            },
            Ok(Err(err)) => {
                log::warn!("Result for quiz {} was not saved: {}", quiz_id, err);
                SubmissionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
            Err(err) => {
                log::error!("Result write for quiz {} did not complete: {}", quiz_id, err);
                SubmissionOutcome::Failed {
                    reason: format!("result write did not complete: {}", err),
                }
            }
        };

        self.state = match std::mem::replace(&mut self.state, SessionState::Loading) {
            SessionState::Submitting(progress, _) => {
                log::info!(
                    "Quiz {} finished with {}/{}",
                    quiz_id,
                    progress.score,
                    progress.quiz.max_score()
                );
                SessionState::Finished(progress, outcome)
            }
            other => other,
        };

        Ok(SessionPhase::Finished)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot {
            phase: self.phase(),
            quiz_id: None,
            quiz_title: None,
            question_number: None,
            question_count: 0,
            question: None,
            score: 0,
            max_score: 0,
            error: self.error().map(|e| e.to_string()),
            submission: self.submission().cloned(),
        };

        if let Some(progress) = self.progress() {
            snapshot.quiz_id = Some(progress.quiz.id.clone());
            snapshot.quiz_title = Some(progress.quiz.title.clone());
            snapshot.question_count = progress.quiz.question_count();
            snapshot.score = progress.score;
            snapshot.max_score = progress.quiz.max_score();

            if let SessionState::Ready(_) = self.state {
                snapshot.question_number = Some(progress.current_index + 1);
                snapshot.question = Some(QuestionView::new(
                    progress.current_question(),
                    progress.selected_answer,
                ));
            }
        }

        snapshot
    }

    fn progress(&self) -> Option<&Progress> {
        match &self.state {
            SessionState::Ready(progress)
            | SessionState::Submitting(progress, _)
            | SessionState::Finished(progress, _) => Some(progress),
            _ => None,
        }
    }

    fn progress_mut(&mut self) -> AppResult<&mut Progress> {
        match &mut self.state {
            SessionState::Ready(progress) => Ok(progress),
            SessionState::Submitting(..) => Err(AppError::InvalidAction(
                "the result is being submitted".to_string(),
            )),
            SessionState::Finished(..) => Err(AppError::InvalidAction(
                "quiz is already finished".to_string(),
            )),
            SessionState::Loading | SessionState::Failed(_) => Err(AppError::InvalidAction(
                "no quiz is loaded".to_string(),
            )),
        }
    }
}

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_number: Option<usize>,
    pub question_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    pub score: u32,
    pub max_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionOutcome>,
}

/// The current question. The answer key stays hidden until it is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
}

impl QuestionView {
    fn new(question: &Question, selected_answer: Option<usize>) -> Self {
        let revealed = selected_answer.is_some();
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            options: question.options.clone(),
            revealed,
            selected_answer,
            correct_index: revealed.then_some(question.correct_index),
        }
    }
}
