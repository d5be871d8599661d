use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizRepository, MongoQuizResultRepository, QuizRepository, QuizResultRepository,
    },
    services::{quiz_service::QuizService, session_store::SessionStore},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub sessions: Arc<SessionStore>,
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: &Config) -> AppResult<Self> {
        let db = Database::connect(config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let result_repository = Arc::new(MongoQuizResultRepository::new(&db));
        result_repository.ensure_indexes().await?;

        let sessions = Arc::new(SessionStore::new(config.session_ttl, config.max_sessions));
        Arc::clone(&sessions).spawn_sweeper(config.session_sweep_interval);
        log::info!(
            "Quiz sessions expire after {}s idle (at most {} live)",
            config.session_ttl.as_secs(),
            config.max_sessions
        );

        let mut state = Self::with_repositories(quiz_repository, result_repository);
        state.sessions = sessions;
        state.db = Some(db);
        Ok(state)
    }

    /// State over arbitrary repositories, without a database handle or a
    /// background sweeper.
    pub fn with_repositories(
        quiz_repository: Arc<dyn QuizRepository>,
        result_repository: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            quiz_service: Arc::new(QuizService::new(quiz_repository, result_repository)),
            sessions: Arc::new(SessionStore::default()),
            db: None,
        }
    }
}
