#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use faith_tribe_quiz::{
    errors::{AppError, AppResult},
    models::domain::{Question, Quiz, QuizDocument, QuizResult},
    repositories::{QuizRepository, QuizResultRepository},
};

/// Quizzes kept as raw documents so the stored-question decoding runs too.
#[derive(Default)]
pub struct InMemoryQuizRepository {
    documents: RwLock<Vec<QuizDocument>>,
    unavailable: RwLock<bool>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, document: QuizDocument) {
        self.documents.write().await.push(document);
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_active(&self) -> AppResult<Option<Quiz>> {
        if *self.unavailable.read().await {
            return Err(AppError::DatabaseError("server selection timeout".to_string()));
        }

        let documents = self.documents.read().await;
        documents
            .iter()
            .find(|d| d.is_active)
            .cloned()
            .map(Quiz::try_from)
            .transpose()
    }
}

#[derive(Default)]
pub struct InMemoryQuizResultRepository {
    results: RwLock<Vec<QuizResult>>,
    failing: RwLock<bool>,
}

impl InMemoryQuizResultRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    pub async fn all(&self) -> Vec<QuizResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryQuizResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        if *self.failing.read().await {
            return Err(AppError::DatabaseError("write failed".to_string()));
        }

        self.results.write().await.push(result.clone());
        Ok(result)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<QuizResult>> {
        let mut results: Vec<_> = self
            .results
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(results)
    }
}

pub fn origins_questions() -> Vec<Question> {
    vec![
        Question {
            id: "1".to_string(),
            text: "Who led the Israelites across the Red Sea?".to_string(),
            options: vec![
                "Joshua".to_string(),
                "Moses".to_string(),
                "Aaron".to_string(),
                "David".to_string(),
            ],
            correct_index: 1,
        },
        Question {
            id: "2".to_string(),
            text: "What is the collective name for Sunday School in RCCG?".to_string(),
            options: vec![
                "Junior Church".to_string(),
                "Zeal".to_string(),
                "Teens Church".to_string(),
                "Faith Club".to_string(),
            ],
            correct_index: 0,
        },
        Question {
            id: "3".to_string(),
            text: "The 'G' in RCCG stands for...".to_string(),
            options: vec![
                "Gospel".to_string(),
                "God".to_string(),
                "General".to_string(),
                "Glory".to_string(),
            ],
            correct_index: 1,
        },
    ]
}

/// The seeded "Faith Tribe Origins" quiz, with its questions stored as a JSON string.
pub fn origins_document(is_active: bool) -> QuizDocument {
    QuizDocument {
        object_id: None,
        id: Some("faith-tribe-origins".to_string()),
        title: "Faith Tribe Origins".to_string(),
        questions: faith_tribe_quiz::models::domain::StoredQuestions::Serialized(
            serde_json::to_string(&origins_questions()).expect("questions serialize"),
        ),
        is_active,
    }
}

pub struct Repositories {
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub results: Arc<InMemoryQuizResultRepository>,
}

pub fn repositories() -> Repositories {
    Repositories {
        quizzes: Arc::new(InMemoryQuizRepository::new()),
        results: Arc::new(InMemoryQuizResultRepository::new()),
    }
}
