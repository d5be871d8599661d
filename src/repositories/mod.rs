pub mod quiz_repository;
pub mod quiz_result_repository;

pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use quiz_result_repository::{MongoQuizResultRepository, QuizResultRepository};

#[cfg(test)]
pub use quiz_repository::MockQuizRepository;
#[cfg(test)]
pub use quiz_result_repository::MockQuizResultRepository;
