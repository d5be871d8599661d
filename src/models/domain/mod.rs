pub mod identity;
pub mod question;
pub mod quiz;
pub mod quiz_result;

pub use identity::Identity;
pub use question::Question;
pub use quiz::{Quiz, QuizDocument, StoredQuestions, POINTS_PER_QUESTION};
pub use quiz_result::QuizResult;
