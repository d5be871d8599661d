pub mod quiz_service;
pub mod quiz_session;
pub mod session_store;

pub use quiz_service::{QuizProvider, QuizService};
pub use quiz_session::{QuizSession, SessionPhase, SessionSnapshot, SubmissionOutcome};
pub use session_store::SessionStore;
