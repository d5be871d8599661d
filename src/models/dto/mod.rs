pub mod request;
pub mod response;

pub use request::AnswerRequest;
pub use response::{AnswerResponse, ResultListResponse, SessionResponse};
