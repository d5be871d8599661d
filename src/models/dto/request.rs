use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnswerRequest {
    pub option_index: usize,
}
