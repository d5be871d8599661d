use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single multiple-choice question. Stored with camelCase keys inside the
/// quiz document's question list.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_correct_index"))]
pub struct Question {
    #[validate(length(min = 1, message = "question id must not be empty"))]
    pub id: String,

    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub text: String,

    #[validate(length(min = 2, message = "a question needs at least two options"))]
    pub options: Vec<String>,

    pub correct_index: usize,
}

fn validate_correct_index(question: &Question) -> Result<(), ValidationError> {
    if question.correct_index < question.options.len() {
        Ok(())
    } else {
        let mut err = ValidationError::new("correct_index_out_of_range");
        err.message = Some(
            format!(
                "question '{}' has correct index {} but only {} options",
                question.id,
                question.correct_index,
                question.options.len()
            )
            .into(),
        );
        Err(err)
    }
}

impl Question {
    pub fn has_option(&self, option_index: usize) -> bool {
        option_index < self.options.len()
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }
}
