use serde::{Deserialize, Serialize};

/// The authenticated user a session acts for.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(id: &str, display_name: &str) -> Self {
        Identity {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}
