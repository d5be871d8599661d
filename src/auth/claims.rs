use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::Identity;

/// Claims carried by the access tokens the auth provider issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (user id)
    pub name: String, // Display name shown on results
    pub exp: usize,   // Expiration time (as UTC timestamp)
    pub iat: usize,   // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(identity: &Identity, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: identity.id.clone(),
            name: identity.display_name.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Identity::new(&claims.sub, &claims.name)
    }
}
