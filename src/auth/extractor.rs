use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};

use crate::{
    auth::JwtService,
    errors::{AppError, AppResult},
    models::domain::Identity,
};

/// The caller's identity if a bearer token was sent. A missing header is an
/// anonymous caller; a malformed or invalid token is rejected.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Option<Identity>);

impl CallerIdentity {
    fn extract(req: &HttpRequest) -> AppResult<Self> {
        let Some(header) = req.headers().get(AUTHORIZATION) else {
            return Ok(CallerIdentity(None));
        };

        let jwt_service = req
            .app_data::<web::Data<JwtService>>()
            .ok_or_else(|| AppError::InternalError("JWT service not configured".to_string()))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthenticated("Invalid authorization header format".to_string())
            })?;

        let claims = jwt_service.validate_token(token)?;
        Ok(CallerIdentity(Some(Identity::from(&claims))))
    }
}

impl FromRequest for CallerIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}
