pub mod claims;
pub mod extractor;
pub mod jwt;

pub use claims::Claims;
pub use extractor::CallerIdentity;
pub use jwt::JwtService;
