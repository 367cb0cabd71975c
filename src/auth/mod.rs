pub mod claims;
pub mod jwt;

pub use claims::AccessClaims;
pub use jwt::JwtVerifier;
