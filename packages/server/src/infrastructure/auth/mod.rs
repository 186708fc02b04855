//! Credential verification for connections and HTTP requests.

pub mod jwt;

pub use jwt::{AuthError, Claims, JwtVerifier};
