//! Credentials and session tokens.
//!
//! Passwords are stored as argon2 PHC strings. Sessions are stateless
//! HMAC-SHA256 JWTs whose subject is the user id.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{SessionClaims, TokenService};

/// Why a credential or token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Invalid signing key: {0}")]
    Key(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub type AuthResult<T> = Result<T, AuthError>;
