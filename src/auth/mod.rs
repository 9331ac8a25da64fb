//! Credential hashing and session tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{AuthError, Claims, TokenCodec, DEFAULT_TOKEN_TTL_SECS, TOKEN_ISSUER};
