//! Authentication module for StoreLens.
//!
//! Password hashing, access tokens, id encryption and mail verification codes.

mod id_cipher;
mod password;
mod token;
mod verification;

pub use id_cipher::{IdCipher, IdCipherError};
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use token::{Claims, TokenIssuer};
pub use verification::VerificationStore;
