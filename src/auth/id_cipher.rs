//! Encryption of primary keys exposed to clients.
//!
//! Ids leave the gateway as URL-safe base64 of `nonce || AES-256-GCM(id)`,
//! so clients never see sequential integers.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;

const PBKDF2_ITERATIONS: u32 = 100_000;
const NONCE_LEN: usize = 12;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdCipherError {
    #[error("id encryption failed")]
    Encryption,

    #[error("id decryption failed: {0}")]
    Decryption(&'static str),
}

/// Symmetric cipher for `i64` identifiers.
#[derive(Clone)]
pub struct IdCipher {
    cipher: Aes256Gcm,
}

impl IdCipher {
    /// Derive the AES key from `secret` and `salt` with PBKDF2-HMAC-SHA256.
    pub fn new(secret: &str, salt: &str) -> Self {
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    pub fn encrypt(&self, id: i64) -> Result<String, IdCipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), id.to_be_bytes().as_ref())
            .map_err(|_| IdCipherError::Encryption)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    pub fn decrypt(&self, token: &str) -> Result<i64, IdCipherError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| IdCipherError::Decryption("not base64"))?;
        if raw.len() <= NONCE_LEN {
            return Err(IdCipherError::Decryption("too short"));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| IdCipherError::Decryption("authentication failed"))?;

        let bytes: [u8; 8] = plain
            .as_slice()
            .try_into()
            .map_err(|_| IdCipherError::Decryption("bad length"))?;
        Ok(i64::from_be_bytes(bytes))
    }
}

impl std::fmt::Debug for IdCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdCipher").finish_non_exhaustive()
    }
}
