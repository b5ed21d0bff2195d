//! AES-256-GCM string encryption.
//!
//! Ciphertexts are base64 strings. The default mode generates a fresh
//! 12-byte nonce per call and prepends it to the ciphertext. The legacy
//! library encrypted everything under an all-zero nonce with no prefix,
//! which makes equal plaintexts encrypt identically under the same key;
//! [`NonceMode::Zero`] keeps that wire format readable and writable for
//! data already at rest, and nothing new should use it.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::{Error, Result};

const NONCE_SIZE: usize = 12;

/// Nonce strategy for [`StringCipher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceMode {
    /// Fresh random nonce per call, prepended to the ciphertext.
    Random,
    /// All-zero nonce, bare ciphertext. Compatible with data written by
    /// the legacy library only.
    Zero,
}

/// Symmetric string encryptor over a 32-byte key.
pub struct StringCipher {
    cipher: Aes256Gcm,
    mode: NonceMode,
}

impl StringCipher {
    /// Create a cipher with the random-nonce mode.
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_mode(key, NonceMode::Random)
    }

    /// Create a cipher with an explicit nonce mode.
    pub fn with_mode(key: &[u8], mode: NonceMode) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| Error::Crypto(format!("invalid key length: {}", key.len())))?;
        Ok(Self { cipher, mode })
    }

    /// Encrypt a string, returning base64 ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        match self.mode {
            NonceMode::Random => {
                let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
                let ciphertext = self
                    .cipher
                    .encrypt(&nonce, plaintext.as_bytes())
                    .map_err(|e| Error::Crypto(format!("encryption failed: {}", e)))?;

                let mut output = nonce.to_vec();
                output.extend_from_slice(&ciphertext);
                Ok(STANDARD.encode(output))
            }
            NonceMode::Zero => {
                let zero = [0u8; NONCE_SIZE];
                let ciphertext = self
                    .cipher
                    .encrypt(Nonce::from_slice(&zero), plaintext.as_bytes())
                    .map_err(|e| Error::Crypto(format!("encryption failed: {}", e)))?;
                Ok(STANDARD.encode(ciphertext))
            }
        }
    }

    /// Decrypt a base64 ciphertext produced by [`encrypt`](Self::encrypt)
    /// under the same mode.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| Error::Crypto(format!("invalid base64 ciphertext: {}", e)))?;

        let plaintext = match self.mode {
            NonceMode::Random => {
                if data.len() <= NONCE_SIZE {
                    return Err(Error::Crypto(
                        "ciphertext too short to contain nonce".to_string(),
                    ));
                }
                let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
                self.cipher
                    .decrypt(Nonce::from_slice(nonce), ciphertext)
                    .map_err(|e| Error::Crypto(format!("decryption failed: {}", e)))?
            }
            NonceMode::Zero => {
                let zero = [0u8; NONCE_SIZE];
                self.cipher
                    .decrypt(Nonce::from_slice(&zero), data.as_slice())
                    .map_err(|e| Error::Crypto(format!("decryption failed: {}", e)))?
            }
        };

        String::from_utf8(plaintext).map_err(|e| Error::Crypto(format!("invalid UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"01234567890123456789012345678901";
    const EMAIL: &str = "test@mail.hu";

    #[test]
    fn round_trips_with_random_nonce() {
        let cipher = StringCipher::new(KEY).unwrap();
        let encrypted = cipher.encrypt(EMAIL).unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), EMAIL);
    }

    #[test]
    fn random_mode_differs_across_calls() {
        let cipher = StringCipher::new(KEY).unwrap();
        let first = cipher.encrypt(EMAIL).unwrap();
        let second = cipher.encrypt(EMAIL).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn round_trips_with_zero_nonce() {
        let cipher = StringCipher::with_mode(KEY, NonceMode::Zero).unwrap();
        let encrypted = cipher.encrypt(EMAIL).unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), EMAIL);
    }

    #[test]
    fn zero_mode_is_deterministic() {
        let cipher = StringCipher::with_mode(KEY, NonceMode::Zero).unwrap();
        assert_eq!(cipher.encrypt(EMAIL).unwrap(), cipher.encrypt(EMAIL).unwrap());
    }

    #[test]
    fn rejects_short_key() {
        assert!(matches!(
            StringCipher::new(b"too-short"),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let cipher = StringCipher::new(KEY).unwrap();
        let encrypted = cipher.encrypt(EMAIL).unwrap();
        let mut data = STANDARD.decode(&encrypted).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        let tampered = STANDARD.encode(data);
        assert!(matches!(cipher.decrypt(&tampered), Err(Error::Crypto(_))));
    }

    #[test]
    fn wrong_mode_fails_to_decrypt() {
        let zero = StringCipher::with_mode(KEY, NonceMode::Zero).unwrap();
        let random = StringCipher::new(KEY).unwrap();
        let encrypted = zero.encrypt(EMAIL).unwrap();
        assert!(random.decrypt(&encrypted).is_err());
    }
}
