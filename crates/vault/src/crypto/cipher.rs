//! AES-256-CBC encryption and decryption of document payloads.
//!
//! Every call derives the document key afresh and, on encryption, draws a new
//! 16-byte IV from the OS CSPRNG, so the same plaintext never produces the same
//! envelope twice even though the key is deterministic.

use std::{fmt, str::FromStr};

use aes::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut,
    KeyIvInit,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

use super::key::KeyDeriver;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Byte length of the CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// Separator between the IV and ciphertext fields of an envelope.
pub const DELIMITER: char = ':';

/// Errors produced by the cipher layer.
///
/// The two variants are kept apart for diagnostics only; the service boundary
/// reports both as a single decryption failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The envelope string does not have the `<iv hex>:<ciphertext hex>` shape.
    #[error("invalid envelope format: {0}")]
    Format(&'static str),

    /// The cipher or PKCS#7 unpadding rejected the input. Usually a key
    /// derived from the wrong identifier.
    #[error("decryption rejected: {0}")]
    Decryption(&'static str),
}

/// A parsed ciphertext envelope.
///
/// The string representation is `hex(iv):hex(ciphertext)` and is persisted
/// verbatim, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            hex::encode(self.iv),
            DELIMITER,
            hex::encode(&self.ciphertext)
        )
    }
}

impl FromStr for Envelope {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(DELIMITER).collect();
        let [iv_hex, ciphertext_hex] = fields.as_slice() else {
            return Err(CipherError::Format(
                "expected exactly two ':'-separated fields",
            ));
        };

        let iv = hex::decode(iv_hex)
            .map_err(|_| CipherError::Format("IV is not valid hex"))?
            .try_into()
            .map_err(|_| CipherError::Format("IV must decode to 16 bytes"))?;

        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|_| CipherError::Format("ciphertext is not valid hex"))?;

        Ok(Self { iv, ciphertext })
    }
}

/// Encrypts and decrypts document payloads under per-document derived keys.
#[derive(Clone, Debug)]
pub struct CipherCodec {
    keys: KeyDeriver,
}

impl CipherCodec {
    pub fn new(keys: KeyDeriver) -> Self {
        Self { keys }
    }

    /// Encrypt `plaintext` for the document `identifier`.
    ///
    /// An empty plaintext short-circuits to an empty string; no envelope is
    /// produced for it.
    pub fn encrypt(&self, plaintext: &str, identifier: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, identifier, iv).to_string()
    }

    /// Decrypt an envelope previously produced by [`CipherCodec::encrypt`].
    ///
    /// An empty envelope decrypts to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Format`] if the envelope is malformed and
    /// [`CipherError::Decryption`] if the cipher rejects it, which is what
    /// happens when `identifier` differs from the one used to encrypt.
    pub fn decrypt(&self, envelope: &str, identifier: &str) -> Result<String, CipherError> {
        if envelope.is_empty() {
            return Ok(String::new());
        }

        let envelope: Envelope = envelope.parse()?;
        let key = self.keys.derive(identifier);

        let plaintext = Aes256CbcDec::new(
            GenericArray::from_slice(key.as_bytes()),
            GenericArray::from_slice(&envelope.iv),
        )
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| CipherError::Decryption("bad padding or truncated ciphertext"))?;

        String::from_utf8(plaintext)
            .map_err(|_| CipherError::Decryption("plaintext is not valid UTF-8"))
    }

    fn encrypt_with_iv(&self, plaintext: &str, identifier: &str, iv: [u8; IV_LEN]) -> Envelope {
        let key = self.keys.derive(identifier);
        let ciphertext = Aes256CbcEnc::new(
            GenericArray::from_slice(key.as_bytes()),
            GenericArray::from_slice(&iv),
        )
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Envelope { iv, ciphertext }
    }
}
