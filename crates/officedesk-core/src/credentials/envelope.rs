//! Passphrase-keyed, chunked encryption of the credential file.
//!
//! Layout:
//!
//! ```text
//! "ODPW" | version (1) | chunk size (u32 BE) | salt (16) | nonce (7) | chunks...
//! ```
//!
//! The key is derived with Argon2id. The plaintext is cut into fixed-size
//! chunks sealed with AES-256-GCM under the STREAM construction, so a
//! dropped, reordered or truncated chunk fails authentication.

use aes_gcm::aead::stream::{DecryptorBE32, EncryptorBE32};
use aes_gcm::{Aes256Gcm, KeyInit};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

const MAGIC: &[u8; 4] = b"ODPW";
const VERSION: u8 = 1;

/// Plaintext bytes per sealed chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

const SALT_LEN: usize = 16;
/// GCM nonce (12) minus the 5 bytes STREAM uses for counter and flag.
const STREAM_NONCE_LEN: usize = 7;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + 1 + 4 + SALT_LEN + STREAM_NONCE_LEN;

#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// The key derivation or cipher could not be set up at all.
    #[error("cipher backend unavailable: {0}")]
    Backend(String),

    /// The bytes are not a valid envelope for this passphrase.
    #[error("{0}")]
    Invalid(String),
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, EnvelopeError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|e| EnvelopeError::Backend(format!("Argon2id key derivation failed: {}", e)))?;
    Ok(key)
}

fn cipher(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, EnvelopeError> {
    let key = derive_key(passphrase, salt)?;
    Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| EnvelopeError::Backend(format!("invalid key length: {}", e)))
}

/// Encrypt with the default chunk size.
pub fn seal(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>, EnvelopeError> {
    seal_with_chunk_size(plaintext, passphrase, CHUNK_SIZE)
}

pub fn seal_with_chunk_size(
    plaintext: &[u8],
    passphrase: &str,
    chunk_size: usize,
) -> Result<Vec<u8>, EnvelopeError> {
    if chunk_size == 0 || u32::try_from(chunk_size).is_err() {
        return Err(EnvelopeError::Backend(format!(
            "unusable chunk size {}",
            chunk_size
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; STREAM_NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let aead = cipher(passphrase, &salt)?;
    let mut encryptor = EncryptorBE32::from_aead(aead, nonce.as_ref().into());

    let chunk_count = plaintext.len().div_ceil(chunk_size).max(1);
    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len() + chunk_count * TAG_LEN);
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(chunk_size as u32).to_be_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);

    let mut chunks = plaintext.chunks(chunk_size).peekable();
    if chunks.peek().is_none() {
        let empty: &[u8] = &[];
        let sealed = encryptor
            .encrypt_last(empty)
            .map_err(|e| EnvelopeError::Backend(format!("encryption failed: {}", e)))?;
        out.extend_from_slice(&sealed);
        return Ok(out);
    }

    while let Some(chunk) = chunks.next() {
        if chunks.peek().is_some() {
            let sealed = encryptor
                .encrypt_next(chunk)
                .map_err(|e| EnvelopeError::Backend(format!("encryption failed: {}", e)))?;
            out.extend_from_slice(&sealed);
        } else {
            let sealed = encryptor
                .encrypt_last(chunk)
                .map_err(|e| EnvelopeError::Backend(format!("encryption failed: {}", e)))?;
            out.extend_from_slice(&sealed);
            break;
        }
    }

    Ok(out)
}

/// Decrypt an envelope produced by `seal`.
pub fn open(sealed: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>, EnvelopeError> {
    if sealed.len() < HEADER_LEN + TAG_LEN {
        return Err(EnvelopeError::Invalid("file too short".to_string()));
    }
    let (header, body) = sealed.split_at(HEADER_LEN);
    if &header[..4] != MAGIC {
        return Err(EnvelopeError::Invalid("not an encrypted password file".to_string()));
    }
    if header[4] != VERSION {
        return Err(EnvelopeError::Invalid(format!(
            "unsupported file version {}",
            header[4]
        )));
    }

    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&header[5..9]);
    let chunk_size = u32::from_be_bytes(size_bytes) as usize;
    if chunk_size == 0 {
        return Err(EnvelopeError::Invalid("zero chunk size".to_string()));
    }
    let salt = &header[9..9 + SALT_LEN];
    let nonce = &header[9 + SALT_LEN..HEADER_LEN];

    let aead = cipher(passphrase, salt)?;
    let mut decryptor = DecryptorBE32::from_aead(aead, nonce.into());

    let mut plaintext = Zeroizing::new(Vec::with_capacity(body.len()));
    let mut chunks = body.chunks(chunk_size + TAG_LEN).peekable();
    while let Some(chunk) = chunks.next() {
        if chunks.peek().is_some() {
            let opened = Zeroizing::new(
                decryptor
                    .decrypt_next(chunk)
                    .map_err(|_| EnvelopeError::Invalid("wrong passphrase or corrupted data".to_string()))?,
            );
            plaintext.extend_from_slice(&opened);
        } else {
            let opened = Zeroizing::new(
                decryptor
                    .decrypt_last(chunk)
                    .map_err(|_| EnvelopeError::Invalid("wrong passphrase or corrupted data".to_string()))?,
            );
            plaintext.extend_from_slice(&opened);
            break;
        }
    }

    Ok(plaintext)
}
