use crate::errors::TransformError;
use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use bytes::Bytes;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

pub const BLOCK_SIZE: usize = 16;
pub const DEFAULT_KEY: [u8; 16] = *b"0123456789ABCDEF";
pub const DEFAULT_PAYLOAD: &[u8] = b"Hello World!\r\n";

static MODE_NAME: [&str; 3] = ["passthrough", "encrypt", "digest"];

/// How the fixed payload is turned into a response body. Chosen once at
/// startup.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Default)]
pub enum TransformMode {
    #[default]
    Passthrough = 0,
    /// `IV || AES-128-CBC(PKCS#7(payload))` with a fresh random IV per call
    Encrypt = 1,
    /// lowercase hex SHA-256 of the payload
    Digest = 2,
}

impl TransformMode {
    #[inline]
    pub fn as_str(self) -> &'static str {
        MODE_NAME[self as usize]
    }
}

impl Display for TransformMode {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone)]
pub struct Transform {
    mode: TransformMode,
    payload: Bytes,
    key: Bytes,
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transform")
            .field("mode", &self.mode)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

impl Transform {
    pub fn new(mode: TransformMode, payload: Bytes, key: [u8; 16]) -> Self {
        Self {
            mode,
            payload,
            key: Bytes::copy_from_slice(&key),
        }
    }

    /// Accepts keys of any length, so cipher setup can be made to fail.
    #[cfg(test)]
    pub(crate) fn with_raw_key(mode: TransformMode, payload: Bytes, key: &'static [u8]) -> Self {
        Self {
            mode,
            payload,
            key: Bytes::from_static(key),
        }
    }

    #[inline]
    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Produces the response body. Only `Encrypt` can fail.
    pub fn apply(&self) -> Result<Bytes, TransformError> {
        match self.mode {
            TransformMode::Passthrough => Ok(self.payload.clone()),
            TransformMode::Encrypt => encrypt_cbc(&self.payload, &self.key).map(Bytes::from),
            TransformMode::Digest => Ok(Bytes::from(digest_hex(&self.payload))),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(
            TransformMode::default(),
            Bytes::from_static(DEFAULT_PAYLOAD),
            DEFAULT_KEY,
        )
    }
}

/// Length of `len` bytes after PKCS#7 padding. Always adds at least one byte.
#[inline]
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

pub fn encrypt_cbc(plain: &[u8], key: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut out = vec![0u8; BLOCK_SIZE + padded_len(plain.len())];
    let (iv, cipher_text) = out.split_at_mut(BLOCK_SIZE);
    OsRng.try_fill_bytes(iv)?;

    let enc = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|e| TransformError::Cipher(e.to_string()))?;
    let written = enc
        .encrypt_padded_b2b_mut::<Pkcs7>(plain, cipher_text)
        .map_err(|_| TransformError::Padding)?
        .len();
    debug_assert_eq!(written, cipher_text.len());

    Ok(out)
}

pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
