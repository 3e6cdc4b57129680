//! Security and encryption primitives
//!
//! AEAD encryption of stored blobs (AES-256-GCM or ChaCha20-Poly1305),
//! Argon2id passphrase derivation, and the sealed-secret container handed
//! to platform keystores.

use crate::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm,
};
use argon2::{Argon2, ParamsBuilder, Version};
use chacha20poly1305::ChaCha20Poly1305;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Argon2id parameters: 64 MiB memory, 3 iterations, 4 lanes
pub const KDF_PARAMS: (u32, u32, u32) = (65536, 3, 4);

/// Minimum salt length accepted by the KDF
pub const MIN_SALT_LENGTH: usize = 16;

const FRAME_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = 2 + NONCE_LEN;

/// Encryption algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    /// AES-256-GCM
    AesGcm,
    /// ChaCha20-Poly1305
    ChaCha20Poly1305,
}

impl EncryptionAlgorithm {
    fn tag(&self) -> u8 {
        match self {
            EncryptionAlgorithm::AesGcm => 0,
            EncryptionAlgorithm::ChaCha20Poly1305 => 1,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(EncryptionAlgorithm::AesGcm),
            1 => Ok(EncryptionAlgorithm::ChaCha20Poly1305),
            other => Err(Error::Encryption(format!("Unknown algorithm tag {}", other))),
        }
    }
}

/// Symmetric key for field-level encryption
#[derive(Clone)]
pub struct MasterKey {
    key: Zeroizing<[u8; 32]>,
    algorithm: EncryptionAlgorithm,
}

impl MasterKey {
    /// Generate new random master key
    pub fn generate(algorithm: EncryptionAlgorithm) -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        Self {
            key: Zeroizing::new(key),
            algorithm,
        }
    }

    /// Create from bytes
    pub fn from_bytes(bytes: &[u8], algorithm: EncryptionAlgorithm) -> Result<Self> {
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Encryption("Invalid key length".to_string()))?;
        Ok(Self {
            key: Zeroizing::new(key),
            algorithm,
        })
    }

    /// Derive from a passphrase with Argon2id
    pub fn from_passphrase(
        passphrase: &str,
        salt: &[u8],
        algorithm: EncryptionAlgorithm,
    ) -> Result<Self> {
        let key = derive_key_bytes(passphrase, salt)?;
        Self::from_bytes(&key[..], algorithm)
    }

    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Get algorithm
    pub fn algorithm(&self) -> EncryptionAlgorithm {
        self.algorithm
    }

    /// Encrypt data
    ///
    /// Format: `[version(1)][algorithm(1)][nonce(12)][ciphertext]`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = match self.algorithm {
            EncryptionAlgorithm::AesGcm => Aes256Gcm::new(self.key.as_ref().into())
                .encrypt(aes_gcm::Nonce::from_slice(&nonce), plaintext),
            EncryptionAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new(self.key.as_ref().into())
                .encrypt(chacha20poly1305::Nonce::from_slice(&nonce), plaintext),
        }
        .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        out.push(FRAME_VERSION);
        out.push(self.algorithm.tag());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`Self::encrypt`]
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < HEADER_LEN {
            return Err(Error::Encryption("Invalid ciphertext length".to_string()));
        }
        if data[0] != FRAME_VERSION {
            return Err(Error::Encryption(format!(
                "Unsupported encryption version: {}",
                data[0]
            )));
        }
        let algorithm = EncryptionAlgorithm::from_tag(data[1])?;
        if algorithm != self.algorithm {
            return Err(Error::Encryption(format!(
                "Algorithm mismatch: key is {:?}, data is {:?}",
                self.algorithm, algorithm
            )));
        }

        let nonce = &data[2..HEADER_LEN];
        let ciphertext = &data[HEADER_LEN..];
        match algorithm {
            EncryptionAlgorithm::AesGcm => Aes256Gcm::new(self.key.as_ref().into())
                .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext),
            EncryptionAlgorithm::ChaCha20Poly1305 => ChaCha20Poly1305::new(self.key.as_ref().into())
                .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext),
        }
        .map_err(|e| Error::Encryption(e.to_string()))
    }
}

/// Derive raw key bytes from passphrase using Argon2id.
pub fn derive_key_bytes(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    if salt.len() < MIN_SALT_LENGTH {
        return Err(Error::Encryption("Salt too short".to_string()));
    }

    let params = ParamsBuilder::new()
        .m_cost(KDF_PARAMS.0)
        .t_cost(KDF_PARAMS.1)
        .p_cost(KDF_PARAMS.2)
        .output_len(32)
        .build()
        .map_err(|e| Error::Encryption(e.to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut *key)
        .map_err(|e| Error::Encryption(e.to_string()))?;
    Ok(key)
}

/// Secret sealed by a platform keystore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedKey {
    /// Sealed bytes (opaque to everything but the keystore)
    pub encrypted_key: Vec<u8>,
    /// Keystore key identifier
    pub key_id: String,
    /// Encryption algorithm
    pub algorithm: EncryptionAlgorithm,
}

impl SealedKey {
    /// Create new sealed key
    pub fn new(encrypted_key: Vec<u8>, key_id: String, algorithm: EncryptionAlgorithm) -> Self {
        Self {
            encrypted_key,
            key_id,
            algorithm,
        }
    }

    /// Serialize for storage
    ///
    /// Format: `[version(1)][algorithm(1)][id_len(4 LE)][id][key_len(4 LE)][key]`
    pub fn serialize(&self) -> Vec<u8> {
        let key_id = self.key_id.as_bytes();
        let mut data = Vec::with_capacity(10 + key_id.len() + self.encrypted_key.len());
        data.push(FRAME_VERSION);
        data.push(self.algorithm.tag());
        data.extend_from_slice(&(key_id.len() as u32).to_le_bytes());
        data.extend_from_slice(key_id);
        data.extend_from_slice(&(self.encrypted_key.len() as u32).to_le_bytes());
        data.extend_from_slice(&self.encrypted_key);
        data
    }

    /// Deserialize from storage
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader { data, pos: 0 };

        if reader.take(1)?[0] != FRAME_VERSION {
            return Err(Error::Encryption("Unknown sealed key version".to_string()));
        }
        let algorithm = EncryptionAlgorithm::from_tag(reader.take(1)?[0])?;

        let key_id_len = reader.take_len()?;
        let key_id = String::from_utf8(reader.take(key_id_len)?.to_vec())
            .map_err(|_| Error::Encryption("Invalid key ID".to_string()))?;

        let key_len = reader.take_len()?;
        let encrypted_key = reader.take(key_len)?.to_vec();

        if reader.pos != data.len() {
            return Err(Error::Encryption("Trailing bytes in sealed key".to_string()));
        }

        Ok(Self {
            encrypted_key,
            key_id,
            algorithm,
        })
    }
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::Encryption("Truncated sealed key data".to_string()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_len(&mut self) -> Result<usize> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    }
}

/// Generate secure random salt
pub fn generate_salt() -> [u8; 32] {
    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Hash data with SHA-256
pub fn hash_sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
