//! Secret processor, cipher path
//!
//! Implements the JCE-style transformations the fixtures exercise:
//! `DES/CBC/PKCS5Padding` and `DESede/ECB/PKCS5Padding` (plus the other two
//! algorithm/mode combinations, since the transformation string is
//! configurable). DES and 3DES are broken ciphers; using them is the
//! vulnerability these fixtures present to scanners, so they are exactly what
//! gets implemented.
//!
//! Key and IV material is generated fresh per request from the OS RNG and is
//! never persisted or reused. PKCS5 and PKCS7 padding coincide on the 8-byte
//! DES block, so `Pkcs7` is the padding used throughout.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;
use crate::extract::RequestValue;

/// Stream-mode inputs are read into a fixed 1000-byte buffer and truncated to
/// the length actually read.
pub const MAX_STREAM_BYTES: usize = 1000;

/// Advisory written when a stream-mode route is invoked with no body to read.
/// This is a deliberate short-circuit, not an error: a stream body is only
/// meaningful on a verb that carries one.
pub const STREAM_REQUIRES_POST: &str =
    "This input source requires a POST, not a GET. Incompatible UI for the InputStream source.";

/// DES block size; also the IV length for CBC mode.
pub const BLOCK_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Des,
    DesEde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Cbc,
}

/// A parsed `algorithm/mode/padding` transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSpec {
    pub algorithm: Algorithm,
    pub mode: Mode,
}

impl CipherSpec {
    /// Required key length in bytes: 8 for DES, 24 for three-key 3DES.
    pub fn key_len(&self) -> usize {
        match self.algorithm {
            Algorithm::Des => 8,
            Algorithm::DesEde => 24,
        }
    }

    /// Whether this transformation takes an IV.
    pub fn needs_iv(&self) -> bool {
        self.mode == Mode::Cbc
    }
}

impl std::str::FromStr for CipherSpec {
    type Err = CryptoError;

    /// Parse a JCE transformation string such as `DESede/ECB/PKCS5Padding`.
    /// The padding token is matched case-insensitively because the source
    /// corpus carries both `PKCS5Padding` and `PKCS5PADDING` spellings.
    fn from_str(transformation: &str) -> Result<Self, Self::Err> {
        let mut parts = transformation.split('/');
        let (alg, mode, padding) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(alg), Some(mode), Some(padding), None) => (alg, mode, padding),
            _ => return Err(CryptoError::NoSuchAlgorithm(transformation.to_string())),
        };

        let algorithm = match alg {
            "DES" => Algorithm::Des,
            "DESede" => Algorithm::DesEde,
            _ => return Err(CryptoError::NoSuchAlgorithm(transformation.to_string())),
        };
        let mode = match mode {
            "ECB" => Mode::Ecb,
            "CBC" => Mode::Cbc,
            _ => return Err(CryptoError::NoSuchAlgorithm(transformation.to_string())),
        };
        if !padding.eq_ignore_ascii_case("PKCS5Padding") {
            return Err(CryptoError::NoSuchPadding(padding.to_string()));
        }

        Ok(CipherSpec { algorithm, mode })
    }
}

/// Per-request key material. Generated fresh on every invocation; dropped
/// when the request completes.
#[derive(Clone)]
pub struct KeyMaterial {
    pub key: Vec<u8>,
    pub iv: Option<[u8; BLOCK_SIZE]>,
}

impl KeyMaterial {
    /// IV as a borrowed slice, if the transformation takes one.
    pub fn iv_slice(&self) -> Option<&[u8]> {
        self.iv.as_ref().map(|iv| iv.as_slice())
    }
}

/// Generate a fresh key (and, for CBC, a fresh 8-byte IV) from the OS CSPRNG.
pub fn generate_key_material(spec: &CipherSpec) -> KeyMaterial {
    let mut key = vec![0u8; spec.key_len()];
    OsRng.fill_bytes(&mut key);

    let iv = if spec.needs_iv() {
        let mut iv = [0u8; BLOCK_SIZE];
        OsRng.fill_bytes(&mut iv);
        Some(iv)
    } else {
        None
    };

    KeyMaterial { key, iv }
}

/// Bytes handed to the cipher, or the stream-mode short-circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherInput {
    Ready(Vec<u8>),
    /// Stream source had nothing to read: answer with [`STREAM_REQUIRES_POST`]
    /// and perform no encryption and no log write.
    RequiresPost,
}

/// Derive the cipher input from an extracted request value.
///
/// Text values contribute their UTF-8 bytes unchanged (the empty string
/// included). Stream values are capped at [`MAX_STREAM_BYTES`]; an empty
/// stream short-circuits. When no value was captured at all the input
/// defaults to the single byte `'?'`.
pub fn derive_cipher_input(value: Option<&RequestValue>) -> CipherInput {
    match value {
        Some(RequestValue::Text(text)) => CipherInput::Ready(text.as_bytes().to_vec()),
        Some(RequestValue::Stream(body)) => {
            if body.is_empty() {
                CipherInput::RequiresPost
            } else {
                let end = body.len().min(MAX_STREAM_BYTES);
                CipherInput::Ready(body[..end].to_vec())
            }
        }
        None => CipherInput::Ready(vec![b'?']),
    }
}

type DesEcbEnc = ecb::Encryptor<des::Des>;
type DesEcbDec = ecb::Decryptor<des::Des>;
type DesCbcEnc = cbc::Encryptor<des::Des>;
type DesCbcDec = cbc::Decryptor<des::Des>;
type TdesEcbEnc = ecb::Encryptor<des::TdesEde3>;
type TdesEcbDec = ecb::Decryptor<des::TdesEde3>;
type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;

fn check_material(spec: &CipherSpec, key: &[u8], iv: Option<&[u8]>) -> Result<(), CryptoError> {
    if key.len() != spec.key_len() {
        return Err(CryptoError::InvalidKey);
    }
    if spec.needs_iv() {
        match iv {
            Some(iv) if iv.len() == BLOCK_SIZE => {}
            _ => return Err(CryptoError::InvalidAlgorithmParameters),
        }
    }
    Ok(())
}

/// Encrypt `plaintext` under the given transformation with PKCS5 padding.
pub fn encrypt(
    spec: &CipherSpec,
    key: &[u8],
    iv: Option<&[u8]>,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_material(spec, key, iv)?;
    let ciphertext = match (spec.algorithm, spec.mode) {
        (Algorithm::Des, Mode::Ecb) => DesEcbEnc::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKey)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        (Algorithm::Des, Mode::Cbc) => {
            DesCbcEnc::new_from_slices(key, iv.unwrap_or_default())
                .map_err(|_| CryptoError::InvalidKey)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
        }
        (Algorithm::DesEde, Mode::Ecb) => TdesEcbEnc::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKey)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        (Algorithm::DesEde, Mode::Cbc) => {
            TdesCbcEnc::new_from_slices(key, iv.unwrap_or_default())
                .map_err(|_| CryptoError::InvalidKey)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
        }
    };
    Ok(ciphertext)
}

/// Decrypt and unpad a ciphertext produced by [`encrypt`]. Needed for the
/// round-trip correctness check; the fixture handlers themselves never
/// decrypt (they throw the key away with the request).
pub fn decrypt(
    spec: &CipherSpec,
    key: &[u8],
    iv: Option<&[u8]>,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_material(spec, key, iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::IllegalBlockSize);
    }
    let plaintext = match (spec.algorithm, spec.mode) {
        (Algorithm::Des, Mode::Ecb) => DesEcbDec::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKey)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        (Algorithm::Des, Mode::Cbc) => {
            DesCbcDec::new_from_slices(key, iv.unwrap_or_default())
                .map_err(|_| CryptoError::InvalidKey)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        }
        (Algorithm::DesEde, Mode::Ecb) => TdesEcbDec::new_from_slice(key)
            .map_err(|_| CryptoError::InvalidKey)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        (Algorithm::DesEde, Mode::Cbc) => {
            TdesCbcDec::new_from_slices(key, iv.unwrap_or_default())
                .map_err(|_| CryptoError::InvalidKey)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        }
    };
    plaintext.map_err(|_| CryptoError::BadPadding)
}
