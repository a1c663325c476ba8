//! AES-CBC encrypted containers for save files and regulation files.
//!
//! | Container                | Layout                                  | Padding |
//! |--------------------------|-----------------------------------------|---------|
//! | [`SaveContainer`]        | MD5 (16) + IV (16) + ciphertext         | None    |
//! | [`RegulationContainer`]  | IV (16) + ciphertext                    | PKCS#7  |
//!
//! The key length selects AES-128, AES-192 or AES-256.

use std::io::Cursor;

use aes::cipher::{
    block_padding::{NoPadding, Padding, Pkcs7},
    consts::U16,
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use aes::{Aes128, Aes192, Aes256};
use binrw::{helpers::until_eof, BinRead, BinWrite};
use md5::{Digest, Md5};
use rand::RngCore;
use tracing::{instrument, warn};

use crate::dcx::{self, Compression};
use crate::error::{Error, Result};

/// AES block size, also the size of every IV
pub const BLOCK_SIZE: usize = 16;

/// Key of Dark Souls III `.sl2` save entries
pub const DS3_SAVE_KEY: [u8; 16] = [
    0xFD, 0x46, 0x4D, 0x69, 0x5E, 0x69, 0xA3, 0x9A, 0x10, 0xE3, 0x19, 0xA7, 0xAC, 0xE8, 0xB7, 0xFA,
];

/// Key of the Dark Souls III regulation file
pub const DS3_REGULATION_KEY: [u8; 32] = *b"ds3#jn/8_7(rsY9pg55GFN7VFL#+3n/)";

/// Key of the Elden Ring regulation file
pub const ER_REGULATION_KEY: [u8; 32] = [
    0x99, 0xBF, 0xFC, 0x36, 0x6A, 0x6B, 0xC8, 0xC6, 0xF5, 0x82, 0x7D, 0x09, 0x36, 0x02, 0xD6, 0x76,
    0xC4, 0x28, 0x92, 0xA0, 0x1C, 0x20, 0x7F, 0xB0, 0x24, 0xD3, 0xAF, 0x4E, 0x49, 0x3F, 0xEF, 0x99,
];

macro_rules! with_cbc {
    ($mode:ident, $key:expr, $iv:expr, |$cipher:ident| $body:expr) => {
        match $key.len() {
            16 => {
                let $cipher = cbc::$mode::<Aes128>::new_from_slices($key, $iv)
                    .map_err(|_| Error::InvalidKeyLength($key.len()))?;
                $body
            }
            24 => {
                let $cipher = cbc::$mode::<Aes192>::new_from_slices($key, $iv)
                    .map_err(|_| Error::InvalidKeyLength($key.len()))?;
                $body
            }
            32 => {
                let $cipher = cbc::$mode::<Aes256>::new_from_slices($key, $iv)
                    .map_err(|_| Error::InvalidKeyLength($key.len()))?;
                $body
            }
            len => Err(Error::InvalidKeyLength(len)),
        }
    };
}

fn encrypt_cbc<P: Padding<U16>>(key: &[u8], iv: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    with_cbc!(Encryptor, key, iv, |cipher| Ok(
        cipher.encrypt_padded_vec_mut::<P>(data)
    ))
}

fn decrypt_cbc<P: Padding<U16>>(key: &[u8], iv: &[u8; BLOCK_SIZE], data: &[u8]) -> Result<Vec<u8>> {
    with_cbc!(Decryptor, key, iv, |cipher| cipher
        .decrypt_padded_vec_mut::<P>(data)
        .map_err(|_| Error::InvalidPadding))
}

fn check_aligned(data: &[u8]) -> Result<()> {
    if data.len() % BLOCK_SIZE == 0 {
        Ok(())
    } else {
        Err(Error::UnalignedData(data.len()))
    }
}

fn random_iv() -> [u8; BLOCK_SIZE] {
    let mut iv = [0; BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}

/// Encrypted save file entry
///
/// The checksum is an MD5 over the IV followed by the ciphertext. Encryption adds no padding, so
/// the plaintext must already be a whole number of blocks.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct SaveContainer {
    /// MD5 of the IV and ciphertext
    pub checksum: [u8; 16],

    /// Initialization vector
    pub iv: [u8; BLOCK_SIZE],

    /// Encrypted payload
    #[br(parse_with = until_eof)]
    pub ciphertext: Vec<u8>,
}

impl SaveContainer {
    /// Parses the container layout without decrypting.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let container = Self::read(&mut Cursor::new(data))?;
        check_aligned(&container.ciphertext)?;
        Ok(container)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// MD5 over the IV and ciphertext as they are now
    pub fn compute_checksum(&self) -> [u8; 16] {
        let mut hasher = Md5::new();
        hasher.update(self.iv);
        hasher.update(&self.ciphertext);

        let mut checksum = [0; 16];
        checksum.copy_from_slice(&hasher.finalize());
        checksum
    }

    /// Whether the stored checksum matches the contents
    pub fn checksum_matches(&self) -> bool {
        self.compute_checksum() == self.checksum
    }

    /// Encrypts `plain` under a fresh random IV.
    pub fn encrypt(plain: &[u8], key: &[u8]) -> Result<Self> {
        Self::encrypt_with_iv(plain, key, random_iv())
    }

    /// Encrypts `plain` under `iv` and computes the checksum.
    #[instrument(skip(plain, key), fields(len = plain.len()), err)]
    pub fn encrypt_with_iv(plain: &[u8], key: &[u8], iv: [u8; BLOCK_SIZE]) -> Result<Self> {
        check_aligned(plain)?;
        let mut container = SaveContainer {
            checksum: [0; 16],
            iv,
            ciphertext: encrypt_cbc::<NoPadding>(key, &iv, plain)?,
        };
        container.checksum = container.compute_checksum();
        Ok(container)
    }

    /// Decrypts the payload. The checksum is not verified.
    #[instrument(skip(self, key), fields(len = self.ciphertext.len()), err)]
    pub fn decrypt(&self, key: &[u8]) -> Result<Vec<u8>> {
        check_aligned(&self.ciphertext)?;
        decrypt_cbc::<NoPadding>(key, &self.iv, &self.ciphertext)
    }
}

/// Decrypts a save entry, warning when its checksum does not match.
pub fn decrypt_save(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let container = SaveContainer::from_bytes(data)?;
    if !container.checksum_matches() {
        warn!("save entry checksum does not match its contents");
    }
    container.decrypt(key)
}

/// Encrypts a save entry under a fresh IV.
pub fn encrypt_save(plain: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    SaveContainer::encrypt(plain, key)?.to_bytes()
}

/// Encrypted regulation file
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct RegulationContainer {
    /// Initialization vector
    pub iv: [u8; BLOCK_SIZE],

    /// PKCS#7 padded ciphertext
    #[br(parse_with = until_eof)]
    pub ciphertext: Vec<u8>,
}

impl RegulationContainer {
    /// Parses the container layout without decrypting.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(data))?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Encrypts `plain` under a fresh random IV.
    pub fn encrypt(plain: &[u8], key: &[u8]) -> Result<Self> {
        Self::encrypt_with_iv(plain, key, random_iv())
    }

    #[instrument(skip(plain, key), fields(len = plain.len()), err)]
    pub fn encrypt_with_iv(plain: &[u8], key: &[u8], iv: [u8; BLOCK_SIZE]) -> Result<Self> {
        Ok(RegulationContainer {
            iv,
            ciphertext: encrypt_cbc::<Pkcs7>(key, &iv, plain)?,
        })
    }

    /// Decrypts the payload and strips its padding.
    #[instrument(skip(self, key), fields(len = self.ciphertext.len()), err)]
    pub fn decrypt(&self, key: &[u8]) -> Result<Vec<u8>> {
        check_aligned(&self.ciphertext)?;
        decrypt_cbc::<Pkcs7>(key, &self.iv, &self.ciphertext)
    }
}

/// Decrypts a regulation file and unwraps the DCX inside it.
pub fn decrypt_regulation(data: &[u8], key: &[u8]) -> Result<(Vec<u8>, Compression)> {
    let plain = RegulationContainer::from_bytes(data)?.decrypt(key)?;
    dcx::decompress(&plain)
}

/// Wraps `data` with `compression` and encrypts it as a regulation file.
pub fn encrypt_regulation(data: &[u8], compression: Compression, key: &[u8]) -> Result<Vec<u8>> {
    let wrapped = dcx::compress(data, compression)?;
    RegulationContainer::encrypt(&wrapped, key)?.to_bytes()
}
