//! Conversions at the edges of a [`Session`][crate::Session]: raw key and
//! nonce material in, and (with the `alloc` feature) hex ciphertext and UTF-8
//! plaintext through.

use crate::{Error, KEY_SIZE, Key, NONCE_SIZE, Nonce, Result};

#[cfg(feature = "alloc")]
use {
    crate::Session,
    alloc::{string::String, vec::Vec},
};

/// How key and nonce material of the wrong size is treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LengthPolicy {
    /// Reject anything but exactly 32 key bytes and 12 nonce bytes.
    #[default]
    Strict,

    /// Zero-pad short material and truncate long material.
    ///
    /// Meant for interoperating with systems that derive keys from text;
    /// a padded key is weaker than its 32 bytes suggest.
    PadOrTruncate,
}

/// Build a key from raw material.
///
/// # Errors
///
/// [`Error::InvalidKeyLength`] if `material` is not 32 bytes and `policy` is
/// [`LengthPolicy::Strict`].
pub fn key_from_material(material: &[u8], policy: LengthPolicy) -> Result<Key> {
    fit::<KEY_SIZE>(material, policy, "key")
        .map(Key::from)
        .ok_or(Error::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: material.len(),
        })
}

/// Build a nonce from raw material.
///
/// # Errors
///
/// [`Error::InvalidNonceLength`] if `material` is not 12 bytes and `policy`
/// is [`LengthPolicy::Strict`].
pub fn nonce_from_material(material: &[u8], policy: LengthPolicy) -> Result<Nonce> {
    fit::<NONCE_SIZE>(material, policy, "nonce")
        .map(Nonce::from)
        .ok_or(Error::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: material.len(),
        })
}

fn fit<const N: usize>(material: &[u8], policy: LengthPolicy, what: &str) -> Option<[u8; N]> {
    if let Ok(exact) = <[u8; N]>::try_from(material) {
        return Some(exact);
    }
    if policy == LengthPolicy::Strict {
        return None;
    }

    #[cfg(feature = "log")]
    log::warn!(
        "chacha20 {what} material is {} bytes, {} to {}",
        material.len(),
        if material.len() < N { "zero-padded" } else { "truncated" },
        N,
    );
    #[cfg(not(feature = "log"))]
    let _ = what;

    let mut out = [0u8; N];
    let n = material.len().min(N);
    out[..n].copy_from_slice(&material[..n]);
    Some(out)
}

/// Encrypt UTF-8 text and return the ciphertext as lowercase hex.
///
/// # Errors
///
/// [`Error::KeystreamExhausted`] as for [`Session::process`].
#[cfg(feature = "alloc")]
pub fn encrypt_to_hex(session: &mut Session, plaintext: &str) -> Result<String> {
    let mut buf = Vec::from(plaintext.as_bytes());
    session.encrypt(&mut buf)?;
    Ok(hex::encode(buf))
}

/// Decrypt hex ciphertext and return the plaintext as UTF-8 text.
///
/// Surrounding whitespace is ignored; either hex case is accepted.
///
/// # Errors
///
/// - [`Error::Hex`] if `ciphertext` is not valid hex
/// - [`Error::Utf8`] if the decrypted bytes are not UTF-8
/// - [`Error::KeystreamExhausted`] as for [`Session::process`]
#[cfg(feature = "alloc")]
pub fn decrypt_from_hex(session: &mut Session, ciphertext: &str) -> Result<String> {
    let mut buf = hex::decode(ciphertext.trim())?;
    session.decrypt(&mut buf)?;
    String::from_utf8(buf).map_err(|err| Error::Utf8(err.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_lengths() {
        assert_eq!(key_from_material(&[1; 32], LengthPolicy::Strict), Ok(Key::from([1; 32])));
        assert_eq!(
            key_from_material(b"password", LengthPolicy::Strict),
            Err(Error::InvalidKeyLength {
                expected: 32,
                actual: 8
            })
        );
        assert_eq!(
            nonce_from_material(&[0; 13], LengthPolicy::default()),
            Err(Error::InvalidNonceLength {
                expected: 12,
                actual: 13
            })
        );
    }

    #[test]
    fn pad_or_truncate() {
        let key = key_from_material(b"password", LengthPolicy::PadOrTruncate).unwrap();
        assert_eq!(&key[..8], b"password");
        assert_eq!(key[8..], [0u8; 24]);

        let nonce = nonce_from_material(b"0123456789abcdef", LengthPolicy::PadOrTruncate).unwrap();
        assert_eq!(nonce.as_slice(), b"0123456789ab");

        let empty = nonce_from_material(&[], LengthPolicy::PadOrTruncate).unwrap();
        assert_eq!(empty, Nonce::default());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn hex_text_roundtrip() {
        let key = [0x11; 32];
        let nonce = [0x22; 12];
        let text = "Привет, ChaCha20";

        let mut enc = Session::new(&key.into(), &nonce.into());
        let ciphertext = encrypt_to_hex(&mut enc, text).unwrap();
        assert_eq!(ciphertext.len(), 2 * text.len());
        assert!(ciphertext.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));

        let mut dec = Session::new(&key.into(), &nonce.into());
        let padded = alloc::format!("  {}\n", ciphertext.to_uppercase());
        assert_eq!(decrypt_from_hex(&mut dec, &padded).unwrap(), text);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn hex_errors() {
        let mut session = Session::new(&[0; 32].into(), &[0; 12].into());
        assert_eq!(
            decrypt_from_hex(&mut session, "abc"),
            Err(Error::Hex(hex::FromHexError::OddLength))
        );
        assert!(matches!(
            decrypt_from_hex(&mut session, "zz"),
            Err(Error::Hex(hex::FromHexError::InvalidHexCharacter { c: 'z', index: 0 }))
        ));
        // a failed decode consumes no keystream
        assert_eq!(session.counter(), 0);
    }
}
