//! Error types.
use core::fmt;

/// Result type with the [`Error`] of this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by sessions and the codec helpers.
///
/// Word arithmetic and the block function never fail; everything here is a
/// configuration or input problem caught before any data is touched.
#[derive(Copy, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Key material is not 32 bytes.
    InvalidKeyLength {
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// Nonce material is not 12 bytes.
    InvalidNonceLength {
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },

    /// Fewer double rounds than ChaCha20's 10 were requested.
    InsecureRoundCount {
        /// Requested double rounds
        requested: u8,
        /// Smallest accepted value
        minimum: u8,
    },

    /// The request would run the block counter past `2^32 - 1` and reuse
    /// keystream.
    KeystreamExhausted,

    /// Ciphertext is not valid hex.
    #[cfg(feature = "alloc")]
    Hex(hex::FromHexError),

    /// Decrypted bytes are not valid UTF-8.
    #[cfg(feature = "alloc")]
    Utf8(core::str::Utf8Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKeyLength { expected, actual } => {
                write!(f, "invalid key length: expected {expected} bytes, got {actual}")
            }
            Self::InvalidNonceLength { expected, actual } => {
                write!(f, "invalid nonce length: expected {expected} bytes, got {actual}")
            }
            Self::InsecureRoundCount { requested, minimum } => write!(
                f,
                "insecure round count: {requested} double rounds requested, at least {minimum} required"
            ),
            Self::KeystreamExhausted => f.write_str("keystream exhausted: block counter would wrap"),
            #[cfg(feature = "alloc")]
            Self::Hex(err) => write!(f, "invalid ciphertext hex: {err}"),
            #[cfg(feature = "alloc")]
            Self::Utf8(err) => write!(f, "decrypted text is not UTF-8: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Hex(err) => Some(err),
            Self::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<cipher::StreamCipherError> for Error {
    fn from(_: cipher::StreamCipherError) -> Self {
        Self::KeystreamExhausted
    }
}

#[cfg(feature = "alloc")]
impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Self::Hex(err)
    }
}

#[cfg(feature = "alloc")]
impl From<core::str::Utf8Error> for Error {
    fn from(err: core::str::Utf8Error) -> Self {
        Self::Utf8(err)
    }
}
