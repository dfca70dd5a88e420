//! The 16-word ChaCha state.
//!
//! Held as named fields and laid out positionally only when handed to the
//! block function:
//!
//! ```text
//! cccccccc  cccccccc  cccccccc  cccccccc
//! kkkkkkkk  kkkkkkkk  kkkkkkkk  kkkkkkkk
//! kkkkkkkk  kkkkkkkk  kkkkkkkk  kkkkkkkk
//! bbbbbbbb  nnnnnnnn  nnnnnnnn  nnnnnnnn
//! ```
//!
//! c=constant k=key b=blockcount n=nonce

use crate::word::{Word, load_le};
use cipher::{
    consts::{U12, U32},
    generic_array::GenericArray,
};
use core::fmt;

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Key type: 256 bits.
pub type Key = GenericArray<u8, U32>;

/// Nonce type: 96 bits (IETF variant).
pub type Nonce = GenericArray<u8, U12>;

/// Size of a key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of a nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Number of 32-bit words in the ChaCha state
pub const STATE_WORDS: usize = 16;

/// Number of 32-bit words in the key
pub const KEY_WORDS: usize = 8;

/// Number of 32-bit words in the nonce
pub const NONCE_WORDS: usize = 3;

/// State initialization constant ("expand 32-byte k")
pub const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Index of the block counter in the positional layout
pub const COUNTER_INDEX: usize = 12;

/// ChaCha state: constants, key, block counter and nonce.
///
/// Only the counter changes after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ChaChaState {
    constants: [Word; 4],
    key: [Word; KEY_WORDS],
    counter: Word,
    nonce: [Word; NONCE_WORDS],
}

impl ChaChaState {
    /// Build the initial state for `key` and `nonce` with the counter at 0.
    #[must_use]
    pub fn new(key: &Key, nonce: &Nonce) -> Self {
        Self {
            constants: CONSTANTS.map(Word),
            key: load_le(key),
            counter: Word::ZERO,
            nonce: load_le(nonce),
        }
    }

    /// Set the initial block counter.
    #[must_use]
    pub fn with_counter(mut self, counter: u32) -> Self {
        self.counter = Word(counter);
        self
    }

    /// Current block counter.
    #[inline(always)]
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter.0
    }

    /// Overwrite the block counter.
    #[inline(always)]
    pub fn set_counter(&mut self, counter: u32) {
        self.counter = Word(counter);
    }

    /// Increment the block counter by one, wrapping at 2³².
    #[inline(always)]
    pub fn advance_counter(&mut self) {
        self.counter += Word::ONE;
    }

    /// Replace the nonce. The key, constants and counter are left as they are.
    pub fn set_nonce(&mut self, nonce: &Nonce) {
        self.nonce = load_le(nonce);
    }

    /// Positional 16-word layout consumed by the block function.
    #[inline]
    #[must_use]
    pub fn to_words(&self) -> [Word; STATE_WORDS] {
        let mut words = [Word::ZERO; STATE_WORDS];
        words[..4].copy_from_slice(&self.constants);
        words[4..COUNTER_INDEX].copy_from_slice(&self.key);
        words[COUNTER_INDEX] = self.counter;
        words[COUNTER_INDEX + 1..].copy_from_slice(&self.nonce);
        words
    }

    /// Positional layout as raw `u32`s, for the SIMD backends.
    #[inline]
    #[must_use]
    pub fn to_array(&self) -> [u32; STATE_WORDS] {
        self.to_words().map(u32::from)
    }
}

impl fmt::Debug for ChaChaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaChaState")
            .field("counter", &self.counter.0)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "zeroize")]
impl Drop for ChaChaState {
    fn drop(&mut self) {
        self.key.zeroize();
        self.nonce.zeroize();
        self.counter.zeroize();
    }
}
