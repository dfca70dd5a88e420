//! Implementation of the IETF [ChaCha20] stream cipher ([RFC 8439]):
//! 256-bit key, 96-bit nonce, 32-bit block counter.
//!
//! Two ways in:
//!
//! - [`Session`]: owns one ChaCha state and processes whole messages, each
//!   call starting on a fresh 64-byte block. Counter behavior between calls
//!   and at the end of the counter space is explicit [`Config`]. By default
//!   a session refuses to reuse keystream instead of wrapping the counter.
//! - [`ChaCha20`]: the byte-granular RustCrypto stream cipher built from
//!   traits of the re-exported [`cipher`] crate, with seeking.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic, which can lead to
//! serious vulnerabilities if used incorrectly!
//!
//! A nonce must never be used twice with the same key. Nothing here can
//! detect that; it is the caller's job.
//!
//! USE AT YOUR OWN RISK!
//!
//! # Example
//! ```
//! use chacha20_ietf::{Config, Session};
//! use hex_literal::hex;
//!
//! let key = [0x42; 32];
//! let nonce = [0x24; 12];
//! let plaintext = *b"attack at dawn";
//!
//! let mut buffer = plaintext;
//! let mut session = Session::new(&key.into(), &nonce.into());
//! session.encrypt(&mut buffer)?;
//! assert_ne!(buffer, plaintext);
//! assert_eq!(session.counter(), 1);
//!
//! // a fresh session with the same key and nonce decrypts
//! let mut session = Session::with_config(&key.into(), &nonce.into(), Config::default());
//! session.decrypt(&mut buffer)?;
//! assert_eq!(buffer, plaintext);
//!
//! // the RustCrypto API gives the same keystream
//! use chacha20_ietf::ChaCha20;
//! use chacha20_ietf::cipher::{KeyIvInit, StreamCipher};
//!
//! let mut cipher = ChaCha20::new(&key.into(), &nonce.into());
//! let mut other = hex!("00000000 00000000 00000000 0000");
//! cipher.apply_keystream(&mut other);
//! for (a, b) in other.iter_mut().zip(plaintext) {
//!     *a ^= b;
//! }
//! let mut expected = plaintext;
//! Session::new(&key.into(), &nonce.into()).encrypt(&mut expected)?;
//! assert_eq!(other, expected);
//! # Ok::<(), chacha20_ietf::Error>(())
//! ```
//!
//! On x86(-64) targets with SSE2 the keystream is computed four blocks at a
//! time; elsewhere, or with `RUSTFLAGS="--cfg chacha20_force_soft"`, the
//! portable backend is used.
//!
//! [ChaCha20]: https://tools.ietf.org/html/rfc8439
//! [RFC 8439]: https://tools.ietf.org/html/rfc8439

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg"
)]
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

pub use cipher;

use cfg_if::cfg_if;
use cipher::{
    Block, BlockSizeUser, IvSizeUser, KeyIvInit, KeySizeUser, StreamCipherCore,
    StreamCipherCoreWrapper, StreamCipherSeekCore, StreamClosure,
    consts::{U12, U32, U64},
};
use core::fmt;

#[cfg(feature = "zeroize")]
use zeroize::ZeroizeOnDrop;

mod backends;
pub mod block;
pub mod codec;
mod config;
mod error;
mod session;
mod state;
mod word;

pub use crate::{
    codec::LengthPolicy,
    config::{Config, CounterMode, DoubleRounds, MIN_DOUBLE_ROUNDS, OverflowPolicy},
    error::{Error, Result},
    session::Session,
    state::{
        COUNTER_INDEX, CONSTANTS, ChaChaState, KEY_SIZE, KEY_WORDS, Key, NONCE_SIZE, NONCE_WORDS,
        Nonce, STATE_WORDS,
    },
    word::Word,
};

/// Size of a ChaCha20 block in bytes
pub const BLOCK_SIZE: usize = 64;

/// Number of 32-bit words in a keystream block
pub const BLOCK_WORDS: usize = 16;

/// Keystream block type.
pub type KeystreamBlock = Block<ChaChaCore>;

/// ChaCha20 stream cipher (RFC 8439 version with 96-bit nonce), byte
/// granular with seeking.
///
/// Follows the [`cipher`] crate contract: the 32-bit counter wrapping is
/// reported as [`cipher::StreamCipherError`] and the block at counter
/// `2^32 - 1` is never handed out.
pub type ChaCha20 = StreamCipherCoreWrapper<ChaChaCore>;

/// The ChaCha20 core function.
#[derive(Clone)]
pub struct ChaChaCore {
    /// Internal state of the core function
    pub(crate) state: ChaChaState,
    /// Number of double rounds to perform
    pub(crate) rounds: DoubleRounds,
}

impl ChaChaCore {
    /// Create a core from an initial state and a round count.
    #[must_use]
    pub fn from_state(state: ChaChaState, rounds: DoubleRounds) -> Self {
        Self { state, rounds }
    }

    /// Create a core with a non-default number of double rounds.
    #[must_use]
    pub fn with_rounds(key: &Key, nonce: &Nonce, rounds: DoubleRounds) -> Self {
        Self::from_state(ChaChaState::new(key, nonce), rounds)
    }

    /// The state this core generates keystream from.
    #[must_use]
    pub fn state(&self) -> &ChaChaState {
        &self.state
    }

    /// Number of double rounds per block.
    #[must_use]
    pub fn rounds(&self) -> DoubleRounds {
        self.rounds
    }

    pub(crate) fn set_nonce(&mut self, nonce: &Nonce) {
        self.state.set_nonce(nonce);
    }
}

impl KeySizeUser for ChaChaCore {
    type KeySize = U32;
}

impl IvSizeUser for ChaChaCore {
    type IvSize = U12;
}

impl BlockSizeUser for ChaChaCore {
    type BlockSize = U64;
}

impl KeyIvInit for ChaChaCore {
    #[inline]
    fn new(key: &Key, iv: &Nonce) -> Self {
        Self::with_rounds(key, iv, DoubleRounds::CHACHA20)
    }
}

impl StreamCipherCore for ChaChaCore {
    #[inline(always)]
    fn remaining_blocks(&self) -> Option<usize> {
        let rem = u32::MAX - self.get_block_pos();
        rem.try_into().ok()
    }

    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        cfg_if! {
            if #[cfg(chacha20_force_soft)] {
                f.call(&mut backends::soft::Backend(self));
            } else if #[cfg(all(
                any(target_arch = "x86", target_arch = "x86_64"),
                target_feature = "sse2"
            ))] {
                // SAFETY: `sse2` is statically enabled for this target.
                unsafe {
                    backends::sse2::inner(&mut self.state, self.rounds, f);
                }
            } else {
                f.call(&mut backends::soft::Backend(self));
            }
        }
    }
}

impl StreamCipherSeekCore for ChaChaCore {
    type Counter = u32;

    #[inline(always)]
    fn get_block_pos(&self) -> u32 {
        self.state.counter()
    }

    #[inline(always)]
    fn set_block_pos(&mut self, pos: u32) {
        self.state.set_counter(pos);
    }
}

impl fmt::Debug for ChaChaCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaChaCore")
            .field("rounds", &self.rounds.get())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for ChaChaCore {}
