//! Message-oriented ChaCha20: one state, whole-block counter steps.

use crate::{
    BLOCK_SIZE, BLOCK_WORDS, ChaChaCore, Config, CounterMode, Error, KeystreamBlock,
    OverflowPolicy, Result,
    codec::{self, LengthPolicy},
    state::{ChaChaState, Key, Nonce},
    word::{Word, load_le},
};
use cipher::{StreamCipherCore, StreamCipherSeekCore};
use core::fmt;

#[cfg(feature = "std")]
use core::num::NonZeroUsize;
#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// Number of distinct block counter values
const COUNTER_SPACE: u64 = 1 << 32;

/// Keystream blocks generated per backend call, a multiple of every
/// backend's parallelism
const KEYSTREAM_CHUNK: usize = 4;

/// A ChaCha20 encryption/decryption session.
///
/// Owns one [`ChaChaState`] with a fixed key and nonce. Every call to
/// [`process`][Session::process] consumes `ceil(len / 64)` consecutive
/// counter values, starting on a fresh block; keystream left over in a
/// partial final block is discarded.
///
/// Encryption and decryption are the same operation.
///
/// # Counter
///
/// With the default [`CounterMode::Continue`] a second call picks up where
/// the first stopped, so decrypting needs a session of its own (or a
/// [`rewind`][Session::rewind]). With the default [`OverflowPolicy::Error`] a
/// call that would run past counter `2^32 - 1` fails with
/// [`Error::KeystreamExhausted`] and leaves both the data and the session
/// untouched.
pub struct Session {
    core: ChaChaCore,
    config: Config,
    /// Counter of the next block, `COUNTER_SPACE` once exhausted
    position: u64,
}

impl Session {
    /// Session with the default [`Config`].
    #[must_use]
    pub fn new(key: &Key, nonce: &Nonce) -> Self {
        Self::with_config(key, nonce, Config::default())
    }

    /// Session with an explicit [`Config`].
    #[must_use]
    pub fn with_config(key: &Key, nonce: &Nonce, config: Config) -> Self {
        #[cfg(feature = "log")]
        log::debug!(
            "chacha20 session: {} double rounds, initial counter {}, {:?} mode, {:?} on overflow",
            config.rounds.get(),
            config.initial_counter,
            config.counter_mode,
            config.overflow,
        );

        let state = ChaChaState::new(key, nonce).with_counter(config.initial_counter);
        Self {
            core: ChaChaCore::from_state(state, config.rounds),
            config,
            position: u64::from(config.initial_counter),
        }
    }

    /// Session from raw key and nonce material, such as a password and a
    /// nonce string.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyLength`] or [`Error::InvalidNonceLength`] when the
    /// material has the wrong size and `policy` is [`LengthPolicy::Strict`].
    pub fn from_material(
        key: &[u8],
        nonce: &[u8],
        policy: LengthPolicy,
        config: Config,
    ) -> Result<Self> {
        let key = codec::key_from_material(key, policy)?;
        let nonce = codec::nonce_from_material(nonce, policy)?;
        Ok(Self::with_config(&key, &nonce, config))
    }

    /// Configuration this session was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Counter of the next keystream block.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.core.get_block_pos()
    }

    /// Counter [`rewind`][Session::rewind] returns to.
    #[must_use]
    pub fn initial_counter(&self) -> u32 {
        self.config.initial_counter
    }

    /// Keystream blocks left before the counter space runs out, `None` if
    /// the session wraps instead.
    #[must_use]
    pub fn remaining_blocks(&self) -> Option<u64> {
        match self.config.overflow {
            OverflowPolicy::Error => Some(COUNTER_SPACE - self.position),
            OverflowPolicy::Wrap => None,
        }
    }

    /// Move the counter back to the initial counter.
    ///
    /// Only safe if what follows is a decryption of data encrypted from that
    /// counter, or a new nonce has been set.
    pub fn rewind(&mut self) {
        self.position = u64::from(self.config.initial_counter);
        self.core.set_block_pos(self.config.initial_counter);
    }

    /// Switch to a new nonce and rewind, so one session can carry several
    /// messages under the same key.
    pub fn set_nonce(&mut self, nonce: &Nonce) {
        #[cfg(feature = "log")]
        log::debug!("chacha20 session re-nonced at counter {}", self.counter());

        self.core.set_nonce(nonce);
        self.rewind();
    }

    /// XOR `data` with the keystream in place.
    ///
    /// # Errors
    ///
    /// [`Error::KeystreamExhausted`] if `data` needs more blocks than remain.
    /// Nothing is modified in that case.
    pub fn process(&mut self, data: &mut [u8]) -> Result<()> {
        let blocks = blocks_for(data.len(), BLOCK_SIZE);
        self.begin(blocks)?;
        apply_keystream(&mut self.core, data);
        self.advance(blocks);
        Ok(())
    }

    /// Encrypt `data` in place. Same as [`process`][Session::process].
    ///
    /// # Errors
    ///
    /// See [`process`][Session::process].
    pub fn encrypt(&mut self, data: &mut [u8]) -> Result<()> {
        self.process(data)
    }

    /// Decrypt `data` in place. Same as [`process`][Session::process].
    ///
    /// # Errors
    ///
    /// See [`process`][Session::process].
    pub fn decrypt(&mut self, data: &mut [u8]) -> Result<()> {
        self.process(data)
    }

    /// XOR a sequence of words with the keystream, 16 words per block.
    ///
    /// Keystream word `i` of a block is the `i`-th output word of the block
    /// function, so this equals [`process`][Session::process] over the
    /// little-endian encoding of `words`.
    ///
    /// # Errors
    ///
    /// [`Error::KeystreamExhausted`] as for [`process`][Session::process].
    pub fn process_words(&mut self, words: &mut [Word]) -> Result<()> {
        let blocks = blocks_for(words.len(), BLOCK_WORDS);
        self.begin(blocks)?;

        let mut keystream = KeystreamBlock::default();
        for chunk in words.chunks_mut(BLOCK_WORDS) {
            self.core.write_keystream_block(&mut keystream);
            let ks: [Word; BLOCK_WORDS] = load_le(&keystream);
            for (word, k) in chunk.iter_mut().zip(ks) {
                *word ^= k;
            }
        }
        wipe(core::slice::from_mut(&mut keystream));

        self.advance(blocks);
        Ok(())
    }

    /// Next keystream block as 16 words, consuming one counter value.
    ///
    /// # Errors
    ///
    /// [`Error::KeystreamExhausted`] if no block remains.
    pub fn keystream_block(&mut self) -> Result<[Word; BLOCK_WORDS]> {
        self.begin(1)?;
        let mut keystream = KeystreamBlock::default();
        self.core.write_keystream_block(&mut keystream);
        let words = load_le(&keystream);
        wipe(core::slice::from_mut(&mut keystream));
        self.advance(1);
        Ok(words)
    }

    /// Independent session starting `block_offset` blocks after this
    /// session's next block, for handing a disjoint counter range to another
    /// worker. This session is not advanced.
    ///
    /// The fork's initial counter is its starting counter.
    ///
    /// # Errors
    ///
    /// [`Error::KeystreamExhausted`] if the starting counter lies past
    /// `2^32 - 1` and this session does not wrap.
    pub fn fork(&self, block_offset: u32) -> Result<Self> {
        let start = self.position + u64::from(block_offset);
        let start = match self.config.overflow {
            OverflowPolicy::Error if start >= COUNTER_SPACE => {
                return Err(Error::KeystreamExhausted);
            }
            OverflowPolicy::Error => start,
            OverflowPolicy::Wrap => start % COUNTER_SPACE,
        };

        let counter = start as u32;
        let mut core = self.core.clone();
        core.set_block_pos(counter);
        Ok(Self {
            core,
            config: self.config.initial_counter(counter),
            position: start,
        })
    }

    /// [`process`][Session::process] split across up to `workers` scoped
    /// threads, each covering a disjoint run of whole blocks.
    ///
    /// The output and the session's counter afterwards are identical to
    /// [`process`][Session::process].
    ///
    /// # Errors
    ///
    /// [`Error::KeystreamExhausted`] as for [`process`][Session::process].
    #[cfg(feature = "std")]
    pub fn process_parallel(&mut self, data: &mut [u8], workers: NonZeroUsize) -> Result<()> {
        let blocks = blocks_for(data.len(), BLOCK_SIZE);
        self.begin(blocks)?;

        let per_worker = data
            .len()
            .div_ceil(BLOCK_SIZE)
            .div_ceil(workers.get())
            .max(1);

        if per_worker as u64 >= blocks {
            apply_keystream(&mut self.core, data);
        } else {
            #[cfg(feature = "log")]
            log::trace!(
                "chacha20: {blocks} blocks across {} workers, {per_worker} blocks each",
                blocks.div_ceil(per_worker as u64),
            );

            let start = self.core.get_block_pos();
            let core = &self.core;
            std::thread::scope(|scope| {
                for (i, chunk) in data.chunks_mut(per_worker * BLOCK_SIZE).enumerate() {
                    let mut worker = core.clone();
                    worker.set_block_pos(start.wrapping_add((i * per_worker) as u32));
                    scope.spawn(move || apply_keystream(&mut worker, chunk));
                }
            });
        }

        self.advance(blocks);
        Ok(())
    }

    /// Prepare a call consuming `blocks` counter values.
    fn begin(&mut self, blocks: u64) -> Result<()> {
        if self.config.counter_mode == CounterMode::Restart {
            self.rewind();
        }
        if self.config.overflow == OverflowPolicy::Error && blocks > COUNTER_SPACE - self.position {
            return Err(Error::KeystreamExhausted);
        }
        Ok(())
    }

    /// Record `blocks` consumed counter values and sync the core's counter.
    fn advance(&mut self, blocks: u64) {
        let next = self.position + blocks;
        self.position = match self.config.overflow {
            OverflowPolicy::Error => next,
            OverflowPolicy::Wrap => {
                if next >= COUNTER_SPACE {
                    #[cfg(feature = "log")]
                    log::warn!("chacha20 block counter wrapped: keystream is being reused");
                }
                next % COUNTER_SPACE
            }
        };
        // `COUNTER_SPACE` truncates to 0, matching the wrapped counter word
        self.core.set_block_pos(self.position as u32);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("counter", &self.counter())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[inline(always)]
fn blocks_for(len: usize, block_len: usize) -> u64 {
    len.div_ceil(block_len) as u64
}

/// XOR `data` with keystream starting at a block boundary; a partial final
/// block still consumes a whole counter value.
fn apply_keystream(core: &mut ChaChaCore, data: &mut [u8]) {
    let mut keystream = [KeystreamBlock::default(); KEYSTREAM_CHUNK];
    for chunk in data.chunks_mut(KEYSTREAM_CHUNK * BLOCK_SIZE) {
        let n = chunk.len().div_ceil(BLOCK_SIZE);
        core.write_keystream_blocks(&mut keystream[..n]);
        for (byte, ks) in chunk.iter_mut().zip(keystream.iter().flatten()) {
            *byte ^= ks;
        }
    }
    wipe(&mut keystream);
}

#[inline(always)]
fn wipe(blocks: &mut [KeystreamBlock]) {
    #[cfg(feature = "zeroize")]
    for block in blocks {
        block.as_mut_slice().zeroize();
    }
    #[cfg(not(feature = "zeroize"))]
    let _ = blocks;
}
