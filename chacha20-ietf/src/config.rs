//! Runtime configuration of a [`Session`][crate::Session].

use crate::{Error, Result};

/// Smallest number of double rounds accepted (ChaCha20).
pub const MIN_DOUBLE_ROUNDS: u8 = 10;

/// Number of double rounds (column + diagonal) run by the block function.
///
/// ChaCha20 runs 10. Fewer are rejected: there is no way to configure a
/// reduced-round variant through this type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoubleRounds(u8);

impl DoubleRounds {
    /// The 10 double rounds (20 rounds) of ChaCha20.
    pub const CHACHA20: Self = Self(MIN_DOUBLE_ROUNDS);

    /// Validate a double-round count.
    ///
    /// # Errors
    ///
    /// [`Error::InsecureRoundCount`] if `count` is below
    /// [`MIN_DOUBLE_ROUNDS`].
    pub fn new(count: u8) -> Result<Self> {
        if count < MIN_DOUBLE_ROUNDS {
            return Err(Error::InsecureRoundCount {
                requested: count,
                minimum: MIN_DOUBLE_ROUNDS,
            });
        }
        Ok(Self(count))
    }

    /// Number of double rounds.
    #[inline(always)]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for DoubleRounds {
    fn default() -> Self {
        Self::CHACHA20
    }
}

impl TryFrom<u8> for DoubleRounds {
    type Error = Error;

    fn try_from(count: u8) -> Result<Self> {
        Self::new(count)
    }
}

/// What the block counter does between calls on one session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CounterMode {
    /// Each call picks up at the counter the previous call stopped at, so a
    /// session encrypts one long stream split across calls.
    #[default]
    Continue,

    /// Each call starts again from the initial counter.
    ///
    /// Two calls then reuse the same keystream unless the nonce is changed in
    /// between with [`Session::set_nonce`][crate::Session::set_nonce].
    Restart,
}

/// What happens when a request would run the counter past `2^32 - 1`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Refuse with [`Error::KeystreamExhausted`] before touching any data.
    #[default]
    Error,

    /// Wrap the counter to 0 and keep going, reusing keystream.
    Wrap,
}

/// Session configuration.
///
/// The defaults are ChaCha20, counter starting at 0, continuing across
/// calls, and refusing to wrap.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Config {
    /// Double rounds per block.
    pub rounds: DoubleRounds,
    /// Counter of the first block.
    pub initial_counter: u32,
    /// Counter behavior across calls.
    pub counter_mode: CounterMode,
    /// Counter behavior at the end of the counter space.
    pub overflow: OverflowPolicy,
}

impl Config {
    /// Set the number of double rounds.
    #[must_use]
    pub fn rounds(mut self, rounds: DoubleRounds) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the counter of the first block.
    #[must_use]
    pub fn initial_counter(mut self, counter: u32) -> Self {
        self.initial_counter = counter;
        self
    }

    /// Set the counter mode.
    #[must_use]
    pub fn counter_mode(mut self, mode: CounterMode) -> Self {
        self.counter_mode = mode;
        self
    }

    /// Set the overflow policy.
    #[must_use]
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }
}
