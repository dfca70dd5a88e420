//! 32-bit words and the add-rotate-xor algebra ChaCha is built from.

use core::{
    fmt,
    ops::{Add, AddAssign, BitXor, BitXorAssign},
};

#[cfg(feature = "zeroize")]
use zeroize::Zeroize;

/// A 32-bit word of ChaCha state or keystream.
///
/// Addition is modulo 2³² and rotation is circular over exactly 32 bits, so
/// every operation is total.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Word(pub u32);

impl Word {
    /// The word `0`.
    pub const ZERO: Self = Self(0);

    /// The word `1`.
    pub const ONE: Self = Self(1);

    /// `(self + rhs) mod 2^32`
    #[inline(always)]
    #[must_use]
    pub const fn add_mod(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Bitwise exclusive-or.
    #[inline(always)]
    #[must_use]
    pub const fn xor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }

    /// Circular left shift by `n` bits; bits leaving the top re-enter at the
    /// bottom. `n` is taken modulo 32.
    #[inline(always)]
    #[must_use]
    pub const fn rotate_left(self, n: u32) -> Self {
        Self(self.0.rotate_left(n))
    }

    /// Decode a word from 4 little-endian bytes.
    #[inline(always)]
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Encode the word as 4 little-endian bytes.
    #[inline(always)]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl Add for Word {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.add_mod(rhs)
    }
}

impl AddAssign for Word {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = self.add_mod(rhs);
    }
}

impl BitXor for Word {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        self.xor(rhs)
    }
}

impl BitXorAssign for Word {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl From<u32> for Word {
    #[inline(always)]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Word> for u32 {
    #[inline(always)]
    fn from(word: Word) -> u32 {
        word.0
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#010x})", self.0)
    }
}

impl fmt::LowerHex for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(feature = "zeroize")]
impl Zeroize for Word {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Load `N` little-endian words from the front of `bytes`.
///
/// Missing trailing bytes leave the corresponding words at zero.
#[inline]
pub(crate) fn load_le<const N: usize>(bytes: &[u8]) -> [Word; N] {
    let mut words = [Word::ZERO; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}
