//! The ChaCha20 block function. Defined in RFC 8439 Section 2.3.
//!
//! <https://tools.ietf.org/html/rfc8439#section-2.3>
//!
//! While ChaCha20 is a stream cipher, not a block cipher, its core
//! primitive is a function which acts on a 512-bit block.

use crate::{
    config::DoubleRounds,
    state::{ChaChaState, STATE_WORDS},
    word::Word,
};

/// The ChaCha20 quarter round function
///
/// Mixes the four state words at indices `a`, `b`, `c` and `d` in place.
#[inline(always)]
pub fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [Word; STATE_WORDS]) {
    state[a] += state[b];
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] += state[d];
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] += state[b];
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] += state[d];
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// One column round followed by one diagonal round
#[inline(always)]
pub fn double_round(state: &mut [Word; STATE_WORDS]) {
    // column rounds
    quarter_round(0, 4, 8, 12, state);
    quarter_round(1, 5, 9, 13, state);
    quarter_round(2, 6, 10, 14, state);
    quarter_round(3, 7, 11, 15, state);

    // diagonal rounds
    quarter_round(0, 5, 10, 15, state);
    quarter_round(1, 6, 11, 12, state);
    quarter_round(2, 7, 8, 13, state);
    quarter_round(3, 4, 9, 14, state);
}

/// Compute the keystream block for the current counter of `state`.
///
/// The state itself is not modified; advancing the counter is up to the
/// caller.
#[inline]
#[must_use]
pub fn block(state: &ChaChaState, rounds: DoubleRounds) -> [Word; STATE_WORDS] {
    let input = state.to_words();
    let mut res = input;

    for _ in 0..rounds.get() {
        double_round(&mut res);
    }

    for (s1, s0) in res.iter_mut().zip(input.iter()) {
        *s1 += *s0;
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn words(raw: [u32; STATE_WORDS]) -> [Word; STATE_WORDS] {
        raw.map(Word)
    }

    /// RFC 8439 Section 2.1.1
    #[test]
    fn quarter_round_vector() {
        let mut state = [Word::ZERO; STATE_WORDS];
        state[..4].copy_from_slice(&[
            Word(0x11111111),
            Word(0x01020304),
            Word(0x9b8d6f43),
            Word(0x01234567),
        ]);
        quarter_round(0, 1, 2, 3, &mut state);
        assert_eq!(
            state[..4],
            [Word(0xea2a92f4), Word(0xcb1cf8ce), Word(0x4581472e), Word(0x5881c4bb)]
        );
    }

    /// RFC 8439 Section 2.2.1
    #[test]
    #[rustfmt::skip]
    fn quarter_round_on_state() {
        let mut state = words([
            0x879531e0, 0xc5ecf37d, 0x516461b1, 0xc9a62f8a,
            0x44c20ef3, 0x3390af7f, 0xd9fc690b, 0x2a5f714c,
            0x53372767, 0xb00a5631, 0x974c541a, 0x359e9963,
            0x5c971061, 0x3d631689, 0x2098d9d6, 0x91dbd320,
        ]);
        quarter_round(2, 7, 8, 13, &mut state);
        assert_eq!(state, words([
            0x879531e0, 0xc5ecf37d, 0xbdb886dc, 0xc9a62f8a,
            0x44c20ef3, 0x3390af7f, 0xd9fc690b, 0xcfacafd2,
            0xe46bea80, 0xb00a5631, 0x974c541a, 0x359e9963,
            0x5c971061, 0xccc07c79, 0x2098d9d6, 0x91dbd320,
        ]));
    }

    const KEY: [u8; 32] = hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
    const NONCE: [u8; 12] = hex!("000000090000004a00000000");

    /// RFC 8439 Section 2.3.2
    #[test]
    #[rustfmt::skip]
    fn block_function_vector() {
        let state = ChaChaState::new(&KEY.into(), &NONCE.into()).with_counter(1);
        let out = block(&state, DoubleRounds::default());
        assert_eq!(out, words([
            0xe4e7f110, 0x15593bd1, 0x1fdd0f50, 0xc47120a3,
            0xc7f4d1c7, 0x0368c033, 0x9aaa2204, 0x4e6cd4c3,
            0x466482d2, 0x09aa9f07, 0x05d7c214, 0xa2028bd9,
            0xd19c12b5, 0xb94e16de, 0xe883d0cb, 0x4e3c50a2,
        ]));
        // the caller's counter is untouched
        assert_eq!(state.counter(), 1);
    }

    #[test]
    fn block_is_deterministic() {
        let state = ChaChaState::new(&KEY.into(), &NONCE.into()).with_counter(42);
        let rounds = DoubleRounds::default();
        assert_eq!(block(&state, rounds), block(&state, rounds));
    }

    #[test]
    fn consecutive_counters_differ() {
        let state = ChaChaState::new(&[0x42; 32].into(), &[0x24; 12].into());
        let rounds = DoubleRounds::default();
        let first = block(&state, rounds);
        let second = block(&state.clone().with_counter(1), rounds);
        assert_ne!(first, second);
    }

    #[test]
    fn more_rounds_change_output() {
        let state = ChaChaState::new(&KEY.into(), &NONCE.into());
        let twenty = block(&state, DoubleRounds::default());
        let forty = block(&state, DoubleRounds::new(20).expect("valid round count"));
        assert_ne!(twenty, forty);
    }
}
