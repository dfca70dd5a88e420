//! SSE2 backend computing four keystream blocks per call.
#![allow(unsafe_op_in_unsafe_fn)]

use crate::{ChaChaState, DoubleRounds};
use cipher::{
    Block, BlockSizeUser, ParBlocks, ParBlocksSizeUser, StreamBackend, StreamClosure,
    consts::{U4, U64},
};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

const PAR_BLOCKS: usize = 4;

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn inner<F>(state: &mut ChaChaState, rounds: DoubleRounds, f: F)
where
    F: StreamClosure<BlockSize = U64>,
{
    let words = state.to_array();
    let state_ptr = words.as_ptr().cast::<__m128i>();
    let mut backend = Backend {
        v: [
            _mm_loadu_si128(state_ptr.add(0)),
            _mm_loadu_si128(state_ptr.add(1)),
            _mm_loadu_si128(state_ptr.add(2)),
            _mm_loadu_si128(state_ptr.add(3)),
        ],
        rounds,
    };

    f.call(&mut backend);

    state.set_counter(_mm_cvtsi128_si32(backend.v[3]) as u32);
}

struct Backend {
    /// State rows; the counter sits in the lowest lane of `v[3]`
    v: [__m128i; 4],
    rounds: DoubleRounds,
}

impl BlockSizeUser for Backend {
    type BlockSize = U64;
}

impl ParBlocksSizeUser for Backend {
    type ParBlocksSize = U4;
}

impl StreamBackend for Backend {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        // SAFETY: `Backend` is only constructed by `inner`, which requires
        // `sse2`; `block` is 64 bytes, i.e. four unaligned 128-bit stores.
        unsafe {
            let res = rounds(&self.v, self.rounds);
            self.v[3] = _mm_add_epi32(self.v[3], _mm_set_epi32(0, 0, 0, 1));

            let block_ptr = block.as_mut_ptr().cast::<__m128i>();
            for i in 0..4 {
                _mm_storeu_si128(block_ptr.add(i), res[0][i]);
            }
        }
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        // SAFETY: as above; `blocks` is `PAR_BLOCKS` contiguous 64-byte blocks.
        unsafe {
            let res = rounds(&self.v, self.rounds);
            self.v[3] = _mm_add_epi32(self.v[3], _mm_set_epi32(0, 0, 0, PAR_BLOCKS as i32));

            let blocks_ptr = blocks.as_mut_ptr().cast::<__m128i>();
            for block in 0..PAR_BLOCKS {
                for i in 0..4 {
                    _mm_storeu_si128(blocks_ptr.add(i + block * 4), res[block][i]);
                }
            }
        }
    }
}

/// Run the block function on `PAR_BLOCKS` consecutive counters.
///
/// Counters are added lane-wise, so they wrap within the 32-bit counter word
/// and never carry into the nonce.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rounds(v: &[__m128i; 4], double_rounds: DoubleRounds) -> [[__m128i; 4]; PAR_BLOCKS] {
    let mut res = [*v; PAR_BLOCKS];
    for block in 1..PAR_BLOCKS {
        res[block][3] = _mm_add_epi32(res[block][3], _mm_set_epi32(0, 0, 0, block as i32));
    }

    for _ in 0..double_rounds.get() {
        double_quarter_round(&mut res);
    }

    for block in 0..PAR_BLOCKS {
        for i in 0..3 {
            res[block][i] = _mm_add_epi32(res[block][i], v[i]);
        }
        let ctr = _mm_add_epi32(v[3], _mm_set_epi32(0, 0, 0, block as i32));
        res[block][3] = _mm_add_epi32(res[block][3], ctr);
    }

    res
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn double_quarter_round(v: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    add_xor_rot(v);
    rows_to_cols(v);
    add_xor_rot(v);
    cols_to_rows(v);
}

/// Rotate rows `a`, `c` and `d` so that the diagonals line up as columns:
/// ```text
/// [a0, a1, a2, a3]    [a3, a0, a1, a2]
/// [b0, b1, b2, b3] => [b0, b1, b2, b3]
/// [c0, c1, c2, c3]    [c1, c2, c3, c0]
/// [d0, d1, d2, d3]    [d2, d3, d0, d1]
/// ```
///
/// Leaving `b` in place keeps the shuffle off the critical path, as the last
/// word written by [`add_xor_rot`] is `b`.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rows_to_cols(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, _, c, d] in blocks.iter_mut() {
        // c >>>= 32; d >>>= 64; a >>>= 96;
        *c = _mm_shuffle_epi32(*c, 0b_00_11_10_01); // _MM_SHUFFLE(0, 3, 2, 1)
        *d = _mm_shuffle_epi32(*d, 0b_01_00_11_10); // _MM_SHUFFLE(1, 0, 3, 2)
        *a = _mm_shuffle_epi32(*a, 0b_10_01_00_11); // _MM_SHUFFLE(2, 1, 0, 3)
    }
}

/// Inverse of [`rows_to_cols`].
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn cols_to_rows(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, _, c, d] in blocks.iter_mut() {
        // c <<<= 32; d <<<= 64; a <<<= 96;
        *c = _mm_shuffle_epi32(*c, 0b_10_01_00_11); // _MM_SHUFFLE(2, 1, 0, 3)
        *d = _mm_shuffle_epi32(*d, 0b_01_00_11_10); // _MM_SHUFFLE(1, 0, 3, 2)
        *a = _mm_shuffle_epi32(*a, 0b_00_11_10_01); // _MM_SHUFFLE(0, 3, 2, 1)
    }
}

/// Four quarter rounds at once, one per column.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn add_xor_rot(blocks: &mut [[__m128i; 4]; PAR_BLOCKS]) {
    for [a, b, c, d] in blocks.iter_mut() {
        // a += b; d ^= a; d <<<= (16, 16, 16, 16);
        *a = _mm_add_epi32(*a, *b);
        *d = _mm_xor_si128(*d, *a);
        *d = _mm_xor_si128(_mm_slli_epi32(*d, 16), _mm_srli_epi32(*d, 16));

        // c += d; b ^= c; b <<<= (12, 12, 12, 12);
        *c = _mm_add_epi32(*c, *d);
        *b = _mm_xor_si128(*b, *c);
        *b = _mm_xor_si128(_mm_slli_epi32(*b, 12), _mm_srli_epi32(*b, 20));

        // a += b; d ^= a; d <<<= (8, 8, 8, 8);
        *a = _mm_add_epi32(*a, *b);
        *d = _mm_xor_si128(*d, *a);
        *d = _mm_xor_si128(_mm_slli_epi32(*d, 8), _mm_srli_epi32(*d, 24));

        // c += d; b ^= c; b <<<= (7, 7, 7, 7);
        *c = _mm_add_epi32(*c, *d);
        *b = _mm_xor_si128(*b, *c);
        *b = _mm_xor_si128(_mm_slli_epi32(*b, 7), _mm_srli_epi32(*b, 25));
    }
}
