//! Portable implementation which does not rely on architecture-specific
//! intrinsics.

use crate::{ChaChaCore, block};
use cipher::{
    Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend,
    consts::{U1, U64},
};

pub(crate) struct Backend<'a>(pub(crate) &'a mut ChaChaCore);

impl BlockSizeUser for Backend<'_> {
    type BlockSize = U64;
}

impl ParBlocksSizeUser for Backend<'_> {
    type ParBlocksSize = U1;
}

impl StreamBackend for Backend<'_> {
    #[inline(always)]
    fn gen_ks_block(&mut self, out: &mut Block<Self>) {
        let res = block::block(&self.0.state, self.0.rounds);
        self.0.state.advance_counter();

        for (chunk, word) in out.chunks_exact_mut(4).zip(res.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }
}
