//! Portable AES round.

use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::U16;

use super::{IAesBlock, Isa};

mod polyfill_x2 {
    include!("generic/polyfill_x2.rs");
}

mod polyfill_x4 {
    include!("generic/polyfill_x4.rs");
}

#[derive(Clone, Copy, Debug)]
pub struct Soft;

impl Isa for Soft {
    type X1 = AesBlock;
    type X2 = polyfill_x2::AesBlock2;
    type X4 = polyfill_x4::AesBlock4;
}

#[derive(Clone, Copy, Default)]
#[repr(transparent)]
pub struct AesBlock(u128);

impl From<AesBlock> for Array<u8, U16> {
    #[inline(always)]
    fn from(val: AesBlock) -> Self {
        Array(val.0.to_ne_bytes())
    }
}

impl IAesBlock for AesBlock {
    type Size = U16;
    const LANES: usize = 1;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        let mut block = aes::Block::default();
        block.copy_from_slice(&self.0.to_ne_bytes());
        let mut round_key = aes::Block::default();
        round_key.copy_from_slice(&key.0.to_ne_bytes());

        aes::hazmat::cipher_round(&mut block, &round_key);

        let mut out = [0; 16];
        out.copy_from_slice(&block);
        Self(u128::from_ne_bytes(out))
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U16>) -> Self {
        Self(u128::from_ne_bytes(a.0))
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        Self::from_block(a)
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        self.into()
    }
}

impl BitXor for AesBlock {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for AesBlock {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl BitAnd for AesBlock {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
