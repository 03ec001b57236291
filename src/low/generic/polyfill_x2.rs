use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::{U16, U32};

use crate::low::IAesBlock;

use super::AesBlock;

#[derive(Clone, Copy, Default)]
#[repr(C)]
pub struct AesBlock2(AesBlock, AesBlock);

impl From<AesBlock2> for Array<u8, U32> {
    #[inline(always)]
    fn from(val: AesBlock2) -> Self {
        let a: Array<u8, U16> = val.0.into();
        let b: Array<u8, U16> = val.1.into();
        a.concat(b)
    }
}

impl IAesBlock for AesBlock2 {
    type Size = U32;
    const LANES: usize = 2;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        let Self(m0, m1) = self;
        let Self(k0, k1) = key;

        Self(m0.aes(k0), m1.aes(k1))
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U32>) -> Self {
        let (a0, a1) = a.split_ref::<U16>();
        Self(AesBlock::from_block(a0), AesBlock::from_block(a1))
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        let a = AesBlock::from_block(a);
        Self(a, a)
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        let Self(a, b) = self;
        (a ^ b).into()
    }
}

impl BitXor for AesBlock2 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        let Self(l0, l1) = self;
        let Self(r0, r1) = rhs;
        Self(l0 ^ r0, l1 ^ r1)
    }
}

impl BitXorAssign for AesBlock2 {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for AesBlock2 {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        let Self(l0, l1) = self;
        let Self(r0, r1) = rhs;
        Self(l0 & r0, l1 & r1)
    }
}
