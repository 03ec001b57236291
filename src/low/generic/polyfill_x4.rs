use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::{U16, U32, U64};

use crate::low::IAesBlock;

use super::AesBlock;

#[derive(Clone, Copy, Default)]
#[repr(C)]
pub struct AesBlock4(AesBlock, AesBlock, AesBlock, AesBlock);

impl From<AesBlock4> for Array<u8, U64> {
    #[inline(always)]
    fn from(val: AesBlock4) -> Self {
        let a: Array<u8, U16> = val.0.into();
        let b: Array<u8, U16> = val.1.into();
        let c: Array<u8, U16> = val.2.into();
        let d: Array<u8, U16> = val.3.into();
        a.concat(b).concat(c.concat(d))
    }
}

impl IAesBlock for AesBlock4 {
    type Size = U64;
    const LANES: usize = 4;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        let Self(m0, m1, m2, m3) = self;
        let Self(k0, k1, k2, k3) = key;

        Self(m0.aes(k0), m1.aes(k1), m2.aes(k2), m3.aes(k3))
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U64>) -> Self {
        let (a01, a23) = a.split_ref::<U32>();
        let (a0, a1) = a01.split_ref::<U16>();
        let (a2, a3) = a23.split_ref::<U16>();
        Self(
            AesBlock::from_block(a0),
            AesBlock::from_block(a1),
            AesBlock::from_block(a2),
            AesBlock::from_block(a3),
        )
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        let a = AesBlock::from_block(a);
        Self(a, a, a, a)
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        let Self(a, b, c, d) = self;
        (a ^ b ^ c ^ d).into()
    }
}

impl BitXor for AesBlock4 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        let Self(l0, l1, l2, l3) = self;
        let Self(r0, r1, r2, r3) = rhs;
        Self(l0 ^ r0, l1 ^ r1, l2 ^ r2, l3 ^ r3)
    }
}

impl BitXorAssign for AesBlock4 {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for AesBlock4 {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        let Self(l0, l1, l2, l3) = self;
        let Self(r0, r1, r2, r3) = rhs;
        Self(l0 & r0, l1 & r1, l2 & r2, l3 & r3)
    }
}
