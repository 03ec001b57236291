use std::arch::x86_64::*;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::U16;

use crate::low::IAesBlock;

// Values of this type only exist inside `run_aesni` and the VAES
// trampolines, all of which enable `aes` and `sse2`.

#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct AesBlock(pub(super) __m128i);

impl Default for AesBlock {
    #[inline(always)]
    fn default() -> Self {
        Self(unsafe { _mm_setzero_si128() })
    }
}

impl From<AesBlock> for Array<u8, U16> {
    #[inline(always)]
    fn from(val: AesBlock) -> Self {
        let mut out = Array::<u8, U16>::default();
        // Safety: `out` is 16 bytes, storeu has no alignment requirement.
        unsafe { _mm_storeu_si128(out.as_mut_ptr().cast(), val.0) }
        out
    }
}

impl IAesBlock for AesBlock {
    type Size = U16;
    const LANES: usize = 1;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        // Safety: `aes` is enabled, see above.
        Self(unsafe { _mm_aesenc_si128(self.0, key.0) })
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U16>) -> Self {
        // Safety: `a` is 16 bytes, loadu has no alignment requirement.
        Self(unsafe { _mm_loadu_si128(a.as_ptr().cast()) })
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
        Self(unsafe { _mm_xor_si128(self.0, rhs.0) })
    }
}

impl BitXorAssign for AesBlock {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for AesBlock {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(unsafe { _mm_and_si128(self.0, rhs.0) })
    }
}
