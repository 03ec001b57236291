use std::arch::x86_64::*;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::{U16, U64};

use crate::low::IAesBlock;

// Only constructed inside `run_vaes512`, which enables `avx512f` and `vaes`.

#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct AesBlock4(__m512i);

impl Default for AesBlock4 {
    #[inline(always)]
    fn default() -> Self {
        Self(unsafe { _mm512_setzero_si512() })
    }
}

impl From<AesBlock4> for Array<u8, U64> {
    #[inline(always)]
    fn from(val: AesBlock4) -> Self {
        let mut out = Array::<u8, U64>::default();
        // Safety: `out` is 64 bytes, storeu has no alignment requirement.
        unsafe { _mm512_storeu_si512(out.as_mut_ptr().cast(), val.0) }
        out
    }
}

impl IAesBlock for AesBlock4 {
    type Size = U64;
    const LANES: usize = 4;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        // Safety: we require target_feature = "vaes" and "avx512f".
        Self(unsafe { _mm512_aesenc_epi128(self.0, key.0) })
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U64>) -> Self {
        // Safety: `a` is 64 bytes, loadu has no alignment requirement.
        Self(unsafe { _mm512_loadu_si512(a.as_ptr().cast()) })
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        // Safety: we require target_feature = "avx512f".
        Self(unsafe { _mm512_broadcast_i32x4(_mm_loadu_si128(a.as_ptr().cast())) })
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        let mut out = Array::<u8, U16>::default();
        // Safety: we require target_feature = "avx512f".
        unsafe {
            let a = _mm512_extracti32x4_epi32::<0>(self.0);
            let b = _mm512_extracti32x4_epi32::<1>(self.0);
            let c = _mm512_extracti32x4_epi32::<2>(self.0);
            let d = _mm512_extracti32x4_epi32::<3>(self.0);
            let abcd = _mm_xor_si128(_mm_xor_si128(a, b), _mm_xor_si128(c, d));
            _mm_storeu_si128(out.as_mut_ptr().cast(), abcd);
        }
        out
    }
}

impl BitXor for AesBlock4 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        // Safety: we require target_feature = "avx512f".
        Self(unsafe { _mm512_xor_si512(self.0, rhs.0) })
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
        // Safety: we require target_feature = "avx512f".
        Self(unsafe { _mm512_and_si512(self.0, rhs.0) })
    }
}
