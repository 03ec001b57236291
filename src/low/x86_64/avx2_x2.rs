use std::arch::x86_64::*;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::{U16, U32, U64};

use crate::low::IAesBlock;

// Only constructed inside the VAES trampolines, which enable `avx2` and `vaes`.

#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct AesBlock2(__m256i);

impl Default for AesBlock2 {
    #[inline(always)]
    fn default() -> Self {
        Self(unsafe { _mm256_setzero_si256() })
    }
}

impl From<AesBlock2> for Array<u8, U32> {
    #[inline(always)]
    fn from(val: AesBlock2) -> Self {
        let mut out = Array::<u8, U32>::default();
        // Safety: `out` is 32 bytes, storeu has no alignment requirement.
        unsafe { _mm256_storeu_si256(out.as_mut_ptr().cast(), val.0) }
        out
    }
}

impl IAesBlock for AesBlock2 {
    type Size = U32;
    const LANES: usize = 2;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        // Safety: we require target_feature = "vaes".
        Self(unsafe { _mm256_aesenc_epi128(self.0, key.0) })
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U32>) -> Self {
        // Safety: `a` is 32 bytes, loadu has no alignment requirement.
        Self(unsafe { _mm256_loadu_si256(a.as_ptr().cast()) })
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        // Safety: we require target_feature = "avx2".
        Self(unsafe { _mm256_broadcastsi128_si256(_mm_loadu_si128(a.as_ptr().cast())) })
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        let mut out = Array::<u8, U16>::default();
        // Safety: we require target_feature = "avx2".
        unsafe {
            let lo = _mm256_castsi256_si128(self.0);
            let hi = _mm256_extracti128_si256::<1>(self.0);
            _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_xor_si128(lo, hi));
        }
        out
    }
}

impl BitXor for AesBlock2 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        // Safety: we require target_feature = "avx2".
        Self(unsafe { _mm256_xor_si256(self.0, rhs.0) })
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
        // Safety: we require target_feature = "avx2".
        Self(unsafe { _mm256_and_si256(self.0, rhs.0) })
    }
}

/// Four lanes as two 256-bit halves, for CPUs without AVX-512.
#[derive(Clone, Copy, Default)]
pub struct AesBlock4(AesBlock2, AesBlock2);

impl From<AesBlock4> for Array<u8, U64> {
    #[inline(always)]
    fn from(val: AesBlock4) -> Self {
        let a: Array<u8, U32> = val.0.into();
        let b: Array<u8, U32> = val.1.into();
        a.concat(b)
    }
}

impl IAesBlock for AesBlock4 {
    type Size = U64;
    const LANES: usize = 4;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        Self(self.0.aes(key.0), self.1.aes(key.1))
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U64>) -> Self {
        let (a0, a1) = a.split_ref::<U32>();
        Self(AesBlock2::from_block(a0), AesBlock2::from_block(a1))
    }

    #[inline(always)]
    fn splat(a: &Array<u8, U16>) -> Self {
        let a = AesBlock2::splat(a);
        Self(a, a)
    }

    #[inline(always)]
    fn reduce_xor(self) -> Array<u8, U16> {
        (self.0 ^ self.1).reduce_xor()
    }
}

impl BitXor for AesBlock4 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0, self.1 ^ rhs.1)
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
        Self(self.0 & rhs.0, self.1 & rhs.1)
    }
}
