use std::arch::aarch64::*;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::Array;
use hybrid_array::sizes::U16;

use super::{IAesBlock, Isa, Kernel, sealed};

mod polyfill_x2 {
    include!("generic/polyfill_x2.rs");
}

mod polyfill_x4 {
    include!("generic/polyfill_x4.rs");
}

/// ARMv8 cryptography extension. Wider lanes are polyfilled.
#[derive(Clone, Copy, Debug)]
pub struct Neon;

impl sealed::Sealed for Neon {}
impl Isa for Neon {
    type X1 = AesBlock;
    type X2 = polyfill_x2::AesBlock2;
    type X4 = polyfill_x4::AesBlock4;
}

cpufeatures::new!(cpuid_aes, "aes");

pub(super) fn has_aes() -> bool {
    cpuid_aes::get()
}

/// # Safety
///
/// The CPU must support `aes`.
#[target_feature(enable = "neon,aes")]
pub(super) unsafe fn run_neon<K: Kernel>(kernel: K) -> K::Output {
    kernel.run::<Neon>()
}

#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct AesBlock(uint8x16_t);

impl Default for AesBlock {
    #[inline(always)]
    fn default() -> Self {
        // Safety: neon is part of the aarch64 baseline.
        Self(unsafe { vmovq_n_u8(0) })
    }
}

impl From<AesBlock> for Array<u8, U16> {
    #[inline(always)]
    fn from(val: AesBlock) -> Self {
        let mut out = Array([0; 16]);
        // Safety: `out` is 16 bytes, st1 has no alignment requirement.
        unsafe { vst1q_u8(out.as_mut_ptr(), val.0) }
        out
    }
}

impl IAesBlock for AesBlock {
    type Size = U16;
    const LANES: usize = 1;

    #[inline(always)]
    fn aes(self, key: Self) -> Self {
        // AESE xors the key before SubBytes, so run it with a zero key and
        // apply the real round key afterwards.
        // Safety: this block is only constructed under `run_neon`, which enables `aes`.
        Self(unsafe { vaesmcq_u8(vaeseq_u8(self.0, vmovq_n_u8(0))) }) ^ key
    }

    #[inline(always)]
    fn from_block(a: &Array<u8, U16>) -> Self {
        // Safety: `a` is 16 bytes, ld1 has no alignment requirement.
        AesBlock(unsafe { vld1q_u8(a.as_ptr()) })
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
        // Safety: neon is part of the aarch64 baseline.
        Self(unsafe { veorq_u8(self.0, rhs.0) })
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
        // Safety: neon is part of the aarch64 baseline.
        Self(unsafe { vandq_u8(self.0, rhs.0) })
    }
}
