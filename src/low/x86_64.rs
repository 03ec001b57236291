use super::{Isa, Kernel, sealed};

mod aesni;
mod avx2_x2;
mod avx512_x4;

use aesni::AesBlock;

mod polyfill_x2 {
    include!("generic/polyfill_x2.rs");
}

mod polyfill_x4 {
    include!("generic/polyfill_x4.rs");
}

/// AES-NI on 128-bit registers.
#[derive(Clone, Copy, Debug)]
pub struct AesNi;

impl sealed::Sealed for AesNi {}
impl Isa for AesNi {
    type X1 = AesBlock;
    type X2 = polyfill_x2::AesBlock2;
    type X4 = polyfill_x4::AesBlock4;
}

/// VAES with AVX2: two lanes per register.
#[derive(Clone, Copy, Debug)]
pub struct Vaes256;

impl sealed::Sealed for Vaes256 {}
impl Isa for Vaes256 {
    type X1 = AesBlock;
    type X2 = avx2_x2::AesBlock2;
    type X4 = avx2_x2::AesBlock4;
}

/// VAES with AVX-512F: four lanes per register.
#[derive(Clone, Copy, Debug)]
pub struct Vaes512;

impl sealed::Sealed for Vaes512 {}
impl Isa for Vaes512 {
    type X1 = AesBlock;
    type X2 = avx2_x2::AesBlock2;
    type X4 = avx512_x4::AesBlock4;
}

cpufeatures::new!(cpuid_aes, "aes", "sse2");
cpufeatures::new!(cpuid_avx2, "avx", "avx2");
cpufeatures::new!(cpuid_avx512, "avx512f");

pub(super) fn has_aesni() -> bool {
    cpuid_aes::get()
}

pub(super) fn has_vaes256() -> bool {
    has_aesni() && cpuid_avx2::get() && std::arch::is_x86_feature_detected!("vaes")
}

pub(super) fn has_vaes512() -> bool {
    has_vaes256() && cpuid_avx512::get()
}

/// # Safety
///
/// The CPU must support `aes` and `sse2`.
#[target_feature(enable = "sse2,aes")]
pub(super) unsafe fn run_aesni<K: Kernel>(kernel: K) -> K::Output {
    kernel.run::<AesNi>()
}

/// # Safety
///
/// The CPU must support `aes`, `avx2` and `vaes`.
#[target_feature(enable = "sse2,aes,avx,avx2,vaes")]
pub(super) unsafe fn run_vaes256<K: Kernel>(kernel: K) -> K::Output {
    kernel.run::<Vaes256>()
}

/// # Safety
///
/// The CPU must support `aes`, `avx2`, `vaes` and `avx512f`.
#[target_feature(enable = "sse2,aes,avx,avx2,vaes,avx512f")]
pub(super) unsafe fn run_vaes512<K: Kernel>(kernel: K) -> K::Output {
    kernel.run::<Vaes512>()
}
