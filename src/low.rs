//! The block primitive: one AES encryption round applied to 1, 2 or 4
//! independent 128-bit lanes.
//!
//! Every [`Isa`] names a 1-, 2- and 4-lane block type. Which one runs is
//! decided at runtime by a [`Backend`], picked once when a cipher handle
//! is created. Algorithm code never looks at `cfg(target_feature)`: it is
//! generic over the ISA and is monomorphised inside a `#[target_feature]`
//! trampoline for each backend.

use std::fmt;
use std::sync::OnceLock;
use std::ops::{BitAnd, BitXor, BitXorAssign};

use hybrid_array::sizes::{U16, U32, U64};
use hybrid_array::{Array, ArraySize};

mod soft;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        mod x86_64;
    } else if #[cfg(target_arch = "aarch64")] {
        mod aarch64;
    }
}

pub(crate) use soft::Soft;

mod sealed {
    pub trait Sealed {}
}

/// A lane-wide AES block.
pub trait IAesBlock:
    Default
    + Copy
    + BitXor<Output = Self>
    + BitXorAssign
    + BitAnd<Output = Self>
    + Into<Array<u8, Self::Size>>
{
    /// `16 * LANES` bytes.
    type Size: ArraySize;
    const LANES: usize;

    /// One AES encryption round of every lane (SubBytes, ShiftRows,
    /// MixColumns), followed by XOR with `key`.
    fn aes(self, key: Self) -> Self;

    /// [`IAesBlock::aes`] with an all-zero round key.
    #[inline(always)]
    fn aesl(self) -> Self {
        self.aes(Self::default())
    }

    fn from_block(a: &Array<u8, Self::Size>) -> Self;

    /// Copies one 128-bit block into every lane.
    fn splat(a: &Array<u8, U16>) -> Self;

    /// XOR of all lanes.
    fn reduce_xor(self) -> Array<u8, U16>;
}

/// A set of block implementations sharing one instruction set.
pub trait Isa: sealed::Sealed + Copy + 'static {
    type X1: IAesBlock<Size = U16>;
    type X2: IAesBlock<Size = U32>;
    type X4: IAesBlock<Size = U64>;
}

impl sealed::Sealed for Soft {}

/// A computation that can be run on any [`Isa`].
pub(crate) trait Kernel {
    type Output;

    fn run<I: Isa>(self) -> Self::Output;
}

/// Implementation of the AES round used by a cipher handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Backend {
    /// Portable round function, lanes processed one after another.
    Soft,
    /// AES-NI, one 128-bit lane per instruction.
    #[cfg(target_arch = "x86_64")]
    AesNi,
    /// VAES on 256-bit registers: two lanes per instruction.
    #[cfg(target_arch = "x86_64")]
    Vaes256,
    /// VAES on 512-bit registers: four lanes per instruction.
    #[cfg(target_arch = "x86_64")]
    Vaes512,
    /// ARMv8 cryptography extension.
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl Backend {
    /// Picks the fastest backend supported by the running CPU.
    ///
    /// The CPU is probed once per process. With the `force-soft` feature
    /// this always returns [`Backend::Soft`].
    pub fn detect() -> Self {
        static DETECTED: OnceLock<Backend> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let backend = Self::probe();
            tracing::debug!(%backend, "selected AES round backend");
            backend
        })
    }

    /// The portable backend, available everywhere.
    pub const fn portable() -> Self {
        Backend::Soft
    }

    /// All backends compiled for this target, portable first.
    pub fn all() -> &'static [Backend] {
        &[
            Backend::Soft,
            #[cfg(target_arch = "x86_64")]
            Backend::AesNi,
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes256,
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes512,
            #[cfg(target_arch = "aarch64")]
            Backend::Neon,
        ]
    }

    /// Whether the running CPU can execute this backend.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Soft => true,
            #[cfg(target_arch = "x86_64")]
            Backend::AesNi => x86_64::has_aesni(),
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes256 => x86_64::has_vaes256(),
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes512 => x86_64::has_vaes512(),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => aarch64::has_aes(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Soft => "soft",
            #[cfg(target_arch = "x86_64")]
            Backend::AesNi => "aes-ni",
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes256 => "vaes-256",
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes512 => "vaes-512",
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => "neon",
        }
    }

    fn probe() -> Self {
        if cfg!(feature = "force-soft") {
            return Backend::Soft;
        }
        Self::all()
            .iter()
            .rev()
            .copied()
            .find(|backend| backend.is_available())
            .unwrap_or(Backend::Soft)
    }

    /// Runs `kernel` with the block types of this backend.
    ///
    /// `Kernel::run` and everything it calls down to the block operations
    /// must be `#[inline(always)]`. Anything left out of line is compiled
    /// without the trampoline's target features and turns every intrinsic
    /// into a call.
    ///
    /// Callers must only hold a `Backend` other than [`Backend::Soft`] after
    /// [`Backend::is_available`] returned true for it.
    #[inline]
    pub(crate) fn run<K: Kernel>(self, kernel: K) -> K::Output {
        match self {
            Backend::Soft => kernel.run::<Soft>(),
            // Safety: the backend was checked to be available when the handle was built.
            #[cfg(target_arch = "x86_64")]
            Backend::AesNi => unsafe { x86_64::run_aesni(kernel) },
            // Safety: as above.
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes256 => unsafe { x86_64::run_vaes256(kernel) },
            // Safety: as above.
            #[cfg(target_arch = "x86_64")]
            Backend::Vaes512 => unsafe { x86_64::run_vaes512(kernel) },
            // Safety: as above.
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => unsafe { aarch64::run_neon(kernel) },
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
