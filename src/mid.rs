//! Cipher states.
//!
//! A state is created per operation by [`AeadState::new`], advanced by one
//! update per rate-sized chunk and consumed by [`AeadState::finalize`].
//! States are generic over the [`Isa`] that provides their AES blocks, so
//! the same code runs under every [`Backend`](crate::Backend).

use std::ops::{Add, Sub};

use aead::inout::InOut;
use hybrid_array::sizes::{U16, U32, U64, U128};
use hybrid_array::{Array, ArraySize};

use crate::low::{IAesBlock, Isa};

pub mod aegis128;
pub mod hiae;
pub mod rocca_s;
mod util;

pub use aegis128::{AegisTag, AegisVariant, Tag128, Tag256};
pub use hiae::{HiAeLanes, HiAeVariant};
pub use rocca_s::RoccaSVariant;

mod sealed {
    pub trait Sealed {}
}

/// Number of parallel AES lanes in a state block.
pub trait Lanes: sealed::Sealed + 'static {
    const LANES: usize;

    /// `16 * LANES` bytes.
    type Block: ArraySize + Add<Self::Block, Output = Self::Block2>;
    /// `32 * LANES` bytes.
    type Block2: ArraySize + Sub<Self::Block, Output = Self::Block>;

    #[doc(hidden)]
    type AesBlock<I: Isa>: IAesBlock<Size = Self::Block>;
}

/// One lane.
#[derive(Clone, Copy, Debug)]
pub struct X1;
/// Two lanes.
#[derive(Clone, Copy, Debug)]
pub struct X2;
/// Four lanes.
#[derive(Clone, Copy, Debug)]
pub struct X4;

impl sealed::Sealed for X1 {}
impl Lanes for X1 {
    const LANES: usize = 1;
    type Block = U16;
    type Block2 = U32;
    type AesBlock<I: Isa> = I::X1;
}

impl sealed::Sealed for X2 {}
impl Lanes for X2 {
    const LANES: usize = 2;
    type Block = U32;
    type Block2 = U64;
    type AesBlock<I: Isa> = I::X2;
}

impl sealed::Sealed for X4 {}
impl Lanes for X4 {
    const LANES: usize = 4;
    type Block = U64;
    type Block2 = U128;
    type AesBlock<I: Isa> = I::X4;
}

/// The constants that set one algorithm apart from the others.
///
/// Index lists name state blocks as the algorithm's description does,
/// before any rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantSpec {
    pub name: &'static str,
    pub lanes: usize,
    /// Blocks in the state, `N`.
    pub state_blocks: usize,
    pub key_bytes: usize,
    pub nonce_bytes: usize,
    pub tag_bytes: usize,
    /// Bytes consumed per update.
    pub rate_bytes: usize,
    /// 128-bit message words per lane and update.
    pub input_words: usize,
    pub init_rounds: usize,
    pub final_rounds: usize,
    /// Blocks that message words are xored into during an update.
    pub injection: &'static [usize],
    /// Blocks read to derive the keystream.
    pub keystream: &'static [usize],
    /// Blocks folded into the tag.
    pub tag_blocks: &'static [usize],
}

/// An AEAD algorithm: its sizes, its constants and its state.
pub trait Variant: sealed::Sealed + Sized + 'static {
    type KeySize: ArraySize;
    type NonceSize: ArraySize;
    type TagSize: ArraySize;
    /// Bytes consumed per update.
    type Rate: ArraySize;

    #[doc(hidden)]
    type State<I: Isa>: AeadState<Self>;

    const SPEC: VariantSpec;
}

/// Init, absorb, encrypt/decrypt and finalize for one variant.
pub trait AeadState<V: Variant>: Sized {
    fn new(key: &Array<u8, V::KeySize>, nonce: &Array<u8, V::NonceSize>) -> Self;

    fn absorb(&mut self, ad: &Array<u8, V::Rate>);

    fn encrypt_block(&mut self, block: InOut<'_, '_, Array<u8, V::Rate>>);
    fn decrypt_block(&mut self, block: InOut<'_, '_, Array<u8, V::Rate>>);

    /// Decrypts a zero-padded final chunk holding `len` bytes of ciphertext.
    /// Output bytes past `len` are zeroed before they are absorbed.
    fn decrypt_partial_block(&mut self, padded_block: InOut<'_, '_, Array<u8, V::Rate>>, len: usize);

    fn finalize(self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, V::TagSize>;
}

#[cfg(test)]
mod tests {
    use hybrid_array::typenum::Unsigned;

    use super::{
        AegisVariant, HiAeVariant, RoccaSVariant, Tag128, Tag256, Variant, VariantSpec, X1, X2, X4,
    };

    fn check<V: Variant>() -> VariantSpec {
        let spec = V::SPEC;
        assert!(spec.state_blocks >= 5, "{}", spec.name);
        assert!(spec.injection.len() >= spec.input_words, "{}", spec.name);
        for &i in spec.injection.iter().chain(spec.keystream).chain(spec.tag_blocks) {
            assert!(i < spec.state_blocks, "{}: index {i}", spec.name);
        }
        assert_eq!(
            spec.rate_bytes,
            16 * spec.lanes * spec.input_words,
            "{}",
            spec.name
        );

        assert_eq!(spec.key_bytes, V::KeySize::USIZE, "{}", spec.name);
        assert_eq!(spec.nonce_bytes, V::NonceSize::USIZE, "{}", spec.name);
        assert_eq!(spec.tag_bytes, V::TagSize::USIZE, "{}", spec.name);
        assert_eq!(spec.rate_bytes, V::Rate::USIZE, "{}", spec.name);
        spec
    }

    #[test]
    fn variant_specs_are_consistent() {
        assert_eq!(check::<AegisVariant<X1, Tag128>>().name, "AEGIS-128L");
        assert_eq!(check::<AegisVariant<X2, Tag128>>().name, "AEGIS-128X2");
        assert_eq!(check::<AegisVariant<X4, Tag128>>().name, "AEGIS-128X4");
        assert_eq!(check::<AegisVariant<X1, Tag256>>().tag_bytes, 32);
        assert_eq!(check::<AegisVariant<X2, Tag256>>().tag_bytes, 32);
        assert_eq!(check::<AegisVariant<X4, Tag256>>().rate_bytes, 128);

        let hiae = check::<HiAeVariant<X1>>();
        assert_eq!((hiae.name, hiae.rate_bytes), ("HiAE", 16));
        let hiaex4 = check::<HiAeVariant<X4>>();
        assert_eq!((hiaex4.name, hiaex4.rate_bytes), ("HiAEx4", 64));

        let rocca = check::<RoccaSVariant>();
        assert_eq!((rocca.name, rocca.tag_bytes), ("ROCCA-S", 32));
    }
}
