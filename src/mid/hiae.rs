//! HiAE, and HiAEx4 which runs four domain-separated HiAE states side by side.
//!
//! The sixteen state blocks never move. An update writes the new first block
//! over the old one and advances `pos`, so block `i` lives at
//! `s[(pos + i) % 16]`.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use aead::inout::InOut;
use hybrid_array::Array;
use hybrid_array::sizes::{U16, U32};

use super::{AeadState, Lanes, Variant, VariantSpec, X1, X4, sealed, util};
use crate::low::{IAesBlock, Isa};

// The first 64 hexadecimal digits of pi, 32 per constant.
const C0: [u8; 16] = [
    0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37, 0x07, 0x34,
];
const C1: [u8; 16] = [
    0x4a, 0x40, 0x93, 0x82, 0x22, 0x99, 0xf3, 0x1d, 0x00, 0x82, 0xef, 0xa9, 0x8e, 0xc4, 0xe6, 0xc8,
];

const STATE_BLOCKS: usize = 16;
const INIT_ROUNDS: usize = 32;
const FINAL_ROUNDS: usize = 32;

/// Lane counts HiAE is defined for.
pub trait HiAeLanes: Lanes {
    const NAME: &'static str;
}

impl HiAeLanes for X1 {
    const NAME: &'static str = "HiAE";
}

impl HiAeLanes for X4 {
    const NAME: &'static str = "HiAEx4";
}

pub struct HiAeVariant<D>(PhantomData<D>);

impl<D: HiAeLanes> sealed::Sealed for HiAeVariant<D> {}
impl<D: HiAeLanes> Variant for HiAeVariant<D> {
    type KeySize = U32;
    type NonceSize = U16;
    type TagSize = U16;
    type Rate = D::Block;

    type State<I: Isa> = StateHiAe<D, I>;

    const SPEC: VariantSpec = VariantSpec {
        name: D::NAME,
        lanes: D::LANES,
        state_blocks: STATE_BLOCKS,
        key_bytes: 32,
        nonce_bytes: 16,
        tag_bytes: 16,
        rate_bytes: 16 * D::LANES,
        input_words: 1,
        init_rounds: INIT_ROUNDS,
        final_rounds: FINAL_ROUNDS,
        injection: &[0, 3, 13],
        keystream: &[0, 1, 9],
        tag_blocks: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    };
}

pub struct StateHiAe<D: Lanes, I: Isa> {
    s: [D::AesBlock<I>; STATE_BLOCKS],
    pos: usize,
}

impl<D: Lanes, I: Isa> Index<usize> for StateHiAe<D, I> {
    type Output = D::AesBlock<I>;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.s[(self.pos + index) % STATE_BLOCKS]
    }
}

impl<D: Lanes, I: Isa> IndexMut<usize> for StateHiAe<D, I> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.s[(self.pos + index) % STATE_BLOCKS]
    }
}

impl<D: HiAeLanes, I: Isa> AeadState<HiAeVariant<D>> for StateHiAe<D, I> {
    #[inline(always)]
    fn new(key: &Array<u8, U32>, nonce: &Array<u8, U16>) -> Self {
        Self::init(key, nonce)
    }

    #[inline(always)]
    fn absorb(&mut self, ad: &Array<u8, D::Block>) {
        self.update(IAesBlock::from_block(ad));
    }

    #[inline(always)]
    fn encrypt_block(&mut self, mut block: InOut<'_, '_, Array<u8, D::Block>>) {
        let x = <D::AesBlock<I>>::from_block(block.get_in());

        // t = AESL(S0 ^ S1) ^ x
        // c = t ^ S9
        let t = (self[0] ^ self[1]).aesl() ^ x;
        let c = t ^ self[9];

        self.advance(t, x);
        *block.get_out() = c.into();
    }

    #[inline(always)]
    fn decrypt_block(&mut self, mut block: InOut<'_, '_, Array<u8, D::Block>>) {
        let c = <D::AesBlock<I>>::from_block(block.get_in());

        // t = c ^ S9
        // x = AESL(S0 ^ S1) ^ t
        let t = c ^ self[9];
        let x = (self[0] ^ self[1]).aesl() ^ t;

        self.advance(t, x);
        *block.get_out() = x.into();
    }

    #[inline(always)]
    fn decrypt_partial_block(
        &mut self,
        mut padded_block: InOut<'_, '_, Array<u8, D::Block>>,
        len: usize,
    ) {
        let c = <D::AesBlock<I>>::from_block(padded_block.get_in());

        // x = Truncate(c ^ AESL(S0 ^ S1) ^ S9, |c|)
        let z = (self[0] ^ self[1]).aesl() ^ self[9];
        let xn = padded_block.get_out();
        *xn = (c ^ z).into();
        xn[len..].fill(0);

        // Update(ZeroPad(x))
        self.update(IAesBlock::from_block(xn));
    }

    #[inline(always)]
    fn finalize(mut self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, U16> {
        // t = LE64(ad_len_bits) || LE64(msg_len_bits)
        // Repeat(32, Update(t))
        let t = <D::AesBlock<I>>::splat(&util::concatu64(ad_len_bits, msg_len_bits));
        for _ in 0..FINAL_ROUNDS {
            self.update(t);
        }

        // tag = S0 ^ S1 ^ ... ^ S15, then folded over lanes
        let mut tag = <D::AesBlock<I>>::default();
        for &b in &self.s {
            tag ^= b;
        }
        tag.reduce_xor()
    }
}

impl<D: Lanes, I: Isa> StateHiAe<D, I> {
    #[inline(always)]
    fn init(key: &Array<u8, U32>, nonce: &Array<u8, U16>) -> Self {
        let (k0, k1) = key.split_ref::<U16>();
        let k0 = <D::AesBlock<I>>::splat(k0);
        let k1 = <D::AesBlock<I>>::splat(k1);
        let n = <D::AesBlock<I>>::splat(nonce);
        let c0 = <D::AesBlock<I>>::splat(&Array(C0));
        let c1 = <D::AesBlock<I>>::splat(&Array(C1));
        let z = <D::AesBlock<I>>::default();

        let mut s = Self {
            s: [
                c0,
                k1,
                n,
                c0,
                z,
                n ^ k0,
                z,
                c1,
                n ^ k1,
                z,
                k1,
                c0,
                c1,
                k1,
                z,
                c0 ^ c1,
            ],
            pos: 0,
        };

        // Each lane gets its own context. A single lane has none.
        let ctx = util::ctx::<D, I>();
        for _ in 0..INIT_ROUNDS {
            s[3] ^= ctx;
            s[13] ^= ctx;
            s.update(c0);
        }

        s[9] ^= k0;
        s[13] ^= k1;
        s
    }

    #[inline(always)]
    fn update(&mut self, x: D::AesBlock<I>) {
        // t = AESL(S0 ^ S1) ^ x
        let t = (self[0] ^ self[1]).aesl() ^ x;
        self.advance(t, x);
    }

    /// The rest of an update once `t = AESL(S0 ^ S1) ^ x` is known.
    #[inline(always)]
    fn advance(&mut self, t: D::AesBlock<I>, x: D::AesBlock<I>) {
        // S0 = AESL(S13) ^ t
        // S3 = S3 ^ x
        // S13 = S13 ^ x
        // Rol()
        let s0 = self[13].aesl() ^ t;
        self[3] ^= x;
        self[13] ^= x;
        self[0] = s0;
        self.pos = (self.pos + 1) % STATE_BLOCKS;
    }
}

#[cfg(test)]
mod tests {
    use hybrid_array::Array;
    use hybrid_array::sizes::{U16, U64};

    use crate::low::{IAesBlock, Isa, Soft};
    use crate::mid::{X1, X4};

    use super::{STATE_BLOCKS, StateHiAe};

    type Block = <Soft as Isa>::X1;

    fn logical(s: &StateHiAe<X1, Soft>) -> [[u8; 16]; STATE_BLOCKS] {
        std::array::from_fn(|i| Array::<u8, U16>::from(s[i]).0)
    }

    /// Shifting every block down by one, the way the algorithm is written.
    fn shifting_update(s: &mut [Block; STATE_BLOCKS], x: Block) {
        let t = (s[0] ^ s[1]).aesl() ^ x;
        s[0] = s[13].aesl() ^ t;
        s[3] ^= x;
        s[13] ^= x;
        s.rotate_left(1);
    }

    #[test]
    fn rotating_offset_matches_shifting_state() {
        let key = Array::from_fn(|i| i as u8);
        let nonce = Array::from_fn(|i| 0x10 + i as u8);
        let mut s = StateHiAe::<X1, Soft>::init(&key, &nonce);
        let mut reference: [Block; STATE_BLOCKS] = std::array::from_fn(|i| s[i]);

        for round in 0..40u8 {
            let x = Block::from_block(&Array([round; 16]));
            s.update(x);
            shifting_update(&mut reference, x);

            let expected = reference.map(|b| Array::<u8, U16>::from(b).0);
            assert_eq!(logical(&s), expected, "round {round}");
        }
        assert_eq!(s.pos, 40 % STATE_BLOCKS);
    }

    #[test]
    fn lanes_are_domain_separated() {
        let key = Array([7; 32]);
        let nonce = Array([9; 16]);

        let single = StateHiAe::<X1, Soft>::init(&key, &nonce);
        let four = StateHiAe::<X4, Soft>::init(&key, &nonce);

        for i in 0..STATE_BLOCKS {
            let lanes: Array<u8, U64> = four[i].into();
            let lanes: Vec<&[u8]> = lanes.chunks(16).collect();
            for a in 0..4 {
                for b in a + 1..4 {
                    assert_ne!(lanes[a], lanes[b], "block {i}, lanes {a} and {b}");
                }
            }
            assert_ne!(lanes[0], Array::<u8, U16>::from(single[i]).as_slice());
        }
    }
}
