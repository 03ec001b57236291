use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use aead::inout::InOut;
use hybrid_array::sizes::{U16, U32};
use hybrid_array::typenum::Unsigned;
use hybrid_array::{Array, ArraySize};

use super::{AeadState, Lanes, Variant, VariantSpec, sealed, util};
use crate::low::{IAesBlock, Isa};

// *  C0: an AES block built from the following bytes in hexadecimal
// format: { 0x00, 0x01, 0x01, 0x02, 0x03, 0x05, 0x08, 0x0d, 0x15,
// 0x22, 0x37, 0x59, 0x90, 0xe9, 0x79, 0x62 }.
const C0: [u8; 16] = [
    0x00, 0x01, 0x01, 0x02, 0x03, 0x05, 0x08, 0x0d, 0x15, 0x22, 0x37, 0x59, 0x90, 0xe9, 0x79, 0x62,
];

// *  C1: an AES block built from the following bytes in hexadecimal
// format: { 0xdb, 0x3d, 0x18, 0x55, 0x6d, 0xc2, 0x2f, 0xf1, 0x20,
// 0x11, 0x31, 0x42, 0x73, 0xb5, 0x28, 0xdd }.
const C1: [u8; 16] = [
    0xdb, 0x3d, 0x18, 0x55, 0x6d, 0xc2, 0x2f, 0xf1, 0x20, 0x11, 0x31, 0x42, 0x73, 0xb5, 0x28, 0xdd,
];

const INIT_ROUNDS: usize = 10;
const FINAL_ROUNDS: usize = 7;

const TAG128_BLOCKS: &[usize] = &[0, 1, 2, 3, 4, 5, 6];
const TAG256_BLOCKS: &[usize] = &[0, 1, 2, 3, 4, 5, 6, 7];

/// AEGIS-128L (one lane) or AEGIS-128X (two or four lanes).
pub struct AegisVariant<D, T>(PhantomData<(D, T)>);

impl<D: Lanes, T: AegisTag> sealed::Sealed for AegisVariant<D, T> {}
impl<D: Lanes, T: AegisTag> Variant for AegisVariant<D, T> {
    type KeySize = U16;
    type NonceSize = U16;
    type TagSize = T::Size;
    type Rate = D::Block2;

    type State<I: Isa> = State128X<D, I>;

    const SPEC: VariantSpec = VariantSpec {
        name: match D::LANES {
            1 => "AEGIS-128L",
            2 => "AEGIS-128X2",
            _ => "AEGIS-128X4",
        },
        lanes: D::LANES,
        state_blocks: 8,
        key_bytes: 16,
        nonce_bytes: 16,
        tag_bytes: <T::Size as Unsigned>::USIZE,
        rate_bytes: 32 * D::LANES,
        input_words: 2,
        init_rounds: INIT_ROUNDS,
        final_rounds: FINAL_ROUNDS,
        injection: &[0, 4],
        keystream: &[1, 2, 3, 5, 6, 7],
        tag_blocks: if <T::Size as Unsigned>::USIZE == 16 {
            TAG128_BLOCKS
        } else {
            TAG256_BLOCKS
        },
    };
}

/// Tag length of an AEGIS variant.
pub trait AegisTag: sealed::Sealed + 'static {
    type Size: ArraySize;

    #[doc(hidden)]
    fn finalize<D: Lanes, I: Isa>(
        state: State128X<D, I>,
        ad_len_bits: u64,
        msg_len_bits: u64,
    ) -> Array<u8, Self::Size>;
}

/// 128-bit tag.
#[derive(Clone, Copy, Debug)]
pub struct Tag128;
/// 256-bit tag.
#[derive(Clone, Copy, Debug)]
pub struct Tag256;

impl sealed::Sealed for Tag128 {}
impl AegisTag for Tag128 {
    type Size = U16;

    #[inline(always)]
    fn finalize<D: Lanes, I: Isa>(
        state: State128X<D, I>,
        ad_len_bits: u64,
        msg_len_bits: u64,
    ) -> Array<u8, U16> {
        state.finalize128(ad_len_bits, msg_len_bits)
    }
}

impl sealed::Sealed for Tag256 {}
impl AegisTag for Tag256 {
    type Size = U32;

    #[inline(always)]
    fn finalize<D: Lanes, I: Isa>(
        state: State128X<D, I>,
        ad_len_bits: u64,
        msg_len_bits: u64,
    ) -> Array<u8, U32> {
        state.finalize256(ad_len_bits, msg_len_bits)
    }
}

pub struct State128X<D: Lanes, I: Isa>([D::AesBlock<I>; 8]);

impl<D: Lanes, I: Isa> Index<usize> for State128X<D, I> {
    type Output = D::AesBlock<I>;

    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<D: Lanes, I: Isa> IndexMut<usize> for State128X<D, I> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl<D: Lanes, T: AegisTag, I: Isa> AeadState<AegisVariant<D, T>> for State128X<D, I> {
    #[inline(always)]
    fn new(key: &Array<u8, U16>, nonce: &Array<u8, U16>) -> Self {
        Self::init(key, nonce)
    }

    #[inline(always)]
    fn absorb(&mut self, ad: &Array<u8, D::Block2>) {
        let (t0, t1) = util::split_blocks::<D, I>(ad);
        self.update(t0, t1);
    }

    #[inline(always)]
    fn encrypt_block(&mut self, block: InOut<'_, '_, Array<u8, D::Block2>>) {
        self.enc(block);
    }

    #[inline(always)]
    fn decrypt_block(&mut self, block: InOut<'_, '_, Array<u8, D::Block2>>) {
        self.dec(block);
    }

    #[inline(always)]
    fn decrypt_partial_block(
        &mut self,
        padded_block: InOut<'_, '_, Array<u8, D::Block2>>,
        len: usize,
    ) {
        self.dec_partial(padded_block, len);
    }

    #[inline(always)]
    fn finalize(self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, T::Size> {
        T::finalize(self, ad_len_bits, msg_len_bits)
    }
}

impl<D: Lanes, I: Isa> State128X<D, I> {
    #[inline(always)]
    fn init(key: &Array<u8, U16>, nonce: &Array<u8, U16>) -> Self {
        let key = <D::AesBlock<I>>::splat(key);
        let nonce = <D::AesBlock<I>>::splat(nonce);
        let c0 = <D::AesBlock<I>>::splat(&Array(C0));
        let c1 = <D::AesBlock<I>>::splat(&Array(C1));

        // for i in 0..D:
        //     V[0,i] = key ^ nonce
        //     V[1,i] = C1
        //     V[2,i] = C0
        //     V[3,i] = C1
        //     V[4,i] = key ^ nonce
        //     V[5,i] = key ^ C0
        //     V[6,i] = key ^ C1
        //     V[7,i] = key ^ C0
        let kn = key ^ nonce;
        let k0 = key ^ c0;
        let k1 = key ^ c1;
        let mut v = Self([kn, c1, c0, c1, kn, k0, k1, k0]);

        // for i in 0..D:
        //     ctx[i] = ZeroPad(Byte(i) || Byte(D - 1), 128)
        let ctx = util::ctx::<D, I>();

        // Repeat(10,
        //     for i in 0..D:
        //         V[3,i] = V[3,i] ^ ctx[i]
        //         V[7,i] = V[7,i] ^ ctx[i]
        //
        //     Update(nonce_v, key_v)
        // )
        for _ in 0..INIT_ROUNDS {
            v[3] ^= ctx;
            v[7] ^= ctx;
            v.update(nonce, key);
        }

        v
    }

    #[inline(always)]
    fn keystream(&self) -> (D::AesBlock<I>, D::AesBlock<I>) {
        let v = self;
        // z0 = {}
        // z1 = {}
        // for i in 0..D:
        //     z0 = z0 || (V[6,i] ^ V[1,i] ^ (V[2,i] & V[3,i]))
        //     z1 = z1 || (V[2,i] ^ V[5,i] ^ (V[6,i] & V[7,i]))
        let z0 = v[6] ^ v[1] ^ (v[2] & v[3]);
        let z1 = v[2] ^ v[5] ^ (v[6] & v[7]);
        (z0, z1)
    }

    #[inline(always)]
    fn enc(&mut self, mut block: InOut<'_, '_, Array<u8, D::Block2>>) {
        let (z0, z1) = self.keystream();

        // t0, t1 = Split(xi, R)
        let (t0, t1) = util::split_blocks::<D, I>(block.get_in());

        // out0 = t0 ^ z0
        // out1 = t1 ^ z1
        let out0 = t0 ^ z0;
        let out1 = t1 ^ z1;

        // Update(t0, t1)
        self.update(t0, t1);

        // ci = out0 || out1
        util::write_blocks::<D, I>(out0, out1, block.get_out());
    }

    #[inline(always)]
    fn dec(&mut self, mut block: InOut<'_, '_, Array<u8, D::Block2>>) {
        let (z0, z1) = self.keystream();

        // t0, t1 = Split(ci, R)
        let (t0, t1) = util::split_blocks::<D, I>(block.get_in());

        // out0 = t0 ^ z0
        // out1 = t1 ^ z1
        let out0 = t0 ^ z0;
        let out1 = t1 ^ z1;

        // Update(out0, out1)
        self.update(out0, out1);

        // xi = out0 || out1
        util::write_blocks::<D, I>(out0, out1, block.get_out());
    }

    #[inline(always)]
    fn dec_partial(&mut self, mut padded_block: InOut<'_, '_, Array<u8, D::Block2>>, len: usize) {
        let (z0, z1) = self.keystream();

        // t0, t1 = Split(ZeroPad(cn, R), 128 * D)
        let (t0, t1) = util::split_blocks::<D, I>(padded_block.get_in());

        // out0 = t0 ^ z0
        // out1 = t1 ^ z1
        let out0 = t0 ^ z0;
        let out1 = t1 ^ z1;

        // xn = Truncate(out0 || out1, |cn|)
        let xn = padded_block.get_out();
        util::write_blocks::<D, I>(out0, out1, xn);
        xn[len..].fill(0);

        // v0, v1 = Split(ZeroPad(xn, R), 128 * D)
        // Update(v0, v1)
        let (v0, v1) = util::split_blocks::<D, I>(xn);
        self.update(v0, v1);
    }

    #[inline(always)]
    fn finalize_rounds(&mut self, ad_len_bits: u64, msg_len_bits: u64) {
        // t = {}
        // u = LE64(ad_len_bits) || LE64(msg_len_bits)
        let u = <D::AesBlock<I>>::splat(&util::concatu64(ad_len_bits, msg_len_bits));

        // for i in 0..D:
        //     t = t || (V[2,i] ^ u)
        let t = self[2] ^ u;

        // Repeat(7, Update(t, t))
        for _ in 0..FINAL_ROUNDS {
            self.update(t, t);
        }
    }

    #[inline(always)]
    pub fn finalize128(mut self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, U16> {
        self.finalize_rounds(ad_len_bits, msg_len_bits);

        // tag = ZeroPad({}, 128)
        // for i in 0..D:
        //     ti = V[0,i] ^ V[1,i] ^ V[2,i] ^ V[3,i] ^ V[4,i] ^ V[5,i] ^ V[6,i]
        //     tag = tag ^ ti
        let v = &self;
        (v[0] ^ v[1] ^ v[2] ^ v[3] ^ v[4] ^ v[5] ^ v[6]).reduce_xor()
    }

    #[inline(always)]
    pub fn finalize256(mut self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, U32> {
        self.finalize_rounds(ad_len_bits, msg_len_bits);

        // ti0 = ZeroPad({}, 128)
        // ti1 = ZeroPad({}, 128)
        // for i in 0..D:
        //     ti0 = ti0 ^ V[0,i] ^ V[1,i] ^ V[2,i] ^ V[3,i]
        //     ti1 = ti1 ^ V[4,i] ^ V[5,i] ^ V[6,i] ^ V[7,i]
        let v = &self;
        let ti0 = (v[0] ^ v[1] ^ v[2] ^ v[3]).reduce_xor();
        let ti1 = (v[4] ^ v[5] ^ v[6] ^ v[7]).reduce_xor();

        // tag = ti0 || ti1
        ti0.concat(ti1)
    }

    #[inline(always)]
    fn update(&mut self, m0: D::AesBlock<I>, m1: D::AesBlock<I>) {
        let v = self;

        // for i in 0..D:
        //     V'[0,i] = AESRound(V[7,i], V[0,i] ^ m0[i])
        //     V'[1,i] = AESRound(V[0,i], V[1,i])
        //     V'[2,i] = AESRound(V[1,i], V[2,i])
        //     V'[3,i] = AESRound(V[2,i], V[3,i])
        //     V'[4,i] = AESRound(V[3,i], V[4,i] ^ m1[i])
        //     V'[5,i] = AESRound(V[4,i], V[5,i])
        //     V'[6,i] = AESRound(V[5,i], V[6,i])
        //     V'[7,i] = AESRound(V[6,i], V[7,i])
        let tmp = v[7];
        v[7] = v[6].aes(v[7]);
        v[6] = v[5].aes(v[6]);
        v[5] = v[4].aes(v[5]);
        v[4] = v[3].aes(v[4]);
        v[3] = v[2].aes(v[3]);
        v[2] = v[1].aes(v[2]);
        v[1] = v[0].aes(v[1]);
        v[0] = tmp.aes(v[0]);

        v[4] ^= m1;
        v[0] ^= m0;
    }
}
