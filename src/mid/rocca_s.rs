use aead::inout::InOut;
use hybrid_array::Array;
use hybrid_array::sizes::{U16, U32};

use super::{AeadState, Variant, VariantSpec, X1, sealed, util};
use crate::low::{IAesBlock, Isa};

// Z0 and Z1 are the first two pairs of SHA-512 round constants.
const Z0: [u8; 16] = [
    0x42, 0x8a, 0x2f, 0x98, 0xd7, 0x28, 0xae, 0x22, 0x71, 0x37, 0x44, 0x91, 0x23, 0xef, 0x65, 0xcd,
];
const Z1: [u8; 16] = [
    0xb5, 0xc0, 0xfb, 0xcf, 0xec, 0x4d, 0x3b, 0x2f, 0xe9, 0xb5, 0xdb, 0xa5, 0x81, 0x89, 0xdb, 0xbc,
];

const STATE_BLOCKS: usize = 7;
const INIT_ROUNDS: usize = 16;
const FINAL_ROUNDS: usize = 16;

/// ROCCA-S: 256-bit key, 256-bit tag.
pub struct RoccaSVariant;

impl sealed::Sealed for RoccaSVariant {}
impl Variant for RoccaSVariant {
    type KeySize = U32;
    type NonceSize = U16;
    type TagSize = U32;
    type Rate = U32;

    type State<I: Isa> = StateRoccaS<I>;

    const SPEC: VariantSpec = VariantSpec {
        name: "ROCCA-S",
        lanes: 1,
        state_blocks: STATE_BLOCKS,
        key_bytes: 32,
        nonce_bytes: 16,
        tag_bytes: 32,
        rate_bytes: 32,
        input_words: 2,
        init_rounds: INIT_ROUNDS,
        final_rounds: FINAL_ROUNDS,
        injection: &[1, 4],
        keystream: &[0, 2, 3, 4, 5, 6],
        tag_blocks: &[0, 1, 2, 3, 4, 5, 6],
    };
}

pub struct StateRoccaS<I: Isa>([I::X1; STATE_BLOCKS]);

impl<I: Isa> AeadState<RoccaSVariant> for StateRoccaS<I> {
    #[inline(always)]
    fn new(key: &Array<u8, U32>, nonce: &Array<u8, U16>) -> Self {
        let (k0, k1) = key.split_ref::<U16>();
        let k0 = I::X1::from_block(k0);
        let k1 = I::X1::from_block(k1);
        let n = I::X1::from_block(nonce);
        let z0 = I::X1::from_block(&Array(Z0));
        let z1 = I::X1::from_block(&Array(Z1));

        // S = (K1, N, Z0, K0, Z1, N ^ K1, 0)
        let mut s = Self([k1, n, z0, k0, z1, n ^ k1, I::X1::default()]);

        // Repeat(16, Update(Z0, Z1))
        for _ in 0..INIT_ROUNDS {
            s.update(z0, z1);
        }

        // S0 ^= K0, S1 ^= K0, S2 ^= K1, S3 ^= K0, S4 ^= K0, S5 ^= K1, S6 ^= K1
        let v = &mut s.0;
        v[0] ^= k0;
        v[1] ^= k0;
        v[2] ^= k1;
        v[3] ^= k0;
        v[4] ^= k0;
        v[5] ^= k1;
        v[6] ^= k1;
        s
    }

    #[inline(always)]
    fn absorb(&mut self, ad: &Array<u8, U32>) {
        let (x0, x1) = util::split_blocks::<X1, I>(ad);
        self.update(x0, x1);
    }

    #[inline(always)]
    fn encrypt_block(&mut self, mut block: InOut<'_, '_, Array<u8, U32>>) {
        let (z0, z1) = self.keystream();
        let (m0, m1) = util::split_blocks::<X1, I>(block.get_in());

        // C0 = AES(S3 ^ S5, S0) ^ M0
        // C1 = AES(S4 ^ S6, S2) ^ M1
        // Update(M0, M1)
        self.update(m0, m1);
        util::write_blocks::<X1, I>(m0 ^ z0, m1 ^ z1, block.get_out());
    }

    #[inline(always)]
    fn decrypt_block(&mut self, mut block: InOut<'_, '_, Array<u8, U32>>) {
        let (z0, z1) = self.keystream();
        let (c0, c1) = util::split_blocks::<X1, I>(block.get_in());

        let m0 = c0 ^ z0;
        let m1 = c1 ^ z1;
        self.update(m0, m1);
        util::write_blocks::<X1, I>(m0, m1, block.get_out());
    }

    #[inline(always)]
    fn decrypt_partial_block(
        &mut self,
        mut padded_block: InOut<'_, '_, Array<u8, U32>>,
        len: usize,
    ) {
        let (z0, z1) = self.keystream();
        let (c0, c1) = util::split_blocks::<X1, I>(padded_block.get_in());

        let mn = padded_block.get_out();
        util::write_blocks::<X1, I>(c0 ^ z0, c1 ^ z1, mn);
        mn[len..].fill(0);

        let (m0, m1) = util::split_blocks::<X1, I>(mn);
        self.update(m0, m1);
    }

    #[inline(always)]
    fn finalize(mut self, ad_len_bits: u64, msg_len_bits: u64) -> Array<u8, U32> {
        // Repeat(16, Update(LE128(ad_len_bits), LE128(msg_len_bits)))
        let ad_len = I::X1::from_block(&util::le128(ad_len_bits));
        let msg_len = I::X1::from_block(&util::le128(msg_len_bits));
        for _ in 0..FINAL_ROUNDS {
            self.update(ad_len, msg_len);
        }

        // T = (S0 ^ S1 ^ S2 ^ S3) || (S4 ^ S5 ^ S6)
        let s = &self.0;
        let t0: Array<u8, U16> = (s[0] ^ s[1] ^ s[2] ^ s[3]).into();
        let t1: Array<u8, U16> = (s[4] ^ s[5] ^ s[6]).into();
        t0.concat(t1)
    }
}

impl<I: Isa> StateRoccaS<I> {
    #[inline(always)]
    fn keystream(&self) -> (I::X1, I::X1) {
        let s = &self.0;
        ((s[3] ^ s[5]).aes(s[0]), (s[4] ^ s[6]).aes(s[2]))
    }

    /// Every new block is computed from the old state only.
    #[inline(always)]
    fn update(&mut self, x0: I::X1, x1: I::X1) {
        let s = self.0;
        self.0 = [
            s[6] ^ s[1],
            s[0].aes(x0),
            s[1].aes(s[0]),
            s[2].aes(s[6]),
            s[3].aes(x1),
            s[4].aes(s[3]),
            s[5].aes(s[4]),
        ];
    }
}

#[cfg(test)]
mod tests {
    use hybrid_array::Array;
    use hybrid_array::sizes::U16;

    use crate::low::{IAesBlock, Isa, Soft};

    use super::StateRoccaS;

    type Block = <Soft as Isa>::X1;

    fn block(b: u8) -> Block {
        Block::from_block(&Array([b; 16]))
    }

    fn bytes(b: Block) -> [u8; 16] {
        Array::<u8, U16>::from(b).0
    }

    #[test]
    fn update_reads_only_the_old_state() {
        let old: [Block; 7] = std::array::from_fn(|i| block(i as u8 * 0x11));
        let (x0, x1) = (block(0xa5), block(0x5a));

        let mut s = StateRoccaS::<Soft>(old);
        s.update(x0, x1);

        // S'0 = S6 ^ S1, S'1 = AES(S0, X0), S'2 = AES(S1, S0), S'3 = AES(S2, S6),
        // S'4 = AES(S3, X1), S'5 = AES(S4, S3), S'6 = AES(S5, S4)
        let expected = [
            old[6] ^ old[1],
            old[0].aes(x0),
            old[1].aes(old[0]),
            old[2].aes(old[6]),
            old[3].aes(x1),
            old[4].aes(old[3]),
            old[5].aes(old[4]),
        ];
        assert_eq!(s.0.map(bytes), expected.map(bytes));
    }
}
