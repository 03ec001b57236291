use hybrid_array::Array;

use crate::low::{IAesBlock, Isa};

use super::Lanes;

/// `ctx[i] = ZeroPad(Byte(i) || Byte(D - 1), 128)` for every lane `i`.
///
/// All zero for a single lane.
#[inline(always)]
pub fn ctx<D: Lanes, I: Isa>() -> D::AesBlock<I> {
    let mut a = Array::<u8, D::Block>::default();
    for i in 0..D::LANES {
        a[16 * i] = i as u8;
        a[16 * i + 1] = (D::LANES - 1) as u8;
    }
    <D::AesBlock<I>>::from_block(&a)
}

#[inline(always)]
pub fn split_blocks<D: Lanes, I: Isa>(
    a: &Array<u8, D::Block2>,
) -> (D::AesBlock<I>, D::AesBlock<I>) {
    let (a0, a1) = a.split_ref::<D::Block>();
    (IAesBlock::from_block(a0), IAesBlock::from_block(a1))
}

#[inline(always)]
pub fn write_blocks<D: Lanes, I: Isa>(
    a: D::AesBlock<I>,
    b: D::AesBlock<I>,
    out: &mut Array<u8, D::Block2>,
) {
    let (p0, p1) = out.split_ref_mut::<D::Block>();
    *p0 = a.into();
    *p1 = b.into();
}

/// `LE64(x) || LE64(y)`
#[inline(always)]
pub fn concatu64(x: u64, y: u64) -> Array<u8, hybrid_array::sizes::U16> {
    let mut u = Array([0; 16]);
    u[..8].copy_from_slice(&x.to_le_bytes());
    u[8..].copy_from_slice(&y.to_le_bytes());
    u
}

/// `LE128(x)`
#[inline(always)]
pub fn le128(x: u64) -> Array<u8, hybrid_array::sizes::U16> {
    Array(u128::from(x).to_le_bytes())
}
