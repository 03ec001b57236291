use std::hint::black_box;

use hybrid_array::{Array, ArraySize};
use subtle::{Choice, ConstantTimeEq};

/// Compares a computed tag against a received one.
///
/// Every byte pair is visited and the differences are or-ed together, so
/// the running time does not depend on where the tags differ.
#[inline]
pub fn verify_tag<N: ArraySize>(expected: &Array<u8, N>, received: &Array<u8, N>) -> Choice {
    difference(expected.iter().zip(received.iter())).ct_eq(&0)
}

/// The accumulator passes through `black_box` after every byte, so the
/// compiler cannot stop the loop early once a difference has been seen.
#[inline(always)]
fn difference<'a>(pairs: impl Iterator<Item = (&'a u8, &'a u8)>) -> u8 {
    pairs.fold(0, |acc, (x, y)| black_box(acc | (x ^ y)))
}
