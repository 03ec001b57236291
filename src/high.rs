//! The AEAD engine shared by every variant.
//!
//! [`Cipher`] owns a key and the [`Backend`] chosen when it was built. Each
//! call creates a fresh state on the stack, so one handle can seal and open
//! any number of messages, from any number of threads, as long as every
//! message gets its own nonce.

pub mod aegis128;
pub mod hiae;
pub mod rocca_s;
mod verify;

use std::fmt;
use std::marker::PhantomData;

use aead::{
    AeadCore, AeadInOut, Key, KeyInit, KeySizeUser, Nonce, Tag, TagPosition,
    inout::{InOut, InOutBuf},
};
use hybrid_array::typenum::Unsigned;
use hybrid_array::Array;
use subtle::Choice;
use zeroize::Zeroize;

use crate::error::{Error, InvalidInput};
use crate::low::{Backend, Isa, Kernel};
use crate::mid::{AeadState, Variant, VariantSpec};

pub use verify::verify_tag;

/// A keyed AEAD for the algorithm `V`.
///
/// The key is wiped when the handle is dropped.
pub struct Cipher<V: Variant> {
    key: Array<u8, V::KeySize>,
    backend: Backend,
    _variant: PhantomData<fn() -> V>,
}

impl<V: Variant> Cipher<V> {
    pub const SPEC: VariantSpec = V::SPEC;
    pub const KEY_SIZE: usize = V::KeySize::USIZE;
    pub const NONCE_SIZE: usize = V::NonceSize::USIZE;
    pub const TAG_SIZE: usize = V::TagSize::USIZE;

    /// Builds a handle that always runs on `backend`.
    pub fn with_backend(key: &Key<Self>, backend: Backend) -> Result<Self, Error> {
        if !backend.is_available() {
            return Err(InvalidInput::UnsupportedBackend(backend).into());
        }
        Ok(Self {
            key: key.clone(),
            backend,
            _variant: PhantomData,
        })
    }

    /// Builds a handle from a key of unchecked length.
    pub fn try_new(key: &[u8]) -> Result<Self, Error> {
        let key = Key::<Self>::try_from(key).map_err(|_| InvalidInput::KeyLength {
            expected: Self::KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(<Self as KeyInit>::new(&key))
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Encrypts `plaintext`, returning `ciphertext || tag`.
    pub fn seal(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let nonce = nonce_from_slice::<V>(nonce)?;

        let mut buffer = Vec::with_capacity(plaintext.len() + Self::TAG_SIZE);
        buffer.extend_from_slice(plaintext);
        let tag = self.seal_inout(nonce, associated_data, InOutBuf::from(buffer.as_mut_slice()))?;
        buffer.extend_from_slice(&tag);
        Ok(buffer)
    }

    /// Decrypts `ciphertext || tag`, returning the plaintext.
    pub fn open(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        sealed: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let nonce = nonce_from_slice::<V>(nonce)?;

        let too_short = InvalidInput::CiphertextTooShort {
            actual: sealed.len(),
            tag: Self::TAG_SIZE,
        };
        let split = sealed.len().checked_sub(Self::TAG_SIZE).ok_or(too_short)?;
        let (ciphertext, tag) = sealed.split_at(split);
        let tag = Tag::<Self>::try_from(tag).map_err(|_| too_short)?;

        let mut buffer = ciphertext.to_vec();
        self.open_inout(nonce, associated_data, InOutBuf::from(buffer.as_mut_slice()), &tag)?;
        Ok(buffer)
    }

    /// Encrypts `buffer` in place and returns the tag.
    pub fn seal_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> Result<Tag<Self>, Error> {
        self.seal_inout(nonce, associated_data, InOutBuf::from(buffer))
    }

    /// Decrypts `buffer` in place. On failure `buffer` is left holding the
    /// ciphertext.
    pub fn open_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> Result<(), Error> {
        self.open_inout(nonce, associated_data, InOutBuf::from(buffer), tag)
    }

    fn seal_inout(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: InOutBuf<'_, '_, u8>,
    ) -> Result<Tag<Self>, Error> {
        // P_MAX (maximum length of the plaintext) is 2^61 - 1 bytes (2^64 - 8 bits).
        // A_MAX (maximum length of the associated data) is 2^61 - 1 bytes (2^64 - 8 bits).
        let msg_len_bits = bits(buffer.len())?;
        let ad_len_bits = bits(associated_data.len())?;

        Ok(self.backend.run(Seal::<V> {
            key: &self.key,
            nonce,
            associated_data,
            buffer,
            ad_len_bits,
            msg_len_bits,
        }))
    }

    fn open_inout(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        mut buffer: InOutBuf<'_, '_, u8>,
        tag: &Tag<Self>,
    ) -> Result<(), Error> {
        let msg_len_bits = bits(buffer.len())?;
        let ad_len_bits = bits(associated_data.len())?;

        let valid = self.backend.run(Open::<V> {
            key: &self.key,
            nonce,
            associated_data,
            buffer: buffer.reborrow(),
            tag,
            ad_len_bits,
            msg_len_bits,
        });

        // if CtEq(tag, expected_tag) is False:
        //     erase msg
        //     erase expected_tag
        //     return "verification failed" error
        // else:
        //     return msg
        if bool::from(valid) {
            return Ok(());
        }

        // re-encrypt the buffer to prevent revealing the plaintext.
        self.seal_inout(nonce, associated_data, InOutBuf::from(buffer.get_out()))?;
        tracing::trace!(variant = V::SPEC.name, "authentication failed");
        Err(Error::AuthenticationFailure)
    }
}

impl<V: Variant> Clone for Cipher<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            backend: self.backend,
            _variant: PhantomData,
        }
    }
}

impl<V: Variant> fmt::Debug for Cipher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("variant", &V::SPEC.name)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl<V: Variant> Drop for Cipher<V> {
    fn drop(&mut self) {
        self.key.as_mut_slice().zeroize();
    }
}

impl<V: Variant> KeySizeUser for Cipher<V> {
    type KeySize = V::KeySize;
}

impl<V: Variant> KeyInit for Cipher<V> {
    #[inline]
    fn new(key: &Key<Self>) -> Self {
        Self {
            key: key.clone(),
            backend: Backend::detect(),
            _variant: PhantomData,
        }
    }
}

impl<V: Variant> AeadCore for Cipher<V> {
    type NonceSize = V::NonceSize;
    type TagSize = V::TagSize;

    const TAG_POSITION: TagPosition = TagPosition::Postfix;
}

impl<V: Variant> AeadInOut for Cipher<V> {
    fn encrypt_inout_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: InOutBuf<'_, '_, u8>,
    ) -> aead::Result<Tag<Self>> {
        Ok(self.seal_inout(nonce, associated_data, buffer)?)
    }

    fn decrypt_inout_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: InOutBuf<'_, '_, u8>,
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        Ok(self.open_inout(nonce, associated_data, buffer, tag)?)
    }
}

struct Seal<'a, 'in_, 'out, V: Variant> {
    key: &'a Array<u8, V::KeySize>,
    nonce: &'a Array<u8, V::NonceSize>,
    associated_data: &'a [u8],
    buffer: InOutBuf<'in_, 'out, u8>,
    ad_len_bits: u64,
    msg_len_bits: u64,
}

impl<V: Variant> Kernel for Seal<'_, '_, '_, V> {
    type Output = Array<u8, V::TagSize>;

    #[inline(always)]
    fn run<I: Isa>(self) -> Self::Output {
        // Init(key, nonce)
        let mut state = <V::State<I> as AeadState<V>>::new(self.key, self.nonce);

        core_encrypt_inout_detached(&mut state, self.associated_data, self.buffer);

        // tag = Finalize(|ad|, |msg|)
        // ct = Truncate(ct, |msg|)
        state.finalize(self.ad_len_bits, self.msg_len_bits)
    }
}

struct Open<'a, 'in_, 'out, V: Variant> {
    key: &'a Array<u8, V::KeySize>,
    nonce: &'a Array<u8, V::NonceSize>,
    associated_data: &'a [u8],
    buffer: InOutBuf<'in_, 'out, u8>,
    tag: &'a Array<u8, V::TagSize>,
    ad_len_bits: u64,
    msg_len_bits: u64,
}

impl<V: Variant> Kernel for Open<'_, '_, '_, V> {
    type Output = Choice;

    #[inline(always)]
    fn run<I: Isa>(self) -> Choice {
        // Init(key, nonce)
        let mut state = <V::State<I> as AeadState<V>>::new(self.key, self.nonce);

        core_decrypt_inout_detached(&mut state, self.associated_data, self.buffer);

        // expected_tag = Finalize(|ad|, |msg|)
        let expected_tag = state.finalize(self.ad_len_bits, self.msg_len_bits);
        verify_tag(&expected_tag, self.tag)
    }
}

// The loops below are written out rather than passed as closures so they stay
// inside the `#[target_feature]` trampoline, see `Backend::run`.

#[inline(always)]
fn core_encrypt_inout_detached<V: Variant, S: AeadState<V>>(
    state: &mut S,
    associated_data: &[u8],
    buffer: InOutBuf<'_, '_, u8>,
) {
    // ad_blocks = Split(ZeroPad(ad, R), R)
    // for ai in ad_blocks:
    //     Absorb(ai)
    absorb_padded::<V, S>(state, associated_data);

    // msg_blocks = Split(ZeroPad(msg, R), R)
    // for xi in msg_blocks:
    //     ct = ct || Enc(xi)
    let (msg_chunks, mut msg_tail) = buffer.into_chunks::<V::Rate>();
    for msg_chunk in msg_chunks {
        state.encrypt_block(msg_chunk);
    }
    if !msg_tail.is_empty() {
        // only the first `len` bytes of the padded output are written back
        let len = msg_tail.len();
        let mut msg_chunk = Array::<u8, V::Rate>::default();
        msg_chunk[..len].copy_from_slice(msg_tail.get_in());
        state.encrypt_block(InOut::from(&mut msg_chunk));
        msg_tail.get_out().copy_from_slice(&msg_chunk[..len]);
    }
}

#[inline(always)]
fn core_decrypt_inout_detached<V: Variant, S: AeadState<V>>(
    state: &mut S,
    associated_data: &[u8],
    buffer: InOutBuf<'_, '_, u8>,
) {
    // ad_blocks = Split(ZeroPad(ad, R), R)
    // for ai in ad_blocks:
    //     Absorb(ai)
    absorb_padded::<V, S>(state, associated_data);

    // ct_blocks = Split(ct, R)
    // cn = Tail(ct, |ct| mod R)
    let (ct_blocks, cn) = buffer.into_chunks::<V::Rate>();

    // for ci in ct_blocks:
    //     msg = msg || Dec(ci)
    for ci in ct_blocks {
        state.decrypt_block(ci);
    }

    // if cn is not empty:
    //     msg = msg || DecPartial(cn)
    if !cn.is_empty() {
        decrypt_partial(state, cn);
    }
}

#[inline(always)]
fn decrypt_partial<V: Variant, S: AeadState<V>>(state: &mut S, mut tail: InOutBuf<'_, '_, u8>) {
    let len = tail.len();
    let mut msg_chunk = Array::<u8, V::Rate>::default();
    msg_chunk[..len].copy_from_slice(tail.get_in());
    state.decrypt_partial_block(InOut::from(&mut msg_chunk), len);
    tail.get_out().copy_from_slice(&msg_chunk[..len]);
}

#[inline(always)]
fn absorb_padded<V: Variant, S: AeadState<V>>(state: &mut S, data: &[u8]) {
    let (chunks, tail) = Array::<u8, V::Rate>::slice_as_chunks(data);
    for ad_chunk in chunks {
        state.absorb(ad_chunk);
    }
    if !tail.is_empty() {
        let mut chunk = Array::<u8, V::Rate>::default();
        chunk[..tail.len()].copy_from_slice(tail);
        state.absorb(&chunk);
    }
}

fn nonce_from_slice<V: Variant>(nonce: &[u8]) -> Result<&Array<u8, V::NonceSize>, Error> {
    <&Array<u8, V::NonceSize>>::try_from(nonce).map_err(|_| {
        InvalidInput::NonceLength {
            expected: V::NonceSize::USIZE,
            actual: nonce.len(),
        }
        .into()
    })
}

#[inline]
fn bits(bytes: usize) -> Result<u64, Error> {
    u64::try_from(bytes)
        .ok()
        .and_then(|b| b.checked_mul(8))
        .ok_or(InvalidInput::LengthOverflow.into())
}

#[cfg(test)]
pub(crate) mod tests {
    use aead::{Aead, AeadInOut, Key, KeyInit, Nonce, Payload, Tag, inout::InOutBuf};
    use hybrid_array::Array;

    use crate::error::{Error, InvalidInput};
    use crate::low::Backend;
    use crate::mid::{AegisVariant, HiAeVariant, RoccaSVariant, Variant, X1, X2, X4};
    use crate::{Aegis128X2, Aegis128X4, HiAe, HiAeX4, RoccaS, Tag128, Tag256};

    use super::Cipher;

    /// The 58 byte greeting zero-padded to 64 bytes.
    pub(crate) fn greeting() -> [u8; 64] {
        let mut msg = [0; 64];
        msg[..58].copy_from_slice(b"Hello, AEGIS-128x4! This is a test message for encryption.");
        msg
    }

    fn available_backends() -> impl Iterator<Item = Backend> {
        Backend::all().iter().copied().filter(|b| b.is_available())
    }

    pub(crate) fn test_roundtrip<V: Variant>(
        key: Key<Cipher<V>>,
        nonce: Nonce<Cipher<V>>,
        aad: &[u8],
        msg: &[u8],
        ct: &[u8],
        tag: Tag<Cipher<V>>,
    ) {
        for backend in available_backends() {
            let cipher = Cipher::<V>::with_backend(&key, backend).unwrap();
            let encrypted = cipher.encrypt(&nonce, Payload { aad, msg }).unwrap();

            let (actual_ct, actual_tag) = encrypted.split_at(msg.len());
            assert_eq!(actual_ct, ct, "{backend}");
            assert_eq!(actual_tag, tag.as_slice(), "{backend}");

            let decrypted = cipher
                .decrypt(
                    &nonce,
                    Payload {
                        aad,
                        msg: &encrypted,
                    },
                )
                .unwrap();

            assert_eq!(decrypted, msg, "{backend}");
        }
    }

    pub(crate) fn test_decrypt_fail<V: Variant>(
        key: Key<Cipher<V>>,
        nonce: Nonce<Cipher<V>>,
        aad: &[u8],
        ct: &[u8],
        tag: Tag<Cipher<V>>,
    ) {
        for backend in available_backends() {
            let mut buf = ct.to_vec();
            Cipher::<V>::with_backend(&key, backend)
                .unwrap()
                .decrypt_inout_detached(&nonce, aad, InOutBuf::from(&mut *buf), &tag)
                .unwrap_err();

            assert_eq!(buf, ct, "plaintext was left in the buffer on {backend}");
        }
    }

    /// Seals the greeting under a key of `0x01` bytes and a nonce of
    /// `0x02` bytes, checks the expected output and opens it again.
    pub(crate) fn test_greeting<V: Variant>(ct: &[u8], tag: &[u8]) {
        let key = Key::<Cipher<V>>::from_fn(|_| 0x01);
        let nonce = Nonce::<Cipher<V>>::from_fn(|_| 0x02);
        let msg = greeting();

        let sealed = Cipher::<V>::new(&key).seal(&nonce, &[], &msg).unwrap();
        assert_eq!(sealed.len(), 64 + Cipher::<V>::TAG_SIZE);

        test_roundtrip::<V>(key, nonce, &[], &msg, ct, Array::try_from(tag).unwrap());
    }

    fn backends_agree<V: Variant>() {
        let key = Key::<Cipher<V>>::from_fn(|i| (i * 7) as u8);
        let nonce = Nonce::<Cipher<V>>::from_fn(|i| (i * 13) as u8);
        let ad: Vec<u8> = (0..77u8).collect();
        let msg: Vec<u8> = (0..=255u8).cycle().take(1031).collect();

        let reference = Cipher::<V>::with_backend(&key, Backend::portable())
            .unwrap()
            .seal(&nonce, &ad, &msg)
            .unwrap();

        for backend in available_backends() {
            let cipher = Cipher::<V>::with_backend(&key, backend).unwrap();
            assert_eq!(cipher.seal(&nonce, &ad, &msg).unwrap(), reference, "{backend}");
            assert_eq!(cipher.open(&nonce, &ad, &reference).unwrap(), msg, "{backend}");
        }
    }

    #[test]
    fn every_backend_agrees_with_the_portable_one() {
        backends_agree::<AegisVariant<X1, Tag128>>();
        backends_agree::<AegisVariant<X2, Tag128>>();
        backends_agree::<AegisVariant<X4, Tag256>>();
        backends_agree::<HiAeVariant<X1>>();
        backends_agree::<HiAeVariant<X4>>();
        backends_agree::<RoccaSVariant>();
    }

    fn decrypt_reports_typed_errors<V: Variant>() {
        let cipher = Cipher::<V>::new(&Key::<Cipher<V>>::default());
        let nonce = vec![0; Cipher::<V>::NONCE_SIZE];

        let short = vec![0; Cipher::<V>::TAG_SIZE - 1];
        assert_eq!(
            cipher.open(&nonce, &[], &short),
            Err(Error::InvalidInput(InvalidInput::CiphertextTooShort {
                actual: Cipher::<V>::TAG_SIZE - 1,
                tag: Cipher::<V>::TAG_SIZE,
            }))
        );

        assert_eq!(
            cipher.seal(&nonce[1..], &[], b"msg"),
            Err(Error::InvalidInput(InvalidInput::NonceLength {
                expected: Cipher::<V>::NONCE_SIZE,
                actual: Cipher::<V>::NONCE_SIZE - 1,
            }))
        );

        let mut sealed = cipher.seal(&nonce, b"ad", b"message").unwrap();
        assert_eq!(cipher.open(&nonce, b"ad", &sealed).unwrap(), b"message");
        sealed[0] ^= 1;
        assert_eq!(
            cipher.open(&nonce, b"ad", &sealed),
            Err(Error::AuthenticationFailure)
        );

        // an empty message still carries a tag
        let sealed = cipher.seal(&nonce, &[], &[]).unwrap();
        assert_eq!(sealed.len(), Cipher::<V>::TAG_SIZE);
        assert_eq!(cipher.open(&nonce, &[], &sealed).unwrap(), b"");
    }

    #[test]
    fn errors_are_typed() {
        decrypt_reports_typed_errors::<AegisVariant<X1, Tag256>>();
        decrypt_reports_typed_errors::<AegisVariant<X4, Tag128>>();
        decrypt_reports_typed_errors::<HiAeVariant<X1>>();
        decrypt_reports_typed_errors::<HiAeVariant<X4>>();
        decrypt_reports_typed_errors::<RoccaSVariant>();
    }

    #[test]
    fn key_length_is_checked() {
        assert_eq!(
            HiAe::try_new(&[0; 16]).unwrap_err(),
            Error::InvalidInput(InvalidInput::KeyLength {
                expected: 32,
                actual: 16,
            })
        );
        assert!(Aegis128X2::<Tag128>::try_new(&[0; 16]).is_ok());
    }

    #[test]
    fn detached_in_place() {
        let cipher = RoccaS::new(&Key::<RoccaS>::from_fn(|i| i as u8));
        let nonce = Nonce::<RoccaS>::default();
        let mut buf = *b"in place, with a detached tag";

        let tag = cipher.seal_in_place_detached(&nonce, b"ad", &mut buf).unwrap();
        assert_ne!(&buf, b"in place, with a detached tag");

        let mut wrong = tag.clone();
        wrong[31] ^= 1;
        let sealed = buf;
        assert_eq!(
            cipher.open_in_place_detached(&nonce, b"ad", &mut buf, &wrong),
            Err(Error::AuthenticationFailure)
        );
        assert_eq!(buf, sealed);

        cipher.open_in_place_detached(&nonce, b"ad", &mut buf, &tag).unwrap();
        assert_eq!(&buf, b"in place, with a detached tag");
    }

    fn throughput<V: Variant>(backend: Backend, msg: &mut [u8]) -> f64 {
        let cipher = Cipher::<V>::with_backend(&Key::<Cipher<V>>::default(), backend).unwrap();
        let nonce = Nonce::<Cipher<V>>::default();
        let rounds = 64;

        let start = std::time::Instant::now();
        for _ in 0..rounds {
            cipher.seal_in_place_detached(&nonce, &[], std::hint::black_box(&mut *msg)).unwrap();
        }
        (rounds * msg.len()) as f64 / start.elapsed().as_secs_f64()
    }

    fn faster_than_portable<V: Variant>() {
        let mut msg = vec![0xd0; 1 << 16];
        let portable = throughput::<V>(Backend::portable(), &mut msg);

        for backend in available_backends().filter(|&b| b != Backend::portable()) {
            let accelerated = throughput::<V>(backend, &mut msg);
            assert!(
                accelerated > 2.0 * portable,
                "{} on {backend}: {accelerated:.0} B/s, portable {portable:.0} B/s",
                V::SPEC.name
            );
        }
    }

    /// Timing dependent, run with `cargo test --release -- --ignored`.
    #[test]
    #[ignore]
    fn hardware_backends_beat_the_portable_round() {
        faster_than_portable::<AegisVariant<X1, Tag128>>();
        faster_than_portable::<AegisVariant<X4, Tag128>>();
        faster_than_portable::<HiAeVariant<X1>>();
        faster_than_portable::<HiAeVariant<X4>>();
        faster_than_portable::<RoccaSVariant>();
    }

    #[test]
    fn handles_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Aegis128X4<Tag256>>();
        assert_send_sync::<HiAeX4>();
        assert_send_sync::<RoccaS>();
    }
}
