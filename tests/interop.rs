//! Output checked against independent implementations: AEGIS-128L/X against
//! libaegis through the `aegis` crate, HiAE against the `hiae` crate.

use lanes_aead::aead::{Key, Nonce};
use lanes_aead::{Aegis128L, Aegis128X2, Aegis128X4, Backend, HiAe, KeyInit, Tag128, Tag256};

const KEY: [u8; 16] = *b"interop test key";
const NONCE: [u8; 16] = *b"and its nonce...";

fn inputs(len: usize) -> (Vec<u8>, Vec<u8>) {
    let msg = (0..len).map(|i| (i * 7 + 3) as u8).collect();
    let ad = (0..len / 3 + 1).map(|i| (i * 11) as u8).collect();
    (msg, ad)
}

macro_rules! interop {
    ($($name:ident: $ours:ty, $theirs:ty;)*) => {
        $(
            #[test]
            fn $name() {
                for len in [0, 1, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 129, 500, 4099] {
                    let (msg, ad) = inputs(len);

                    let mut expected = msg.clone();
                    let tag = <$theirs>::new(&KEY, &NONCE).encrypt_in_place(&mut expected, &ad);
                    expected.extend_from_slice(&tag);

                    for &backend in Backend::all() {
                        if !backend.is_available() {
                            continue;
                        }
                        let cipher = <$ours>::with_backend(&Key::<$ours>::from(KEY), backend).unwrap();
                        assert_eq!(cipher.seal(&NONCE, &ad, &msg).unwrap(), expected, "len {len} on {backend}");
                    }

                    let cipher = <$ours>::new(&Key::<$ours>::from(KEY));
                    let opened = cipher
                        .open_in_place_detached(
                            &Nonce::<$ours>::from(NONCE),
                            &ad,
                            &mut expected[..len],
                            &tag.into(),
                        );
                    assert!(opened.is_ok(), "len {len}");
                    assert_eq!(&expected[..len], &msg[..]);
                }
            }
        )*
    };
}

interop! {
    aegis128l_tag128: Aegis128L<Tag128>, aegis::aegis128l::Aegis128L<16>;
    aegis128l_tag256: Aegis128L<Tag256>, aegis::aegis128l::Aegis128L<32>;
    aegis128x2_tag128: Aegis128X2<Tag128>, aegis::aegis128x2::Aegis128X2<16>;
    aegis128x2_tag256: Aegis128X2<Tag256>, aegis::aegis128x2::Aegis128X2<32>;
    aegis128x4_tag128: Aegis128X4<Tag128>, aegis::aegis128x4::Aegis128X4<16>;
    aegis128x4_tag256: Aegis128X4<Tag256>, aegis::aegis128x4::Aegis128X4<32>;
}

#[test]
fn hiae() {
    let key: [u8; 32] = *b"a 256-bit key for the HiAE check";
    for len in [0, 1, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 129, 500, 4099] {
        let (msg, ad) = inputs(len);

        let (ct, tag) = hiae::encrypt(&msg, &ad, &key, &NONCE).unwrap();
        let mut expected = ct;
        expected.extend_from_slice(&tag);

        for &backend in Backend::all() {
            if !backend.is_available() {
                continue;
            }
            let cipher = HiAe::with_backend(&Key::<HiAe>::from(key), backend).unwrap();
            let sealed = cipher.seal(&NONCE, &ad, &msg).unwrap();
            assert_eq!(sealed, expected, "len {len} on {backend}");
        }

        // and the other way around
        let sealed = HiAe::new(&Key::<HiAe>::from(key)).seal(&NONCE, &ad, &msg).unwrap();
        let (ct, tag) = sealed.split_at(len);
        let tag: &[u8; 16] = tag.try_into().unwrap();
        assert_eq!(hiae::decrypt(ct, tag, &ad, &key, &NONCE).unwrap(), msg, "len {len}");
    }
}
