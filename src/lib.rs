//! AEGIS-128L/X, HiAE/HiAEx4 and ROCCA-S, built on one AES-round engine.
//!
//! All five algorithms keep a state of AES blocks that is updated once per
//! chunk of input. The block primitive runs on 1, 2 or 4 lanes at once and
//! is picked at runtime from the instructions the CPU offers (see
//! [`Backend`]).
//!
//! Every cipher implements the [`aead`] traits, and also offers a small
//! slice-based API returning this crate's [`Error`]:
//!
//! ```
//! use lanes_aead::{HiAe, KeyInit};
//!
//! let cipher = HiAe::new(&[0x42; 32].into());
//! let nonce = [0x24; 16];
//!
//! let sealed = cipher.seal(&nonce, b"header", b"hello").unwrap();
//! assert_eq!(sealed.len(), 5 + HiAe::TAG_SIZE);
//!
//! let opened = cipher.open(&nonce, b"header", &sealed).unwrap();
//! assert_eq!(opened, b"hello");
//! ```

mod error;
mod high;
mod low;
mod mid;

pub use aead::{self, AeadCore, AeadInOut, KeyInit};

pub use error::{Error, InvalidInput};
pub use high::aegis128::{Aegis128L, Aegis128X, Aegis128X2, Aegis128X4};
pub use high::hiae::{HiAe, HiAeX4};
pub use high::rocca_s::RoccaS;
pub use high::{Cipher, verify_tag};
pub use low::Backend;
pub use mid::{
    AegisTag, AegisVariant, HiAeLanes, HiAeVariant, Lanes, RoccaSVariant, Tag128, Tag256, Variant,
    VariantSpec, X1, X2, X4,
};
