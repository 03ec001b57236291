use crate::high::Cipher;
use crate::mid::{HiAeVariant, X1, X4};

/// HiAE: 256-bit key, 128-bit nonce and tag.
pub type HiAe = Cipher<HiAeVariant<X1>>;

/// Four HiAE lanes with per-lane domain separation.
pub type HiAeX4 = Cipher<HiAeVariant<X4>>;
