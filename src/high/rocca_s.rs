use crate::high::Cipher;
use crate::mid::RoccaSVariant;

/// ROCCA-S: 256-bit key, 128-bit nonce, 256-bit tag.
pub type RoccaS = Cipher<RoccaSVariant>;
