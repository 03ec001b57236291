use crate::high::Cipher;
use crate::mid::{AegisVariant, X1, X2, X4};

/// AEGIS-128X over `D` lanes with tag length `T`.
pub type Aegis128X<D, T> = Cipher<AegisVariant<D, T>>;

pub type Aegis128L<T> = Aegis128X<X1, T>;
pub type Aegis128X2<T> = Aegis128X<X2, T>;
pub type Aegis128X4<T> = Aegis128X<X4, T>;
