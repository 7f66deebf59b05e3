//! Typed - 型から handler を引く二段レジストリ
//!
//! # 二層構造
//! - **上位（family）**: `TypeRegistry` が MessagePack ext code 0..=127 を family に割り当てる
//! - **下位（subcode）**: `Family` が自前の `Registry` で subcode を handler に割り当てる
//!
//! Family 自身も `Handler` なので、上位レジストリからは 1 つの handler に見える。

pub mod codec;
pub mod family;
pub mod handler;
pub mod registry;

pub use self::codec::Codec;
pub use self::family::Family;
pub use self::handler::{Encoded, Handler, expect_type};
pub use self::registry::{MAX_FAMILY_CODE, Registry, Selected, TypeRegistry};
