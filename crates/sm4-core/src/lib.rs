//! SM4 block cipher (GB/T 32907-2016) with the five confidentiality modes of
//! operation and PKCS#7 padding.
//!
//! This crate provides:
//! - The SM4 key schedule (32 round keys from a 128-bit key).
//! - Single-block encryption and decryption.
//! - ECB, CBC, CFB, OFB and CTR over arbitrary-length buffers, in place.
//! - PKCS#7 padding with lenient and strict unpadding, composable with any mode.
//!
//! There is no authentication, no key derivation and no IV generation: the
//! caller supplies key and IV explicitly. The implementation uses table
//! lookups and makes no constant-time claims.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod error;
mod key;
pub mod modes;
pub mod padding;
mod round;
mod sbox;

pub use crate::block::{block_from_slice, increment_counter, xor_in_place, Block, BLOCK_SIZE};
pub use crate::cipher::{decrypt_block, encrypt_block, expand_key};
pub use crate::error::Sm4Error;
pub use crate::key::{RoundKeys, Sm4Key, ROUNDS};
pub use crate::modes::Mode;
