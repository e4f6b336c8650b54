//! Key types for SM4.

use crate::error::Sm4Error;

/// Number of rounds, and of round keys, in SM4.
pub const ROUNDS: usize = 32;

/// SM4 key wrapper (128 bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sm4Key(pub [u8; 16]);

impl From<[u8; 16]> for Sm4Key {
    fn from(value: [u8; 16]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Sm4Key {
    type Error = Sm4Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 16] = value
            .try_into()
            .map_err(|_| Sm4Error::InvalidKeyLength(value.len()))?;
        Ok(Self(bytes))
    }
}

/// Expanded round keys for SM4.
///
/// Immutable once derived; a single set may be shared by any number of
/// threads running independent block or mode operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundKeys(pub [u32; ROUNDS]);

impl RoundKeys {
    /// Returns the round key at the requested index (0..32).
    #[inline]
    pub fn get(&self, round: usize) -> u32 {
        self.0[round]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_slice_checks_length() {
        let bytes = [0xabu8; 16];
        assert_eq!(Sm4Key::try_from(&bytes[..]), Ok(Sm4Key(bytes)));
        assert_eq!(
            Sm4Key::try_from(&bytes[..10]),
            Err(Sm4Error::InvalidKeyLength(10))
        );
    }
}
