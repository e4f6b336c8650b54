//! Block representation helpers.

use crate::error::Sm4Error;

/// Size of an SM4 block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// SM4 block of 16 bytes.
pub type Block = [u8; BLOCK_SIZE];

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}

/// XORs the leading bytes of `keystream` into `data`.
///
/// `data` may be shorter than a block (final partial block of a stream mode).
#[inline]
pub(crate) fn xor_prefix(data: &mut [u8], keystream: &Block) {
    for (d, k) in data.iter_mut().zip(keystream.iter()) {
        *d ^= *k;
    }
}

/// Increments a block as a 128-bit big-endian counter, wrapping to zero.
#[inline]
pub fn increment_counter(counter: &mut Block) {
    for byte in counter.iter_mut().rev() {
        let (next, carry) = byte.overflowing_add(1);
        *byte = next;
        if !carry {
            return;
        }
    }
}

/// Copies a 16-byte slice into a [`Block`], typically an IV read from input.
pub fn block_from_slice(bytes: &[u8]) -> Result<Block, Sm4Error> {
    bytes
        .try_into()
        .map_err(|_| Sm4Error::InvalidIvLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_increments_low_byte() {
        let mut ctr = [0u8; 16];
        increment_counter(&mut ctr);
        assert_eq!(ctr[15], 1);
        assert!(ctr[..15].iter().all(|&b| b == 0));
    }

    #[test]
    fn counter_carries_across_bytes() {
        let mut ctr = [0u8; 16];
        ctr[14] = 0x01;
        ctr[15] = 0xff;
        increment_counter(&mut ctr);
        assert_eq!(ctr[14], 0x02);
        assert_eq!(ctr[15], 0x00);
    }

    #[test]
    fn counter_wraps_to_zero() {
        let mut ctr = [0xffu8; 16];
        increment_counter(&mut ctr);
        assert_eq!(ctr, [0u8; 16]);
    }

    #[test]
    fn xor_prefix_only_touches_data_len() {
        let mut data = [0u8; 3];
        let ks = [0xaau8; 16];
        xor_prefix(&mut data, &ks);
        assert_eq!(data, [0xaa; 3]);
    }

    #[test]
    fn block_from_slice_rejects_wrong_length() {
        assert_eq!(block_from_slice(&[0u8; 15]), Err(Sm4Error::InvalidIvLength(15)));
        assert_eq!(block_from_slice(&[7u8; 16]), Ok([7u8; 16]));
    }
}
