//! SM4 round transformations.

use crate::sbox::sbox;

/// Non-linear transform τ: applies the S-box to each byte of the word.
#[inline]
pub fn tau(word: u32) -> u32 {
    let [b0, b1, b2, b3] = word.to_be_bytes();
    u32::from_be_bytes([sbox(b0), sbox(b1), sbox(b2), sbox(b3)])
}

/// Linear diffusion `L` used by the encryption rounds.
#[inline]
pub fn l(b: u32) -> u32 {
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// Linear diffusion `L'` used by the key schedule.
#[inline]
pub fn l_prime(b: u32) -> u32 {
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

/// Round transform `T = L ∘ τ`.
#[inline]
pub fn t(x: u32) -> u32 {
    l(tau(x))
}

/// Key-schedule transform `T' = L' ∘ τ`.
#[inline]
pub fn t_prime(x: u32) -> u32 {
    l_prime(tau(x))
}

/// One Feistel round: shifts the state left by a word and appends
/// `x0 ^ T(x1 ^ x2 ^ x3 ^ rk)`.
#[inline]
pub fn round(state: &mut [u32; 4], round_key: u32) {
    let [x0, x1, x2, x3] = *state;
    *state = [x1, x2, x3, x0 ^ t(x1 ^ x2 ^ x3 ^ round_key)];
}
