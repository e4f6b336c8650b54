//! SM4 key schedule and block encryption/decryption.

use crate::block::Block;
use crate::key::{RoundKeys, Sm4Key, ROUNDS};
use crate::round::{round, t_prime};
use crate::sbox::{CK, FK};

fn load_words(bytes: &[u8; 16]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Writes the state in reverse word order, as required by the final
/// transform `R`.
fn store_reversed(state: &[u32; 4]) -> Block {
    let mut out = [0u8; 16];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state.iter().rev()) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// Expands a 128-bit key into 32 round keys.
pub fn expand_key(key: &Sm4Key) -> RoundKeys {
    let mk = load_words(&key.0);
    let mut k = [0u32; ROUNDS + 4];
    for i in 0..4 {
        k[i] = mk[i] ^ FK[i];
    }

    let mut rk = [0u32; ROUNDS];
    for i in 0..ROUNDS {
        k[i + 4] = k[i] ^ t_prime(k[i + 1] ^ k[i + 2] ^ k[i + 3] ^ CK[i]);
        rk[i] = k[i + 4];
    }

    RoundKeys(rk)
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = load_words(block);
    for &rk in round_keys.0.iter() {
        round(&mut state, rk);
    }
    store_reversed(&state)
}

/// Decrypts a single 16-byte block with pre-expanded round keys.
///
/// Same rounds as encryption with the round keys consumed in reverse.
pub fn decrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = load_words(block);
    for &rk in round_keys.0.iter().rev() {
        round(&mut state, rk);
    }
    store_reversed(&state)
}
