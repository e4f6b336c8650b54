//! Confidentiality modes of operation over arbitrary-length buffers.
//!
//! Every transform works in place on a `&mut [u8]`. A trailing partial block
//! is left untouched by ECB and CBC, and XORed with a truncated keystream
//! block by CFB, OFB and CTR. Callers needing strict alignment should go
//! through the PKCS#7 helpers in [`crate::padding`].
//!
//! The IV is the initial feedback register for CBC/CFB/OFB and the initial
//! counter for CTR; ECB ignores it. Reusing an IV under the same key breaks
//! confidentiality for every mode except ECB.

use core::fmt;
use core::str::FromStr;

use crate::block::{increment_counter, xor_in_place, xor_prefix, Block, BLOCK_SIZE};
use crate::cipher::{decrypt_block, encrypt_block};
use crate::error::Sm4Error;
use crate::key::RoundKeys;
use crate::padding::{pad_then, then_unpad, then_unpad_strict};

/// Shape shared by every in-place mode transform.
pub type ModeFn = fn(&mut [u8], &Block, &RoundKeys);

fn load(chunk: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(chunk);
    block
}

/// ECB encryption: `C_i = E(P_i)`.
pub fn ecb_encrypt(buf: &mut [u8], _iv: &Block, round_keys: &RoundKeys) {
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let ct = encrypt_block(&load(chunk), round_keys);
        chunk.copy_from_slice(&ct);
    }
}

/// ECB decryption: `P_i = D(C_i)`.
pub fn ecb_decrypt(buf: &mut [u8], _iv: &Block, round_keys: &RoundKeys) {
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let pt = decrypt_block(&load(chunk), round_keys);
        chunk.copy_from_slice(&pt);
    }
}

/// CBC encryption: `C_i = E(P_i ^ C_{i-1})`, `C_{-1} = IV`.
pub fn cbc_encrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut feedback = *iv;
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let mut block = load(chunk);
        xor_in_place(&mut block, &feedback);
        feedback = encrypt_block(&block, round_keys);
        chunk.copy_from_slice(&feedback);
    }
}

/// CBC decryption: `P_i = D(C_i) ^ C_{i-1}`.
pub fn cbc_decrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut feedback = *iv;
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        // Ciphertext must be captured before the chunk is overwritten.
        let ct = load(chunk);
        let mut pt = decrypt_block(&ct, round_keys);
        xor_in_place(&mut pt, &feedback);
        chunk.copy_from_slice(&pt);
        feedback = ct;
    }
}

/// CFB encryption: `C_i = P_i ^ E(C_{i-1})`, `C_{-1} = IV`.
pub fn cfb_encrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut feedback = *iv;
    for chunk in buf.chunks_mut(BLOCK_SIZE) {
        let keystream = encrypt_block(&feedback, round_keys);
        xor_prefix(chunk, &keystream);
        if chunk.len() == BLOCK_SIZE {
            feedback = load(chunk);
        }
    }
}

/// CFB decryption: `P_i = C_i ^ E(C_{i-1})`.
pub fn cfb_decrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut feedback = *iv;
    for chunk in buf.chunks_mut(BLOCK_SIZE) {
        let keystream = encrypt_block(&feedback, round_keys);
        if chunk.len() == BLOCK_SIZE {
            feedback = load(chunk);
        }
        xor_prefix(chunk, &keystream);
    }
}

/// OFB transform: `O_i = E(O_{i-1})`, `O_{-1} = IV`, output `X_i ^ O_i`.
///
/// Encryption and decryption are the same operation.
pub fn ofb_encrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut register = *iv;
    for chunk in buf.chunks_mut(BLOCK_SIZE) {
        register = encrypt_block(&register, round_keys);
        xor_prefix(chunk, &register);
    }
}

/// OFB decryption, identical to [`ofb_encrypt`].
pub fn ofb_decrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    ofb_encrypt(buf, iv, round_keys);
}

/// CTR transform: `X_i ^ E(ctr_i)` where `ctr_0 = IV` and the counter is a
/// 128-bit big-endian integer that wraps silently.
pub fn ctr_encrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    let mut counter = *iv;
    for chunk in buf.chunks_mut(BLOCK_SIZE) {
        let keystream = encrypt_block(&counter, round_keys);
        xor_prefix(chunk, &keystream);
        increment_counter(&mut counter);
    }
}

/// CTR decryption, identical to [`ctr_encrypt`].
pub fn ctr_decrypt(buf: &mut [u8], iv: &Block, round_keys: &RoundKeys) {
    ctr_encrypt(buf, iv, round_keys);
}

/// Mode of operation selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Electronic codebook.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Cipher feedback (full-block).
    Cfb,
    /// Output feedback.
    Ofb,
    /// Counter.
    Ctr,
}

impl Mode {
    /// Every supported mode, in the order the BMP driver processes them.
    pub const ALL: [Mode; 5] = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr];

    /// Lowercase mode name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
            Mode::Cfb => "cfb",
            Mode::Ofb => "ofb",
            Mode::Ctr => "ctr",
        }
    }

    /// Whether the mode transforms a trailing partial block (keystream modes).
    pub fn is_stream(self) -> bool {
        matches!(self, Mode::Cfb | Mode::Ofb | Mode::Ctr)
    }

    /// The in-place encryption function for this mode.
    pub fn encrypt_fn(self) -> ModeFn {
        match self {
            Mode::Ecb => ecb_encrypt,
            Mode::Cbc => cbc_encrypt,
            Mode::Cfb => cfb_encrypt,
            Mode::Ofb => ofb_encrypt,
            Mode::Ctr => ctr_encrypt,
        }
    }

    /// The in-place decryption function for this mode.
    pub fn decrypt_fn(self) -> ModeFn {
        match self {
            Mode::Ecb => ecb_decrypt,
            Mode::Cbc => cbc_decrypt,
            Mode::Cfb => cfb_decrypt,
            Mode::Ofb => ofb_decrypt,
            Mode::Ctr => ctr_decrypt,
        }
    }

    /// Encrypts `buf` in place.
    pub fn encrypt_in_place(self, round_keys: &RoundKeys, iv: &Block, buf: &mut [u8]) {
        (self.encrypt_fn())(buf, iv, round_keys);
    }

    /// Decrypts `buf` in place.
    pub fn decrypt_in_place(self, round_keys: &RoundKeys, iv: &Block, buf: &mut [u8]) {
        (self.decrypt_fn())(buf, iv, round_keys);
    }

    /// Encrypts `input` into a separate `output` buffer of the same length.
    pub fn encrypt_into(
        self,
        round_keys: &RoundKeys,
        iv: &Block,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), Sm4Error> {
        copy_checked(input, output)?;
        self.encrypt_in_place(round_keys, iv, output);
        Ok(())
    }

    /// Decrypts `input` into a separate `output` buffer of the same length.
    pub fn decrypt_into(
        self,
        round_keys: &RoundKeys,
        iv: &Block,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), Sm4Error> {
        copy_checked(input, output)?;
        self.decrypt_in_place(round_keys, iv, output);
        Ok(())
    }

    /// Encrypts `input` into a freshly allocated buffer.
    pub fn encrypt(self, round_keys: &RoundKeys, iv: &Block, input: &[u8]) -> Vec<u8> {
        let mut out = input.to_vec();
        self.encrypt_in_place(round_keys, iv, &mut out);
        out
    }

    /// Decrypts `input` into a freshly allocated buffer.
    pub fn decrypt(self, round_keys: &RoundKeys, iv: &Block, input: &[u8]) -> Vec<u8> {
        let mut out = input.to_vec();
        self.decrypt_in_place(round_keys, iv, &mut out);
        out
    }

    /// Pads `input` with PKCS#7 and encrypts it. The output is always a whole
    /// number of blocks and strictly longer than `input`.
    pub fn pkcs7_encrypt(
        self,
        round_keys: &RoundKeys,
        iv: &Block,
        input: &[u8],
    ) -> Result<Vec<u8>, Sm4Error> {
        pad_then(self.encrypt_fn(), input, iv, round_keys)
    }

    /// Decrypts `input` and strips PKCS#7 padding leniently: malformed
    /// padding leaves the decrypted buffer at full length.
    pub fn pkcs7_decrypt(self, round_keys: &RoundKeys, iv: &Block, input: &[u8]) -> Vec<u8> {
        then_unpad(self.decrypt_fn(), input, iv, round_keys)
    }

    /// Decrypts `input` and strips PKCS#7 padding, failing with
    /// [`Sm4Error::PaddingInvalid`] on malformed padding.
    pub fn pkcs7_decrypt_strict(
        self,
        round_keys: &RoundKeys,
        iv: &Block,
        input: &[u8],
    ) -> Result<Vec<u8>, Sm4Error> {
        then_unpad_strict(self.decrypt_fn(), input, iv, round_keys)
    }
}

fn copy_checked(input: &[u8], output: &mut [u8]) -> Result<(), Sm4Error> {
    if input.len() != output.len() {
        return Err(Sm4Error::LengthMismatch {
            input: input.len(),
            output: output.len(),
        });
    }
    output.copy_from_slice(input);
    Ok(())
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Sm4Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Sm4Error::UnknownMode(s.to_string()))
    }
}
