//! Key, IV and mode selection for the driver.

use anyhow::{bail, Context, Result};
use sm4_core::{Block, Mode, Sm4Key};

/// Demonstration key used when `--key-hex` is not given.
pub const DEFAULT_KEY_HEX: &str = "0123456789abcdeffedcba9876543210";

/// Demonstration IV used when `--iv-hex` is not given. An all-zero IV reused
/// for every file is only acceptable for showing how the modes differ.
pub const DEFAULT_IV_HEX: &str = "00000000000000000000000000000000";

/// Resolved cipher settings for one run.
#[derive(Clone, Debug)]
pub struct CipherConfig {
    /// SM4 key.
    pub key: Sm4Key,
    /// IV or initial counter, shared by every selected mode.
    pub iv: Block,
    /// Modes to run, in order.
    pub modes: Vec<Mode>,
}

impl CipherConfig {
    /// Builds the configuration from command-line values. An empty mode list
    /// selects every mode.
    pub fn from_args(key_hex: &str, iv_hex: &str, modes: &[Mode]) -> Result<Self> {
        let modes = if modes.is_empty() {
            Mode::ALL.to_vec()
        } else {
            modes.to_vec()
        };
        Ok(Self {
            key: parse_key_hex(key_hex)?,
            iv: parse_iv_hex(iv_hex)?,
            modes,
        })
    }
}

fn parse_block_hex(hex_str: &str, what: &str) -> Result<[u8; 16]> {
    let bytes = hex::decode(hex_str.trim()).with_context(|| format!("decode {what} hex"))?;
    if bytes.len() != 16 {
        bail!(
            "SM4 {what} must be 16 bytes (32 hex characters), got {}",
            bytes.len()
        );
    }
    let mut block = [0u8; 16];
    block.copy_from_slice(&bytes);
    Ok(block)
}

/// Parses a 32-character hex key.
pub fn parse_key_hex(hex_str: &str) -> Result<Sm4Key> {
    parse_block_hex(hex_str, "key").map(Sm4Key::from)
}

/// Parses a 32-character hex IV.
pub fn parse_iv_hex(hex_str: &str) -> Result<Block> {
    parse_block_hex(hex_str, "IV")
}
