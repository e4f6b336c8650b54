//! Command-line driver that encrypts the pixel data of a BMP image with SM4
//! under every mode of operation, leaving the headers readable so the
//! result can still be opened as an image.

#![forbid(unsafe_code)]

mod bmp;
mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sm4_core::{encrypt_block, expand_key, Block, Mode, RoundKeys};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use crate::bmp::Bitmap;
use crate::config::{CipherConfig, DEFAULT_IV_HEX, DEFAULT_KEY_HEX};

/// SM4 bitmap CLI.
#[derive(Parser)]
#[command(
    name = "sm4bmp",
    version,
    author,
    about = "Encrypt BMP pixel data with SM4 in ECB, CBC, CFB, OFB and CTR modes"
)]
struct Cli {
    /// SM4 key as 32 hex characters.
    #[arg(long, value_name = "HEX", global = true, default_value = DEFAULT_KEY_HEX)]
    key_hex: String,
    /// IV / initial counter as 32 hex characters.
    #[arg(long, value_name = "HEX", global = true, default_value = DEFAULT_IV_HEX)]
    iv_hex: String,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a bitmap once per mode, writing `enc_<mode>.bmp`.
    Encrypt {
        /// Input bitmap.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Directory for the encrypted bitmaps.
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Restrict to the given modes (repeatable; default all).
        #[arg(long = "mode", value_name = "MODE")]
        modes: Vec<Mode>,
    },
    /// Decrypt `enc_<mode>.bmp` files, writing `dec_<mode>.bmp`.
    Decrypt {
        /// Directory holding the encrypted bitmaps.
        #[arg(long, value_name = "DIR", default_value = ".")]
        in_dir: PathBuf,
        /// Directory for the decrypted bitmaps.
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
        /// Restrict to the given modes (repeatable; default all).
        #[arg(long = "mode", value_name = "MODE")]
        modes: Vec<Mode>,
    },
    /// Run random data through every mode and check the round trips.
    Demo {
        /// Optional RNG seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,
        /// Plaintext length in bytes.
        #[arg(long, default_value_t = 45)]
        len: usize,
    },
    /// Check the published SM4 test vectors.
    Kat {
        /// Also run the 1,000,000-iteration vector.
        #[arg(long, default_value_t = false)]
        million: bool,
    },
}

/// Direction of a batch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Encrypt => "Encrypted",
            Direction::Decrypt => "Decrypted",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    match cli.command {
        Commands::Encrypt {
            input,
            out_dir,
            modes,
        } => {
            let cfg = CipherConfig::from_args(&cli.key_hex, &cli.iv_hex, &modes)?;
            cmd_encrypt(&cfg, &input, &out_dir)
        }
        Commands::Decrypt {
            in_dir,
            out_dir,
            modes,
        } => {
            let cfg = CipherConfig::from_args(&cli.key_hex, &cli.iv_hex, &modes)?;
            cmd_decrypt(&cfg, &in_dir, &out_dir)
        }
        Commands::Demo { seed, len } => {
            let cfg = CipherConfig::from_args(&cli.key_hex, &cli.iv_hex, &[])?;
            cmd_demo(&cfg, seed, len)
        }
        Commands::Kat { million } => cmd_kat(million),
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let targets = match std::env::var("RUST_LOG") {
        Ok(var) => var.parse::<Targets>().context("parse RUST_LOG")?,
        Err(_) => {
            let level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            Targets::new().with_default(level)
        }
    };
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish()
        .with(targets)
        .init();
    Ok(())
}

fn encrypted_name(mode: Mode) -> String {
    format!("enc_{mode}.bmp")
}

fn decrypted_name(mode: Mode) -> String {
    format!("dec_{mode}.bmp")
}

fn cmd_encrypt(cfg: &CipherConfig, input: &Path, out_dir: &Path) -> Result<()> {
    let report = run_batch(cfg, Direction::Encrypt, |_| input.to_path_buf(), |mode| {
        out_dir.join(encrypted_name(mode))
    });
    report.into_result()
}

fn cmd_decrypt(cfg: &CipherConfig, in_dir: &Path, out_dir: &Path) -> Result<()> {
    let report = run_batch(
        cfg,
        Direction::Decrypt,
        |mode| in_dir.join(encrypted_name(mode)),
        |mode| out_dir.join(decrypted_name(mode)),
    );
    report.into_result()
}

/// Outcome of a batch over several modes.
#[derive(Debug, Default)]
struct BatchReport {
    succeeded: Vec<Mode>,
    failed: Vec<Mode>,
}

impl BatchReport {
    fn into_result(self) -> Result<()> {
        if !self.failed.is_empty() {
            let names: Vec<&str> = self.failed.iter().map(|m| m.name()).collect();
            bail!(
                "{} of {} modes failed: {}",
                self.failed.len(),
                self.failed.len() + self.succeeded.len(),
                names.join(", ")
            );
        }
        Ok(())
    }
}

/// Runs every configured mode, logging and skipping modes whose file cannot
/// be read, parsed or written.
fn run_batch(
    cfg: &CipherConfig,
    direction: Direction,
    input_for: impl Fn(Mode) -> PathBuf,
    output_for: impl Fn(Mode) -> PathBuf,
) -> BatchReport {
    let round_keys = expand_key(&cfg.key);
    let mut report = BatchReport::default();
    for &mode in &cfg.modes {
        let input = input_for(mode);
        let output = output_for(mode);
        match process_file(&round_keys, &cfg.iv, mode, direction, &input, &output) {
            Ok(()) => {
                info!(%mode, "{} {} -> {}", direction.verb(), input.display(), output.display());
                report.succeeded.push(mode);
            }
            Err(err) => {
                error!(%mode, "skipping: {err:#}");
                report.failed.push(mode);
            }
        }
    }
    report
}

fn process_file(
    round_keys: &RoundKeys,
    iv: &Block,
    mode: Mode,
    direction: Direction,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("read {}", input.display()))?;
    let mut image = Bitmap::parse(&bytes).with_context(|| format!("parse {}", input.display()))?;
    debug!(
        header = image.header().len(),
        pixels = image.pixels().len(),
        "loaded {}",
        input.display()
    );

    match direction {
        Direction::Encrypt => mode.encrypt_in_place(round_keys, iv, image.pixels_mut()),
        Direction::Decrypt => mode.decrypt_in_place(round_keys, iv, image.pixels_mut()),
    }

    fs::write(output, image.to_bytes()).with_context(|| format!("write {}", output.display()))?;
    Ok(())
}

fn cmd_demo(cfg: &CipherConfig, seed: Option<u64>, len: usize) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let mut plaintext = vec![0u8; len];
    rng.fill_bytes(&mut plaintext);
    let round_keys = expand_key(&cfg.key);

    println!("key: {}", hex::encode(cfg.key.0));
    println!("iv: {}", hex::encode(cfg.iv));
    println!("plaintext: {}", hex::encode(&plaintext));
    for mode in Mode::ALL {
        let ciphertext = mode.encrypt(&round_keys, &cfg.iv, &plaintext);
        let decrypted = mode.decrypt(&round_keys, &cfg.iv, &ciphertext);
        println!("{mode}: {}", hex::encode(&ciphertext));
        if decrypted != plaintext {
            bail!("{mode} roundtrip failed");
        }

        let padded = mode.pkcs7_encrypt(&round_keys, &cfg.iv, &plaintext)?;
        let unpadded = mode
            .pkcs7_decrypt_strict(&round_keys, &cfg.iv, &padded)
            .with_context(|| format!("{mode} pkcs7 decrypt"))?;
        println!("{mode}+pkcs7: {}", hex::encode(&padded));
        if unpadded != plaintext {
            bail!("{mode} pkcs7 roundtrip failed");
        }
    }
    Ok(())
}

const STD_KEY_HEX: &str = "0123456789abcdeffedcba9876543210";
const STD_CIPHER_HEX: &str = "681edf34d206965e86b3e94f536e4246";
const STD_MILLION_HEX: &str = "595298c7c6fd271f0402f804c33d3f66";

fn cmd_kat(million: bool) -> Result<()> {
    let key = config::parse_key_hex(STD_KEY_HEX)?;
    let round_keys = expand_key(&key);
    let ciphertext = encrypt_block(&key.0, &round_keys);
    check_vector("single block", &ciphertext, STD_CIPHER_HEX)?;

    if million {
        let mut state = key.0;
        for _ in 0..1_000_000 {
            state = encrypt_block(&state, &round_keys);
        }
        check_vector("1,000,000 iterations", &state, STD_MILLION_HEX)?;
    }
    Ok(())
}

fn check_vector(label: &str, actual: &[u8], expected_hex: &str) -> Result<()> {
    let actual_hex = hex::encode(actual);
    if actual_hex != expected_hex {
        bail!("{label}: expected {expected_hex}, got {actual_hex}");
    }
    println!("{label}: {actual_hex} ok");
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(value) => {
            let mut seed_bytes = [0u8; 32];
            seed_bytes[..8].copy_from_slice(&value.to_le_bytes());
            ChaCha20Rng::from_seed(seed_bytes)
        }
        None => {
            let mut seed_bytes = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed_bytes);
            ChaCha20Rng::from_seed(seed_bytes)
        }
    }
}
