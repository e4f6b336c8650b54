//! Error type shared by the padding layer and the slice conversions.

use thiserror::Error;

/// SM4 error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Sm4Error {
    /// The trailing PKCS#7 padding is malformed.
    #[error("invalid PKCS#7 padding")]
    PaddingInvalid,

    /// Input and output buffers differ in length.
    #[error("buffer length mismatch: input {input} bytes, output {output} bytes")]
    LengthMismatch {
        /// Input length in bytes.
        input: usize,
        /// Output length in bytes.
        output: usize,
    },

    /// The padded buffer could not be allocated.
    #[error("failed to allocate {len} bytes for padded buffer")]
    AllocationFailed {
        /// Requested length in bytes.
        len: usize,
    },

    /// Key material was not 16 bytes.
    #[error("SM4 key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// IV or counter was not 16 bytes.
    #[error("IV must be 16 bytes, got {0}")]
    InvalidIvLength(usize),

    /// Mode name not recognised.
    #[error("unknown mode of operation `{0}`")]
    UnknownMode(String),
}
