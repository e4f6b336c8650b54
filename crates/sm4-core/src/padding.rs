//! PKCS#7 padding and its composition with the modes of operation.
//!
//! Two unpadding flavours are offered. [`unpad`] is lenient: a malformed
//! trailer is treated as "no padding" and the full length is returned, which
//! means a corrupted ciphertext decrypts to an over-long buffer instead of
//! failing. [`unpad_strict`] reports the same condition as
//! [`Sm4Error::PaddingInvalid`] and should be preferred by new callers.

use crate::block::{Block, BLOCK_SIZE};
use crate::error::Sm4Error;
use crate::key::RoundKeys;

/// Returns `data` followed by `p` bytes of value `p`, where
/// `p = 16 - len % 16` (a whole block when `data` is already aligned).
pub fn pad(data: &[u8]) -> Result<Vec<u8>, Sm4Error> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let total = data
        .len()
        .checked_add(pad_len)
        .ok_or(Sm4Error::AllocationFailed { len: usize::MAX })?;

    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| Sm4Error::AllocationFailed { len: total })?;
    out.extend_from_slice(data);
    out.resize(total, pad_len as u8);
    Ok(out)
}

fn padding_len(buf: &[u8]) -> Option<usize> {
    let &last = buf.last()?;
    let pad_len = last as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE || pad_len > buf.len() {
        return None;
    }
    buf[buf.len() - pad_len..]
        .iter()
        .all(|&b| b == last)
        .then_some(pad_len)
}

/// Returns the unpadded length of `buf`, or `buf.len()` when the trailer is
/// not valid PKCS#7 padding.
pub fn unpad(buf: &[u8]) -> usize {
    buf.len() - padding_len(buf).unwrap_or(0)
}

/// Returns the unpadded length of `buf`.
///
/// Fails when `buf` is empty, not block aligned, or ends in malformed padding.
pub fn unpad_strict(buf: &[u8]) -> Result<usize, Sm4Error> {
    if buf.is_empty() || buf.len() % BLOCK_SIZE != 0 {
        return Err(Sm4Error::PaddingInvalid);
    }
    padding_len(buf)
        .map(|pad_len| buf.len() - pad_len)
        .ok_or(Sm4Error::PaddingInvalid)
}

/// Pads `input` and runs `mode_encrypt` over the padded buffer.
pub fn pad_then<F>(
    mode_encrypt: F,
    input: &[u8],
    iv: &Block,
    round_keys: &RoundKeys,
) -> Result<Vec<u8>, Sm4Error>
where
    F: Fn(&mut [u8], &Block, &RoundKeys),
{
    let mut buf = pad(input)?;
    mode_encrypt(&mut buf, iv, round_keys);
    Ok(buf)
}

/// Runs `mode_decrypt` over a copy of `input` and strips padding with
/// [`unpad`].
pub fn then_unpad<F>(mode_decrypt: F, input: &[u8], iv: &Block, round_keys: &RoundKeys) -> Vec<u8>
where
    F: Fn(&mut [u8], &Block, &RoundKeys),
{
    let mut buf = input.to_vec();
    mode_decrypt(&mut buf, iv, round_keys);
    let len = unpad(&buf);
    buf.truncate(len);
    buf
}

/// Runs `mode_decrypt` over a copy of `input` and strips padding with
/// [`unpad_strict`].
pub fn then_unpad_strict<F>(
    mode_decrypt: F,
    input: &[u8],
    iv: &Block,
    round_keys: &RoundKeys,
) -> Result<Vec<u8>, Sm4Error>
where
    F: Fn(&mut [u8], &Block, &RoundKeys),
{
    let mut buf = input.to_vec();
    mode_decrypt(&mut buf, iv, round_keys);
    let len = unpad_strict(&buf)?;
    buf.truncate(len);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::expand_key;
    use crate::key::Sm4Key;
    use crate::modes::Mode;
    use rand::RngCore;

    #[test]
    fn pad_appends_count_bytes() {
        let padded = pad(b"hello").unwrap();
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..5], b"hello");
        assert!(padded[5..].iter().all(|&b| b == 11));
    }

    #[test]
    fn pad_aligned_input_adds_full_block() {
        let padded = pad(&[0xaa; 32]).unwrap();
        assert_eq!(padded.len(), 48);
        assert_eq!(&padded[32..], &[16u8; 16]);
        assert_eq!(pad(&[]).unwrap(), vec![16u8; 16]);
    }

    #[test]
    fn unpad_inverts_pad_for_every_remainder() {
        for len in 0..48 {
            let data = vec![0x5cu8; len];
            let padded = pad(&data).unwrap();
            assert_eq!(unpad(&padded), len);
            assert_eq!(unpad_strict(&padded), Ok(len));
        }
    }

    #[test]
    fn lenient_unpad_passes_bad_padding_through() {
        let mut buf = [0u8; 16];
        assert_eq!(unpad(&buf), 16, "zero pad byte");
        buf[15] = 17;
        assert_eq!(unpad(&buf), 16, "pad byte too large");
        buf[15] = 3;
        buf[14] = 3;
        buf[13] = 2;
        assert_eq!(unpad(&buf), 16, "inconsistent pad bytes");
        assert_eq!(unpad(&[]), 0);
        assert_eq!(unpad(&[4, 4]), 2, "pad longer than buffer");
    }

    #[test]
    fn strict_unpad_rejects_bad_padding() {
        let mut buf = [0u8; 16];
        assert_eq!(unpad_strict(&buf), Err(Sm4Error::PaddingInvalid));
        buf[15] = 3;
        buf[14] = 3;
        buf[13] = 2;
        assert_eq!(unpad_strict(&buf), Err(Sm4Error::PaddingInvalid));
        assert_eq!(unpad_strict(&[]), Err(Sm4Error::PaddingInvalid));
        assert_eq!(unpad_strict(&[1u8; 15]), Err(Sm4Error::PaddingInvalid));
    }

    #[test]
    fn padded_round_trip_all_modes() {
        let mut rng = rand::thread_rng();
        let mut key = [0u8; 16];
        let mut iv = [0u8; 16];
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut iv);
        let rks = expand_key(&Sm4Key::from(key));

        for mode in Mode::ALL {
            for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
                let mut plain = vec![0u8; len];
                rng.fill_bytes(&mut plain);
                let ct = mode.pkcs7_encrypt(&rks, &iv, &plain).unwrap();
                assert_eq!(ct.len(), (len / 16 + 1) * 16, "{mode} len {len}");
                assert_eq!(mode.pkcs7_decrypt(&rks, &iv, &ct), plain);
                assert_eq!(mode.pkcs7_decrypt_strict(&rks, &iv, &ct), Ok(plain));
            }
        }
    }

    #[test]
    fn combinators_accept_closures() {
        let rks = expand_key(&Sm4Key::from([2u8; 16]));
        let iv = [0u8; 16];
        let calls = core::cell::Cell::new(0);
        let ct = pad_then(
            |buf: &mut [u8], iv: &Block, rk: &RoundKeys| {
                calls.set(calls.get() + 1);
                Mode::Cbc.encrypt_in_place(rk, iv, buf);
            },
            b"closure",
            &iv,
            &rks,
        )
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(then_unpad(Mode::Cbc.decrypt_fn(), &ct, &iv, &rks), b"closure");
    }

    #[test]
    fn corrupted_trailer_is_lenient_or_rejected() {
        let rks = expand_key(&Sm4Key::from([1u8; 16]));
        let iv = [0u8; 16];
        let mut ct = Mode::Ctr.pkcs7_encrypt(&rks, &iv, b"attack at dawn").unwrap();
        // CTR flips plaintext bits in place: the trailer becomes `02 03`.
        ct[15] ^= 0x01;

        let lenient = Mode::Ctr.pkcs7_decrypt(&rks, &iv, &ct);
        assert_eq!(lenient.len(), 16);
        assert_eq!(&lenient[..14], b"attack at dawn");
        assert_eq!(&lenient[14..], &[0x02, 0x03]);

        assert_eq!(
            Mode::Ctr.pkcs7_decrypt_strict(&rks, &iv, &ct),
            Err(Sm4Error::PaddingInvalid)
        );
    }
}
