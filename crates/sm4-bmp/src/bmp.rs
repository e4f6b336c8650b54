//! Minimal Windows bitmap container handling: split into header and pixel
//! data, and join them back.

use anyhow::{bail, Result};

/// `BITMAPFILEHEADER` length.
pub const FILE_HEADER_LEN: usize = 14;
/// `BITMAPINFOHEADER` length.
pub const INFO_HEADER_LEN: usize = 40;
/// `"BM"` read as a little-endian `u16`.
pub const BMP_MAGIC: u16 = 0x4d42;

const SIZE_OFFSET: usize = 2;
const PIXEL_OFFSET_OFFSET: usize = 10;
const SIZE_IMAGE_OFFSET: usize = FILE_HEADER_LEN + 20;

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// A bitmap file split into its header bytes and pixel data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    header: Vec<u8>,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Parses a bitmap file.
    ///
    /// The header runs up to `bfOffBits`; the pixel data is `biSizeImage`
    /// bytes, or `bfSize - bfOffBits` when `biSizeImage` is zero. Bytes past
    /// the pixel data are dropped.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_LEN + INFO_HEADER_LEN {
            bail!(
                "invalid BMP: {} bytes is shorter than the {}-byte headers",
                bytes.len(),
                FILE_HEADER_LEN + INFO_HEADER_LEN
            );
        }
        let magic = read_u16(bytes, 0);
        if magic != BMP_MAGIC {
            bail!("invalid BMP signature {magic:#06x}");
        }

        let file_size = read_u32(bytes, SIZE_OFFSET) as usize;
        let offset = read_u32(bytes, PIXEL_OFFSET_OFFSET) as usize;
        let size_image = read_u32(bytes, SIZE_IMAGE_OFFSET) as usize;

        if offset < FILE_HEADER_LEN + INFO_HEADER_LEN || offset > bytes.len() {
            bail!("invalid BMP: pixel offset {offset} outside file of {} bytes", bytes.len());
        }
        let pixel_len = if size_image != 0 {
            size_image
        } else {
            match file_size.checked_sub(offset) {
                Some(len) => len,
                None => bail!("invalid BMP: file size {file_size} below pixel offset {offset}"),
            }
        };
        let end = offset + pixel_len;
        if end > bytes.len() {
            bail!(
                "truncated BMP: pixel data needs {end} bytes, file has {}",
                bytes.len()
            );
        }

        Ok(Self {
            header: bytes[..offset].to_vec(),
            pixels: bytes[offset..end].to_vec(),
        })
    }

    /// Header bytes, everything before the pixel data.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable pixel data, for in-place transforms.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Serializes header followed by pixel data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header.len() + self.pixels.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.pixels);
        out
    }
}

/// Builds an uncompressed 24-bit bitmap with the given dimensions and pixel
/// bytes.
#[cfg(test)]
pub fn synthesize(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let offset = (FILE_HEADER_LEN + INFO_HEADER_LEN) as u32;
    let size_image = pixels.len() as u32;
    let mut out = Vec::with_capacity(offset as usize + pixels.len());
    out.extend_from_slice(&BMP_MAGIC.to_le_bytes());
    out.extend_from_slice(&(offset + size_image).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&offset.to_le_bytes());

    out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&size_image.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);

    out.extend_from_slice(pixels);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| i as u8).collect();
        synthesize(4, 3, &pixels)
    }

    #[test]
    fn parse_splits_header_and_pixels() {
        let bytes = sample();
        let bmp = Bitmap::parse(&bytes).unwrap();
        assert_eq!(bmp.header().len(), 54);
        assert_eq!(bmp.pixels().len(), 36);
        assert_eq!(bmp.pixels()[5], 5);
        assert_eq!(bmp.to_bytes(), bytes);
    }

    #[test]
    fn zero_size_image_falls_back_to_file_size() {
        let mut bytes = sample();
        bytes[SIZE_IMAGE_OFFSET..SIZE_IMAGE_OFFSET + 4].copy_from_slice(&0u32.to_le_bytes());
        let bmp = Bitmap::parse(&bytes).unwrap();
        assert_eq!(bmp.pixels().len(), 36);
    }

    #[test]
    fn trailing_bytes_are_dropped() {
        let mut bytes = sample();
        bytes.extend_from_slice(&[0xee; 7]);
        let bmp = Bitmap::parse(&bytes).unwrap();
        assert_eq!(bmp.to_bytes().len(), 54 + 36);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample();
        bytes[0] = b'X';
        let err = Bitmap::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("signature"), "{err}");
    }

    #[test]
    fn rejects_short_file() {
        let err = Bitmap::parse(&sample()[..20]).unwrap_err();
        assert!(err.to_string().contains("shorter"), "{err}");
    }

    #[test]
    fn rejects_truncated_pixel_data() {
        let bytes = sample();
        let err = Bitmap::parse(&bytes[..60]).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn rejects_offset_past_end() {
        let mut bytes = sample();
        bytes[PIXEL_OFFSET_OFFSET..PIXEL_OFFSET_OFFSET + 4]
            .copy_from_slice(&1000u32.to_le_bytes());
        assert!(Bitmap::parse(&bytes).is_err());
    }
}
