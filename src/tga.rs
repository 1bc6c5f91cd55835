//! TGA image codec: an 18-byte packed little-endian header followed by a
//! row-major payload of blue-green-red byte triplets.
//!
//! Only the uncompressed 24-bit truecolor variant (image type 2) is
//! accepted. Decoding swaps every triplet into red-green-blue order for the
//! in-memory buffer; encoding performs the inverse swap while writing.

use std::fs;
use std::path::Path;

use crate::error::{AssetError, Result};
use crate::texture::{Texture, TextureFormat, MAX_IMAGE_DIMENSION};

/// Byte size of the fixed file header.
pub const TGA_HEADER_SIZE: usize = 18;

const TRUECOLOR_IMAGE_TYPE: u8 = 2;
const TRUECOLOR_BITS: u8 = 24;

/// Fixed-size TGA file header.
///
/// All multi-byte fields are little-endian and the on-disk layout is packed
/// with no padding between fields, so the struct round-trips through
/// [`TgaHeader::to_bytes`] / [`TgaHeader::from_bytes`] rather than a direct
/// memory copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TgaHeader {
    /// Size of the ID field that follows the header, usually 0.
    pub ident_size: u8,
    /// 0 = no colour map, 1 = palette present.
    pub colour_map_type: u8,
    /// 0 = none, 1 = indexed, 2 = rgb, 3 = grey, +8 = RLE packed.
    pub image_type: u8,
    pub colour_map_start: u16,
    pub colour_map_length: u16,
    pub colour_map_bits: u8,
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    /// Bits per pixel: 8, 16, 24 or 32.
    pub bits: u8,
    /// Descriptor bits (vh flip bits).
    pub descriptor: u8,
}

impl TgaHeader {
    /// Header for an uncompressed 24-bit truecolor image, all other fields
    /// zeroed.
    pub fn truecolor(width: u16, height: u16) -> Self {
        Self {
            image_type: TRUECOLOR_IMAGE_TYPE,
            width,
            height,
            bits: TRUECOLOR_BITS,
            ..Self::default()
        }
    }

    pub fn from_bytes(bytes: &[u8; TGA_HEADER_SIZE]) -> Self {
        Self {
            ident_size: bytes[0],
            colour_map_type: bytes[1],
            image_type: bytes[2],
            colour_map_start: u16::from_le_bytes([bytes[3], bytes[4]]),
            colour_map_length: u16::from_le_bytes([bytes[5], bytes[6]]),
            colour_map_bits: bytes[7],
            x_origin: u16::from_le_bytes([bytes[8], bytes[9]]),
            y_origin: u16::from_le_bytes([bytes[10], bytes[11]]),
            width: u16::from_le_bytes([bytes[12], bytes[13]]),
            height: u16::from_le_bytes([bytes[14], bytes[15]]),
            bits: bytes[16],
            descriptor: bytes[17],
        }
    }

    pub fn to_bytes(self) -> [u8; TGA_HEADER_SIZE] {
        let mut bytes = [0u8; TGA_HEADER_SIZE];
        bytes[0] = self.ident_size;
        bytes[1] = self.colour_map_type;
        bytes[2] = self.image_type;
        bytes[3..5].copy_from_slice(&self.colour_map_start.to_le_bytes());
        bytes[5..7].copy_from_slice(&self.colour_map_length.to_le_bytes());
        bytes[7] = self.colour_map_bits;
        bytes[8..10].copy_from_slice(&self.x_origin.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.y_origin.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.width.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.height.to_le_bytes());
        bytes[16] = self.bits;
        bytes[17] = self.descriptor;
        bytes
    }
}

/// Reads a texture from `path`, dispatching on the file extension.
///
/// Only `.tga` is recognised. On success the previous contents of `texture`
/// are replaced in full; on any failure `texture` is left untouched.
pub fn read_texture_from_file(path: impl AsRef<Path>, texture: &mut Texture) -> Result<()> {
    let path = path.as_ref();
    let extension = crate::file_extension(path);
    if extension != "tga" {
        return Err(AssetError::UnsupportedFormat { extension });
    }
    let bytes = fs::read(path)
        .map_err(|err| AssetError::io(format!("unable to read {}", path.display()), err))?;
    *texture = decode_tga(&bytes)?;
    Ok(())
}

/// Encodes `texture` and writes it to `path`, dispatching on the file
/// extension. Only `.tga` is recognised.
pub fn write_texture_to_file(path: impl AsRef<Path>, texture: &Texture) -> Result<()> {
    let path = path.as_ref();
    let extension = crate::file_extension(path);
    if extension != "tga" {
        return Err(AssetError::UnsupportedFormat { extension });
    }
    let bytes = encode_tga(texture)?;
    fs::write(path, bytes)
        .map_err(|err| AssetError::io(format!("unable to write {}", path.display()), err))
}

/// Decodes a TGA byte stream into a 3-channel texture buffer with pixels in
/// red-green-blue order.
pub fn decode_tga(bytes: &[u8]) -> Result<Texture> {
    let header_bytes: &[u8; TGA_HEADER_SIZE] = bytes
        .get(..TGA_HEADER_SIZE)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            AssetError::malformed(format!(
                "TGA stream is {} bytes, shorter than the {TGA_HEADER_SIZE}-byte header",
                bytes.len()
            ))
        })?;
    let header = TgaHeader::from_bytes(header_bytes);

    if header.image_type != TRUECOLOR_IMAGE_TYPE || header.bits != TRUECOLOR_BITS {
        return Err(AssetError::UnsupportedImageVariant {
            image_type: header.image_type,
            bits: header.bits,
        });
    }

    let width = u32::from(header.width);
    let height = u32::from(header.height);
    if width == 0 || height == 0 {
        return Err(AssetError::malformed(format!(
            "TGA header declares empty image {width}x{height}"
        )));
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(AssetError::ImageTooLarge {
            width,
            height,
            max: MAX_IMAGE_DIMENSION,
        });
    }

    let payload_size = (width * height * 3) as usize;
    let payload = bytes
        .get(TGA_HEADER_SIZE..TGA_HEADER_SIZE + payload_size)
        .ok_or_else(|| {
            AssetError::malformed(format!(
                "TGA payload truncated: need {payload_size} bytes after the header, found {}",
                bytes.len().saturating_sub(TGA_HEADER_SIZE)
            ))
        })?;

    let mut pixels = payload.to_vec();
    swap_red_blue(&mut pixels);

    let mut texture = Texture::new();
    texture.create_with_data(width, height, TextureFormat::Rgb8, pixels)?;
    Ok(texture)
}

/// Encodes a populated texture buffer as an uncompressed 24-bit truecolor
/// TGA byte stream.
///
/// The buffer is always treated as 3-channel truecolor: callers holding a
/// buffer created with a different channel count must convert it first.
pub fn encode_tga(texture: &Texture) -> Result<Vec<u8>> {
    if texture.is_empty() {
        return Err(AssetError::EmptyBuffer);
    }
    let payload_size = (texture.width() * texture.height() * 3) as usize;
    let Some(payload) = texture.pixels().get(..payload_size) else {
        return Err(AssetError::EmptyBuffer);
    };

    let header = TgaHeader::truecolor(texture.width() as u16, texture.height() as u16);

    let mut bytes = Vec::with_capacity(TGA_HEADER_SIZE + payload_size);
    bytes.extend_from_slice(&header.to_bytes());
    for pixel in payload.chunks_exact(3) {
        bytes.extend_from_slice(&[pixel[2], pixel[1], pixel[0]]);
    }
    Ok(bytes)
}

/// Swaps the first and third byte of every triplet in place. Triplets are
/// swapped atomically; a trailing partial triplet is never touched.
fn swap_red_blue(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_texture() -> Texture {
        let mut texture = Texture::new();
        texture
            .create_with_data(
                2,
                2,
                TextureFormat::Rgb8,
                vec![
                    255, 0, 0, // red
                    0, 255, 0, // green
                    0, 0, 255, // blue
                    10, 20, 30,
                ],
            )
            .unwrap();
        texture
    }

    #[test]
    fn header_round_trips_through_fixed_layout() {
        let header = TgaHeader {
            ident_size: 1,
            colour_map_type: 0,
            image_type: 2,
            colour_map_start: 0x0102,
            colour_map_length: 0x0304,
            colour_map_bits: 5,
            x_origin: 0x0607,
            y_origin: 0x0809,
            width: 0x0A0B,
            height: 0x0C0D,
            bits: 24,
            descriptor: 0x20,
        };
        let bytes = header.to_bytes();
        // Multi-byte fields are little-endian at fixed offsets.
        assert_eq!(bytes[3..5], [0x02, 0x01]);
        assert_eq!(bytes[12..14], [0x0B, 0x0A]);
        assert_eq!(bytes[14..16], [0x0D, 0x0C]);
        assert_eq!(bytes[16], 24);
        assert_eq!(TgaHeader::from_bytes(&bytes), header);
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let texture = sample_texture();
        let bytes = encode_tga(&texture).unwrap();
        assert_eq!(bytes.len(), TGA_HEADER_SIZE + 12);
        let decoded = decode_tga(&bytes).unwrap();
        assert_eq!(decoded, texture);
    }

    #[test]
    fn decode_swaps_blue_and_red() {
        let mut bytes = TgaHeader::truecolor(1, 1).to_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]); // b, g, r on disk
        let texture = decode_tga(&bytes).unwrap();
        assert_eq!(texture.pixels(), &[3, 2, 1]);
    }

    #[test]
    fn encode_swaps_red_and_blue() {
        let mut texture = Texture::new();
        texture
            .create_with_data(1, 1, TextureFormat::Rgb8, vec![3, 2, 1])
            .unwrap();
        let bytes = encode_tga(&texture).unwrap();
        assert_eq!(&bytes[TGA_HEADER_SIZE..], &[1, 2, 3]);
    }

    #[test]
    fn decode_uses_header_height() {
        let mut bytes = TgaHeader::truecolor(1, 3).to_bytes().to_vec();
        bytes.extend_from_slice(&[0; 9]);
        let texture = decode_tga(&bytes).unwrap();
        assert_eq!(texture.width(), 1);
        assert_eq!(texture.height(), 3);
    }

    #[test]
    fn unsupported_variants_are_rejected() {
        let mut rle = TgaHeader::truecolor(1, 1);
        rle.image_type = 10;
        let err = decode_tga(&rle.to_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AssetError::UnsupportedImageVariant {
                image_type: 10,
                bits: 24,
            }
        ));

        let mut deep = TgaHeader::truecolor(1, 1);
        deep.bits = 32;
        let err = decode_tga(&deep.to_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AssetError::UnsupportedImageVariant {
                image_type: 2,
                bits: 32,
            }
        ));
    }

    #[test]
    fn oversize_image_is_rejected() {
        let header = TgaHeader::truecolor(4097, 1);
        let err = decode_tga(&header.to_bytes()).unwrap_err();
        assert!(matches!(err, AssetError::ImageTooLarge { width: 4097, .. }));
    }

    #[test]
    fn truncated_streams_are_rejected() {
        assert!(matches!(
            decode_tga(&[0; 4]).unwrap_err(),
            AssetError::MalformedRecord(_)
        ));

        let mut bytes = TgaHeader::truecolor(2, 2).to_bytes().to_vec();
        bytes.extend_from_slice(&[0; 11]); // one byte short of 2*2*3
        assert!(matches!(
            decode_tga(&bytes).unwrap_err(),
            AssetError::MalformedRecord(_)
        ));
    }

    #[test]
    fn trailing_bytes_after_payload_are_tolerated() {
        let mut bytes = encode_tga(&sample_texture()).unwrap();
        bytes.extend_from_slice(b"TRUEVISION-XFILE.");
        assert!(decode_tga(&bytes).is_ok());
    }

    #[test]
    fn encoding_an_empty_buffer_fails() {
        let err = encode_tga(&Texture::new()).unwrap_err();
        assert!(matches!(err, AssetError::EmptyBuffer));
    }

    #[test]
    fn encoding_an_undersized_buffer_fails() {
        // One-channel buffer: fewer bytes than width*height*3.
        let mut texture = Texture::new();
        texture.create(2, 2, TextureFormat::R8).unwrap();
        let err = encode_tga(&texture).unwrap_err();
        assert!(matches!(err, AssetError::EmptyBuffer));
    }

    #[test]
    fn file_round_trip_through_extension_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.tga");
        let texture = sample_texture();
        write_texture_to_file(&path, &texture).unwrap();

        let mut loaded = Texture::new();
        read_texture_from_file(&path, &mut loaded).unwrap();
        assert_eq!(loaded, texture);
    }

    #[test]
    fn unknown_extension_fails_dispatch_on_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.png");
        let mut texture = Texture::new();
        assert!(matches!(
            read_texture_from_file(&path, &mut texture).unwrap_err(),
            AssetError::UnsupportedFormat { .. }
        ));
        assert!(matches!(
            write_texture_to_file(&path, &sample_texture()).unwrap_err(),
            AssetError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn failed_read_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tga");
        fs::write(&path, [0u8; 4]).unwrap();
        let mut texture = sample_texture();
        assert!(read_texture_from_file(&path, &mut texture).is_err());
        assert_eq!(texture, sample_texture());
    }
}
