use serde::{Deserialize, Serialize};

use crate::error::{AssetError, Result};

/// Largest width or height the image pipeline accepts.
pub const MAX_IMAGE_DIMENSION: u32 = 4096;

/// Channel layouts supported by [`Texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    /// Number of bytes per pixel for this layout.
    pub fn channels(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Raw image buffer: row-major, tightly packed pixels.
///
/// The buffer is owned by the caller and follows an explicit create/destroy
/// lifecycle. Re-creating over a populated buffer releases the old payload
/// first; a failed create leaves the previous payload intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    width: u32,
    height: u32,
    format: Option<TextureFormat>,
    data: Vec<u8>,
}

impl Texture {
    /// Creates an empty texture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a zero-filled payload of `width` x `height` pixels in the
    /// given layout, replacing any previous payload.
    pub fn create(&mut self, width: u32, height: u32, format: TextureFormat) -> Result<()> {
        check_dimensions(width, height)?;
        let size = (width * height * format.channels()) as usize;
        self.width = width;
        self.height = height;
        self.format = Some(format);
        self.data = vec![0; size];
        Ok(())
    }

    /// Installs an already-filled payload, replacing any previous one. The
    /// payload must be exactly `width * height * channels` bytes.
    pub fn create_with_data(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Vec<u8>,
    ) -> Result<()> {
        check_dimensions(width, height)?;
        let expected = (width * height * format.channels()) as usize;
        if data.len() != expected {
            return Err(AssetError::malformed(format!(
                "pixel payload is {} bytes, expected {expected} for {width}x{height} {:?}",
                data.len(),
                format
            )));
        }
        self.width = width;
        self.height = height;
        self.format = Some(format);
        self.data = data;
        Ok(())
    }

    /// Releases the payload and resets the dimensions to zero.
    pub fn destroy(&mut self) {
        *self = Self::default();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> Option<TextureFormat> {
        self.format
    }

    /// Bytes per pixel, zero for an empty buffer.
    pub fn channels(&self) -> u32 {
        self.format.map_or(0, TextureFormat::channels)
    }

    /// Raw pixel bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes, for callers capturing rendered output.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// True when the buffer holds no pixel data.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(AssetError::malformed(format!(
            "image dimensions {width}x{height} must be at least 1x1"
        )));
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(AssetError::ImageTooLarge {
            width,
            height,
            max: MAX_IMAGE_DIMENSION,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_allocates_zeroed_payload() {
        let mut texture = Texture::new();
        texture.create(4, 2, TextureFormat::Rgb8).unwrap();
        assert_eq!(texture.pixels().len(), 4 * 2 * 3);
        assert!(texture.pixels().iter().all(|&b| b == 0));
        assert_eq!(texture.channels(), 3);
        assert!(!texture.is_empty());
    }

    #[test]
    fn recreate_replaces_previous_payload() {
        let mut texture = Texture::new();
        texture
            .create_with_data(1, 1, TextureFormat::Rgba8, vec![1, 2, 3, 4])
            .unwrap();
        texture.create(2, 2, TextureFormat::R8).unwrap();
        assert_eq!(texture.width(), 2);
        assert_eq!(texture.pixels(), &[0, 0, 0, 0]);
    }

    #[test]
    fn oversize_create_fails_and_keeps_previous_payload() {
        let mut texture = Texture::new();
        texture
            .create_with_data(1, 1, TextureFormat::Rgb8, vec![9, 8, 7])
            .unwrap();
        let err = texture
            .create(MAX_IMAGE_DIMENSION + 1, 1, TextureFormat::Rgb8)
            .unwrap_err();
        assert!(matches!(err, AssetError::ImageTooLarge { .. }));
        assert_eq!(texture.width(), 1);
        assert_eq!(texture.pixels(), &[9, 8, 7]);
    }

    #[test]
    fn zero_dimension_create_is_rejected() {
        let mut texture = Texture::new();
        assert!(texture.create(0, 4, TextureFormat::R8).is_err());
        assert!(texture.is_empty());
    }

    #[test]
    fn payload_size_mismatch_is_rejected() {
        let mut texture = Texture::new();
        let err = texture
            .create_with_data(2, 2, TextureFormat::Rgb8, vec![0; 5])
            .unwrap_err();
        assert!(matches!(err, AssetError::MalformedRecord(_)));
    }

    #[test]
    fn destroy_resets_dimensions() {
        let mut texture = Texture::new();
        texture.create(8, 8, TextureFormat::Rg8).unwrap();
        texture.destroy();
        assert_eq!(texture.width(), 0);
        assert_eq!(texture.height(), 0);
        assert_eq!(texture.channels(), 0);
        assert!(texture.is_empty());
    }
}
