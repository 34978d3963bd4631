//! Immutable RGBA image buffers.
//!
//! Every compositing operation in this crate consumes buffers by reference
//! and returns a freshly allocated buffer. Nothing mutates pixel data that
//! has already been handed out, which is what lets the edit session share
//! buffers freely without locking.

use serde::{Deserialize, Serialize};

/// An immutable RGBA raster with a device pixel scale.
///
/// `width` and `height` are in device-independent pixels; `pixel_scale` is
/// the resolution multiplier the host display uses (2.0 on a 2x screen).
/// The scale travels with the buffer so the flattened output can be produced
/// at full resolution without the caller re-deriving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBuffer {
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Device pixel scale factor (1.0 = standard resolution).
    pub pixel_scale: f32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Create a new buffer from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixel_scale: 1.0,
            pixels,
        }
    }

    /// Create a new buffer with an explicit device pixel scale.
    pub fn with_scale(width: u32, height: u32, pixel_scale: f32, pixels: Vec<u8>) -> Self {
        let mut buffer = Self::new(width, height, pixels);
        buffer.pixel_scale = pixel_scale;
        buffer
    }

    /// Create a fully transparent buffer.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_scale: 1.0,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Create an ImageBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixel_scale: 1.0,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Read the RGBA pixel at integer coordinates.
    ///
    /// Out-of-bounds reads return transparent black, which is what the
    /// resamplers rely on for pixels outside the source extent.
    #[inline]
    pub fn pixel_at(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return [0, 0, 0, 0];
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let pixels = vec![0u8; 100 * 50 * 4];
        let buf = ImageBuffer::new(100, 50, pixels);

        assert_eq!(buf.width, 100);
        assert_eq!(buf.height, 50);
        assert_eq!(buf.pixel_count(), 5000);
        assert_eq!(buf.byte_size(), 20000);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_buffer_empty() {
        let buf = ImageBuffer::new(0, 0, vec![]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_blank_is_transparent() {
        let buf = ImageBuffer::blank(4, 4);
        assert_eq!(buf.pixel_at(2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn test_pixel_at_out_of_bounds() {
        let buf = ImageBuffer::new(2, 2, vec![255u8; 2 * 2 * 4]);
        assert_eq!(buf.pixel_at(-1, 0), [0, 0, 0, 0]);
        assert_eq!(buf.pixel_at(0, 2), [0, 0, 0, 0]);
        assert_eq!(buf.pixel_at(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_with_scale() {
        let buf = ImageBuffer::with_scale(2, 2, 2.0, vec![0u8; 2 * 2 * 4]);
        assert_eq!(buf.pixel_scale, 2.0);
    }

    #[test]
    fn test_rgba_image_round_trip() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgba([10, 20, 30, 255]));

        let buf = ImageBuffer::from_rgba_image(img);
        assert_eq!(buf.pixel_at(1, 1), [10, 20, 30, 255]);

        let back = buf.to_rgba_image().unwrap();
        assert_eq!(back.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }
}
