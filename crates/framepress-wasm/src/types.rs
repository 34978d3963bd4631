//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core
//! Framepress types, handling the conversion between Rust and JavaScript
//! data representations.

use framepress_core::ImageBuffer;
use wasm_bindgen::prelude::*;

/// An RGBA image buffer wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. `pixels()` copies it out to a
/// JavaScript `Uint8Array`; for performance-critical paths keep the buffer
/// in WASM memory and only extract pixels when needed. `free()` releases
/// WASM memory explicitly, though wasm-bindgen's finalizer handles cleanup
/// automatically.
#[wasm_bindgen]
pub struct JsImageBuffer {
    width: u32,
    height: u32,
    pixel_scale: f32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsImageBuffer {
    /// Create a new JsImageBuffer from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixel_scale` - Device pixel scale factor (1.0 = standard)
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixel_scale: f32, pixels: Vec<u8>) -> JsImageBuffer {
        JsImageBuffer {
            width,
            height,
            pixel_scale,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the device pixel scale factor
    #[wasm_bindgen(getter)]
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as a Uint8Array copy in JavaScript memory.
    pub fn pixels(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.pixels[..])
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically. Call this to immediately release a large image.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsImageBuffer {
    /// Create a JsImageBuffer from a core ImageBuffer.
    pub(crate) fn from_buffer(buf: ImageBuffer) -> Self {
        Self {
            width: buf.width,
            height: buf.height,
            pixel_scale: buf.pixel_scale,
            pixels: buf.pixels,
        }
    }

    /// Convert back to a core ImageBuffer. Clones the pixel data.
    pub(crate) fn to_buffer(&self) -> ImageBuffer {
        ImageBuffer::with_scale(self.width, self.height, self.pixel_scale, self.pixels.clone())
    }
}
