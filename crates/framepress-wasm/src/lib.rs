//! Framepress WASM - WebAssembly bindings for Framepress
//!
//! This crate exposes the framepress-core editing engine to
//! JavaScript/TypeScript host applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `session` - The edit session bindings (gestures, overlays, commit)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession, JsImageBuffer, JsGesturePhase } from '@framepress/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const source = new JsImageBuffer(width, height, devicePixelRatio, rgbaBytes);
//! const session = new JsEditSession(source, 390, 520, 0.2, 4.0);
//!
//! session.handle_pan(JsGesturePhase.Changed, dx, dy);
//! const flattened = session.commit();
//! ```

use wasm_bindgen::prelude::*;

mod session;
mod types;

// Re-export public types
pub use session::{composite_masked, flatten_single, JsEditSession, JsGesturePhase};
pub use types::JsImageBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}
