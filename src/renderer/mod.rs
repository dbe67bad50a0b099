//! Prime Drop rendering
//!
//! `scene` turns the sim state into a flat list of draw items; `canvas`
//! paints that list with the 2D canvas API in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{DrawItem, Palette, Scene, build_scene};
