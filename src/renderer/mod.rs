//! Rendering module
//!
//! The simulation never draws; the host hands `scene::render` a `Surface`
//! once per frame after ticking.

pub mod batch;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod surface;
pub mod vertex;

pub use batch::VertexBatch;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{Render, render};
pub use surface::{Color, Surface};
