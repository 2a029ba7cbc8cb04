//! Render: backend-agnostic rendering interface with a RIB stream backend.
//!
//! # Invariants
//! - Backends never reorder calls; what arrives is what goes out.
//! - The [`Renderer`] trait is the only seam sessions depend on; a live
//!   renderer binding can replace the RIB backend without touching
//!   session code.

mod placement;
mod recording;
mod renderer;
mod rib;

pub use placement::{TransformStep, placement_steps};
pub use recording::{RecordingRenderer, RendererCall};
pub use renderer::{CameraPlacement, RenderError, Renderer};
pub use rib::RibRenderer;

pub fn crate_info() -> &'static str {
    "stagehand-render v0.1.0"
}
