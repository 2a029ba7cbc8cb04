//! Camera framing: focal length and field of view from display geometry.
//!
//! # Invariants
//! - Focal length is measured in pixels: at zoom 1.0 it equals the
//!   horizontal resolution, so the field of view is independent of the
//!   physical output size.
//! - Field of view is horizontal, derived from the frame width.

use stagehand_common::DisplayConfig;

/// Focal length and frame geometry for one camera setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Focal length in pixels.
    pub focal_length: f32,
    /// Frame width in pixels.
    pub frame_width: f32,
    /// Frame height in pixels.
    pub frame_height: f32,
}

impl FrameParams {
    /// Frame a camera against a display: the focal length is the
    /// horizontal resolution scaled by the zoom factor.
    pub fn frame(display: &DisplayConfig, zoom: f32) -> Self {
        Self {
            focal_length: display.width as f32 * zoom,
            frame_width: display.width as f32,
            frame_height: display.height as f32,
        }
    }

    /// Horizontal field of view, in degrees.
    pub fn field_of_view_degrees(&self) -> f32 {
        (2.0 * ((self.frame_width / 2.0) / self.focal_length).atan()).to_degrees()
    }
}
