use std::collections::BTreeMap;

use glam::Vec3;
use stagehand_common::{CameraConfig, CropWindow, DisplayKind, OptionValue, PixelFormat, Projection};

/// Errors a rendering backend can raise.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("IO error writing scene stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("renderer rejected {call}: {reason}")]
    Rejected { call: &'static str, reason: String },
}

/// Camera pose handed to [`Renderer::place_camera`]: position, viewing
/// direction, and roll about that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPlacement {
    pub position: Vec3,
    /// Viewing direction. Orientation is all that matters; the length is
    /// ignored.
    pub direction: Vec3,
    pub roll_degrees: f32,
}

impl CameraPlacement {
    /// The placement a camera configuration describes: its direction is
    /// the delta from the camera position to the look-at point.
    pub fn from_camera(camera: &CameraConfig) -> Self {
        Self {
            position: camera.position,
            direction: camera.direction(),
            roll_degrees: camera.roll_degrees,
        }
    }
}

/// Backend-agnostic rendering interface. All backends implement this trait.
///
/// Calls arrive in session order: `begin_session` first, frame setup next,
/// then one `begin_world`/`end_world` pair around geometry, finally
/// `end_session`. A backend may reject any call; the session layer stops
/// at the first error.
pub trait Renderer {
    /// Open the rendering interface. Always the first call.
    fn begin_session(&mut self) -> Result<(), RenderError>;

    /// Close the rendering interface. No calls may follow.
    fn end_session(&mut self) -> Result<(), RenderError>;

    /// Name the output target and its pixel format.
    fn set_display(
        &mut self,
        target: &str,
        kind: DisplayKind,
        format: PixelFormat,
    ) -> Result<(), RenderError>;

    /// Set the output resolution. A `None` pixel aspect leaves the ratio
    /// to the renderer.
    fn set_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_aspect: Option<f32>,
    ) -> Result<(), RenderError>;

    /// Restrict rendering to a sub-rectangle of the frame.
    fn set_crop_window(&mut self, crop: &CropWindow) -> Result<(), RenderError>;

    /// Set the shading sample spacing.
    fn set_shading_rate(&mut self, rate: f32) -> Result<(), RenderError>;

    /// Select the projection onto the image plane.
    fn set_projection(&mut self, projection: &Projection) -> Result<(), RenderError>;

    /// Set near and far clip planes.
    fn set_clipping(&mut self, near: f32, far: f32) -> Result<(), RenderError>;

    /// Apply one category of renderer tuning options.
    fn set_option(
        &mut self,
        category: &str,
        params: &BTreeMap<String, OptionValue>,
    ) -> Result<(), RenderError>;

    /// Enter the world phase; geometry follows.
    fn begin_world(&mut self) -> Result<(), RenderError>;

    /// Leave the world phase and render the frame.
    fn end_world(&mut self) -> Result<(), RenderError>;

    /// Install the world-to-camera transform for this placement.
    fn place_camera(&mut self, placement: &CameraPlacement) -> Result<(), RenderError>;
}
