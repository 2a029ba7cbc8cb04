//! Scene configuration: camera framing and display output for one session.
//!
//! # Invariants
//! - Configuration is plain data. It is built (or deserialized) once,
//!   validated, handed to a session, and never mutated afterwards.
//! - `validate` runs before any renderer call; invalid values never reach
//!   the rendering interface.
//! - The camera stores a look-at point, not a direction. The viewing
//!   direction is always derived as `target - position`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::options::RenderOptionProfile;

/// Errors raised while validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("resolution must be positive, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },
    #[error("shading rate must be positive, got {0}")]
    NonPositiveShadingRate(f32),
    #[error(
        "crop window must satisfy 0 <= min <= max <= 1 per axis, got x [{x_min}, {x_max}] y [{y_min}, {y_max}]"
    )]
    BadCropWindow {
        x_min: f32,
        x_max: f32,
        y_min: f32,
        y_max: f32,
    },
    #[error("clip planes must satisfy 0 < near < far, got near {near} far {far}")]
    BadClipPlanes { near: f32, far: f32 },
    #[error("camera target coincides with its position; viewing direction is undefined")]
    DegenerateDirection,
    #[error("camera zoom must be positive, got {0}")]
    NonPositiveZoom(f32),
}

/// Pixel format of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Three color channels.
    Rgb,
    /// Three color channels plus coverage.
    Rgba,
}

impl PixelFormat {
    /// Number of channels written per pixel.
    pub fn channels(&self) -> u32 {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }

    /// The mode keyword the rendering interface expects.
    pub fn mode(&self) -> &'static str {
        match self {
            PixelFormat::Rgb => "rgb",
            PixelFormat::Rgba => "rgba",
        }
    }
}

/// Where the rendered image is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayKind {
    /// Write the image to a file at the display target path.
    File,
    /// Present the image in a live framebuffer window.
    Framebuffer,
}

impl DisplayKind {
    /// The device keyword the rendering interface expects.
    pub fn keyword(&self) -> &'static str {
        match self {
            DisplayKind::File => "file",
            DisplayKind::Framebuffer => "framebuffer",
        }
    }
}

/// The sub-rectangle of the frame actually rendered, in normalized
/// screen coordinates. The full frame is x [0, 1], y [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl CropWindow {
    /// Crop covering the whole frame.
    pub const FULL_FRAME: CropWindow = CropWindow {
        x_min: 0.0,
        x_max: 1.0,
        y_min: 0.0,
        y_max: 1.0,
    };

    pub fn new(x_min: f32, x_max: f32, y_min: f32, y_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |v: f32| (0.0..=1.0).contains(&v);
        let ordered = self.x_min <= self.x_max && self.y_min <= self.y_max;
        if !ordered
            || !in_range(self.x_min)
            || !in_range(self.x_max)
            || !in_range(self.y_min)
            || !in_range(self.y_max)
        {
            return Err(ConfigError::BadCropWindow {
                x_min: self.x_min,
                x_max: self.x_max,
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }
}

impl Default for CropWindow {
    fn default() -> Self {
        Self::FULL_FRAME
    }
}

/// Near and far clip planes, as distances along the viewing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlanes {
    pub near: f32,
    pub far: f32,
}

impl ClipPlanes {
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }
}

/// Projection from camera space onto the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective projection. `None` leaves the field of view to the
    /// renderer; sessions normally fill it from the camera framing.
    Perspective { field_of_view_degrees: Option<f32> },
    /// Orthographic projection.
    Orthographic,
}

impl Projection {
    /// The projection name the rendering interface expects.
    pub fn name(&self) -> &'static str {
        match self {
            Projection::Perspective { .. } => "perspective",
            Projection::Orthographic => "orthographic",
        }
    }
}

/// Camera placement and framing for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point in world space the camera looks at.
    pub target: Vec3,
    /// Rotation about the viewing direction, in degrees.
    pub roll_degrees: f32,
    /// Zoom factor scaling the focal length. At 1.0 the focal length
    /// equals the frame width in pixels.
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::new(0.0, 0.0, -1.0),
            roll_degrees: 0.0,
            zoom: 1.0,
        }
    }
}

impl CameraConfig {
    /// Viewing direction: the delta from the position to the look-at point.
    pub fn direction(&self) -> Vec3 {
        self.target - self.position
    }

    /// Check the invariants camera placement relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.direction() == Vec3::ZERO {
            return Err(ConfigError::DegenerateDirection);
        }
        if self.zoom <= 0.0 {
            return Err(ConfigError::NonPositiveZoom(self.zoom));
        }
        Ok(())
    }
}

/// Output image characteristics for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Output target: a file path for [`DisplayKind::File`], a window
    /// title for [`DisplayKind::Framebuffer`].
    pub target: String,
    /// Where the rendered image is sent.
    pub kind: DisplayKind,
    /// Pixel format of the output image.
    pub format: PixelFormat,
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Pixel aspect ratio; `None` leaves it to the renderer.
    pub pixel_aspect_ratio: Option<f32>,
    /// Sub-rectangle of the frame actually rendered.
    pub crop_window: CropWindow,
    /// Shading sample spacing in pixel area; smaller is finer and slower.
    pub shading_rate: f32,
    /// Near/far clip planes; `None` leaves clipping to the renderer.
    pub clipping: Option<ClipPlanes>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            target: "main.tiff".to_string(),
            kind: DisplayKind::File,
            format: PixelFormat::Rgb,
            width: 512,
            height: 384,
            pixel_aspect_ratio: None,
            crop_window: CropWindow::FULL_FRAME,
            shading_rate: 1.0,
            clipping: None,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.shading_rate <= 0.0 {
            return Err(ConfigError::NonPositiveShadingRate(self.shading_rate));
        }
        self.crop_window.validate()?;
        if let Some(clip) = self.clipping {
            if clip.near <= 0.0 || clip.near >= clip.far {
                return Err(ConfigError::BadClipPlanes {
                    near: clip.near,
                    far: clip.far,
                });
            }
        }
        Ok(())
    }
}

/// Everything one rendering session consumes.
///
/// This replaces a pile of compile-time constants in older scene setup
/// code: build (or deserialize) one value per frame, hand it to the
/// session, and drop it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub display: DisplayConfig,
    /// Renderer tuning applied before the world phase; an empty profile
    /// applies nothing.
    pub options: RenderOptionProfile,
}

impl SceneConfig {
    /// Validate every invariant a session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.display.validate()
    }
}
