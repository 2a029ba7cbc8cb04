//! Common: shared configuration types for the stagehand pipeline.
//!
//! # Invariants
//! - Everything here is plain data with serde support; no I/O, no
//!   renderer calls.
//! - Validation lives next to the types and runs before a session
//!   touches the rendering interface.

pub mod config;
pub mod options;

pub use config::{
    CameraConfig, ClipPlanes, ConfigError, CropWindow, DisplayConfig, DisplayKind, PixelFormat,
    Projection, SceneConfig,
};
pub use options::{OptionValue, RenderOptionProfile};

pub fn crate_info() -> &'static str {
    "stagehand-common v0.1.0"
}
