//! RIB stream backend: writes interface calls as RIB text.
//!
//! # Invariants
//! - One statement per line, in exactly the order calls arrive; the
//!   stream is a faithful transcript of the session.
//! - Numbers print in their shortest form (`1`, not `1.0`) and negative
//!   zero prints as `0`, so streams diff cleanly across runs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use stagehand_common::{CropWindow, DisplayKind, OptionValue, PixelFormat, Projection};

use crate::placement::{TransformStep, placement_steps};
use crate::renderer::{CameraPlacement, RenderError, Renderer};

/// Rendering backend that serializes every call into a RIB scene stream.
///
/// Geometry helpers (`sphere`, `translate`, ...) are inherent methods:
/// world-description callbacks that know they are talking to a RIB sink
/// can emit geometry between `begin_world` and `end_world`.
#[derive(Debug)]
pub struct RibRenderer<W: Write> {
    sink: W,
}

impl RibRenderer<BufWriter<File>> {
    /// Open a RIB stream writing to a new file at `path`.
    pub fn create(path: &Path) -> Result<Self, RenderError> {
        tracing::debug!(path = %path.display(), "creating rib output file");
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RibRenderer<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consume the renderer and hand back its sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Emit a quadric sphere: `radius`, z extent, sweep in degrees.
    pub fn sphere(
        &mut self,
        radius: f32,
        z_min: f32,
        z_max: f32,
        sweep_degrees: f32,
    ) -> Result<(), RenderError> {
        writeln!(
            self.sink,
            "Sphere {} {} {} {}",
            num(radius),
            num(z_min),
            num(z_max),
            num(sweep_degrees)
        )?;
        Ok(())
    }

    /// Emit a translation of the current transform.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> Result<(), RenderError> {
        writeln!(self.sink, "Translate {} {} {}", num(x), num(y), num(z))?;
        Ok(())
    }

    /// Push the current transform.
    pub fn transform_begin(&mut self) -> Result<(), RenderError> {
        writeln!(self.sink, "TransformBegin")?;
        Ok(())
    }

    /// Pop back to the transform saved by the matching `transform_begin`.
    pub fn transform_end(&mut self) -> Result<(), RenderError> {
        writeln!(self.sink, "TransformEnd")?;
        Ok(())
    }

    /// Set the current surface color.
    pub fn color(&mut self, r: f32, g: f32, b: f32) -> Result<(), RenderError> {
        writeln!(self.sink, "Color [{} {} {}]", num(r), num(g), num(b))?;
        Ok(())
    }
}

impl<W: Write> Renderer for RibRenderer<W> {
    fn begin_session(&mut self) -> Result<(), RenderError> {
        writeln!(self.sink, "##RenderMan RIB-Structure 1.0")?;
        writeln!(self.sink, "version 3.03")?;
        Ok(())
    }

    fn end_session(&mut self) -> Result<(), RenderError> {
        self.sink.flush()?;
        Ok(())
    }

    fn set_display(
        &mut self,
        target: &str,
        kind: DisplayKind,
        format: PixelFormat,
    ) -> Result<(), RenderError> {
        writeln!(
            self.sink,
            "Display \"{target}\" \"{}\" \"{}\"",
            kind.keyword(),
            format.mode()
        )?;
        Ok(())
    }

    fn set_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_aspect: Option<f32>,
    ) -> Result<(), RenderError> {
        // -1 asks the renderer to choose the pixel aspect ratio itself.
        let aspect = pixel_aspect.unwrap_or(-1.0);
        writeln!(self.sink, "Format {width} {height} {}", num(aspect))?;
        Ok(())
    }

    fn set_crop_window(&mut self, crop: &CropWindow) -> Result<(), RenderError> {
        writeln!(
            self.sink,
            "CropWindow {} {} {} {}",
            num(crop.x_min),
            num(crop.x_max),
            num(crop.y_min),
            num(crop.y_max)
        )?;
        Ok(())
    }

    fn set_shading_rate(&mut self, rate: f32) -> Result<(), RenderError> {
        writeln!(self.sink, "ShadingRate {}", num(rate))?;
        Ok(())
    }

    fn set_projection(&mut self, projection: &Projection) -> Result<(), RenderError> {
        match projection {
            Projection::Perspective {
                field_of_view_degrees: Some(fov),
            } => writeln!(
                self.sink,
                "Projection \"{}\" \"fov\" [{}]",
                projection.name(),
                num(*fov)
            )?,
            _ => writeln!(self.sink, "Projection \"{}\"", projection.name())?,
        }
        Ok(())
    }

    fn set_clipping(&mut self, near: f32, far: f32) -> Result<(), RenderError> {
        writeln!(self.sink, "Clipping {} {}", num(near), num(far))?;
        Ok(())
    }

    fn set_option(
        &mut self,
        category: &str,
        params: &BTreeMap<String, OptionValue>,
    ) -> Result<(), RenderError> {
        write!(self.sink, "Option \"{category}\"")?;
        for (name, value) in params {
            match value {
                OptionValue::Int(v) => write!(self.sink, " \"integer {name}\" [{v}]")?,
                OptionValue::IntPair(a, b) => {
                    write!(self.sink, " \"integer[2] {name}\" [{a} {b}]")?
                }
                OptionValue::Float(v) => write!(self.sink, " \"float {name}\" [{}]", num(*v))?,
                OptionValue::Str(v) => write!(self.sink, " \"string {name}\" [\"{v}\"]")?,
            }
        }
        writeln!(self.sink)?;
        Ok(())
    }

    fn begin_world(&mut self) -> Result<(), RenderError> {
        writeln!(self.sink, "WorldBegin")?;
        Ok(())
    }

    fn end_world(&mut self) -> Result<(), RenderError> {
        writeln!(self.sink, "WorldEnd")?;
        Ok(())
    }

    fn place_camera(&mut self, placement: &CameraPlacement) -> Result<(), RenderError> {
        for step in placement_steps(placement) {
            match step {
                TransformStep::Identity => writeln!(self.sink, "Identity")?,
                TransformStep::Rotate {
                    angle_degrees,
                    x,
                    y,
                    z,
                } => writeln!(
                    self.sink,
                    "Rotate {} {} {} {}",
                    num(angle_degrees),
                    num(x),
                    num(y),
                    num(z)
                )?,
                TransformStep::Translate { x, y, z } => {
                    writeln!(self.sink, "Translate {} {} {}", num(x), num(y), num(z))?
                }
            }
        }
        Ok(())
    }
}

/// Shortest RIB spelling of a float: integral values drop the fraction,
/// negative zero normalizes to `0`.
fn num(value: f32) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
