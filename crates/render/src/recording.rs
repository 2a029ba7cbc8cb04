//! Recording backend for tests and call tracing.
//!
//! # Invariants
//! - Every call is recorded before an injected failure fires, so the
//!   trace always shows what was attempted.
//! - Payloads are stored verbatim; assertions can match exact values.

use std::collections::BTreeMap;

use stagehand_common::{CropWindow, DisplayKind, OptionValue, PixelFormat, Projection};

use crate::renderer::{CameraPlacement, RenderError, Renderer};

/// One recorded interface call with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    BeginSession,
    EndSession,
    SetDisplay {
        target: String,
        kind: DisplayKind,
        format: PixelFormat,
    },
    SetFormat {
        width: u32,
        height: u32,
        pixel_aspect: Option<f32>,
    },
    SetCropWindow(CropWindow),
    SetShadingRate(f32),
    SetProjection(Projection),
    SetClipping {
        near: f32,
        far: f32,
    },
    SetOption {
        category: String,
        params: BTreeMap<String, OptionValue>,
    },
    BeginWorld,
    EndWorld,
    PlaceCamera(CameraPlacement),
}

impl RendererCall {
    /// The interface method this call records.
    pub fn name(&self) -> &'static str {
        match self {
            RendererCall::BeginSession => "begin_session",
            RendererCall::EndSession => "end_session",
            RendererCall::SetDisplay { .. } => "set_display",
            RendererCall::SetFormat { .. } => "set_format",
            RendererCall::SetCropWindow(_) => "set_crop_window",
            RendererCall::SetShadingRate(_) => "set_shading_rate",
            RendererCall::SetProjection(_) => "set_projection",
            RendererCall::SetClipping { .. } => "set_clipping",
            RendererCall::SetOption { .. } => "set_option",
            RendererCall::BeginWorld => "begin_world",
            RendererCall::EndWorld => "end_world",
            RendererCall::PlaceCamera(_) => "place_camera",
        }
    }
}

/// Backend that records calls instead of rendering.
///
/// Used by tests to assert on call order and payloads, and by the CLI to
/// trace what a scene would send to a real renderer. `fail_on` turns it
/// into a fault injector: the named call is recorded, then rejected.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RendererCall>,
    fail_on: Option<&'static str>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer that rejects the named call after recording it.
    pub fn fail_on(call: &'static str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(call),
        }
    }

    /// Calls recorded so far, in arrival order.
    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    /// Just the call names, for order assertions.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.iter().map(RendererCall::name).collect()
    }

    fn record(&mut self, call: RendererCall) -> Result<(), RenderError> {
        let name = call.name();
        self.calls.push(call);
        if self.fail_on == Some(name) {
            return Err(RenderError::Rejected {
                call: name,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn begin_session(&mut self) -> Result<(), RenderError> {
        self.record(RendererCall::BeginSession)
    }

    fn end_session(&mut self) -> Result<(), RenderError> {
        self.record(RendererCall::EndSession)
    }

    fn set_display(
        &mut self,
        target: &str,
        kind: DisplayKind,
        format: PixelFormat,
    ) -> Result<(), RenderError> {
        self.record(RendererCall::SetDisplay {
            target: target.to_string(),
            kind,
            format,
        })
    }

    fn set_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_aspect: Option<f32>,
    ) -> Result<(), RenderError> {
        self.record(RendererCall::SetFormat {
            width,
            height,
            pixel_aspect,
        })
    }

    fn set_crop_window(&mut self, crop: &CropWindow) -> Result<(), RenderError> {
        self.record(RendererCall::SetCropWindow(*crop))
    }

    fn set_shading_rate(&mut self, rate: f32) -> Result<(), RenderError> {
        self.record(RendererCall::SetShadingRate(rate))
    }

    fn set_projection(&mut self, projection: &Projection) -> Result<(), RenderError> {
        self.record(RendererCall::SetProjection(*projection))
    }

    fn set_clipping(&mut self, near: f32, far: f32) -> Result<(), RenderError> {
        self.record(RendererCall::SetClipping { near, far })
    }

    fn set_option(
        &mut self,
        category: &str,
        params: &BTreeMap<String, OptionValue>,
    ) -> Result<(), RenderError> {
        self.record(RendererCall::SetOption {
            category: category.to_string(),
            params: params.clone(),
        })
    }

    fn begin_world(&mut self) -> Result<(), RenderError> {
        self.record(RendererCall::BeginWorld)
    }

    fn end_world(&mut self) -> Result<(), RenderError> {
        self.record(RendererCall::EndWorld)
    }

    fn place_camera(&mut self, placement: &CameraPlacement) -> Result<(), RenderError> {
        self.record(RendererCall::PlaceCamera(*placement))
    }
}
