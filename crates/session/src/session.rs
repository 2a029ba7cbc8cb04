//! Session: the linear scene-setup lifecycle over a rendering backend.
//!
//! # Invariants
//! - Phases move strictly forward: Unopened, Open, WorldDescribing,
//!   Closed. No transition is skipped and none repeats.
//! - Setup calls reach the backend in a fixed order; no step is retried.
//! - The first failure aborts the session; everything after it is
//!   best-effort teardown.

use std::fmt;

use stagehand_common::{ConfigError, Projection, SceneConfig};
use stagehand_render::{CameraPlacement, RenderError, Renderer};
use uuid::Uuid;

use crate::framing::FrameParams;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, no backend call made yet.
    Unopened,
    /// `begin_session` succeeded; scene setup is legal.
    Open,
    /// The world phase has been entered. The session stays here once
    /// `describe_world` returns; the only continuation is `close`.
    WorldDescribing,
    /// Terminal. The backend saw `end_session`.
    Closed,
}

/// The setup or teardown step a backend failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Begin,
    Options,
    Clipping,
    Display,
    Format,
    ShadingRate,
    CropWindow,
    Projection,
    PlaceCamera,
    WorldBegin,
    Geometry,
    WorldEnd,
    End,
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStep::Begin => "session begin",
            SessionStep::Options => "option setup",
            SessionStep::Clipping => "clipping setup",
            SessionStep::Display => "display setup",
            SessionStep::Format => "format setup",
            SessionStep::ShadingRate => "shading-rate setup",
            SessionStep::CropWindow => "crop-window setup",
            SessionStep::Projection => "projection setup",
            SessionStep::PlaceCamera => "camera placement",
            SessionStep::WorldBegin => "world begin",
            SessionStep::Geometry => "geometry emission",
            SessionStep::WorldEnd => "world end",
            SessionStep::End => "session end",
        };
        f.write_str(name)
    }
}

/// The one error class a session surfaces. Everything is fatal; there
/// are no retries and no recoverable variants.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid scene configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("renderer failed during {step}: {source}")]
    Renderer {
        step: SessionStep,
        #[source]
        source: RenderError,
    },
    #[error("{action} requires phase {expected:?}, session is {actual:?}")]
    OutOfPhase {
        action: &'static str,
        expected: SessionPhase,
        actual: SessionPhase,
    },
}

fn at_step<T>(step: SessionStep, result: Result<T, RenderError>) -> Result<T, SessionError> {
    result.map_err(|source| SessionError::Renderer { step, source })
}

/// One scene-setup session holding exclusive access to a backend.
///
/// The stepwise API (`open`, `apply_scene`, `describe_world`, `close`)
/// enforces the lifecycle; [`render_scene`] drives it in one call.
/// Dropping a session that is still open performs a best-effort
/// `end_session` so the backend is never left dangling.
pub struct RenderSession<'a, B: Renderer> {
    backend: &'a mut B,
    phase: SessionPhase,
    id: Uuid,
}

impl<'a, B: Renderer> RenderSession<'a, B> {
    /// A session in the `Unopened` phase. No backend call happens here.
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            phase: SessionPhase::Unopened,
            id: Uuid::new_v4(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    fn expect_phase(
        &self,
        action: &'static str,
        expected: SessionPhase,
    ) -> Result<(), SessionError> {
        if self.phase != expected {
            return Err(SessionError::OutOfPhase {
                action,
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Open the rendering session. Always the first backend call.
    pub fn open(&mut self) -> Result<(), SessionError> {
        self.expect_phase("open", SessionPhase::Unopened)?;
        at_step(SessionStep::Begin, self.backend.begin_session())?;
        self.phase = SessionPhase::Open;
        tracing::info!(session = %self.short_id(), "session opened");
        Ok(())
    }

    /// Apply scene configuration in the fixed setup order: option
    /// profile, clipping if configured, display, format, shading rate,
    /// crop window, projection with the computed field of view, camera
    /// placement.
    pub fn apply_scene(&mut self, scene: &SceneConfig) -> Result<(), SessionError> {
        self.expect_phase("apply_scene", SessionPhase::Open)?;
        scene.validate()?;

        for (category, params) in scene.options.categories() {
            tracing::debug!(session = %self.short_id(), category, "applying option category");
            at_step(
                SessionStep::Options,
                self.backend.set_option(category, params),
            )?;
        }

        let display = &scene.display;
        if let Some(clip) = display.clipping {
            at_step(
                SessionStep::Clipping,
                self.backend.set_clipping(clip.near, clip.far),
            )?;
        }
        at_step(
            SessionStep::Display,
            self.backend
                .set_display(&display.target, display.kind, display.format),
        )?;
        at_step(
            SessionStep::Format,
            self.backend
                .set_format(display.width, display.height, display.pixel_aspect_ratio),
        )?;
        at_step(
            SessionStep::ShadingRate,
            self.backend.set_shading_rate(display.shading_rate),
        )?;
        at_step(
            SessionStep::CropWindow,
            self.backend.set_crop_window(&display.crop_window),
        )?;

        let frame = FrameParams::frame(display, scene.camera.zoom);
        let fov = frame.field_of_view_degrees();
        tracing::debug!(
            session = %self.short_id(),
            focal = frame.focal_length,
            width = frame.frame_width,
            height = frame.frame_height,
            fov,
            "framed camera"
        );
        at_step(
            SessionStep::Projection,
            self.backend.set_projection(&Projection::Perspective {
                field_of_view_degrees: Some(fov),
            }),
        )?;
        at_step(
            SessionStep::PlaceCamera,
            self.backend
                .place_camera(&CameraPlacement::from_camera(&scene.camera)),
        )?;
        Ok(())
    }

    /// Run the world phase: `begin_world`, the geometry callback exactly
    /// once, `end_world`. A failing callback still attempts to leave the
    /// world phase before the error propagates.
    pub fn describe_world<F>(&mut self, emit_geometry: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut B) -> Result<(), RenderError>,
    {
        self.expect_phase("describe_world", SessionPhase::Open)?;
        at_step(SessionStep::WorldBegin, self.backend.begin_world())?;
        self.phase = SessionPhase::WorldDescribing;
        tracing::debug!(session = %self.short_id(), "world phase entered");

        if let Err(source) = emit_geometry(self.backend) {
            let _ = self.backend.end_world();
            return Err(SessionError::Renderer {
                step: SessionStep::Geometry,
                source,
            });
        }

        at_step(SessionStep::WorldEnd, self.backend.end_world())
    }

    /// Close the session. Legal only after the world phase has run.
    pub fn close(mut self) -> Result<(), SessionError> {
        self.expect_phase("close", SessionPhase::WorldDescribing)?;
        // Flip the phase before the backend call so Drop cannot close a
        // second time if end_session fails.
        self.phase = SessionPhase::Closed;
        at_step(SessionStep::End, self.backend.end_session())?;
        tracing::info!(session = %self.short_id(), "session closed");
        Ok(())
    }
}

impl<B: Renderer> Drop for RenderSession<'_, B> {
    fn drop(&mut self) {
        match self.phase {
            SessionPhase::Unopened | SessionPhase::Closed => {}
            SessionPhase::Open | SessionPhase::WorldDescribing => {
                tracing::warn!(
                    session = %self.short_id(),
                    phase = ?self.phase,
                    "session dropped while open, closing backend"
                );
                let _ = self.backend.end_session();
            }
        }
    }
}

/// Run one complete scene session: open, apply the scene in fixed order,
/// describe the world through `emit_geometry`, close.
///
/// The configuration is validated before the backend sees any call. On
/// failure the remaining steps are abandoned and the backend session is
/// closed best-effort.
pub fn render_scene<B, F>(
    backend: &mut B,
    scene: &SceneConfig,
    emit_geometry: F,
) -> Result<(), SessionError>
where
    B: Renderer,
    F: FnOnce(&mut B) -> Result<(), RenderError>,
{
    scene.validate()?;
    let mut session = RenderSession::new(backend);
    session.open()?;
    session.apply_scene(scene)?;
    session.describe_world(emit_geometry)?;
    session.close()
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use stagehand_common::{
        CameraConfig, ClipPlanes, CropWindow, DisplayConfig, OptionValue, PixelFormat,
        RenderOptionProfile,
    };
    use stagehand_render::{RecordingRenderer, RendererCall};

    use super::*;

    fn scene_with_everything() -> SceneConfig {
        SceneConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 1.5, 10.0),
                target: Vec3::new(0.0, 0.0, 0.0),
                roll_degrees: 0.0,
                zoom: 1.0,
            },
            display: DisplayConfig {
                clipping: Some(ClipPlanes::new(0.1, 1000.0)),
                ..DisplayConfig::default()
            },
            options: RenderOptionProfile::small_buckets(),
        }
    }

    #[test]
    fn full_session_calls_in_fixed_order() {
        let mut renderer = RecordingRenderer::new();
        let mut invoked = 0;
        render_scene(&mut renderer, &scene_with_everything(), |_| {
            invoked += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(invoked, 1);
        assert_eq!(
            renderer.call_names(),
            [
                "begin_session",
                "set_option",
                "set_clipping",
                "set_display",
                "set_format",
                "set_shading_rate",
                "set_crop_window",
                "set_projection",
                "place_camera",
                "begin_world",
                "end_world",
                "end_session"
            ]
        );
    }

    #[test]
    fn clipping_is_skipped_when_unset() {
        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &SceneConfig::default(), |_| Ok(())).unwrap();
        assert!(!renderer.call_names().contains(&"set_clipping"));
    }

    #[test]
    fn placement_direction_is_target_minus_position() {
        let scene = SceneConfig {
            camera: CameraConfig {
                position: Vec3::new(1.0, 2.0, 3.0),
                target: Vec3::new(1.0, 2.0, -7.0),
                ..CameraConfig::default()
            },
            ..SceneConfig::default()
        };

        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &scene, |_| Ok(())).unwrap();

        let placement = renderer
            .calls()
            .iter()
            .find_map(|call| match call {
                RendererCall::PlaceCamera(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert_eq!(placement.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(placement.direction, Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn pixel_format_passes_through_with_its_channel_count() {
        let scene = SceneConfig {
            display: DisplayConfig {
                format: PixelFormat::Rgba,
                ..DisplayConfig::default()
            },
            ..SceneConfig::default()
        };

        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &scene, |_| Ok(())).unwrap();

        let format = renderer
            .calls()
            .iter()
            .find_map(|call| match call {
                RendererCall::SetDisplay { format, .. } => Some(*format),
                _ => None,
            })
            .unwrap();
        assert_eq!(format, PixelFormat::Rgba);
        assert_eq!(format.channels(), 4);
    }

    #[test]
    fn crop_window_passes_through_unchanged() {
        let scene = SceneConfig {
            display: DisplayConfig {
                crop_window: CropWindow::new(0.1, 0.9, 0.2, 0.8),
                ..DisplayConfig::default()
            },
            ..SceneConfig::default()
        };

        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &scene, |_| Ok(())).unwrap();

        assert!(renderer.calls().contains(&RendererCall::SetCropWindow(
            CropWindow::new(0.1, 0.9, 0.2, 0.8)
        )));
    }

    #[test]
    fn standard_frame_yields_the_expected_field_of_view() {
        // Camera at origin looking down -z, 512x384 at zoom 1.
        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &SceneConfig::default(), |_| Ok(())).unwrap();

        let fov = renderer
            .calls()
            .iter()
            .find_map(|call| match call {
                RendererCall::SetProjection(Projection::Perspective {
                    field_of_view_degrees: Some(fov),
                }) => Some(*fov),
                _ => None,
            })
            .unwrap();
        assert!((fov - 53.130102).abs() < 1e-3);
    }

    #[test]
    fn option_profile_applies_one_call_per_category() {
        let mut renderer = RecordingRenderer::new();
        let scene = SceneConfig {
            options: RenderOptionProfile::small_buckets(),
            ..SceneConfig::default()
        };
        render_scene(&mut renderer, &scene, |_| Ok(())).unwrap();

        let options: Vec<_> = renderer
            .calls()
            .iter()
            .filter_map(|call| match call {
                RendererCall::SetOption { category, params } => Some((category.clone(), params)),
                _ => None,
            })
            .collect();
        assert_eq!(options.len(), 1);
        let (category, params) = &options[0];
        assert_eq!(category, "limits");
        assert_eq!(params.get("gridsize"), Some(&OptionValue::Int(9)));
        assert_eq!(params.get("bucketsize"), Some(&OptionValue::IntPair(6, 6)));
    }

    #[test]
    fn display_failure_aborts_before_world() {
        let mut renderer = RecordingRenderer::fail_on("set_display");
        let mut invoked = false;
        let err = render_scene(&mut renderer, &SceneConfig::default(), |_| {
            invoked = true;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Renderer {
                step: SessionStep::Display,
                ..
            }
        ));
        assert!(!invoked);
        let names = renderer.call_names();
        assert!(!names.contains(&"begin_world"));
        // Best-effort close still reaches the backend.
        assert_eq!(names.last(), Some(&"end_session"));
    }

    #[test]
    fn geometry_failure_still_leaves_the_world_phase() {
        let mut renderer = RecordingRenderer::new();
        let err = render_scene(&mut renderer, &SceneConfig::default(), |_| {
            Err(RenderError::Rejected {
                call: "sphere",
                reason: "bad geometry".to_string(),
            })
        })
        .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Renderer {
                step: SessionStep::Geometry,
                ..
            }
        ));
        let names = renderer.call_names();
        assert!(names.contains(&"end_world"));
        assert_eq!(names.last(), Some(&"end_session"));
    }

    #[test]
    fn invalid_scene_never_touches_the_backend() {
        let scene = SceneConfig {
            camera: CameraConfig {
                zoom: 0.0,
                ..CameraConfig::default()
            },
            ..SceneConfig::default()
        };

        let mut renderer = RecordingRenderer::new();
        let err = render_scene(&mut renderer, &scene, |_| Ok(())).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert!(renderer.calls().is_empty());
    }

    #[test]
    fn world_phase_runs_exactly_once() {
        let mut renderer = RecordingRenderer::new();
        render_scene(&mut renderer, &SceneConfig::default(), |_| Ok(())).unwrap();
        let names = renderer.call_names();
        assert_eq!(names.iter().filter(|n| **n == "begin_world").count(), 1);
        assert_eq!(names.iter().filter(|n| **n == "end_world").count(), 1);
    }

    #[test]
    fn stepwise_misuse_is_an_error_not_a_panic() {
        let mut renderer = RecordingRenderer::new();
        let mut session = RenderSession::new(&mut renderer);
        assert!(matches!(
            session.apply_scene(&SceneConfig::default()),
            Err(SessionError::OutOfPhase {
                action: "apply_scene",
                ..
            })
        ));

        session.open().unwrap();
        assert!(matches!(
            session.open(),
            Err(SessionError::OutOfPhase { action: "open", .. })
        ));

        session.describe_world(|_| Ok(())).unwrap();
        assert!(matches!(
            session.describe_world(|_| Ok(())),
            Err(SessionError::OutOfPhase {
                action: "describe_world",
                ..
            })
        ));
        session.close().unwrap();
    }

    #[test]
    fn closing_before_the_world_phase_is_rejected() {
        let mut renderer = RecordingRenderer::new();
        let mut session = RenderSession::new(&mut renderer);
        session.open().unwrap();
        assert!(matches!(
            session.close(),
            Err(SessionError::OutOfPhase {
                action: "close",
                ..
            })
        ));
        // The consumed session still closed the backend on drop.
        assert_eq!(renderer.call_names(), ["begin_session", "end_session"]);
    }

    #[test]
    fn dropping_an_open_session_closes_the_backend() {
        let mut renderer = RecordingRenderer::new();
        {
            let mut session = RenderSession::new(&mut renderer);
            session.open().unwrap();
        }
        assert_eq!(renderer.call_names(), ["begin_session", "end_session"]);
    }

    #[test]
    fn dropping_an_unopened_session_is_silent() {
        let mut renderer = RecordingRenderer::new();
        {
            let _session = RenderSession::new(&mut renderer);
        }
        assert!(renderer.calls().is_empty());
    }
}
