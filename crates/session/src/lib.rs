//! Session: fixed-order scene setup over a rendering backend.
//!
//! # Invariants
//! - One session produces one image. Phases move strictly forward and
//!   the world phase runs exactly once.
//! - The first failure wins; everything after it is best-effort teardown.

mod framing;
mod session;

pub use framing::FrameParams;
pub use session::{RenderSession, SessionError, SessionPhase, SessionStep, render_scene};

pub fn crate_info() -> &'static str {
    "stagehand-session v0.1.0"
}
