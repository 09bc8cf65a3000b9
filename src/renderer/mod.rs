//! The software rendering pipeline.
//!
//! One [`Renderer::render`] call composes a full frame into a caller-owned
//! `&mut [Rgba]`: skybox or ceiling first, then the floor, then per screen
//! column the DDA hit list is composited back-to-front with the projected
//! sprites interleaved by depth.  The host only presents the buffer.

pub mod color;
mod planes;
mod raycast;
#[allow(clippy::module_inception)]
mod renderer;
mod skybox;
mod sprites;

/// 0xAARRGGBB pixel.  The alpha byte is a binary opacity flag on texture
/// input and carries no meaning once written to the frame.
pub type Rgba = u32;

pub use raycast::{Hit, HitList, HitSide, cast_column, probe_door};
pub use renderer::{RenderError, Renderer};
