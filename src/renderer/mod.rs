//! WebGPU rendering module
//!
//! The battle is drawn as plain colored triangles. `scene` builds them on
//! the CPU in arena pixels; `pipeline` maps them to the surface.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{SQUAD_GRAB_RADIUS, SQUAD_MARKER_SIZE, Viewport, battle_scene, build_frame};
pub use vertex::Vertex;
