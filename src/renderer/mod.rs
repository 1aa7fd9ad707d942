//! Rendering module
//!
//! `scene` builds a vertex list from the simulation (headless, testable);
//! `pipeline` presents it through WebGPU.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{Frame, build_frame};
pub use vertex::Vertex;
