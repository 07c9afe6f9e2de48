/// shapeview core library
///
/// Tessellation of parametric surfaces and loaded meshes, the touch-driven
/// interaction engine (trackball rotation and the animated surface swap),
/// and the narrow traits a rendering backend implements. Nothing here talks
/// to a graphics API.
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod math;
pub mod mesh;
pub mod obj;
pub mod parametric;
pub mod projection;
pub mod render;
pub mod shapes;
pub mod stl;
pub mod surface;
pub mod transform;
pub mod visual;

// Re-export commonly used types
pub use config::{EngineConfig, Palette, SurfaceSpec};
pub use engine::{ApplicationEngine, Gesture};
pub use error::{Error, Result};
pub use layout::ScreenLayout;
pub use math::{IVec2, Quaternion, Vec2, Vec3, Vec4};
pub use mesh::MeshSurface;
pub use parametric::{Evaluator, ParametricInterval, ParametricSurface};
pub use projection::{Camera, ProjectionMode};
pub use render::{DirectoryResources, RenderingEngine, ResourceManager};
pub use surface::{Surface, VertexFlags};
pub use transform::Transform;
pub use visual::{Animation, Visual};
