pub mod builder;
pub mod camera;
pub mod node;
pub mod scene;
pub mod transform;

pub use builder::SceneBuilder;
pub use camera::Camera;
pub use node::Node;
pub use scene::Scene;
pub use transform::Transformation;
