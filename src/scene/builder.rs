use crate::lights::Light;
use crate::material::Material;
use crate::shapes::Shape;
use crate::texture::Texture;

use super::camera::Camera;
use super::node::Node;
use super::scene::Scene;
use super::transform::Transformation;

/// Programmatic scene construction, standing in for the out-of-scope XML
/// scene parser (`spec.md` §1/§6): builds the same in-memory graph a
/// parser would, for use by `main.rs`'s built-in demo scenes and by
/// tests. Grounded in `doxxx-raytracer/src/scene.rs::setup_scene`'s
/// shape/node accumulation, restructured around the index-based weak
/// references of `spec.md` §3.
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    pub fn new(camera: Camera) -> SceneBuilder {
        SceneBuilder { scene: Scene::new(camera) }
    }

    pub fn with_background(mut self, color: crate::math::Color) -> SceneBuilder {
        self.scene.background = color;
        self
    }

    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.scene.add_texture(texture)
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.scene.add_material(material)
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.scene.add_light(light)
    }

    /// Adds a shape as a direct child of the root node with the given
    /// transform and material, returning the child node's index within
    /// `root.children` (useful for tests that want to mutate it further).
    pub fn add_node(&mut self, shape: Shape, material: usize, transform: Transformation) -> usize {
        let shape_index = self.scene.add_shape(shape);
        let node = Node::new(format!("node{}", self.scene.root.children.len()))
            .with_transform(transform)
            .with_object(shape_index, material);
        self.scene.root.children.push(node);
        self.scene.root.children.len() - 1
    }

    /// Finalizes bounding boxes and returns the built scene.
    pub fn build(mut self) -> Scene {
        self.scene.finalize();
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::{Color, Direction, Point};
    use crate::shapes::sphere::Sphere;

    #[test]
    fn builder_produces_renderable_scene() {
        let camera = Camera::look_at(
            Point::new(0.0, 0.0, 5.0),
            Point::zero(),
            Direction::new(0.0, 1.0, 0.0),
            40.0,
            5.0,
            0.0,
            64,
            64,
        );
        let mut builder = SceneBuilder::new(camera);
        let material = builder.add_material(Material::diffuse(Color::white()));
        builder.add_node(Shape::Sphere(Sphere::new()), material, Transformation::identity());
        let scene = builder.build();
        assert_eq!(scene.shapes.len(), 1);
        assert_eq!(scene.root.children.len(), 1);
    }
}
