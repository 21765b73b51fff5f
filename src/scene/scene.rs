use crate::lights::Light;
use crate::material::Material;
use crate::math::Color;
use crate::shapes::Shape;
use crate::texture::Texture;

use super::camera::Camera;
use super::node::Node;

/// Owns every flat array the scene graph's nodes reference by index
/// (`spec.md` §3/§9: "express [weak references] as indices into those
/// arrays to avoid back-pointer cycles"), plus the root of the transform
/// tree and the camera. Constructed once before rendering begins and
/// treated as read-only for the remainder of the render
/// (`spec.md` §5).
pub struct Scene {
    pub camera: Camera,
    pub shapes: Vec<Shape>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub lights: Vec<Light>,
    pub root: Node,
    pub background: Color,
    non_ambient_lights: usize,
}

impl Scene {
    pub fn new(camera: Camera) -> Scene {
        Scene {
            camera,
            shapes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            lights: Vec::new(),
            root: Node::new("root"),
            background: Color::black(),
            non_ambient_lights: 0,
        }
    }

    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Appends a light, keeping the cached non-ambient count in sync
    /// (`spec.md` §9: direct lighting must divide by the count of
    /// *non-ambient* lights, not every light).
    pub fn add_light(&mut self, light: Light) -> usize {
        if !matches!(light, Light::Ambient(_)) {
            self.non_ambient_lights += 1;
        }
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn non_ambient_light_count(&self) -> usize {
        self.non_ambient_lights
    }

    /// Recomputes every node's bottom-up child bounding box; must be
    /// called once after the scene graph is fully built and before
    /// rendering or photon emission begin.
    pub fn finalize(&mut self) {
        let mut root = std::mem::replace(&mut self.root, Node::new("root"));
        root.compute_child_bounding_box(self);
        self.root = root;
    }

    pub fn photon_sources(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|l| l.is_photon_source())
    }
}
