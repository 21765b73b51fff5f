use crate::geometry::{DiffHitInfo, DiffRay, HitInfo, Ray, SideMask};
use crate::scene::scene::Scene;
use crate::scene::transform::Transformation;

use super::super::geometry::bounding_box::BoundingBox;

/// A node in the scene's transform hierarchy. Children are owned
/// outright (deleted along with the parent); the object and material
/// references are weak — plain indices into `Scene::shapes` /
/// `Scene::materials` — so the tree can never form a reference cycle.
pub struct Node {
    pub name: String,
    pub transform: Transformation,
    pub object: Option<usize>,
    pub material: Option<usize>,
    pub children: Vec<Node>,
    pub child_bounding_box: BoundingBox,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Node {
        Node {
            name: name.into(),
            transform: Transformation::identity(),
            object: None,
            material: None,
            children: Vec::new(),
            child_bounding_box: BoundingBox::empty(),
        }
    }

    pub fn with_object(mut self, object: usize, material: usize) -> Node {
        self.object = Some(object);
        self.material = Some(material);
        self
    }

    pub fn with_transform(mut self, transform: Transformation) -> Node {
        self.transform = transform;
        self
    }

    pub fn add_child(mut self, child: Node) -> Node {
        self.children.push(child);
        self
    }

    /// Recomputes `child_bounding_box` bottom-up: each child's own
    /// object box (if any) is unioned with its already-computed child
    /// bounding box, transformed through all 8 corners into this node's
    /// local space, and unioned in. Mirrors
    /// `original_source/src/core/node.cpp::ComputeChildBoundBox`.
    pub fn compute_child_bounding_box(&mut self, scene: &Scene) -> BoundingBox {
        let mut accum = BoundingBox::empty();
        for child in &mut self.children {
            let mut child_box = child.compute_child_bounding_box(scene);
            if let Some(object) = child.object {
                child_box = child_box.union_box(scene.shapes[object].bounding_box());
            }
            if !child_box.is_empty() {
                for i in 0..8 {
                    let corner = child.transform.transform_from(child_box.corner(i));
                    accum = accum.union_point(corner);
                }
            }
        }
        self.child_bounding_box = accum;
        accum
    }

    fn to_node_ray(&self, ray: &Ray) -> Ray {
        let p = self.transform.transform_to(ray.origin);
        let dir = self.transform.transform_to(ray.origin + ray.direction) - p;
        Ray::with_depth(p, dir, ray.depth)
    }

    fn to_node_diff_ray(&self, ray: &DiffRay) -> DiffRay {
        DiffRay::new(self.to_node_ray(&ray.c), self.to_node_ray(&ray.x), self.to_node_ray(&ray.y))
    }

    fn from_node_hit<'s>(&'s self, hit: &mut HitInfo<'s>) {
        hit.p = self.transform.transform_from(hit.p);
        hit.n = self.transform.vector_transform_from(hit.n).normalize();
    }

    /// Normal trace: recurse into children in node-local coordinates,
    /// intersect this node's own object if any, then — on the way back
    /// up, exactly once per visited node — transform the hit back into
    /// the parent's coordinate frame. Mirrors
    /// `original_source/src/scene.cpp::TraceNodeNormal`.
    pub fn trace_normal<'s>(
        &'s self,
        scene: &'s Scene,
        ray: &DiffRay,
        hit: &mut DiffHitInfo<'s>,
        mask: SideMask,
    ) -> bool {
        let node_ray = self.to_node_diff_ray(ray);
        let mut has_hit = false;

        if let Some(object) = self.object {
            if scene.shapes[object].intersect_differential(&node_ray, hit, mask) {
                hit.c.node = Some(self);
                hit.c.material_index = hit.c.material_index.or(self.material);
                has_hit = true;
            }
        }

        for child in &self.children {
            if child.trace_normal(scene, &node_ray, hit, mask) {
                has_hit = true;
            }
        }

        if has_hit {
            self.from_node_hit(&mut hit.c);
            if let Some(x) = hit.x.as_mut() {
                self.from_node_hit(x);
            }
            if let Some(y) = hit.y.as_mut() {
                self.from_node_hit(y);
            }
        }
        has_hit
    }

    /// Shadow trace: identical structure, but short-circuits on the
    /// first intersection found anywhere in the subtree, regardless of
    /// distance ordering.
    pub fn trace_shadow(&self, scene: &Scene, ray: &Ray, mask: SideMask, max_distance: f64) -> bool {
        let node_ray = self.to_node_ray(ray);

        if let Some(object) = self.object {
            let mut hit = HitInfo::with_max_distance(max_distance);
            if scene.shapes[object].intersect(&node_ray, &mut hit, mask) {
                return true;
            }
        }

        self.children.iter().any(|child| child.trace_shadow(scene, &node_ray, mask, max_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Direction, Point};
    use crate::scene::scene::Scene;
    use crate::shapes::sphere::Sphere;
    use crate::shapes::Shape;
    use crate::scene::camera::Camera;
    use crate::material::Material;

    fn unit_sphere_scene() -> Scene {
        let mut scene = Scene::new(Camera::look_at(
            Point::new(0.0, 0.0, 5.0),
            Point::zero(),
            Direction::new(0.0, 1.0, 0.0),
            40.0,
            5.0,
            0.0,
            64,
            64,
        ));
        let shape = scene.add_shape(Shape::Sphere(Sphere::new()));
        let material = scene.add_material(Material::diffuse(Color::white()));
        scene.root = Node::new("root").add_child(Node::new("sphere").with_object(shape, material));
        scene
    }

    #[test]
    fn trace_normal_hits_sphere_through_root() {
        let scene = unit_sphere_scene();
        let ray = DiffRay::degenerate(Ray::new(Point::new(0.0, 0.0, 5.0), Direction::new(0.0, 0.0, -1.0)));
        let mut hit = DiffHitInfo::new();
        assert!(scene.root.trace_normal(&scene, &ray, &mut hit, SideMask::Both));
        assert!((hit.c.z - 4.0).abs() < 1e-6);
        assert!(hit.c.node.is_some());
    }

    #[test]
    fn trace_shadow_short_circuits() {
        let scene = unit_sphere_scene();
        let ray = Ray::new(Point::new(0.0, 0.0, 5.0), Direction::new(0.0, 0.0, -1.0));
        assert!(scene.root.trace_shadow(&scene, &ray, SideMask::Both, f64::INFINITY));
    }

    #[test]
    fn trace_normal_misses_outside_sphere() {
        let scene = unit_sphere_scene();
        let ray = DiffRay::degenerate(Ray::new(Point::new(10.0, 0.0, 5.0), Direction::new(0.0, 0.0, -1.0)));
        let mut hit = DiffHitInfo::new();
        assert!(!scene.root.trace_normal(&scene, &ray, &mut hit, SideMask::Both));
    }
}
