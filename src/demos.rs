//! Hand-built in-memory scenes, standing in for the out-of-scope scene
//! file parser (`spec.md` §1/§6). Plays the role
//! `doxxx-raytracer/src/scene.rs::setup_scene` plays there, generalized
//! into one named builder per `spec.md` §8 scenario instead of a single
//! hardcoded scene. Used by `main.rs --demo <name>` and by the
//! integration tests.

use crate::lights::Light;
use crate::material::Material;
use crate::math::{Color, Direction, Point};
use crate::scene::{Camera, SceneBuilder, Scene, Transformation};
use crate::shapes::mesh::Face;
use crate::shapes::{Plane, Shape, Sphere, TriMesh};
use crate::math::Vector2f;

/// Scenario A (`spec.md` §8): one unit sphere at the origin, one
/// directional light, diffuse-only material, 64x64.
pub fn scenario_a_single_sphere() -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 0.0, 5.0), Point::zero(), Direction::new(0.0, 1.0, 0.0), 40.0, 5.0, 0.0, 64, 64);
    let mut builder = SceneBuilder::new(camera).with_background(Color::black());
    let material = builder.add_material(Material::diffuse(Color::white()));
    builder.add_node(Shape::Sphere(Sphere::new()), material, Transformation::identity());
    builder.add_light(Light::directional(Color::white(), Direction::new(-1.0, -1.0, -1.0).normalize()));
    builder.build()
}

/// Scenario B (`spec.md` §8): mirror sphere inside a five-plane Cornell
/// box. Marked for manual/visual inspection in the integration suite
/// (checking "a specular reflection of the red wall appears" needs pixel
/// inspection, not a single numeric assertion), but built here so a demo
/// run can still produce it.
pub fn scenario_b_cornell_box_mirror() -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 0.0, 8.0), Point::zero(), Direction::new(0.0, 1.0, 0.0), 50.0, 8.0, 0.0, 256, 256);
    let mut builder = SceneBuilder::new(camera).with_background(Color::black());

    let white = builder.add_material(Material::diffuse(Color::gray(0.75)));
    let red = builder.add_material(Material::diffuse(Color::new(0.75, 0.1, 0.1)));
    let green = builder.add_material(Material::diffuse(Color::new(0.1, 0.75, 0.1)));
    let mirror = builder.add_material(Material::mirror(Color::white()));

    let wall = |axis: Direction, angle: f64, offset: Direction| Transformation::identity().rotated(axis, angle).translated(offset);

    builder.add_node(Shape::Plane(Plane::new()), white, wall(Direction::new(1.0, 0.0, 0.0), 90.0, Direction::new(0.0, -4.0, 0.0)));
    builder.add_node(Shape::Plane(Plane::new()), white, wall(Direction::new(1.0, 0.0, 0.0), -90.0, Direction::new(0.0, 4.0, 0.0)));
    builder.add_node(Shape::Plane(Plane::new()), white, wall(Direction::new(0.0, 1.0, 0.0), 0.0, Direction::new(0.0, 0.0, -4.0)));
    builder.add_node(Shape::Plane(Plane::new()), red, wall(Direction::new(0.0, 1.0, 0.0), 90.0, Direction::new(-4.0, 0.0, 0.0)));
    builder.add_node(Shape::Plane(Plane::new()), green, wall(Direction::new(0.0, 1.0, 0.0), -90.0, Direction::new(4.0, 0.0, 0.0)));

    builder.add_node(Shape::Sphere(Sphere::new()), mirror, Transformation::identity().scaled(Direction::new(1.5, 1.5, 1.5)));
    builder.add_light(Light::point(Point::new(0.0, 3.5, 2.0), Color::white() * 60.0, 0.1));
    builder.build()
}

/// Scenario C (`spec.md` §8): glass sphere, point light, bounce=8.
/// Manual/visual scenario, built for demo/inspection purposes.
pub fn scenario_c_glass_sphere() -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 0.0, 6.0), Point::zero(), Direction::new(0.0, 1.0, 0.0), 40.0, 6.0, 0.0, 256, 256);
    let mut builder = SceneBuilder::new(camera).with_background(Color::gray(0.05));
    let glass = builder.add_material(Material::glass(1.5, Color::white()));
    builder.add_node(Shape::Sphere(Sphere::new()), glass, Transformation::identity());
    builder.add_light(Light::point(Point::new(3.0, 4.0, 5.0), Color::white() * 80.0, 0.0));
    builder.build()
}

/// Scenario D (`spec.md` §8): a flat triangulated grid standing in for
/// the "10k-triangle mesh" BVH stress scene, with `grid_resolution`
/// controlling face count (`2 * grid_resolution^2` triangles) so tests
/// can pick a cheaper grid than a true 10k-triangle demo run.
pub fn scenario_d_mesh_grid(grid_resolution: usize) -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 5.0, 0.0), Point::zero(), Direction::new(0.0, 0.0, -1.0), 50.0, 5.0, 0.0, 64, 64);
    let mut builder = SceneBuilder::new(camera).with_background(Color::black());
    let material = builder.add_material(Material::diffuse(Color::white()));

    let n = grid_resolution;
    let half = n as f64 / 2.0;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point::new(i as f64 - half, 0.0, j as f64 - half));
        }
    }
    let normals = vec![Direction::new(0.0, 1.0, 0.0)];
    let texcoords = vec![Vector2f::new(0.0, 0.0)];

    let vertex_index = |i: usize, j: usize| j * (n + 1) + i;
    let mut faces = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let a = vertex_index(i, j);
            let b = vertex_index(i + 1, j);
            let c = vertex_index(i + 1, j + 1);
            let d = vertex_index(i, j + 1);
            faces.push(Face { vertices: [a, b, c], normals: [0, 0, 0], texcoords: [0, 0, 0], material_sub_id: None });
            faces.push(Face { vertices: [a, c, d], normals: [0, 0, 0], texcoords: [0, 0, 0], material_sub_id: None });
        }
    }

    let mesh = TriMesh::new(vertices, normals, texcoords, faces);
    builder.add_node(Shape::TriMesh(mesh), material, Transformation::identity());
    builder.add_light(Light::directional(Color::white(), Direction::new(0.0, -1.0, 0.0)));
    builder.build()
}

/// Scenario E (`spec.md` §8): one point light above a Lambertian floor,
/// sized for a photon-map irradiance-estimate query at the floor center.
/// The plane's local `z=0` face is rotated to horizontal (`-90°` about
/// `x` turns its `+z` normal into world `+y`) and scaled up to an 8x8
/// patch — a plane left at `Transformation::identity()` here would sit
/// in the same `z=0` world plane as the light itself (both have `z=0`),
/// which makes every emitted photon's `t = -origin.z/direction.z`
/// degenerate to `0` and rejected by the bias check, so no photon could
/// ever reach it.
pub fn scenario_e_photon_floor() -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 3.0, 6.0), Point::zero(), Direction::new(0.0, 1.0, 0.0), 45.0, 6.0, 0.0, 128, 128);
    let mut builder = SceneBuilder::new(camera).with_background(Color::black());
    let floor = builder.add_material(Material::diffuse(Color::gray(0.8)));
    builder.add_node(
        Shape::Plane(Plane::new()),
        floor,
        Transformation::identity().scaled(Direction::new(8.0, 8.0, 8.0)).rotated(Direction::new(1.0, 0.0, 0.0), -90.0),
    );
    builder.add_light(Light::point(Point::new(0.0, 5.0, 0.0), Color::white() * 400.0, 0.0));
    builder.build()
}

/// Scenario F (`spec.md` §8): checkerboard plane at grazing angle, for
/// exercising the adaptive supersampler's per-pixel sample-count spread.
/// Manual/visual scenario (asserting "the aliased region records
/// sppMax" needs per-pixel sample-count inspection), built for demo
/// purposes.
pub fn scenario_f_grazing_checkerboard() -> Scene {
    let camera = Camera::look_at(Point::new(0.0, 1.0, 8.0), Point::new(0.0, 0.0, -20.0), Direction::new(0.0, 1.0, 0.0), 60.0, 8.0, 0.0, 128, 128);
    let mut builder = SceneBuilder::new(camera).with_background(Color::gray(0.2));
    let white = builder.add_material(Material::diffuse(Color::white()));
    builder.add_node(Shape::Plane(Plane::new()), white, Transformation::identity());
    builder.add_light(Light::directional(Color::white(), Direction::new(0.0, -1.0, -0.2).normalize()));
    builder.build()
}

/// Resolves a demo name from the CLI (`main.rs --demo <name>`) to its
/// builder, or `None` for an unrecognized name.
pub fn by_name(name: &str) -> Option<Scene> {
    match name {
        "a" | "sphere" => Some(scenario_a_single_sphere()),
        "b" | "cornell" => Some(scenario_b_cornell_box_mirror()),
        "c" | "glass" => Some(scenario_c_glass_sphere()),
        "d" | "mesh" => Some(scenario_d_mesh_grid(70)),
        "e" | "photon-floor" => Some(scenario_e_photon_floor()),
        "f" | "checkerboard" => Some(scenario_f_grazing_checkerboard()),
        _ => None,
    }
}
