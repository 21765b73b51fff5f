//! `photonray`: an offline physically-based ray tracer combining path
//! tracing with multiple importance sampling against a two-pass photon
//! map for global illumination and caustics (`spec.md` §1).
//!
//! Exposed as a library, with `main.rs` as a thin CLI binary over it
//! (`SPEC_FULL.md` §4.O: "library code never calls `env_logger::init`
//! itself — only `main.rs` does, so the crate remains embeddable"),
//! mirroring how `doxxx-raytracer` keeps all process-level setup inside
//! its own `main.rs`.

pub mod demos;
pub mod error;
pub mod geometry;
pub mod lights;
pub mod material;
pub mod math;
pub mod output;
pub mod photon;
pub mod render;
pub mod sampler;
pub mod scene;
pub mod shapes;
pub mod texture;
