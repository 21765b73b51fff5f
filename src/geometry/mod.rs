pub mod bounding_box;
pub mod hit;
pub mod ray;

pub use bounding_box::BoundingBox;
pub use hit::{Candidate, DiffHitInfo, HitInfo};
pub use ray::{DiffRay, Ray, SideMask};
