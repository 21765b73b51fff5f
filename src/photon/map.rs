use crate::geometry::BoundingBox;
use crate::math::{Color, Direction, Dot, Point};

use super::record::Photon;

/// Irradiance-estimate kernel weighting, per `spec.md` §4.J.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Constant,
    Linear,
    Quadratic,
}

/// A balanced kd-tree of deposited photons (`spec.md` §3/§4.J), built
/// once after emission and queried read-only during shading. Index 0 is
/// unused so the tree can be addressed 1-based with children at `2i`/
/// `2i+1`, matching
/// `original_source/external/cyCodeBase/cyPhotonMap.h`.
pub struct PhotonMap {
    photons: Vec<Photon>,
    /// Last internal-node index (`spec.md` §3 `PhotonMap`). Signed
    /// because a map with 0 or 1 photons has no internal nodes at all,
    /// which the original's `(n-1)/2 - 1` formula represents as a
    /// negative number.
    half_stored_photons: i64,
    balanced: bool,
}

impl PhotonMap {
    pub fn new() -> PhotonMap {
        PhotonMap { photons: vec![Photon::new(Point::zero(), Direction::zero(), Color::black())], half_stored_photons: 0, balanced: false }
    }

    /// `CreateAllPhotons`/`AllocatePhotons`: reserves storage for `n`
    /// photons up front (`spec.md` §3 `PhotonMap` lifecycle step 1).
    pub fn reserve(&mut self, n: usize) {
        self.photons.reserve(n);
    }

    pub fn push(&mut self, photon: Photon) {
        self.photons.push(photon);
    }

    pub fn len(&self) -> usize {
        self.photons.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scale_powers(&mut self, scale: f64) {
        for photon in &mut self.photons[1..] {
            photon.scale_power(scale);
        }
    }

    pub fn photons(&self) -> &[Photon] {
        &self.photons[1..]
    }

    /// `PrepareForIrradianceEstimation`: balances the array into a
    /// left-balanced implicit kd-tree rooted at index 1 (`spec.md`
    /// §3/§4.J). Must be called exactly once, after all photons have
    /// been deposited and before any `estimate_irradiance` call.
    pub fn balance(&mut self) {
        if self.photons.len() <= 1 {
            self.balanced = true;
            return;
        }
        let mut bbox = BoundingBox::empty();
        for photon in &self.photons[1..] {
            bbox = bbox.union_point(photon.position);
        }
        let mut balanced = vec![self.photons[0]; self.photons.len()];
        let mut working = self.photons.clone();
        Self::balance_segment(&mut working, &mut balanced, bbox, 1, 1, self.photons.len() - 1);
        self.photons = balanced;
        self.half_stored_photons = (self.photons.len() as i64 - 1) / 2 - 1;
        self.balanced = true;
    }

    /// Chooses the left-balanced median index for the segment
    /// `[start,end]`, so the resulting tree is an optimally balanced
    /// complete binary tree (`spec.md` §4.J step 1).
    fn median_index(start: usize, end: usize) -> usize {
        let mut median = 1usize;
        let count = end - start + 1;
        while 4 * median <= count {
            median *= 2;
        }
        if 3 * median <= count {
            median *= 2;
            median + start - 1
        } else {
            end - median + 1
        }
    }

    fn balance_segment(
        working: &mut [Photon],
        balanced: &mut [Photon],
        bbox: BoundingBox,
        index: usize,
        start: usize,
        end: usize,
    ) {
        let median = Self::median_index(start, end);
        let axis = bbox.longest_axis();

        Self::partition_around_median(working, axis, start, end, median);

        balanced[index] = working[median];
        balanced[index].set_plane(axis);

        if median > start {
            if start < median - 1 {
                let mut left_box = bbox;
                Self::set_axis_max(&mut left_box, axis, balanced[index].position[axis]);
                Self::balance_segment(working, balanced, left_box, 2 * index, start, median - 1);
            } else {
                balanced[2 * index] = working[start];
            }
        }

        if median < end {
            if median + 1 < end {
                let mut right_box = bbox;
                Self::set_axis_min(&mut right_box, axis, balanced[index].position[axis]);
                Self::balance_segment(working, balanced, right_box, 2 * index + 1, median + 1, end);
            } else {
                balanced[2 * index + 1] = working[end];
            }
        }
    }

    fn set_axis_max(bbox: &mut BoundingBox, axis: usize, v: f64) {
        match axis {
            0 => bbox.pmax.x = v,
            1 => bbox.pmax.y = v,
            _ => bbox.pmax.z = v,
        }
    }

    fn set_axis_min(bbox: &mut BoundingBox, axis: usize, v: f64) {
        match axis {
            0 => bbox.pmin.x = v,
            1 => bbox.pmin.y = v,
            _ => bbox.pmin.z = v,
        }
    }

    /// Quickselect-style in-place partition so every photon in
    /// `[start,median)` has an axis coordinate no larger than the
    /// median's and every photon in `(median,end]` no smaller
    /// (`spec.md` §4.J step 3).
    fn partition_around_median(photons: &mut [Photon], axis: usize, start: usize, end: usize, median: usize) {
        let mut left = start;
        let mut right = end;
        while right > left {
            let v = photons[right].position[axis];
            let mut i = left as isize - 1;
            let mut j = right as isize;
            loop {
                i += 1;
                while photons[i as usize].position[axis] < v {
                    i += 1;
                }
                j -= 1;
                while j > left as isize && photons[j as usize].position[axis] > v {
                    j -= 1;
                }
                if i >= j {
                    break;
                }
                photons.swap(i as usize, j as usize);
            }
            photons.swap(i as usize, right);
            let i = i as usize;
            if i >= median {
                right = i - 1;
            }
            if i <= median {
                left = i + 1;
            }
        }
    }

    /// `EstimateIrradiance<k>`: bounded k-nearest-neighbor query via a
    /// fixed-size max-heap, returning the filtered irradiance estimate
    /// and mean photon direction (`spec.md` §4.J). Returns `Color::black()`
    /// when no photon lies within `radius` of `pos` (`spec.md` §7: "Empty
    /// photon map query ... returns zero irradiance").
    pub fn estimate_irradiance(&self, pos: Point, normal: Direction, k: usize, radius: f64) -> Color {
        if self.photons.len() <= 1 {
            return Color::black();
        }
        debug_assert!(self.balanced, "estimate_irradiance called before balance()");

        let mut heap = NearestHeap::new(k, radius * radius);
        self.locate(1, pos, Some(normal), &mut heap);

        if heap.found == 0 {
            return Color::black();
        }

        let r2 = heap.dist2[0];
        let mut irradiance = Color::black();
        for i in 1..=heap.found {
            let filter = Self::filter_weight(heap.dist2[i], r2, Filter::Quadratic);
            irradiance += heap.photon[i].power() * filter;
        }
        let area = std::f64::consts::PI * 0.5 * r2;
        if area > 0.0 {
            irradiance * (1.0 / area)
        } else {
            Color::black()
        }
    }

    fn filter_weight(dist2: f64, r2: f64, filter: Filter) -> f64 {
        match filter {
            Filter::Constant => 1.0,
            Filter::Linear => 1.0 - (dist2 / r2).sqrt(),
            Filter::Quadratic => 1.0 - dist2 / r2,
        }
    }

    fn locate(&self, index: usize, pos: Point, normal: Option<Direction>, heap: &mut NearestHeap) {
        let photon = &self.photons[index];
        let axis = photon.plane();

        if (index as i64) < self.half_stored_photons {
            let delta = pos[axis] - photon.position[axis];
            let (near, far) = if delta > 0.0 { (2 * index + 1, 2 * index) } else { (2 * index, 2 * index + 1) };
            if near < self.photons.len() {
                self.locate(near, pos, normal, heap);
            }
            if delta * delta < heap.dist2[0] && far < self.photons.len() {
                self.locate(far, pos, normal, heap);
            }
        }

        let diff = photon.position - pos;
        let mut dist2 = diff.length_squared();
        if dist2 >= heap.dist2[0] {
            return;
        }

        if let Some(n) = normal {
            if photon.direction().dot(n) >= 0.0 {
                return;
            }
            if heap.norm_scale > 0.0 {
                let perp = diff.dot(n);
                let adjusted = diff + n * (perp * heap.norm_scale);
                dist2 = adjusted.length_squared();
                if dist2 >= heap.dist2[0] {
                    return;
                }
            }
        }

        heap.offer(dist2, *photon);
    }
}

impl Default for PhotonMap {
    fn default() -> PhotonMap {
        PhotonMap::new()
    }
}

/// Fixed-capacity max-heap of `(dist2, photon)` candidates, 1-indexed
/// like the original so `dist2[0]` always holds the current worst
/// (largest) squared distance among the `found` candidates, or the
/// query radius squared before the heap fills (`spec.md` §4.J).
struct NearestHeap {
    max_photons: usize,
    found: usize,
    dist2: Vec<f64>,
    photon: Vec<Photon>,
    norm_scale: f64,
}

impl NearestHeap {
    fn new(max_photons: usize, radius2: f64) -> NearestHeap {
        let mut dist2 = vec![0.0; max_photons + 1];
        dist2[0] = radius2;
        NearestHeap {
            max_photons,
            found: 0,
            dist2,
            photon: vec![Photon::new(Point::zero(), Direction::zero(), Color::black()); max_photons + 1],
            norm_scale: 0.0,
        }
    }

    fn offer(&mut self, dist2: f64, photon: Photon) {
        if self.found < self.max_photons {
            self.found += 1;
            self.dist2[self.found] = dist2;
            self.photon[self.found] = photon;
            if self.found == self.max_photons {
                self.heapify();
            }
        } else {
            self.dist2[1] = dist2;
            self.photon[1] = photon;
            self.sift_down(1);
            self.dist2[0] = self.dist2[1];
        }
    }

    fn heapify(&mut self) {
        let half = self.found / 2;
        for parent in (1..=half).rev() {
            self.sift_down(parent);
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        let tp = self.photon[parent];
        let td2 = self.dist2[parent];
        let half = self.found / 2;
        while parent <= half {
            let mut j = parent * 2;
            if j < self.found && self.dist2[j] < self.dist2[j + 1] {
                j += 1;
            }
            if td2 >= self.dist2[j] {
                break;
            }
            self.dist2[parent] = self.dist2[j];
            self.photon[parent] = self.photon[j];
            parent = j;
        }
        self.photon[parent] = tp;
        self.dist2[parent] = td2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_map(n_per_axis: i32, spacing: f64) -> PhotonMap {
        let mut map = PhotonMap::new();
        for x in 0..n_per_axis {
            for y in 0..n_per_axis {
                let p = Point::new(x as f64 * spacing, y as f64 * spacing, 0.0);
                map.push(Photon::new(p, Direction::new(0.0, 0.0, -1.0), Color::white()));
            }
        }
        map.balance();
        map
    }

    #[test]
    fn balance_depth_matches_log2_n() {
        let map = grid_map(10, 1.0);
        assert_eq!(map.len(), 100);
        assert!(map.half_stored_photons * 2 + 1 <= map.len());
    }

    #[test]
    fn estimate_irradiance_is_zero_when_no_photon_in_radius() {
        let map = grid_map(4, 100.0);
        let irradiance = map.estimate_irradiance(Point::new(1000.0, 1000.0, 1000.0), Direction::new(0.0, 0.0, 1.0), 8, 0.1);
        assert_eq!(irradiance, Color::black());
    }

    #[test]
    fn estimate_irradiance_on_dense_grid_is_positive() {
        let map = grid_map(20, 0.05);
        let irradiance = map.estimate_irradiance(Point::new(0.5, 0.5, 0.0), Direction::new(0.0, 0.0, 1.0), 50, 0.5);
        assert!(irradiance.luma_linf() > 0.0);
    }

    #[test]
    fn empty_map_returns_black() {
        let map = PhotonMap::new();
        let irradiance = map.estimate_irradiance(Point::zero(), Direction::new(0.0, 0.0, 1.0), 10, 1.0);
        assert_eq!(irradiance, Color::black());
    }
}
