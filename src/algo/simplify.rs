//! Greedy edge-collapse simplification.
//!
//! This driver repeatedly ranks every edge of the mesh with an
//! [`ErrorMetric`], collapses the cheapest candidates that keep the mesh
//! manifold, and rebuilds connectivity. Because the metrics read live
//! half-edge neighborhoods (planarity stars, one-ring fits), costs are
//! re-ranked on the rebuilt mesh after every batch of independent
//! collapses rather than patched incrementally.
//!
//! # Example
//!
//! ```
//! use whittle::algo::simplify::{simplify, SimplifyOptions};
//! use whittle::metric::QuadricMetric;
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, -1.0),
//! ];
//! let faces = vec![
//!     [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
//!     [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
//! ];
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let mut metric = QuadricMetric::default();
//! let options = SimplifyOptions::with_target_faces(4);
//! let simplified = simplify(&mesh, &mut metric, &options).unwrap();
//! assert!(simplified.num_faces() < mesh.num_faces());
//! ```

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use nalgebra::Point3;
use tracing::{debug, info};

use crate::error::Result;
use crate::mesh::{build_from_triangles, to_face_vertex, HalfEdgeMesh};
use crate::metric::ErrorMetric;

/// Options for mesh simplification.
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Target number of faces after simplification.
    /// If `None`, `target_ratio` is used instead.
    pub target_faces: Option<usize>,

    /// Target ratio of faces to keep (0.0 to 1.0).
    /// Only used if `target_faces` is `None`.
    pub target_ratio: f64,

    /// Maximum allowed cost for a single edge collapse.
    /// Edges with cost above this threshold won't be collapsed.
    pub max_cost: Option<f64>,
}

impl SimplifyOptions {
    /// Create options to reduce to a target number of faces.
    pub fn with_target_faces(target: usize) -> Self {
        Self {
            target_faces: Some(target),
            target_ratio: 0.5,
            max_cost: None,
        }
    }

    /// Create options to reduce to a ratio of the original face count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_faces: None,
            target_ratio: ratio.clamp(0.0, 1.0),
            max_cost: None,
        }
    }

    /// Set the maximum cost threshold for edge collapses.
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Compute the target number of faces given the original count.
    pub fn compute_target(&self, original_faces: usize) -> usize {
        if let Some(target) = self.target_faces {
            target.min(original_faces)
        } else {
            ((original_faces as f64) * self.target_ratio).round() as usize
        }
    }
}

/// An edge collapse candidate ordered by ascending cost.
#[derive(Debug, Clone)]
struct Candidate {
    v0: usize,
    v1: usize,
    cost: f64,
    position: Point3<f64>,
    boundary: bool,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

/// Simplify a mesh by greedy edge collapse under the given metric.
///
/// Returns a new mesh; the input is left untouched. Edges the metric
/// cannot evaluate (unstable fits on degenerate neighborhoods) are
/// skipped rather than aborting the run.
pub fn simplify<M: ErrorMetric>(
    mesh: &HalfEdgeMesh,
    metric: &mut M,
    options: &SimplifyOptions,
) -> Result<HalfEdgeMesh> {
    let (mut vertices, mut faces) = to_face_vertex(mesh);

    let target = options.compute_target(faces.len());
    if target >= faces.len() {
        return Ok(mesh.clone());
    }

    info!(
        original = faces.len(),
        target_faces = target,
        "starting simplification"
    );

    let mut current = mesh.clone();
    let mut round = 0usize;

    while faces.len() > target {
        round += 1;

        // Rank every edge on the current connectivity.
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
        for he in current.halfedge_handles() {
            if current.is_boundary_halfedge(he) {
                continue;
            }
            // One candidate per undirected edge: skip when the twin is an
            // interior half-edge with a smaller index.
            let twin = current.twin(he);
            if !current.is_boundary_halfedge(twin) && twin < he {
                continue;
            }

            match metric.edge_error(&current, he) {
                Ok(collapse) if collapse.cost.is_finite() => heap.push(Candidate {
                    v0: current.from_vertex(he).index(),
                    v1: current.to_vertex(he).index(),
                    cost: collapse.cost,
                    position: collapse.position,
                    boundary: current.is_boundary_edge(he),
                }),
                Ok(_) => {}
                Err(err) => debug!(%err, "skipping edge"),
            }
        }

        // Apply a batch of independent collapses, cheapest first. Vertices
        // whose neighborhoods changed this round are off-limits until the
        // next ranking.
        let neighbors = vertex_neighbors(&faces);
        let mut valid = vec![true; faces.len()];
        let mut remaining = faces.len();
        let mut touched: HashSet<usize> = HashSet::new();
        let mut collapsed = 0usize;
        let mut cost_exceeded = false;

        while let Some(cand) = heap.pop() {
            if remaining <= target {
                break;
            }
            if let Some(max) = options.max_cost {
                if cand.cost > max {
                    cost_exceeded = true;
                    break;
                }
            }
            if touched.contains(&cand.v0) || touched.contains(&cand.v1) {
                continue;
            }
            if !collapse_is_valid(cand.v0, cand.v1, cand.boundary, &neighbors) {
                continue;
            }

            // Collapse v1 into v0 at the metric's position.
            vertices[cand.v0] = cand.position;
            for (fi, face) in faces.iter_mut().enumerate() {
                if !valid[fi] {
                    continue;
                }
                let mut changed = false;
                for v in face.iter_mut() {
                    if *v == cand.v1 {
                        *v = cand.v0;
                        changed = true;
                    }
                }
                if changed && (face[0] == face[1] || face[1] == face[2] || face[0] == face[2]) {
                    valid[fi] = false;
                    remaining -= 1;
                }
            }

            // Everything adjacent to either endpoint is stale now.
            touched.insert(cand.v0);
            touched.insert(cand.v1);
            if let Some(n) = neighbors.get(&cand.v0) {
                touched.extend(n.iter().copied());
            }
            if let Some(n) = neighbors.get(&cand.v1) {
                touched.extend(n.iter().copied());
            }
            collapsed += 1;
        }

        faces = faces
            .into_iter()
            .zip(valid)
            .filter_map(|(f, keep)| keep.then_some(f))
            .collect();

        debug!(round, collapsed, faces = faces.len(), "collapse round");

        if collapsed == 0 || cost_exceeded {
            break;
        }
        current = build_from_triangles(&vertices, &faces)?;
    }

    let (vertices, faces) = compact(vertices, faces);
    let result = build_from_triangles(&vertices, &faces)?;
    info!(faces = result.num_faces(), rounds = round, "simplification finished");
    Ok(result)
}

/// Adjacent-vertex sets for every vertex referenced by a face.
fn vertex_neighbors(faces: &[[usize; 3]]) -> HashMap<usize, HashSet<usize>> {
    let mut neighbors: HashMap<usize, HashSet<usize>> = HashMap::new();
    for face in faces {
        for i in 0..3 {
            let v = face[i];
            let entry = neighbors.entry(v).or_default();
            entry.insert(face[(i + 1) % 3]);
            entry.insert(face[(i + 2) % 3]);
        }
    }
    neighbors
}

/// Link condition: a collapse keeps the mesh manifold only when the
/// endpoints share exactly the two opposite vertices of the edge's
/// incident faces (one for a boundary edge).
fn collapse_is_valid(
    v0: usize,
    v1: usize,
    boundary: bool,
    neighbors: &HashMap<usize, HashSet<usize>>,
) -> bool {
    let (Some(n0), Some(n1)) = (neighbors.get(&v0), neighbors.get(&v1)) else {
        return false;
    };
    let common = n0.intersection(n1).count();
    common == if boundary { 1 } else { 2 }
}

/// Drop vertices no surviving face references and remap face indices.
fn compact(
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut map = vec![usize::MAX; vertices.len()];
    let mut out_vertices = Vec::new();

    let out_faces = faces
        .iter()
        .map(|face| {
            let mut out = [0usize; 3];
            for (slot, &v) in out.iter_mut().zip(face.iter()) {
                if map[v] == usize::MAX {
                    map[v] = out_vertices.len();
                    out_vertices.push(vertices[v]);
                }
                *slot = map[v];
            }
            out
        })
        .collect();

    (out_vertices, out_faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{QuadricMetric, SimpleApssMetric};

    fn octahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn grid(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_simplify_reduces_faces() {
        let mesh = octahedron();
        let mut metric = QuadricMetric::default();

        let options = SimplifyOptions::with_target_faces(4);
        let result = simplify(&mesh, &mut metric, &options).unwrap();

        assert!(result.num_faces() < mesh.num_faces());
        assert!(result.is_valid());
    }

    #[test]
    fn test_simplify_no_change_at_full_ratio() {
        let mesh = octahedron();
        let mut metric = QuadricMetric::default();

        let options = SimplifyOptions::with_target_ratio(1.0);
        let result = simplify(&mesh, &mut metric, &options).unwrap();

        assert_eq!(result.num_faces(), mesh.num_faces());
        assert_eq!(result.num_vertices(), mesh.num_vertices());
    }

    #[test]
    fn test_simplify_respects_max_cost() {
        let mesh = octahedron();
        let mut metric = QuadricMetric::default();

        // No octahedron collapse is free, so nothing may happen.
        let options = SimplifyOptions::with_target_ratio(0.1).with_max_cost(1e-12);
        let result = simplify(&mesh, &mut metric, &options).unwrap();

        assert_eq!(result.num_faces(), mesh.num_faces());
        assert!(result.is_valid());
    }

    #[test]
    fn test_simplify_flat_grid() {
        let mesh = grid(3);
        let mut metric = QuadricMetric::default();

        let options = SimplifyOptions::with_target_ratio(0.5);
        let result = simplify(&mesh, &mut metric, &options).unwrap();

        assert!(result.num_faces() < mesh.num_faces());
        assert!(result.is_valid());
    }

    #[test]
    fn test_simplify_with_sphere_fit_metric() {
        let mesh = octahedron();
        let mut metric = SimpleApssMetric::new(10.0);

        let options = SimplifyOptions::with_target_faces(4);
        let result = simplify(&mesh, &mut metric, &options).unwrap();

        assert!(result.num_faces() <= mesh.num_faces());
        assert!(result.is_valid());
        // The metric logged fits along the way.
        assert!(!metric.fits().is_empty());
    }

    #[test]
    fn test_compact_drops_orphan_vertices() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(9.0, 9.0, 9.0), // orphan
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 2, 3]];

        let (out_v, out_f) = compact(vertices, faces);
        assert_eq!(out_v.len(), 3);
        assert_eq!(out_f, vec![[0, 1, 2]]);
        assert!((out_v[1] - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }
}
