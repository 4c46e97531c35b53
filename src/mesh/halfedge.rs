//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list)
//! representation for triangle meshes, exposing the adjacency interface
//! the error metrics consume:
//!
//! - `from_vertex` / `to_vertex` / `next_halfedge`: O(1) halfedge walks
//! - `point`: vertex geometry
//! - `halfedge_of`: a face's representative halfedge
//! - `faces_around_vertex` / `faces_around_face`: local neighborhoods,
//!   returned as collected vectors so the sequences are finite,
//!   restartable, and stable in traversal order
//!
//! # Boundary Handling
//!
//! Boundary half-edges (on mesh boundaries) have an invalid face handle.
//! Their twins are the interior half-edges. Boundary vertices store a
//! boundary half-edge as their outgoing half-edge so circulation always
//! starts at the boundary.

use nalgebra::{Point3, Vector3};

use super::handle::{FaceHandle, HalfEdgeHandle, VertexHandle};
use crate::geometry::triangle_normal;

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeHandle,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeHandle::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexHandle,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeHandle,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeHandle,

    /// The previous half-edge around the face (clockwise).
    pub prev: HalfEdgeHandle,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceHandle,
}

impl HalfEdge {
    /// Create a new unconnected half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexHandle::invalid(),
            twin: HalfEdgeHandle::invalid(),
            next: HalfEdgeHandle::invalid(),
            prev: HalfEdgeHandle::invalid(),
            face: FaceHandle::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeHandle,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeHandle) -> Self {
        Self { halfedge }
    }
}

/// A half-edge mesh data structure for triangle meshes.
///
/// Stores vertices, half-edges, and faces with full connectivity
/// information, enabling O(1) adjacency queries. The error metrics treat
/// the mesh as read-only; collapse application happens on the face-vertex
/// representation (see [`crate::algo::simplify`]).
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed mesh: 3 half-edges per face; boundary meshes need a few more.
        let num_halfedges = num_faces * 3 + num_faces / 2;
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by handle.
    #[inline]
    pub fn vertex(&self, v: VertexHandle) -> &Vertex {
        &self.vertices[v.index()]
    }

    /// Get a mutable vertex by handle.
    #[inline]
    pub(crate) fn vertex_mut(&mut self, v: VertexHandle) -> &mut Vertex {
        &mut self.vertices[v.index()]
    }

    /// Get a half-edge by handle.
    #[inline]
    pub fn halfedge(&self, he: HalfEdgeHandle) -> &HalfEdge {
        &self.halfedges[he.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, he: HalfEdgeHandle) -> &mut HalfEdge {
        &mut self.halfedges[he.index()]
    }

    /// Get a face by handle.
    #[inline]
    pub fn face(&self, f: FaceHandle) -> &Face {
        &self.faces[f.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn point(&self, v: VertexHandle) -> Point3<f64> {
        self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_point(&mut self, v: VertexHandle, p: Point3<f64>) {
        self.vertex_mut(v).position = p;
    }

    // ==================== Topology Queries ====================

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn from_vertex(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn to_vertex(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.from_vertex(self.twin(he))
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next_halfedge(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev_halfedge(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.halfedge(he).prev
    }

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeHandle) -> HalfEdgeHandle {
        self.halfedge(he).twin
    }

    /// Get the face a half-edge belongs to (invalid on the boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeHandle) -> FaceHandle {
        self.halfedge(he).face
    }

    /// Get a face's representative half-edge.
    #[inline]
    pub fn halfedge_of(&self, f: FaceHandle) -> HalfEdgeHandle {
        self.face(f).halfedge
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeHandle) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge (either of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeHandle) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexHandle) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true; // Isolated vertex
        }
        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return true;
            }
            he = self.next_halfedge(self.twin(he));
            if he == start {
                break;
            }
        }
        false
    }

    // ==================== Neighborhood Queries ====================

    /// Collect the faces incident to a vertex, in circulation order.
    ///
    /// The result is a finite, restartable sequence: callers may index it,
    /// traverse it repeatedly, and rely on a stable order for a given mesh.
    pub fn faces_around_vertex(&self, v: VertexHandle) -> Vec<FaceHandle> {
        let mut faces = Vec::new();
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return faces;
        }
        let mut he = start;
        loop {
            let f = self.face_of(he);
            if f.is_valid() {
                faces.push(f);
            }
            he = self.next_halfedge(self.twin(he));
            if he == start {
                break;
            }
        }
        faces
    }

    /// Collect the faces edge-adjacent to a face (its one-ring), in order.
    ///
    /// Boundary sides contribute nothing, so the result has at most three
    /// entries for a triangle mesh.
    pub fn faces_around_face(&self, f: FaceHandle) -> Vec<FaceHandle> {
        let mut faces = Vec::new();
        let start = self.halfedge_of(f);
        let mut he = start;
        loop {
            let nf = self.face_of(self.twin(he));
            if nf.is_valid() {
                faces.push(nf);
            }
            he = self.next_halfedge(he);
            if he == start {
                break;
            }
        }
        faces
    }

    /// Collect the vertices adjacent to a vertex, in circulation order.
    pub fn vertices_around_vertex(&self, v: VertexHandle) -> Vec<VertexHandle> {
        let mut out = Vec::new();
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return out;
        }
        let mut he = start;
        loop {
            out.push(self.to_vertex(he));
            he = self.next_halfedge(self.twin(he));
            if he == start {
                break;
            }
        }
        out
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex handles.
    pub fn vertex_handles(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        (0..self.vertices.len()).map(VertexHandle::new)
    }

    /// Iterate over all half-edge handles.
    pub fn halfedge_handles(&self) -> impl Iterator<Item = HalfEdgeHandle> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeHandle::new)
    }

    /// Iterate over all face handles.
    pub fn face_handles(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        (0..self.faces.len()).map(FaceHandle::new)
    }

    /// Find the half-edge running from `v0` to `v1`, if the edge exists.
    ///
    /// Returns the invalid handle when the vertices are not connected.
    pub fn find_halfedge(&self, v0: VertexHandle, v1: VertexHandle) -> HalfEdgeHandle {
        let start = self.vertex(v0).halfedge;
        if !start.is_valid() {
            return HalfEdgeHandle::invalid();
        }
        let mut he = start;
        loop {
            if self.to_vertex(he) == v1 {
                return he;
            }
            he = self.next_halfedge(self.twin(he));
            if he == start {
                return HalfEdgeHandle::invalid();
            }
        }
    }

    // ==================== Geometry ====================

    /// Get the three vertices of a face.
    pub fn face_triangle(&self, f: FaceHandle) -> [VertexHandle; 3] {
        let he0 = self.halfedge_of(f);
        let he1 = self.next_halfedge(he0);
        let he2 = self.next_halfedge(he1);
        [
            self.from_vertex(he0),
            self.from_vertex(he1),
            self.from_vertex(he2),
        ]
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_points(&self, f: FaceHandle) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [self.point(v0), self.point(v1), self.point(v2)]
    }

    /// Compute the (non-unit) normal of a face.
    ///
    /// Magnitude equals twice the face area; see
    /// [`triangle_normal`](crate::geometry::triangle_normal).
    pub fn face_normal(&self, f: FaceHandle) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_points(f);
        triangle_normal(&p0, &p1, &p2)
    }

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: FaceHandle) -> Point3<f64> {
        let [p0, p1, p2] = self.face_points(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, he: HalfEdgeHandle) -> Point3<f64> {
        let p0 = self.point(self.from_vertex(he));
        let p1 = self.point(self.to_vertex(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeHandle) -> f64 {
        let p0 = self.point(self.from_vertex(he));
        let p1 = self.point(self.to_vertex(he));
        (p1 - p0).norm()
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its handle.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexHandle {
        let h = VertexHandle::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        h
    }

    // ==================== Validation ====================

    /// Check if the mesh connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() {
                let he = self.halfedge(v.halfedge);
                if he.origin != VertexHandle::new(i) {
                    return false;
                }
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let h = HalfEdgeHandle::new(i);
            if he.twin.is_valid() && self.halfedge(he.twin).twin != h {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev != h {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next != h {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_from_to_vertex() {
        let mesh = tetrahedron();
        for he in mesh.halfedge_handles() {
            let v0 = mesh.from_vertex(he);
            let v1 = mesh.to_vertex(he);
            assert_ne!(v0, v1);
            // The twin points the other way.
            assert_eq!(mesh.from_vertex(mesh.twin(he)), v1);
            assert_eq!(mesh.to_vertex(mesh.twin(he)), v0);
        }
    }

    #[test]
    fn test_next_halfedge_cycles_triangle() {
        let mesh = tetrahedron();
        for f in mesh.face_handles() {
            let he0 = mesh.halfedge_of(f);
            let he3 = mesh.next_halfedge(mesh.next_halfedge(mesh.next_halfedge(he0)));
            assert_eq!(he0, he3);
        }
    }

    #[test]
    fn test_faces_around_vertex_tetrahedron() {
        let mesh = tetrahedron();
        // Every vertex of a tetrahedron touches exactly 3 faces.
        for v in mesh.vertex_handles() {
            let faces = mesh.faces_around_vertex(v);
            assert_eq!(faces.len(), 3);
            // Restartable: a second query returns the same sequence.
            assert_eq!(faces, mesh.faces_around_vertex(v));
        }
    }

    #[test]
    fn test_faces_around_face_tetrahedron() {
        let mesh = tetrahedron();
        for f in mesh.face_handles() {
            let ring = mesh.faces_around_face(f);
            assert_eq!(ring.len(), 3);
            assert!(!ring.contains(&f));
        }
    }

    #[test]
    fn test_faces_around_face_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        assert!(mesh.faces_around_face(FaceHandle::new(0)).is_empty());
    }

    #[test]
    fn test_face_normal_is_area_weighted() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let n = mesh.face_normal(FaceHandle::new(0));
        // Area 2, so the raw normal has magnitude 4.
        assert!((n.norm() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_midpoint() {
        let mesh = tetrahedron();
        let he = HalfEdgeHandle::new(0);
        let m = mesh.edge_midpoint(he);
        let p0 = mesh.point(mesh.from_vertex(he));
        let p1 = mesh.point(mesh.to_vertex(he));
        assert!(((p0 - m) + (p1 - m)).norm() < 1e-12);
    }
}
