//! Mesh construction utilities.
//!
//! Builds half-edge connectivity from a face-vertex triangle list, and
//! converts back. The simplification driver round-trips through these
//! after each batch of collapses.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::handle::{FaceHandle, HalfEdgeHandle, VertexHandle};
use crate::error::{Result, SimplifyError};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as `[v0, v1, v2]` indices
///
/// # Example
/// ```
/// use whittle::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(SimplifyError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(SimplifyError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(SimplifyError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_handles: Vec<VertexHandle> =
        vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Map from directed edge (v0, v1) to half-edge handle.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeHandle> = HashMap::new();

    // First pass: create all half-edges and faces.
    for face in faces {
        let [v0, v1, v2] = *face;

        let he0 = HalfEdgeHandle::new(mesh.num_halfedges());
        let he1 = HalfEdgeHandle::new(mesh.num_halfedges() + 1);
        let he2 = HalfEdgeHandle::new(mesh.num_halfedges() + 2);
        for _ in 0..3 {
            mesh.halfedges.push(HalfEdge::new());
        }

        let fh = FaceHandle::new(mesh.num_faces());
        mesh.faces.push(Face::new(he0));

        {
            let rec = mesh.halfedge_mut(he0);
            rec.origin = vertex_handles[v0];
            rec.next = he1;
            rec.prev = he2;
            rec.face = fh;
        }
        {
            let rec = mesh.halfedge_mut(he1);
            rec.origin = vertex_handles[v1];
            rec.next = he2;
            rec.prev = he0;
            rec.face = fh;
        }
        {
            let rec = mesh.halfedge_mut(he2);
            rec.origin = vertex_handles[v2];
            rec.next = he0;
            rec.prev = he1;
            rec.face = fh;
        }

        // Will be overwritten for shared vertices; fixed up for boundaries below.
        mesh.vertex_mut(vertex_handles[v0]).halfedge = he0;
        mesh.vertex_mut(vertex_handles[v1]).halfedge = he1;
        mesh.vertex_mut(vertex_handles[v2]).halfedge = he2;

        edge_map.insert((v0, v1), he0);
        edge_map.insert((v1, v2), he1);
        edge_map.insert((v2, v0), he2);
    }

    // Second pass: link twins, creating boundary half-edges where needed.
    for (&(v0, v1), &he) in &edge_map {
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary = HalfEdgeHandle::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge::new());

            mesh.halfedge_mut(he).twin = boundary;
            let rec = mesh.halfedge_mut(boundary);
            rec.origin = vertex_handles[v1];
            rec.twin = he;
            // Face stays invalid: this is a boundary half-edge.
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Link boundary half-edges into loops via their origin vertices.
fn link_boundary_loops(mesh: &mut HalfEdgeMesh) {
    let boundary: Vec<HalfEdgeHandle> = mesh
        .halfedge_handles()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeHandle> = HashMap::new();
    for &he in &boundary {
        outgoing.insert(mesh.from_vertex(he).index(), he);
    }

    for &he in &boundary {
        let dest = mesh.to_vertex(he).index();
        if let Some(&next) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next;
            mesh.halfedge_mut(next).prev = he;
        }
    }
}

/// Ensure boundary vertices store a boundary half-edge, so circulation
/// around them visits every incident face.
fn fix_boundary_vertex_halfedges(mesh: &mut HalfEdgeMesh) {
    for v in mesh.vertex_handles().collect::<Vec<_>>() {
        let start = mesh.vertex(v).halfedge;
        if !start.is_valid() {
            continue;
        }
        let mut he = start;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(v).halfedge = he;
                break;
            }
            he = mesh.next_halfedge(mesh.twin(he));
            if he == start {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns a `(vertices, faces)` tuple; face indices reference the vertex
/// list in handle order.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_handles().map(|v| mesh.point(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_handles()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}
