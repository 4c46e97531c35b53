//! Planarity detection around an edge.
//!
//! When the quadric system for an edge is singular, the safe collapse
//! position depends on whether the local surface is flat: on a flat patch
//! every point of the edge has identical error and the midpoint is the
//! stable pick. These checks answer "do all faces touching the edge's
//! endpoints share one supporting plane?".

use nalgebra::Vector3;

use crate::mesh::{HalfEdgeHandle, HalfEdgeMesh, VertexHandle};

/// Relative tolerance for the parallel-normals test. Two face normals
/// count as parallel (or anti-parallel) when their dot product reaches
/// the product of their norms to within this factor. Comfortably above
/// f64 rounding noise, far below any visible dihedral angle.
const PLANARITY_EPS: f64 = 1e-9;

/// Whether two (non-unit) normals are parallel or anti-parallel.
fn parallel(n0: &Vector3<f64>, ni: &Vector3<f64>) -> bool {
    let prod = n0.norm() * ni.norm();
    prod - n0.dot(ni).abs() <= PLANARITY_EPS * prod
}

/// Whether every face of the sequence shares the supporting plane of the
/// first. An empty sequence is vacuously planar.
fn star_is_planar(mesh: &HalfEdgeMesh, faces: &[crate::mesh::FaceHandle]) -> bool {
    let Some((first, rest)) = faces.split_first() else {
        return true;
    };
    let n0 = mesh.face_normal(*first);
    rest.iter().all(|&f| parallel(&n0, &mesh.face_normal(f)))
}

/// Check whether all faces incident to either endpoint of an edge lie in
/// a single plane.
///
/// The source star is collected first and its first face supplies the
/// reference normal; faces incident to both endpoints are visited twice,
/// which does not change the answer.
pub fn is_planar_edge(mesh: &HalfEdgeMesh, halfedge: HalfEdgeHandle) -> bool {
    let vs = mesh.from_vertex(halfedge);
    let vt = mesh.to_vertex(halfedge);

    let mut faces = mesh.faces_around_vertex(vs);
    faces.extend(mesh.faces_around_vertex(vt));
    star_is_planar(mesh, &faces)
}

/// Check planarity independently around each endpoint of an edge.
///
/// Returns `(both_planar, source, target)` where each returned handle is
/// the endpoint itself if that endpoint's star is NOT planar (signaling
/// that side needs special handling), or the invalid handle if it is.
pub fn is_planar_edge2(
    mesh: &HalfEdgeMesh,
    halfedge: HalfEdgeHandle,
) -> (bool, VertexHandle, VertexHandle) {
    let vs = mesh.from_vertex(halfedge);
    let vt = mesh.to_vertex(halfedge);

    let planar_vs = star_is_planar(mesh, &mesh.faces_around_vertex(vs));
    let planar_vt = star_is_planar(mesh, &mesh.faces_around_vertex(vt));

    let vs_out = if planar_vs { VertexHandle::invalid() } else { vs };
    let vt_out = if planar_vt { VertexHandle::invalid() } else { vt };

    (planar_vs && planar_vt, vs_out, vt_out)
}
