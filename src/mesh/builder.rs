//! Mesh construction from face-vertex arrays.
//!
//! The input shape is the one file loaders and host applications hand over:
//! a position per vertex, a vertex count per face, and the faces' vertex
//! indices flattened into one array (counter-clockwise winding).
//!
//! Construction inserts faces one by one. The half-edges of a face reuse an
//! existing half-edge when the directed vertex pair was already created as the
//! twin of a neighbouring face's edge; otherwise a new half-edge pair and edge
//! are allocated. A final pass links the face-less half-edges into boundary
//! loops.

use std::collections::HashSet;

use nalgebra::Point3;

use super::halfedge::{quantize, Edge, Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{FormError, Result};

/// Build a mesh from positions, per-face vertex counts and flattened indices.
///
/// # Errors
/// Fails without producing a partial mesh if the counts do not match the
/// index array, if a face references a missing vertex, has fewer than three
/// distinct vertices, or if a directed edge is claimed by two faces.
///
/// # Example
/// ```
/// use formfind::mesh::{build, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build(&positions, &[4], &[0, 1, 2, 3]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_edges(), 4);
/// assert!(mesh.is_valid());
/// ```
pub fn build<I: MeshIndex>(
    positions: &[Point3<f64>],
    face_counts: &[usize],
    face_connects: &[usize],
) -> Result<HalfEdgeMesh<I>> {
    validate_faces(positions.len(), face_counts, face_connects)?;

    let num_edges = count_edges(face_counts, face_connects);
    let mut mesh = HalfEdgeMesh::with_capacity(positions.len(), num_edges, face_counts.len());

    for &pos in positions {
        add_vertex(&mut mesh, pos);
    }

    let mut offset = 0;
    for &count in face_counts {
        insert_polygon(&mut mesh, &face_connects[offset..offset + count])?;
        offset += count;
    }

    link_boundary_loops(&mut mesh)?;
    fix_boundary_vertex_halfedges(&mut mesh);
    mesh.compute_normals();

    log::debug!(
        "built mesh: {} vertices, {} edges, {} faces",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces()
    );

    Ok(mesh)
}

/// Build a mesh from flat coordinates (three values per vertex).
pub fn build_from_flat<I: MeshIndex>(
    coords: &[f64],
    face_counts: &[usize],
    face_connects: &[usize],
) -> Result<HalfEdgeMesh<I>> {
    if coords.len() % 3 != 0 {
        return Err(FormError::size_mismatch(
            "coords",
            coords.len() / 3 * 3 + 3,
            coords.len(),
        ));
    }
    let positions: Vec<Point3<f64>> = coords
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();
    build(&positions, face_counts, face_connects)
}

/// Build a mesh from per-face vertex lists.
pub fn build_from_polygons<I: MeshIndex>(
    positions: &[Point3<f64>],
    faces: &[Vec<usize>],
) -> Result<HalfEdgeMesh<I>> {
    let counts: Vec<usize> = faces.iter().map(Vec::len).collect();
    let connects: Vec<usize> = faces.iter().flatten().copied().collect();
    build(positions, &counts, &connects)
}

/// Build a mesh from triangles.
pub fn build_from_triangles<I: MeshIndex>(
    positions: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    let counts = vec![3; faces.len()];
    let connects: Vec<usize> = faces.iter().flatten().copied().collect();
    build(positions, &counts, &connects)
}

/// Build a mesh from quads (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    positions: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    let counts = vec![4; faces.len()];
    let connects: Vec<usize> = faces.iter().flatten().copied().collect();
    build(positions, &counts, &connects)
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Rebuild this mesh in place from face-vertex arrays.
    ///
    /// On failure the mesh is left empty.
    pub fn create(
        &mut self,
        positions: &[Point3<f64>],
        face_counts: &[usize],
        face_connects: &[usize],
    ) -> Result<()> {
        self.clear();
        *self = build(positions, face_counts, face_connects)?;
        Ok(())
    }

    // ==================== Topology Edits ====================

    /// Append an isolated vertex.
    pub fn add_vertex(&mut self, pos: Point3<f64>) -> VertexId<I> {
        add_vertex(self, pos)
    }

    /// Append a face over existing vertices and relink the boundary loops.
    ///
    /// # Errors
    /// The same face checks as [`build`], made before anything changes.
    pub fn add_polygon(&mut self, verts: &[usize]) -> Result<FaceId<I>> {
        validate_polygon(self.num_vertices(), self.num_faces(), verts)?;
        let face = insert_polygon(self, verts)?;
        repair_boundary(self)?;
        self.compute_normals();
        Ok(face)
    }

    /// Replace the vertex loop of an existing face.
    ///
    /// Edges of the old loop that no face uses any more are marked inactive,
    /// and vertices left without edges become isolated.
    ///
    /// # Errors
    /// `IndexOutOfRange` for an unknown face, otherwise the same face checks
    /// as [`build`], made before anything changes. A directed edge owned by
    /// the face being replaced may be reused.
    pub fn update_polygon(&mut self, face: usize, verts: &[usize]) -> Result<()> {
        let f = self.checked_face(face)?;
        validate_polygon(self.num_vertices(), face, verts)?;
        check_edges_free(self, verts, f)?;

        let old: Vec<HalfEdgeId<I>> = self.face_halfedges(f).collect();
        for &he in &old {
            self.halfedge_mut(he).face = FaceId::invalid();
        }

        let loop_hes = claim_loop(self, verts);
        wire_face(self, f, verts, &loop_hes);

        for &he in &old {
            let e = self.edge_of(he);
            let dangling = self.is_boundary_halfedge(he) && self.is_boundary_halfedge(self.sym(he));
            if dangling && self.edge(e).is_active() {
                remove_edge(self, e);
            }
        }

        repair_boundary(self)?;
        self.compute_normals();

        log::debug!("updated face {:?} to {} vertices", f, verts.len());
        Ok(())
    }
}

/// Number of distinct undirected edges referenced by a face list.
///
/// Faces running past the end of `face_connects` are ignored.
pub fn count_edges(face_counts: &[usize], face_connects: &[usize]) -> usize {
    let mut edges = HashSet::new();
    let mut offset = 0;
    for &count in face_counts {
        let Some(face) = face_connects.get(offset..offset + count) else {
            break;
        };
        for (i, &a) in face.iter().enumerate() {
            let b = face[(i + 1) % count];
            edges.insert((a.min(b), a.max(b)));
        }
        offset += count;
    }
    edges.len()
}

/// Convert a mesh back to positions plus per-face vertex lists.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let positions = mesh.positions().to_vec();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    (positions, faces)
}

/// Convert a mesh back to flat coordinates, face counts and face indices.
pub fn to_flat_arrays<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<f64>, Vec<usize>, Vec<usize>) {
    let coords = mesh
        .positions()
        .iter()
        .flat_map(|p| [p.x, p.y, p.z])
        .collect();

    let mut counts = Vec::with_capacity(mesh.num_faces());
    let mut connects = Vec::with_capacity(mesh.num_halfedges());
    for f in mesh.face_ids() {
        let before = connects.len();
        connects.extend(mesh.face_vertices(f).map(|v| v.index()));
        counts.push(connects.len() - before);
    }

    (coords, counts, connects)
}

/// Reject malformed face lists before anything is allocated.
fn validate_faces(num_vertices: usize, face_counts: &[usize], face_connects: &[usize]) -> Result<()> {
    let expected: usize = face_counts.iter().sum();
    if expected != face_connects.len() {
        return Err(FormError::FaceCountMismatch {
            expected,
            actual: face_connects.len(),
        });
    }

    let mut offset = 0;
    for (fi, &count) in face_counts.iter().enumerate() {
        validate_polygon(num_vertices, fi, &face_connects[offset..offset + count])?;
        offset += count;
    }

    Ok(())
}

fn validate_polygon(num_vertices: usize, face: usize, verts: &[usize]) -> Result<()> {
    if let Some(&vertex) = verts.iter().find(|&&vi| vi >= num_vertices) {
        return Err(FormError::InvalidVertexIndex { face, vertex });
    }

    let distinct: HashSet<usize> = verts.iter().copied().collect();
    if verts.len() < 3 || distinct.len() != verts.len() {
        return Err(FormError::DegenerateFace { face });
    }
    Ok(())
}

fn add_vertex<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, pos: Point3<f64>) -> VertexId<I> {
    let id = VertexId::new(mesh.vertices.len());
    mesh.vertices.push(Vertex::new(id));
    mesh.attributes.push_vertex(pos);
    mesh.position_map.entry(quantize(&pos)).or_insert(id);
    id
}

/// Allocate the half-edge pair `a -> b`, `b -> a` and its edge.
///
/// Returns the half-edge running from `a` to `b`.
fn add_edge_pair<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, a: usize, b: usize) -> HalfEdgeId<I> {
    let edge = EdgeId::new(mesh.edges.len());
    let he_ab = HalfEdgeId::new(mesh.halfedges.len());
    let he_ba = he_ab.pair();

    mesh.halfedges.push(HalfEdge::new(he_ab, VertexId::new(b), edge));
    mesh.halfedges.push(HalfEdge::new(he_ba, VertexId::new(a), edge));
    mesh.edges.push(Edge::new(edge));
    mesh.attributes.push_edge();

    mesh.halfedge_map.insert((a, b), he_ab);
    mesh.halfedge_map.insert((b, a), he_ba);

    he_ab
}

/// Fail if a directed edge of `verts` already borders a face other than `owner`.
fn check_edges_free<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, verts: &[usize], owner: FaceId<I>) -> Result<()> {
    let n = verts.len();
    for i in 0..n {
        let (a, b) = (verts[i], verts[(i + 1) % n]);
        if let Some(&he) = mesh.halfedge_map.get(&(a, b)) {
            let face = mesh.halfedge(he).face;
            if face.is_valid() && face != owner {
                return Err(FormError::NonManifoldEdge { v0: a, v1: b });
            }
        }
    }
    Ok(())
}

/// Look up or allocate the half-edge of every side of a loop.
fn claim_loop<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, verts: &[usize]) -> Vec<HalfEdgeId<I>> {
    let n = verts.len();
    (0..n)
        .map(|i| {
            let (a, b) = (verts[i], verts[(i + 1) % n]);
            match mesh.halfedge_map.get(&(a, b)) {
                Some(&he) => he,
                None => add_edge_pair(mesh, a, b),
            }
        })
        .collect()
}

/// Point a face, its half-edges and its vertices at the loop.
fn wire_face<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    face: FaceId<I>,
    verts: &[usize],
    loop_hes: &[HalfEdgeId<I>],
) {
    let n = loop_hes.len();
    for (i, &v) in verts.iter().enumerate() {
        mesh.vertices[v].halfedge = loop_hes[i];
    }

    for i in 0..n {
        let next = loop_hes[(i + 1) % n];
        let prev = loop_hes[(i + n - 1) % n];
        let he = mesh.halfedge_mut(loop_hes[i]);
        he.face = face;
        he.next = next;
        he.prev = prev;
    }

    mesh.faces[face.index()].halfedge = loop_hes[0];
}

/// Insert one face loop, reusing half-edges created by earlier faces.
fn insert_polygon<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, verts: &[usize]) -> Result<FaceId<I>> {
    check_edges_free(mesh, verts, FaceId::invalid())?;

    let face_id = FaceId::new(mesh.faces.len());
    let loop_hes = claim_loop(mesh, verts);

    mesh.faces.push(Face::new(face_id));
    mesh.attributes.push_face();
    wire_face(mesh, face_id, verts, &loop_hes);

    Ok(face_id)
}

/// Mark an edge and its two half-edges inactive.
fn remove_edge<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, e: EdgeId<I>) {
    let [h0, h1] = mesh.edge(e).halfedges;
    let a = mesh.origin(h0).index();
    let b = mesh.target(h0).index();
    mesh.halfedge_map.remove(&(a, b));
    mesh.halfedge_map.remove(&(b, a));

    mesh.halfedges[h0.index()].id = HalfEdgeId::invalid();
    mesh.halfedges[h1.index()].id = HalfEdgeId::invalid();
    mesh.edges[e.index()].id = EdgeId::invalid();
}

/// Re-derive vertex half-edges and boundary links after a topology edit.
fn repair_boundary<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    for v in &mut mesh.vertices {
        v.halfedge = HalfEdgeId::invalid();
    }
    let active: Vec<HalfEdgeId<I>> = mesh.halfedge_ids().collect();
    for he in active {
        let origin = mesh.origin(he);
        if !mesh.vertices[origin.index()].halfedge.is_valid() {
            mesh.vertices[origin.index()].halfedge = he;
        }
    }

    link_boundary_loops(mesh)?;
    fix_boundary_vertex_halfedges(mesh);
    Ok(())
}

/// Link every face-less half-edge to its neighbours on the boundary.
///
/// For a boundary half-edge `a -> b`, the next boundary half-edge leaves `b`
/// and is found by rotating around `b` through `sym(prev(..))`; the previous
/// one arrives at `a` and is found through `sym(next(..))`.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let boundary: Vec<HalfEdgeId<I>> = mesh.boundary_halfedges().collect();
    let limit = mesh.num_halfedges();

    for he in boundary {
        let mut next = mesh.sym(he);
        let mut steps = 0;
        loop {
            next = mesh.sym(mesh.prev(next));
            if mesh.is_boundary_halfedge(next) {
                break;
            }
            steps += 1;
            if steps > limit {
                return Err(FormError::BoundaryLoop { halfedge: he.index() });
            }
        }

        let mut prev = mesh.sym(he);
        let mut steps = 0;
        loop {
            prev = mesh.sym(mesh.next(prev));
            if mesh.is_boundary_halfedge(prev) {
                break;
            }
            steps += 1;
            if steps > limit {
                return Err(FormError::BoundaryLoop { halfedge: he.index() });
            }
        }

        mesh.halfedge_mut(he).next = next;
        mesh.halfedge_mut(next).prev = he;
        mesh.halfedge_mut(he).prev = prev;
        mesh.halfedge_mut(prev).next = he;
    }

    Ok(())
}

/// Point boundary vertices at their outgoing boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let ids: Vec<VertexId<I>> = mesh.vertex_ids().collect();
    for v in ids {
        let outgoing = mesh
            .vertex_halfedges(v)
            .find(|&he| mesh.is_boundary_halfedge(he));
        if let Some(he) = outgoing {
            mesh.vertices[v.index()].halfedge = he;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        (positions, vec![[0, 1, 2]])
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        (positions, vec![[0, 1, 2], [1, 0, 3]])
    }

    /// `n` x `n` quad grid in the XY plane.
    fn quad_grid(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
        let mut positions = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                positions.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                faces.push([v00, v00 + 1, v00 + n + 2, v00 + n + 1]);
            }
        }
        (positions, faces)
    }

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        (positions, vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]])
    }

    #[test]
    fn test_single_triangle() {
        let (positions, faces) = single_triangle();
        let mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_triangles_share_edge() {
        let (positions, faces) = two_triangles();
        let mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();

        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());

        let v0 = VertexId::new(0);
        let v1 = VertexId::new(1);
        let ab = mesh.halfedge_between(v0, v1).unwrap();
        let ba = mesh.halfedge_between(v1, v0).unwrap();
        assert_eq!(mesh.sym(ab), ba);
        assert_eq!(mesh.edge_of(ab), mesh.edge_of(ba));
        assert!(!mesh.is_boundary_edge(mesh.edge_of(ab)));
    }

    #[test]
    fn test_topology_invariants() {
        let (positions, faces) = quad_grid(3);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        for he in mesh.halfedge_ids() {
            assert_eq!(mesh.sym(mesh.sym(he)), he);
            assert_eq!(mesh.next(mesh.prev(he)), he);
            assert_eq!(mesh.prev(mesh.next(he)), he);
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_edge_uniqueness() {
        let (positions, faces) = quad_grid(3);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        let mut seen = HashSet::new();
        for e in mesh.edge_ids() {
            let [a, b] = mesh.edge_vertices(e);
            let key = (a.index().min(b.index()), a.index().max(b.index()));
            assert!(seen.insert(key), "duplicate edge {:?}", key);
        }

        // 3x3 grid: 12 horizontal + 12 vertical
        assert_eq!(mesh.num_edges(), 24);
        assert_eq!(count_edges(&[4; 9], &faces.concat()), 24);
    }

    #[test]
    fn test_boundary_closure() {
        let (positions, faces) = quad_grid(2);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        let boundary: Vec<_> = mesh.boundary_halfedges().collect();
        assert_eq!(boundary.len(), 8);

        for &start in &boundary {
            let mut he = start;
            let mut steps = 0;
            loop {
                assert!(mesh.is_boundary_halfedge(he));
                he = mesh.next(he);
                steps += 1;
                assert!(steps <= boundary.len());
                if he == start {
                    break;
                }
            }
            assert_eq!(steps, 8);
        }
    }

    #[test]
    fn test_closed_mesh_has_no_boundary() {
        let (positions, faces) = tetrahedron();
        let mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();

        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.boundary_halfedges().count(), 0);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v));
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_vertex_ring() {
        let (positions, faces) = quad_grid(2);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        let center = VertexId::new(4);
        assert!(!mesh.is_boundary_vertex(center));
        let mut ring: Vec<usize> = mesh.vertex_neighbors(center).map(|v| v.index()).collect();
        ring.sort_unstable();
        assert_eq!(ring, vec![1, 3, 5, 7]);
        assert_eq!(mesh.vertex_faces(center).count(), 4);

        let corner = VertexId::new(0);
        assert!(mesh.is_boundary_vertex(corner));
        assert_eq!(mesh.valence(corner), 2);
        assert_eq!(mesh.vertex_faces(corner).count(), 1);
    }

    #[test]
    fn test_face_walk() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&positions, &[vec![0, 1, 2, 3, 4]]).unwrap();

        let f = FaceId::new(0);
        let verts: Vec<usize> = mesh.face_vertices(f).map(|v| v.index()).collect();
        assert_eq!(verts, vec![0, 1, 2, 3, 4]);
        assert_eq!(mesh.face_halfedges(f).count(), 5);
        assert_eq!(mesh.face_vertex_count(f), 5);
    }

    #[test]
    fn test_roundtrip() {
        let (positions, faces) = quad_grid(2);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        let (out_positions, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_positions, positions);
        let expected: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
        assert_eq!(out_faces, expected);

        let (coords, counts, connects) = to_flat_arrays(&mesh);
        let rebuilt: HalfEdgeMesh = build_from_flat(&coords, &counts, &connects).unwrap();
        assert_eq!(rebuilt.num_edges(), mesh.num_edges());
        assert_eq!(rebuilt.num_faces(), mesh.num_faces());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0)];
        let result: Result<HalfEdgeMesh> = build(&positions, &[3], &[0, 1, 2]);
        assert_eq!(
            result.unwrap_err(),
            FormError::InvalidVertexIndex { face: 0, vertex: 1 }
        );
    }

    #[test]
    fn test_degenerate_faces() {
        let (positions, _) = single_triangle();
        let result: Result<HalfEdgeMesh> = build(&positions, &[3], &[0, 0, 2]);
        assert_eq!(result.unwrap_err(), FormError::DegenerateFace { face: 0 });

        let result: Result<HalfEdgeMesh> = build(&positions, &[2], &[0, 1]);
        assert_eq!(result.unwrap_err(), FormError::DegenerateFace { face: 0 });
    }

    #[test]
    fn test_face_count_mismatch() {
        let (positions, _) = single_triangle();
        let result: Result<HalfEdgeMesh> = build(&positions, &[4], &[0, 1, 2]);
        assert_eq!(
            result.unwrap_err(),
            FormError::FaceCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_non_manifold_directed_edge() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        // both faces run 0 -> 1
        let result: Result<HalfEdgeMesh> = build_from_triangles(&positions, &[[0, 1, 2], [0, 1, 3]]);
        assert_eq!(result.unwrap_err(), FormError::NonManifoldEdge { v0: 0, v1: 1 });
    }

    #[test]
    fn test_create_leaves_empty_on_error() {
        let (positions, faces) = quad_grid(1);
        let mut mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();
        assert_eq!(mesh.num_faces(), 1);

        assert!(mesh.create(&positions, &[3], &[0, 0, 1]).is_err());
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_edges(), 0);

        mesh.create(&positions, &[4], &[0, 1, 3, 2]).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_incremental_build_matches_batch() {
        use approx::assert_relative_eq;

        let (positions, faces) = two_triangles();
        let batch: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();

        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        for p in &positions {
            mesh.add_vertex(*p);
        }
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_edges(), 0);

        let f0 = mesh.add_polygon(&[0, 1, 2]).unwrap();
        assert_eq!(f0, FaceId::new(0));
        assert!(mesh.is_valid());
        // vertex 3 has no face yet
        assert!(!mesh.vertex(VertexId::new(3)).halfedge.is_valid());

        let f1 = mesh.add_polygon(&[1, 0, 3]).unwrap();
        assert_eq!(f1, FaceId::new(1));
        assert!(mesh.is_valid());

        assert_eq!(mesh.num_edges(), batch.num_edges());
        assert_eq!(mesh.boundary_halfedges().count(), 4);
        assert_eq!(to_face_vertex(&mesh), to_face_vertex(&batch));
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
            assert_eq!(mesh.valence(v), batch.valence(v));
        }
        assert_relative_eq!(mesh.face_normal(f1).z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_incremental_grid_is_valid() {
        let (positions, faces) = quad_grid(2);
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new();
        for p in &positions {
            mesh.add_vertex(*p);
        }
        for face in &faces {
            mesh.add_polygon(face).unwrap();
            assert!(mesh.is_valid());
        }

        assert_eq!(mesh.num_edges(), 12);
        assert!(!mesh.is_boundary_vertex(VertexId::new(4)));
        assert_eq!(mesh.boundary_halfedges().count(), 8);
    }

    #[test]
    fn test_update_polygon_rewires_face() {
        let (positions, faces) = two_triangles();
        let mut mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();
        let v4 = mesh.add_vertex(Point3::new(1.0, -1.0, 0.0));
        assert_eq!(v4, VertexId::new(4));

        mesh.update_polygon(1, &[1, 0, 4]).unwrap();
        assert!(mesh.is_valid());

        let verts: Vec<usize> = mesh.face_vertices(FaceId::new(1)).map(|v| v.index()).collect();
        assert_eq!(verts, vec![1, 0, 4]);

        // edges 0-3 and 3-1 lost their last face
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.edge_ids().count(), 5);
        let v3 = VertexId::new(3);
        assert!(mesh.halfedge_between(VertexId::new(0), v3).is_none());
        assert!(mesh.halfedge_between(v3, VertexId::new(1)).is_none());

        assert!(!mesh.vertex(v3).halfedge.is_valid());
        assert!(!mesh.is_boundary_vertex(v3));
        assert_eq!(mesh.valence(v3), 0);

        assert_eq!(mesh.boundary_halfedges().count(), 4);
        let shared = mesh.halfedge_between(VertexId::new(0), VertexId::new(1)).unwrap();
        assert!(!mesh.is_boundary_edge(mesh.edge_of(shared)));
    }

    #[test]
    fn test_update_polygon_reuses_own_edges() {
        let (positions, faces) = quad_grid(1);
        let mut mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        // split the quad into a triangle, then add the other half back
        mesh.update_polygon(0, &[0, 1, 3]).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.edge_ids().count(), 3);

        mesh.add_polygon(&[0, 3, 2]).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.edge_ids().count(), 5);
        assert_eq!(mesh.boundary_halfedges().count(), 4);
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_topology_edit_errors_leave_mesh_unchanged() {
        let (positions, faces) = two_triangles();
        let mut mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();
        let before = to_face_vertex(&mesh);

        // 1 -> 0 is owned by face 1
        assert_eq!(
            mesh.update_polygon(0, &[1, 0, 2]).unwrap_err(),
            FormError::NonManifoldEdge { v0: 1, v1: 0 }
        );
        assert_eq!(
            mesh.add_polygon(&[0, 1, 7]).unwrap_err(),
            FormError::InvalidVertexIndex { face: 2, vertex: 7 }
        );
        assert_eq!(
            mesh.add_polygon(&[2, 1, 2]).unwrap_err(),
            FormError::DegenerateFace { face: 2 }
        );
        assert_eq!(
            mesh.update_polygon(1, &[1, 0]).unwrap_err(),
            FormError::DegenerateFace { face: 1 }
        );
        assert!(matches!(
            mesh.update_polygon(5, &[0, 1, 2]),
            Err(FormError::IndexOutOfRange { .. })
        ));

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(to_face_vertex(&mesh), before);
    }

    #[test]
    fn test_flat_coords_must_be_triples() {
        let result: Result<HalfEdgeMesh> = build_from_flat(&[0.0, 1.0], &[], &[]);
        assert!(matches!(result, Err(FormError::SizeMismatch { name: "coords", .. })));
    }

    #[test]
    fn test_position_lookup() {
        let (positions, faces) = quad_grid(1);
        let mesh: HalfEdgeMesh = build_from_quads(&positions, &faces).unwrap();

        assert_eq!(
            mesh.vertex_at(&Point3::new(1.0001, 1.0, 0.0)),
            Some(VertexId::new(3))
        );
        assert_eq!(mesh.vertex_at(&Point3::new(5.0, 5.0, 0.0)), None);
    }

    #[test]
    fn test_default_attributes() {
        use crate::mesh::Color;

        let (positions, faces) = single_triangle();
        let mesh: HalfEdgeMesh = build_from_triangles(&positions, &faces).unwrap();

        let v = VertexId::new(0);
        assert_eq!(mesh.vertex_color(v), Color::RED);
        assert_eq!(mesh.vertex_weight(v), 2.0);
        assert_eq!(mesh.edge_weight(EdgeId::new(0)), 1.0);
        assert_eq!(mesh.face_color(FaceId::new(0)), Color::GREY);
        assert_eq!(mesh.attributes().edge_colors().len(), 3);
    }
}
