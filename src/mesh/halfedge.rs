//! Half-edge topology store.
//!
//! The store keeps four arenas (vertices, half-edges, edges, faces) whose
//! records refer to each other only through typed indices. Geometry and
//! display attributes live in parallel arrays (see [`MeshAttributes`]) so that
//! moving a vertex never touches a topology record.
//!
//! # Conventions
//!
//! - A half-edge stores its **terminal** vertex. Its origin is the terminal
//!   vertex of its `sym`.
//! - Half-edges are allocated in consecutive pairs `(2e, 2e + 1)` forming
//!   edge `e`, so `sym(h)` is always the other member of the pair.
//! - Boundary half-edges have no face. After construction their `next`/`prev`
//!   links form closed boundary loops.
//! - A vertex stores one outgoing half-edge. Walking `next(sym(h))` visits
//!   every outgoing half-edge of that vertex.

use std::collections::HashMap;

use nalgebra::Point3;

use super::attributes::{Color, MeshAttributes};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{FormError, Result};

/// Decimal precision used by the position lookup table.
pub const POSITION_PRECISION: i32 = 3;

/// A vertex record.
#[derive(Debug, Clone, Copy)]
pub struct Vertex<I: MeshIndex = u32> {
    /// Own index; the sentinel marks a removed vertex.
    pub id: VertexId<I>,

    /// One outgoing half-edge, invalid for isolated vertices.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex record.
    pub fn new(id: VertexId<I>) -> Self {
        Self {
            id,
            halfedge: HalfEdgeId::invalid(),
        }
    }

    /// Whether the record is in use.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_valid()
    }
}

/// A half-edge record.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// Own index.
    pub id: HalfEdgeId<I>,

    /// The vertex this half-edge points to.
    pub vertex: VertexId<I>,

    /// The edge this half-edge belongs to.
    pub edge: EdgeId<I>,

    /// The face on the left, invalid on the boundary.
    pub face: FaceId<I>,

    /// Previous half-edge around the face (or boundary loop).
    pub prev: HalfEdgeId<I>,

    /// Next half-edge around the face (or boundary loop).
    pub next: HalfEdgeId<I>,

    /// The opposite half-edge.
    pub sym: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a half-edge with only its identity and terminal vertex set.
    pub fn new(id: HalfEdgeId<I>, vertex: VertexId<I>, edge: EdgeId<I>) -> Self {
        Self {
            id,
            vertex,
            edge,
            face: FaceId::invalid(),
            prev: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            sym: id.pair(),
        }
    }

    /// Whether the record is in use.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_valid()
    }

    /// Whether this half-edge has no face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// An edge record: two half-edges allocated together.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// Own index.
    pub id: EdgeId<I>,

    /// The half-edge pair, `[2 * id, 2 * id + 1]`.
    pub halfedges: [HalfEdgeId<I>; 2],
}

impl<I: MeshIndex> Edge<I> {
    /// Create the edge record for pair `id`.
    pub fn new(id: EdgeId<I>) -> Self {
        Self {
            id,
            halfedges: [
                HalfEdgeId::new(id.index() * 2),
                HalfEdgeId::new(id.index() * 2 + 1),
            ],
        }
    }

    /// Whether the record is in use.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_valid()
    }
}

/// A face record.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// Own index.
    pub id: FaceId<I>,

    /// One half-edge of the face loop.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face record with no loop yet.
    pub fn new(id: FaceId<I>) -> Self {
        Self {
            id,
            halfedge: HalfEdgeId::invalid(),
        }
    }

    /// Whether the record is in use.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_valid()
    }
}

/// Indexed half-edge mesh for polygonal surfaces.
///
/// Faces may have any number of sides. Construction goes through
/// [`build`](super::build) and its convenience wrappers.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,

    pub(crate) attributes: MeshAttributes,

    /// Directed vertex pair to the half-edge running between them.
    pub(crate) halfedge_map: HashMap<(usize, usize), HalfEdgeId<I>>,

    /// Quantized position to vertex.
    pub(crate) position_map: HashMap<[i64; 3], VertexId<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            attributes: MeshAttributes::default(),
            halfedge_map: HashMap::new(),
            position_map: HashMap::new(),
        }
    }

    /// Create an empty mesh with reserved storage.
    pub fn with_capacity(num_vertices: usize, num_edges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_edges * 2),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
            attributes: MeshAttributes::with_capacity(num_vertices, num_edges, num_faces),
            halfedge_map: HashMap::with_capacity(num_edges * 2),
            position_map: HashMap::with_capacity(num_vertices),
        }
    }

    /// Remove every record and attribute.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.halfedges.clear();
        self.edges.clear();
        self.faces.clear();
        self.attributes.clear();
        self.halfedge_map.clear();
        self.position_map.clear();
    }

    // ==================== Accessors ====================

    /// Number of vertex records.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edge records.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of edge records.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of face records.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get a vertex record.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a half-edge record.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get an edge record.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face record.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Resolve a raw vertex index, failing if it is out of range or inactive.
    pub fn checked_vertex(&self, index: usize) -> Result<VertexId<I>> {
        match self.vertices.get(index) {
            Some(v) if v.is_active() => Ok(v.id),
            _ => Err(FormError::IndexOutOfRange {
                kind: "vertex",
                index,
                len: self.vertices.len(),
            }),
        }
    }

    /// Resolve a raw edge index, failing if it is out of range.
    pub fn checked_edge(&self, index: usize) -> Result<EdgeId<I>> {
        match self.edges.get(index) {
            Some(e) if e.is_active() => Ok(e.id),
            _ => Err(FormError::IndexOutOfRange {
                kind: "edge",
                index,
                len: self.edges.len(),
            }),
        }
    }

    /// Resolve a raw face index, failing if it is out of range.
    pub fn checked_face(&self, index: usize) -> Result<FaceId<I>> {
        match self.faces.get(index) {
            Some(f) if f.is_active() => Ok(f.id),
            _ => Err(FormError::IndexOutOfRange {
                kind: "face",
                index,
                len: self.faces.len(),
            }),
        }
    }

    // ==================== Attributes ====================

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.attributes.vertex_positions[v.index()]
    }

    /// Move a vertex. The position lookup table is not updated.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.attributes.vertex_positions[v.index()] = pos;
    }

    /// All vertex positions, indexed by vertex index.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.attributes.vertex_positions
    }

    #[inline]
    pub(crate) fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.attributes.vertex_positions
    }

    /// Read-only view of every attribute array.
    #[inline]
    pub fn attributes(&self) -> &MeshAttributes {
        &self.attributes
    }

    /// Display color of a vertex.
    #[inline]
    pub fn vertex_color(&self, v: VertexId<I>) -> Color {
        self.attributes.vertex_colors[v.index()]
    }

    /// Set the display color of a vertex.
    #[inline]
    pub fn set_vertex_color(&mut self, v: VertexId<I>, color: Color) {
        self.attributes.vertex_colors[v.index()] = color;
    }

    /// Scalar weight of a vertex.
    #[inline]
    pub fn vertex_weight(&self, v: VertexId<I>) -> f64 {
        self.attributes.vertex_weights[v.index()]
    }

    /// Set the scalar weight of a vertex.
    #[inline]
    pub fn set_vertex_weight(&mut self, v: VertexId<I>, weight: f64) {
        self.attributes.vertex_weights[v.index()] = weight;
    }

    /// Display color of an edge.
    #[inline]
    pub fn edge_color(&self, e: EdgeId<I>) -> Color {
        self.attributes.edge_colors[e.index()]
    }

    /// Set the display color of an edge.
    #[inline]
    pub fn set_edge_color(&mut self, e: EdgeId<I>, color: Color) {
        self.attributes.edge_colors[e.index()] = color;
    }

    /// Scalar weight of an edge.
    #[inline]
    pub fn edge_weight(&self, e: EdgeId<I>) -> f64 {
        self.attributes.edge_weights[e.index()]
    }

    /// Display color of a face.
    #[inline]
    pub fn face_color(&self, f: FaceId<I>) -> Color {
        self.attributes.face_colors[f.index()]
    }

    /// Set the display color of a face.
    #[inline]
    pub fn set_face_color(&mut self, f: FaceId<I>, color: Color) {
        self.attributes.face_colors[f.index()] = color;
    }

    /// Find the vertex stored at `pos`, compared at [`POSITION_PRECISION`] decimals.
    ///
    /// Lookups use the positions vertices were created at.
    pub fn vertex_at(&self, pos: &Point3<f64>) -> Option<VertexId<I>> {
        self.position_map.get(&quantize(pos)).copied()
    }

    // ==================== Topology Queries ====================

    /// The opposite half-edge.
    #[inline]
    pub fn sym(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).sym
    }

    /// The next half-edge around the face or boundary loop.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// The previous half-edge around the face or boundary loop.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// The terminal vertex of a half-edge.
    #[inline]
    pub fn target(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).vertex
    }

    /// The start vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.target(self.sym(he))
    }

    /// The edge owning a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// The face of a half-edge, invalid on the boundary.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// The two vertices of an edge, in the direction of its first half-edge.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let he = self.edge(e).halfedges[0];
        [self.origin(he), self.target(he)]
    }

    /// The half-edge running from `a` to `b`, if the two are connected.
    pub fn halfedge_between(&self, a: VertexId<I>, b: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.halfedge_map.get(&(a.index(), b.index())).copied()
    }

    /// Whether a half-edge has no face.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Whether either half-edge of an edge has no face.
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let [h0, h1] = self.edge(e).halfedges;
        self.is_boundary_halfedge(h0) || self.is_boundary_halfedge(h1)
    }

    /// Whether a vertex touches a face-less half-edge.
    ///
    /// Isolated vertices are not on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.sym(he)))
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    // ==================== Iteration ====================

    /// Active vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices.iter().filter(|v| v.is_active()).map(|v| v.id)
    }

    /// Active half-edge ids.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges.iter().filter(|h| h.is_active()).map(|h| h.id)
    }

    /// Active edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edges.iter().filter(|e| e.is_active()).map(|e| e.id)
    }

    /// Active face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces.iter().filter(|f| f.is_active()).map(|f| f.id)
    }

    /// Face-less half-edges.
    pub fn boundary_halfedges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedge_ids().filter(|&he| self.is_boundary_halfedge(he))
    }

    /// Outgoing half-edges of a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// One-ring neighbours of a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.target(he))
    }

    /// Faces around a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v).filter_map(|he| self.face_of(he).valid())
    }

    /// Half-edges of a face loop ("face edges").
    ///
    /// Empty when the face's starting half-edge is inactive.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Vertices of a face in loop order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Number of sides of a face.
    pub fn face_vertex_count(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    // ==================== Validation ====================

    /// Check every connectivity invariant of the store.
    ///
    /// Verifies `sym(sym(h)) == h`, `next(prev(h)) == h`, `prev(next(h)) == h`,
    /// pair allocation of edges, that every face loop closes on its own face,
    /// and that every vertex's half-edge starts at that vertex.
    pub fn is_valid(&self) -> bool {
        for he in self.halfedges.iter().filter(|h| h.is_active()) {
            let id = he.id;
            if !he.sym.is_valid() || self.sym(he.sym) != id {
                return false;
            }
            if !he.next.is_valid() || !he.prev.is_valid() {
                return false;
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            if self.edge(he.edge).halfedges[id.index() % 2] != id {
                return false;
            }
            // consecutive half-edges chain head to tail
            if self.origin(he.next) != he.vertex {
                return false;
            }
        }

        for f in self.faces.iter().filter(|f| f.is_active()) {
            let mut count = 0;
            for he in self.face_halfedges(f.id) {
                if self.face_of(he) != f.id {
                    return false;
                }
                count += 1;
                if count > self.halfedges.len() {
                    return false;
                }
            }
            if count < 3 {
                return false;
            }
        }

        for v in self.vertices.iter().filter(|v| v.is_active()) {
            if v.halfedge.is_valid() && self.origin(v.halfedge) != v.id {
                return false;
            }
        }

        true
    }
}

/// Quantize a position for the lookup table.
pub(crate) fn quantize(pos: &Point3<f64>) -> [i64; 3] {
    let factor = 10f64.powi(POSITION_PRECISION);
    [
        (pos.x * factor).round() as i64,
        (pos.y * factor).round() as i64,
        (pos.z * factor).round() as i64,
    ]
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // current runs v -> w, its sym runs w -> v, and the half-edge after
        // the sym leaves v again.
        self.current = self.mesh.next(self.mesh.sym(self.current));

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the half-edges of a face loop.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        let active = start.is_valid() && mesh.halfedge(start).is_active();
        Self {
            mesh,
            start,
            current: start,
            done: !active,
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}
