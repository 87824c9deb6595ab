//! Geometric queries on the half-edge store.
//!
//! Face normals are cached in the attribute arrays and refreshed by
//! [`HalfEdgeMesh::compute_normals`]. Everything else is computed on demand
//! from the current vertex positions.

use nalgebra::{Point3, Vector3};

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Average of the face's vertex positions.
    pub fn face_center(&self, f: FaceId<I>) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        if count == 0 {
            return Point3::origin();
        }
        Point3::from(sum / count as f64)
    }

    /// Cached unit normal of a face, as of the last [`compute_normals`](Self::compute_normals).
    #[inline]
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.attributes.face_normals[f.index()]
    }

    /// Cached unit normal of a vertex.
    #[inline]
    pub fn vertex_normal(&self, v: VertexId<I>) -> Vector3<f64> {
        self.attributes.vertex_normals[v.index()]
    }

    /// Unit normal of a face from the current positions (Newell's method).
    ///
    /// Works for non-planar polygons; degenerate faces yield the zero vector.
    pub fn compute_face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let n = self.newell_vector(f);
        n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Area of a face, exact for planar polygons.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        0.5 * self.newell_vector(f).norm()
    }

    fn newell_vector(&self, f: FaceId<I>) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for he in self.face_halfedges(f) {
            let a = self.position(self.origin(he));
            let b = self.position(self.target(he));
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n
    }

    /// Recompute every cached face normal and vertex normal.
    ///
    /// Vertex normals are the normalized average of the incident face normals.
    pub fn compute_normals(&mut self) {
        let face_normals: Vec<Vector3<f64>> = (0..self.faces.len())
            .map(|i| {
                let f = FaceId::new(i);
                if self.face(f).is_active() {
                    self.compute_face_normal(f)
                } else {
                    Vector3::zeros()
                }
            })
            .collect();

        let vertex_normals: Vec<Vector3<f64>> = (0..self.vertices.len())
            .map(|i| {
                let v = VertexId::new(i);
                if !self.vertex(v).is_active() {
                    return Vector3::zeros();
                }
                let sum: Vector3<f64> = self
                    .vertex_faces(v)
                    .map(|f| face_normals[f.index()])
                    .sum();
                sum.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
            })
            .collect();

        self.attributes.face_normals = face_normals;
        self.attributes.vertex_normals = vertex_normals;
    }

    /// Fan triangulation of a face around its first vertex.
    ///
    /// Returns `n - 2` triangles for an `n`-sided face.
    pub fn face_triangles(&self, f: FaceId<I>) -> Vec<[VertexId<I>; 3]> {
        let verts: Vec<VertexId<I>> = self.face_vertices(f).collect();
        if verts.len() < 3 {
            return Vec::new();
        }
        (1..verts.len() - 1)
            .map(|i| [verts[0], verts[i], verts[i + 1]])
            .collect()
    }

    /// Vector from origin to target of a half-edge.
    #[inline]
    pub fn halfedge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        self.position(self.target(he)) - self.position(self.origin(he))
    }

    /// Vector along an edge, in the direction of its first half-edge.
    #[inline]
    pub fn edge_vector(&self, e: EdgeId<I>) -> Vector3<f64> {
        self.halfedge_vector(self.edge(e).halfedges[0])
    }

    /// Current length of an edge.
    #[inline]
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        self.edge_vector(e).norm()
    }

    /// Current length of every edge, indexed by edge index.
    pub fn edge_lengths(&self) -> Vec<f64> {
        (0..self.edges.len())
            .map(|i| self.edge_length(EdgeId::new(i)))
            .collect()
    }

    /// Axis-aligned bounding box, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertex_ids().map(|v| *self.position(v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        }))
    }
}
