//! Core mesh data structures.
//!
//! This module provides the half-edge store used to represent polygonal
//! surfaces (triangles, quads and general n-gons) during form finding.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`]. Topology records (vertices,
//! half-edges, edges, faces) live in index-addressed arenas; positions,
//! colors, weights and normals live in parallel attribute arrays
//! ([`MeshAttributes`]).
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`EdgeId`] - Identifies an edge (a half-edge pair)
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`]),
//! so `u16`, `u32` or `u64` can be chosen based on mesh size.
//!
//! # Construction
//!
//! ```
//! use formfind::mesh::{HalfEdgeMesh, build_from_quads};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_quads(&positions, &[[0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.boundary_halfedges().count(), 4);
//! ```

mod attributes;
mod builder;
mod geometry;
mod halfedge;
mod index;

pub use attributes::{Color, MeshAttributes, DEFAULT_EDGE_WEIGHT, DEFAULT_VERTEX_WEIGHT};
pub use builder::{
    build, build_from_flat, build_from_polygons, build_from_quads, build_from_triangles,
    count_edges, to_face_vertex, to_flat_arrays,
};
pub use halfedge::{
    Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
    POSITION_PRECISION,
};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
