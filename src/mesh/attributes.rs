//! Per-element attribute arrays.
//!
//! Attributes are stored outside the topology records, one array per
//! attribute, indexed by the element index.

use nalgebra::{Point3, Vector3};

/// RGBA display color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Default vertex color.
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    /// Color of free particles.
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    /// Default edge color.
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    /// Default face color.
    pub const GREY: Color = Color::new(0.5, 0.5, 0.5, 1.0);

    /// Create a color from components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

/// Default weight of a new vertex.
pub const DEFAULT_VERTEX_WEIGHT: f64 = 2.0;

/// Default weight of a new edge.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Parallel attribute arrays owned by a mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshAttributes {
    pub(crate) vertex_positions: Vec<Point3<f64>>,
    pub(crate) vertex_colors: Vec<Color>,
    pub(crate) vertex_weights: Vec<f64>,
    pub(crate) vertex_normals: Vec<Vector3<f64>>,

    pub(crate) edge_colors: Vec<Color>,
    pub(crate) edge_weights: Vec<f64>,

    pub(crate) face_colors: Vec<Color>,
    pub(crate) face_normals: Vec<Vector3<f64>>,
}

impl MeshAttributes {
    pub(crate) fn with_capacity(num_vertices: usize, num_edges: usize, num_faces: usize) -> Self {
        Self {
            vertex_positions: Vec::with_capacity(num_vertices),
            vertex_colors: Vec::with_capacity(num_vertices),
            vertex_weights: Vec::with_capacity(num_vertices),
            vertex_normals: Vec::with_capacity(num_vertices),
            edge_colors: Vec::with_capacity(num_edges),
            edge_weights: Vec::with_capacity(num_edges),
            face_colors: Vec::with_capacity(num_faces),
            face_normals: Vec::with_capacity(num_faces),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.vertex_positions.clear();
        self.vertex_colors.clear();
        self.vertex_weights.clear();
        self.vertex_normals.clear();
        self.edge_colors.clear();
        self.edge_weights.clear();
        self.face_colors.clear();
        self.face_normals.clear();
    }

    pub(crate) fn push_vertex(&mut self, pos: Point3<f64>) {
        self.vertex_positions.push(pos);
        self.vertex_colors.push(Color::RED);
        self.vertex_weights.push(DEFAULT_VERTEX_WEIGHT);
        self.vertex_normals.push(Vector3::zeros());
    }

    pub(crate) fn push_edge(&mut self) {
        self.edge_colors.push(Color::TRANSPARENT);
        self.edge_weights.push(DEFAULT_EDGE_WEIGHT);
    }

    pub(crate) fn push_face(&mut self) {
        self.face_colors.push(Color::GREY);
        self.face_normals.push(Vector3::zeros());
    }

    /// Vertex positions.
    pub fn vertex_positions(&self) -> &[Point3<f64>] {
        &self.vertex_positions
    }

    /// Vertex colors.
    pub fn vertex_colors(&self) -> &[Color] {
        &self.vertex_colors
    }

    /// Vertex weights.
    pub fn vertex_weights(&self) -> &[f64] {
        &self.vertex_weights
    }

    /// Vertex normals as of the last normal update.
    pub fn vertex_normals(&self) -> &[Vector3<f64>] {
        &self.vertex_normals
    }

    /// Edge colors.
    pub fn edge_colors(&self) -> &[Color] {
        &self.edge_colors
    }

    /// Edge weights.
    pub fn edge_weights(&self) -> &[f64] {
        &self.edge_weights
    }

    /// Face colors.
    pub fn face_colors(&self) -> &[Color] {
        &self.face_colors
    }

    /// Face normals as of the last normal update.
    pub fn face_normals(&self) -> &[Vector3<f64>] {
        &self.face_normals
    }
}
