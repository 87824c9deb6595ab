//! Geometric measurements on meshes.
//!
//! - **Curvature**: discrete Gaussian curvature as angle defect
//! - **Geometry**: closest points between lines, point-plane distance, corner angles

pub mod curvature;
pub mod geometry;
