// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surface mesh representation

use super::BoundingBox;
use crate::table::Table;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Anything that can hand the store its vertices and faces
pub trait MeshTopology {
    /// Vertices as a 3×N table, one column per vertex
    fn vertex_table(&self) -> Table;

    /// Faces as variable-length vertex index lists
    fn faces(&self) -> Vec<Vec<u32>>;
}

/// Polygonal surface mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Vec<u32>>,
}

impl SurfaceMesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<u32>>) -> Self {
        Self { vertices, faces }
    }

    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    pub fn add_face(&mut self, face: Vec<u32>) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter())
    }

    /// Merge with another mesh, shifting its face indices past our vertices
    pub fn merge(&mut self, other: &SurfaceMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|face| face.iter().map(|&i| i + offset).collect::<Vec<u32>>()),
        );
    }

    /// Rebuild a mesh from an N×3 point table and polygon lists
    pub fn from_table(points: &Table, faces: Vec<Vec<u32>>) -> Self {
        let vertices = points
            .row_iter()
            .filter(|row| row.len() == 3)
            .map(|row| Point3::new(row[0], row[1], row[2]))
            .collect();
        Self { vertices, faces }
    }
}

impl MeshTopology for SurfaceMesh {
    fn vertex_table(&self) -> Table {
        Table::from_fn(3, self.vertices.len(), |axis, i| self.vertices[i][axis])
    }

    fn faces(&self) -> Vec<Vec<u32>> {
        self.faces.clone()
    }
}
