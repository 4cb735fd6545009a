// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory dataset held by a mesh file store

mod registry;

pub use registry::{FieldRegistry, NumericField, StringField};

use crate::io::{Association, ScalarType};
use crate::table::Table;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALARS_NAME: &str = "scalars";
pub const DEFAULT_VECTORS_NAME: &str = "vectors";

/// Named SCALARS or VECTORS table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub ty: ScalarType,
    pub data: Table,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: ScalarType, data: Table) -> Self {
        Self {
            name: name.into(),
            ty,
            data,
        }
    }
}

/// SCALARS and VECTORS of one association
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub scalars: Option<Attribute>,
    pub vectors: Option<Attribute>,
}

impl AttributeSet {
    pub fn is_empty(&self) -> bool {
        self.scalars.is_none() && self.vectors.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// N×3 coordinates
    pub points: Table,
    pub polygons: Vec<Vec<u32>>,
    pub cells: Vec<Vec<u32>>,
    pub cell_types: Vec<u8>,
    pub point_data: AttributeSet,
    pub cell_data: AttributeSet,
    pub fields: FieldRegistry,
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            points: Table::zeros(0, 3),
            polygons: Vec::new(),
            cells: Vec::new(),
            cell_types: Vec::new(),
            point_data: AttributeSet::default(),
            cell_data: AttributeSet::default(),
            fields: FieldRegistry::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.nrows()
    }

    pub fn attributes(&self, association: Association) -> &AttributeSet {
        match association {
            Association::Point => &self.point_data,
            Association::Cell => &self.cell_data,
        }
    }

    pub fn attributes_mut(&mut self, association: Association) -> &mut AttributeSet {
        match association {
            Association::Point => &mut self.point_data,
            Association::Cell => &mut self.cell_data,
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    #[test]
    fn test_new_dataset_is_empty() {
        let dataset = Dataset::new();
        assert_eq!(dataset.point_count(), 0);
        assert_eq!(dataset.points.ncols(), 3);
        assert!(dataset.point_data.is_empty());
        assert!(dataset.fields.is_empty());
    }

    #[test]
    fn test_attributes_by_association() {
        let mut dataset = Dataset::new();
        dataset.attributes_mut(Association::Cell).scalars = Some(Attribute::new(
            "area",
            ScalarType::Double,
            table::column(&[1.0, 2.0]),
        ));

        assert!(dataset.attributes(Association::Point).is_empty());
        let cell = dataset.attributes(Association::Cell);
        assert_eq!(cell.scalars.as_ref().unwrap().name, "area");
        assert!(cell.vectors.is_none());
    }
}
