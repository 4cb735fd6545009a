// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Serializable description of a loaded store

use crate::dataset::Attribute;
use crate::geometry::BoundingBox;
use crate::io::{Association, DatasetKind, ScalarType};
use crate::store::MeshFileStore;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AttributeSummary {
    pub name: String,
    pub ty: ScalarType,
    pub rows: usize,
    pub columns: usize,
}

impl AttributeSummary {
    fn from_attribute(attribute: &Attribute) -> Self {
        Self {
            name: attribute.name.clone(),
            ty: attribute.ty,
            rows: attribute.data.nrows(),
            columns: attribute.data.ncols(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    /// Element type, or `"string"` for string arrays
    pub ty: String,
    pub association: Option<Association>,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub path: String,
    pub kind: DatasetKind,
    pub encoding: Option<String>,
    pub swap_bytes: bool,
    pub title: String,
    pub points: usize,
    pub polygons: usize,
    pub cells: usize,
    /// `None` when there are no points
    pub bounds: Option<BoundingBox>,
    pub point_scalars: Option<AttributeSummary>,
    pub point_vectors: Option<AttributeSummary>,
    pub cell_scalars: Option<AttributeSummary>,
    pub cell_vectors: Option<AttributeSummary>,
    pub fields: Vec<FieldSummary>,
}

impl DatasetSummary {
    pub fn from_store(path: &str, store: &MeshFileStore) -> Self {
        let dataset = store.dataset();
        let bounds = BoundingBox::from_table(store.points());

        let mut fields: Vec<FieldSummary> = dataset
            .fields
            .numeric()
            .iter()
            .map(|f| FieldSummary {
                name: f.name.clone(),
                ty: f.ty.as_str().to_string(),
                association: Some(f.association),
                rows: f.data.nrows(),
                columns: f.data.ncols(),
            })
            .collect();
        fields.extend(dataset.fields.strings().iter().map(|f| FieldSummary {
            name: f.name.clone(),
            ty: "string".to_string(),
            association: None,
            rows: f.values.len(),
            columns: 1,
        }));

        Self {
            path: path.to_string(),
            kind: store.kind(),
            encoding: store.encoding().map(|e| e.as_str().to_string()),
            swap_bytes: store.swap_bytes(),
            title: store.title().to_string(),
            points: dataset.point_count(),
            polygons: dataset.polygons.len(),
            cells: dataset.cells.len(),
            bounds: (!bounds.is_empty()).then_some(bounds),
            point_scalars: store.scalars().map(AttributeSummary::from_attribute),
            point_vectors: store.vectors().map(AttributeSummary::from_attribute),
            cell_scalars: store.cell_scalars().map(AttributeSummary::from_attribute),
            cell_vectors: store.cell_vectors().map(AttributeSummary::from_attribute),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    #[test]
    fn test_summary_lists_numeric_then_string_fields() {
        let mut store = MeshFileStore::default();
        store.set_points(Table::from_element(2, 3, 1.0)).unwrap();
        store.add_string_field("names", vec!["a".into(), "b".into()]).unwrap();
        store.add_field_values(&[1i32, 2], "labels", ScalarType::Int).unwrap();

        let summary = DatasetSummary::from_store("mem", &store);
        assert_eq!(summary.points, 2);
        assert_eq!(summary.fields[0].name, "labels");
        assert_eq!(summary.fields[1].ty, "string");
        assert!(summary.bounds.is_some());
        assert!(summary.encoding.is_none());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"labels\""));
    }
}
