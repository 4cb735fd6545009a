// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file store
//!
//! Owns one [`Dataset`] and the flags that decide how it is encoded. The
//! dataset kind is fixed at construction; everything else can change between
//! saves. `swap_bytes` is only ever set by `load`.

use crate::dataset::{
    Attribute, Dataset, NumericField, StringField, DEFAULT_SCALARS_NAME, DEFAULT_VECTORS_NAME,
};
use crate::error::{VtkError, VtkResult};
use crate::geometry::MeshTopology;
use crate::io::{
    parse_header, read_dataset, validate, write_dataset, Association, AttributeKind, BinaryEncoder,
    DatasetKind, Encoding, ScalarType, Scanner, TextEncoder, ValueEncoder, WriteOptions,
    DEFAULT_TITLE,
};
use crate::table::{self, Table};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// Encoding flags for a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Write BINARY instead of ASCII
    pub binary: bool,
    /// Transpose attribute and field tables on read and write
    pub switch_rows_cols: bool,
    /// Keep only this many columns of scalar and field tables on write
    pub max_columns: Option<usize>,
    /// Element type used for POINTS on write
    pub point_type: ScalarType,
    pub title: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            binary: false,
            switch_rows_cols: false,
            max_columns: None,
            point_type: ScalarType::Float,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeshFileStore {
    kind: DatasetKind,
    options: StoreOptions,
    swap_bytes: bool,
    encoding: Option<Encoding>,
    dataset: Dataset,
}

impl MeshFileStore {
    /// Empty store for the given dataset kind
    pub fn new(kind: DatasetKind) -> Self {
        Self::with_options(kind, StoreOptions::default())
    }

    pub fn with_options(kind: DatasetKind, options: StoreOptions) -> Self {
        Self {
            kind,
            options,
            swap_bytes: false,
            encoding: None,
            dataset: Dataset::new(),
        }
    }

    /// Store bound to `path`, loaded immediately
    pub fn open(path: impl AsRef<Path>, kind: DatasetKind) -> VtkResult<Self> {
        let mut store = Self::new(kind);
        store.load(path)?;
        Ok(store)
    }

    /// Store whose kind is taken from the file's DATASET line
    pub fn open_detected(path: impl AsRef<Path>, options: StoreOptions) -> VtkResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| VtkError::io(path, e))?;
        let header = parse_header(&mut Scanner::new(&bytes))?;
        let mut store = Self::with_options(header.kind, options);
        store.load_bytes(path, &bytes)?;
        Ok(store)
    }

    /// POLYDATA store populated from a mesh's vertices and faces
    pub fn from_mesh(mesh: &impl MeshTopology) -> VtkResult<Self> {
        let mut store = Self::new(DatasetKind::PolyData);
        store.set_mesh(mesh)?;
        Ok(store)
    }

    // ---------------------------------------------------------------- I/O

    /// Replaces the dataset with the contents of `path`.
    /// On failure the current dataset is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> VtkResult<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| VtkError::io(path, e))?;
        self.load_bytes(path, &bytes)
    }

    fn load_bytes(&mut self, path: &Path, bytes: &[u8]) -> VtkResult<()> {
        let outcome = read_dataset(bytes, self.kind, self.options.switch_rows_cols)?;

        self.swap_bytes = outcome.swap_bytes;
        self.encoding = Some(outcome.header.encoding);
        self.options.title = outcome.header.title;
        self.dataset = outcome.dataset;

        info!(
            path = %path.display(),
            encoding = outcome.header.encoding.as_str(),
            swap_bytes = self.swap_bytes,
            points = self.dataset.point_count(),
            fields = self.dataset.fields.len(),
            "loaded dataset"
        );
        Ok(())
    }

    /// Writes the dataset to `path` with the current flags
    pub fn save(&self, path: impl AsRef<Path>) -> VtkResult<()> {
        let path = path.as_ref();
        let options = self.write_options();
        validate(&self.dataset, &options)?;

        let file = File::create(path).map_err(|e| VtkError::io(path, e))?;
        let out = BufWriter::new(file);
        let mut encoder: Box<dyn ValueEncoder> = if self.options.binary {
            Box::new(BinaryEncoder::new(out))
        } else {
            Box::new(TextEncoder::new(out))
        };
        write_dataset(encoder.as_mut(), &self.dataset, &options).map_err(|e| VtkError::io(path, e))?;

        info!(
            path = %path.display(),
            binary = self.options.binary,
            points = self.dataset.point_count(),
            fields = self.dataset.fields.len(),
            "saved dataset"
        );
        Ok(())
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            kind: self.kind,
            title: self.options.title.clone(),
            point_type: self.options.point_type,
            switch_rows_cols: self.options.switch_rows_cols,
            max_columns: self.options.max_columns,
        }
    }

    // ---------------------------------------------------------------- flags

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Replaces every flag except the dataset kind
    pub fn set_options(&mut self, options: StoreOptions) {
        self.options = options;
    }

    pub fn set_binary_write(&mut self, binary: bool) {
        self.options.binary = binary;
    }

    pub fn binary_write(&self) -> bool {
        self.options.binary
    }

    pub fn set_switch_rows_cols(&mut self, switch: bool) {
        self.options.switch_rows_cols = switch;
    }

    pub fn switch_rows_cols(&self) -> bool {
        self.options.switch_rows_cols
    }

    /// `None` removes the cap
    pub fn set_max_columns(&mut self, max: Option<usize>) {
        self.options.max_columns = max;
    }

    pub fn max_columns(&self) -> Option<usize> {
        self.options.max_columns
    }

    pub fn set_point_type(&mut self, ty: ScalarType) {
        self.options.point_type = ty;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.options.title = title.into();
    }

    pub fn title(&self) -> &str {
        &self.options.title
    }

    /// Whether the last binary load had to reverse byte order
    pub fn swap_bytes(&self) -> bool {
        self.swap_bytes
    }

    /// Encoding of the last loaded file
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    // ---------------------------------------------------------------- points

    pub fn points(&self) -> &Table {
        &self.dataset.points
    }

    /// Points must be N×3
    pub fn set_points(&mut self, points: Table) -> VtkResult<()> {
        if points.nrows() > 0 && points.ncols() != 3 {
            return Err(VtkError::ShapeMismatch {
                what: "point columns",
                expected: 3,
                found: points.ncols(),
            });
        }
        self.dataset.points = points;
        Ok(())
    }

    /// Points from interleaved x, y, z values
    pub fn set_points_flat(&mut self, coords: &[f32]) -> VtkResult<()> {
        if coords.len() % 3 != 0 {
            return Err(VtkError::ShapeMismatch {
                what: "interleaved coordinates",
                expected: coords.len() / 3 * 3,
                found: coords.len(),
            });
        }
        let values: Vec<f64> = coords.iter().map(|&v| v as f64).collect();
        self.dataset.points = table::from_row_major(coords.len() / 3, 3, &values);
        Ok(())
    }

    /// Interleaved x, y, z values
    pub fn points_flat(&self) -> Vec<f64> {
        table::row_major(&self.dataset.points)
    }

    /// All x values, then all y values, then all z values
    pub fn points_as_column(&self) -> DVector<f64> {
        table::to_column_vector(&self.dataset.points)
    }

    pub fn points_as_rows(&self) -> Vec<Vec<f64>> {
        self.dataset
            .points
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    // ---------------------------------------------------------------- topology

    pub fn polygons(&self) -> &[Vec<u32>] {
        &self.dataset.polygons
    }

    pub fn set_polygons(&mut self, polygons: Vec<Vec<u32>>) {
        self.dataset.polygons = polygons;
    }

    /// Polygons from a table with one polygon per row
    pub fn set_polygons_table(&mut self, polygons: &Table) -> VtkResult<()> {
        self.dataset.polygons = table::index_lists(polygons).ok_or_else(|| {
            VtkError::ShapeMismatch {
                what: "polygon indices (non-negative integers)",
                expected: polygons.len(),
                found: 0,
            }
        })?;
        Ok(())
    }

    /// Polygons as a table; `None` when polygon lengths differ
    pub fn polygons_table(&self) -> Option<Table> {
        table::from_rows(&self.dataset.polygons)
    }

    pub fn cells(&self) -> &[Vec<u32>] {
        &self.dataset.cells
    }

    pub fn cell_types(&self) -> &[u8] {
        &self.dataset.cell_types
    }

    /// Replaces the cells; the cell types are kept and must be set to match before saving
    pub fn set_cells(&mut self, cells: Vec<Vec<u32>>) {
        self.dataset.cells = cells;
    }

    pub fn set_cells_with_types(&mut self, cells: Vec<Vec<u32>>, types: Vec<u8>) -> VtkResult<()> {
        if cells.len() != types.len() {
            return Err(VtkError::ShapeMismatch {
                what: "cell types",
                expected: cells.len(),
                found: types.len(),
            });
        }
        self.dataset.cells = cells;
        self.dataset.cell_types = types;
        Ok(())
    }

    /// Replaces points and polygons with the mesh's vertices and faces
    pub fn set_mesh(&mut self, mesh: &impl MeshTopology) -> VtkResult<()> {
        let vertices = mesh.vertex_table();
        if vertices.nrows() != 3 {
            return Err(VtkError::ShapeMismatch {
                what: "vertex table rows",
                expected: 3,
                found: vertices.nrows(),
            });
        }
        self.dataset.points = vertices.transpose();
        self.dataset.polygons = mesh.faces();
        Ok(())
    }

    /// Appends a point block and its polygons, shifting the new indices past the existing points
    pub fn append_points_and_polygons(&mut self, points: &Table, polygons: &[Vec<u32>]) -> VtkResult<()> {
        if points.nrows() > 0 && points.ncols() != 3 {
            return Err(VtkError::ShapeMismatch {
                what: "point columns",
                expected: 3,
                found: points.ncols(),
            });
        }
        let offset = u32::try_from(self.dataset.point_count()).map_err(|_| VtkError::ShapeMismatch {
            what: "point count",
            expected: u32::MAX as usize,
            found: self.dataset.point_count(),
        })?;
        let shifted = polygons
            .iter()
            .map(|polygon| {
                polygon
                    .iter()
                    .map(|&i| {
                        i.checked_add(offset).ok_or(VtkError::ShapeMismatch {
                            what: "shifted polygon index",
                            expected: (u32::MAX - offset) as usize,
                            found: i as usize,
                        })
                    })
                    .collect::<VtkResult<Vec<u32>>>()
            })
            .collect::<VtkResult<Vec<_>>>()?;

        let existing = &self.dataset.points;
        let mut merged = Table::zeros(existing.nrows() + points.nrows(), 3);
        if existing.nrows() > 0 {
            merged.rows_mut(0, existing.nrows()).copy_from(existing);
        }
        if points.nrows() > 0 {
            merged.rows_mut(existing.nrows(), points.nrows()).copy_from(points);
        }
        self.dataset.points = merged;

        self.dataset.polygons.extend(shifted);
        Ok(())
    }

    // ---------------------------------------------------------------- attributes

    pub fn scalars(&self) -> Option<&Attribute> {
        self.dataset.point_data.scalars.as_ref()
    }

    /// Point scalars under the default name, as float
    pub fn set_scalars(&mut self, data: Table) {
        self.set_named_scalars(DEFAULT_SCALARS_NAME, ScalarType::Float, data);
    }

    pub fn set_named_scalars(&mut self, name: impl Into<String>, ty: ScalarType, data: Table) {
        self.dataset.point_data.scalars = Some(Attribute::new(name, ty, data));
    }

    /// One scalar per point
    pub fn set_scalar_values<T: Copy + Into<f64>>(&mut self, values: &[T]) {
        self.set_scalars(table::column(values));
    }

    /// First column of the point scalars
    pub fn scalar_values(&self) -> Vec<f64> {
        self.scalars()
            .filter(|s| s.data.ncols() > 0)
            .map(|s| s.data.column(0).iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn vectors(&self) -> Option<&Attribute> {
        self.dataset.point_data.vectors.as_ref()
    }

    /// Point vectors under the default name, as float
    pub fn set_vectors(&mut self, data: Table) {
        self.set_named_vectors(DEFAULT_VECTORS_NAME, ScalarType::Float, data);
    }

    pub fn set_named_vectors(&mut self, name: impl Into<String>, ty: ScalarType, data: Table) {
        self.dataset.point_data.vectors = Some(Attribute::new(name, ty, data));
    }

    pub fn cell_scalars(&self) -> Option<&Attribute> {
        self.dataset.cell_data.scalars.as_ref()
    }

    pub fn cell_vectors(&self) -> Option<&Attribute> {
        self.dataset.cell_data.vectors.as_ref()
    }

    /// Routes a table to point SCALARS, VECTORS or a point field
    pub fn add_point_data(
        &mut self,
        data: Table,
        name: &str,
        ty: ScalarType,
        kind: AttributeKind,
    ) -> VtkResult<()> {
        self.add_attribute(Association::Point, data, name, ty, kind)
    }

    /// Routes a table to cell SCALARS, VECTORS or a cell field
    pub fn add_cell_data(
        &mut self,
        data: Table,
        name: &str,
        ty: ScalarType,
        kind: AttributeKind,
    ) -> VtkResult<()> {
        self.add_attribute(Association::Cell, data, name, ty, kind)
    }

    fn add_attribute(
        &mut self,
        association: Association,
        data: Table,
        name: &str,
        ty: ScalarType,
        kind: AttributeKind,
    ) -> VtkResult<()> {
        match kind {
            AttributeKind::Scalars => {
                self.dataset.attributes_mut(association).scalars = Some(Attribute::new(name, ty, data));
            }
            AttributeKind::Vectors => {
                self.dataset.attributes_mut(association).vectors = Some(Attribute::new(name, ty, data));
            }
            AttributeKind::Field => {
                self.dataset.fields.upsert(NumericField {
                    name: name.to_string(),
                    ty,
                    association,
                    data,
                })?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------- fields

    /// Adds or overwrites a point-associated numeric field
    pub fn add_field_data(&mut self, data: Table, name: &str, ty: ScalarType) -> VtkResult<()> {
        self.add_point_data(data, name, ty, AttributeKind::Field)
    }

    /// Single-column numeric field
    pub fn add_field_values<T: Copy + Into<f64>>(
        &mut self,
        values: &[T],
        name: &str,
        ty: ScalarType,
    ) -> VtkResult<()> {
        self.add_field_data(table::column(values), name, ty)
    }

    /// Overwrites data and type of a field, appending it if absent
    pub fn replace_field_data(&mut self, data: Table, name: &str, ty: ScalarType) -> VtkResult<()> {
        let association = self
            .dataset
            .fields
            .get(name)
            .map(|f| f.association)
            .unwrap_or(Association::Point);
        self.dataset.fields.upsert(NumericField {
            name: name.to_string(),
            ty,
            association,
            data,
        })
    }

    /// Overwrites the data of a field, keeping its declared type; new fields are float
    pub fn set_field(&mut self, name: &str, data: Table) -> VtkResult<()> {
        let ty = self
            .dataset
            .fields
            .get(name)
            .map(|f| f.ty)
            .unwrap_or(ScalarType::Float);
        self.replace_field_data(data, name, ty)
    }

    pub fn field(&self, name: &str) -> VtkResult<&Table> {
        self.dataset.fields.get(name).map(|f| &f.data)
    }

    /// Field together with its registry position
    pub fn field_with_index(&self, name: &str) -> VtkResult<(usize, &NumericField)> {
        let index = self
            .dataset
            .fields
            .position(name)
            .ok_or_else(|| VtkError::FieldNotFound(name.to_string()))?;
        Ok((index, &self.dataset.fields.numeric()[index]))
    }

    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.dataset.fields.name(index)
    }

    /// Number of numeric fields
    pub fn number_of_fields(&self) -> usize {
        self.dataset.fields.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.dataset.fields.numeric().iter().map(|f| f.name.as_str()).collect()
    }

    /// Stores strings verbatim; they must not contain newlines
    pub fn add_string_field(&mut self, name: &str, values: Vec<String>) -> VtkResult<()> {
        if let Some(bad) = values.iter().position(|v| v.contains('\n')) {
            return Err(VtkError::ShapeMismatch {
                what: "string lines (entry contains a newline)",
                expected: 1,
                found: bad,
            });
        }
        self.dataset.fields.upsert_string(StringField {
            name: name.to_string(),
            values,
        })
    }

    pub fn string_field(&self, name: &str) -> VtkResult<&[String]> {
        self.dataset.fields.get_string(name).map(|f| f.values.as_slice())
    }

    /// Drops every numeric and string field
    pub fn clear_fields(&mut self) {
        self.dataset.fields.clear();
    }

    pub fn string_field_names(&self) -> Vec<&str> {
        self.dataset.fields.strings().iter().map(|f| f.name.as_str()).collect()
    }
}

impl Default for MeshFileStore {
    fn default() -> Self {
        Self::new(DatasetKind::PolyData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SurfaceMesh;
    use nalgebra::Point3;

    #[test]
    fn test_set_points_rejects_wrong_width() {
        let mut store = MeshFileStore::default();
        let err = store.set_points(Table::zeros(4, 2)).unwrap_err();
        assert!(matches!(err, VtkError::ShapeMismatch { expected: 3, found: 2, .. }));
        assert!(store.set_points(Table::zeros(4, 3)).is_ok());
    }

    #[test]
    fn test_flat_points() {
        let mut store = MeshFileStore::default();
        store.set_points_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(store.points().shape(), (2, 3));
        assert_eq!(store.points_flat(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(store.points_as_column().as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        assert!(store.set_points_flat(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_append_renumbers_polygons() {
        let mut store = MeshFileStore::default();
        store.set_points(Table::zeros(3, 3)).unwrap();
        store.set_polygons(vec![vec![0, 1, 2]]);

        store
            .append_points_and_polygons(&Table::from_element(3, 3, 1.0), &[vec![0, 2, 1]])
            .unwrap();

        assert_eq!(store.points().nrows(), 6);
        assert_eq!(store.points()[(4, 0)], 1.0);
        assert_eq!(store.points()[(2, 0)], 0.0);
        assert_eq!(store.polygons(), &[vec![0, 1, 2], vec![3, 5, 4]]);
    }

    #[test]
    fn test_append_index_overflow_is_rejected() {
        let mut store = MeshFileStore::default();
        store.set_points(Table::zeros(4, 3)).unwrap();
        store.set_polygons(vec![vec![0, 1, 2, 3]]);

        let err = store
            .append_points_and_polygons(&Table::zeros(1, 3), &[vec![u32::MAX - 1]])
            .unwrap_err();
        assert!(matches!(err, VtkError::ShapeMismatch { what: "shifted polygon index", .. }));
        assert_eq!(store.points().nrows(), 4);
        assert_eq!(store.polygons(), &[vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_from_mesh() {
        let mesh = SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2]],
        );
        let store = MeshFileStore::from_mesh(&mesh).unwrap();
        assert_eq!(store.points().shape(), (3, 3));
        assert_eq!(store.points()[(1, 0)], 1.0);
        assert_eq!(store.polygons_table().unwrap().shape(), (1, 3));
    }

    #[test]
    fn test_field_accessors() {
        let mut store = MeshFileStore::default();
        store.add_field_values(&[1i32, 2, 3], "A", ScalarType::Int).unwrap();
        store.add_field_values(&[0.5f32], "B", ScalarType::Float).unwrap();

        assert_eq!(store.number_of_fields(), 2);
        assert_eq!(store.field_name(1), Some("B"));
        assert_eq!(store.field("A").unwrap().nrows(), 3);
        assert!(matches!(store.field("C"), Err(VtkError::FieldNotFound(_))));

        store.set_field("A", Table::zeros(2, 2)).unwrap();
        let (index, field) = store.field_with_index("A").unwrap();
        assert_eq!(index, 0);
        assert_eq!(field.ty, ScalarType::Int);
        assert_eq!(field.data.shape(), (2, 2));

        store.set_field("D", Table::zeros(1, 1)).unwrap();
        assert_eq!(store.field_names(), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_string_field_conflict() {
        let mut store = MeshFileStore::default();
        store.add_field_values(&[1.0], "labels", ScalarType::Double).unwrap();
        assert!(matches!(
            store.add_string_field("labels", vec!["x".into()]),
            Err(VtkError::FieldKindConflict(_))
        ));
        assert!(store.add_string_field("names", vec!["bad\nvalue".into()]).is_err());
        store.add_string_field("names", vec!["left caudate".into()]).unwrap();
        assert_eq!(store.string_field("names").unwrap(), &["left caudate".to_string()]);
    }

    #[test]
    fn test_attribute_routing() {
        let mut store = MeshFileStore::default();
        store
            .add_point_data(Table::zeros(2, 3), "normals", ScalarType::Float, AttributeKind::Vectors)
            .unwrap();
        store
            .add_cell_data(Table::zeros(1, 1), "area", ScalarType::Double, AttributeKind::Scalars)
            .unwrap();
        store
            .add_cell_data(Table::zeros(1, 2), "extra", ScalarType::Double, AttributeKind::Field)
            .unwrap();

        assert_eq!(store.vectors().unwrap().name, "normals");
        assert_eq!(store.cell_scalars().unwrap().name, "area");
        assert_eq!(
            store.field_with_index("extra").unwrap().1.association,
            Association::Cell
        );
    }

    #[test]
    fn test_scalar_values() {
        let mut store = MeshFileStore::default();
        store.set_scalar_values(&[1.5f32, 2.5]);
        assert_eq!(store.scalars().unwrap().name, DEFAULT_SCALARS_NAME);
        assert_eq!(store.scalar_values(), vec![1.5, 2.5]);

        store.set_vectors(Table::zeros(2, 3));
        assert_eq!(store.vectors().unwrap().name, DEFAULT_VECTORS_NAME);
    }
}
