// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshvtk
//!
//! Reader and writer for legacy VTK-style mesh files. A [`MeshFileStore`]
//! owns one dataset (points, polygons or typed cells, point/cell attributes
//! and named numeric or string fields) and loads or saves it in ASCII or
//! big-endian binary encoding.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod io;
pub mod store;
pub mod table;

pub use config::StoreConfig;
pub use dataset::{Attribute, Dataset, NumericField, StringField};
pub use error::{VtkError, VtkResult};
pub use geometry::{BoundingBox, MeshTopology, SurfaceMesh};
pub use io::{cell_type, Association, AttributeKind, DatasetKind, Encoding, ScalarType};
pub use store::{MeshFileStore, StoreOptions};
pub use table::Table;

/// Load a POLYDATA file
pub fn load_polydata(path: impl AsRef<std::path::Path>) -> VtkResult<MeshFileStore> {
    MeshFileStore::open(path, DatasetKind::PolyData)
}

/// Load a file of either kind
pub fn load_any(path: impl AsRef<std::path::Path>) -> VtkResult<MeshFileStore> {
    MeshFileStore::open_detected(path, StoreOptions::default())
}
