// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Legacy format constants and header tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// First line written to every file
pub const MAGIC: &str = "# vtk DataFile Version 3.0";

/// Prefix accepted on line 1 when reading
pub const MAGIC_PREFIX: &str = "# vtk DataFile Version";

pub const DEFAULT_TITLE: &str = "written by meshvtk";

/// Legacy readers stop at 256 bytes including the newline
pub const MAX_TITLE_LEN: usize = 255;

/// Marker written after the DATASET line of binary files, used to detect byte order
pub const BINARY_SENTINEL: i32 = 42;

pub const ASCII_TOKEN: &str = "ASCII";
pub const BINARY_TOKEN: &str = "BINARY";
pub const DATASET_TOKEN: &str = "DATASET";
pub const LOOKUP_TABLE_TOKEN: &str = "LOOKUP_TABLE";
pub const DEFAULT_LOOKUP_TABLE: &str = "default";
pub const FIELD_BLOCK_NAME: &str = "FieldData";
pub const STRING_TYPE_TOKEN: &str = "string";

/// Legacy cell-shape codes used in CELL_TYPES
pub mod cell_type {
    pub const VERTEX: u8 = 1;
    pub const POLY_VERTEX: u8 = 2;
    pub const LINE: u8 = 3;
    pub const POLY_LINE: u8 = 4;
    pub const TRIANGLE: u8 = 5;
    pub const TRIANGLE_STRIP: u8 = 6;
    pub const POLYGON: u8 = 7;
    pub const PIXEL: u8 = 8;
    pub const QUAD: u8 = 9;
    pub const TETRA: u8 = 10;
    pub const VOXEL: u8 = 11;
    pub const HEXAHEDRON: u8 = 12;
    pub const WEDGE: u8 = 13;
    pub const PYRAMID: u8 = 14;
}

/// Which topology block a file carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    PolyData,
    UnstructuredGrid,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::PolyData => "POLYDATA",
            DatasetKind::UnstructuredGrid => "UNSTRUCTURED_GRID",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "POLYDATA" => Some(DatasetKind::PolyData),
            "UNSTRUCTURED_GRID" => Some(DatasetKind::UnstructuredGrid),
            _ => None,
        }
    }
}

impl Default for DatasetKind {
    fn default() -> Self {
        DatasetKind::PolyData
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type token of a data section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    UnsignedChar,
    Int,
    Float,
    Double,
    Bit,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::UnsignedChar => "unsigned_char",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Bit => "bit",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "unsigned_char" => Some(ScalarType::UnsignedChar),
            "int" => Some(ScalarType::Int),
            "float" => Some(ScalarType::Float),
            "double" => Some(ScalarType::Double),
            "bit" => Some(ScalarType::Bit),
            _ => None,
        }
    }

    /// Encoded width in bytes; `None` for packed bits
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            ScalarType::UnsignedChar => Some(1),
            ScalarType::Int | ScalarType::Float => Some(4),
            ScalarType::Double => Some(8),
            ScalarType::Bit => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ScalarType::UnsignedChar | ScalarType::Int | ScalarType::Bit)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Binary,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Ascii => ASCII_TOKEN,
            Encoding::Binary => BINARY_TOKEN,
        }
    }

    /// Case-sensitive match on the encoding line
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ASCII_TOKEN => Some(Encoding::Ascii),
            BINARY_TOKEN => Some(Encoding::Binary),
            _ => None,
        }
    }
}

/// Whether an attribute belongs to points or cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Association {
    Point,
    Cell,
}

impl Association {
    pub fn keyword(&self) -> &'static str {
        match self {
            Association::Point => "POINT_DATA",
            Association::Cell => "CELL_DATA",
        }
    }
}

/// Where an attribute table is routed by `add_point_data` / `add_cell_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Scalars,
    Vectors,
    Field,
}

impl AttributeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "scalars" => Some(AttributeKind::Scalars),
            "vectors" => Some(AttributeKind::Vectors),
            "field" => Some(AttributeKind::Field),
            _ => None,
        }
    }
}
