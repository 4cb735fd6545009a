// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named field arrays in insertion order, point fields first

use crate::error::{VtkError, VtkResult};
use crate::io::{Association, ScalarType};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Numeric field array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    pub name: String,
    pub ty: ScalarType,
    pub association: Association,
    pub data: Table,
}

/// String field array, one entry per line on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringField {
    pub name: String,
    pub values: Vec<String>,
}

/// Names are unique within each kind and never shared across kinds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistry {
    numeric: Vec<NumericField>,
    strings: Vec<StringField>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.strings.is_empty()
    }

    pub fn numeric(&self) -> &[NumericField] {
        &self.numeric
    }

    pub fn strings(&self) -> &[StringField] {
        &self.strings
    }

    pub fn numeric_with(&self, association: Association) -> impl Iterator<Item = &NumericField> {
        self.numeric
            .iter()
            .filter(move |f| f.association == association)
    }

    pub fn len(&self) -> usize {
        self.numeric.len()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.numeric.get(index).map(|f| f.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.numeric.iter().position(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> VtkResult<&NumericField> {
        self.numeric
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| VtkError::FieldNotFound(name.to_string()))
    }

    pub fn get_string(&self, name: &str) -> VtkResult<&StringField> {
        self.strings
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| VtkError::FieldNotFound(name.to_string()))
    }

    /// Overwrites a numeric field in place, or inserts a new one
    ///
    /// Point fields always precede cell fields, matching the order the
    /// POINT_DATA and CELL_DATA blocks are written in. A field whose
    /// association changes moves to the end of its new group.
    pub fn upsert(&mut self, field: NumericField) -> VtkResult<()> {
        if self.strings.iter().any(|f| f.name == field.name) {
            return Err(VtkError::FieldKindConflict(field.name));
        }
        match self.numeric.iter().position(|f| f.name == field.name) {
            Some(index) if self.numeric[index].association == field.association => {
                self.numeric[index] = field;
            }
            Some(index) => {
                self.numeric.remove(index);
                self.insert_grouped(field);
            }
            None => self.insert_grouped(field),
        }
        Ok(())
    }

    fn insert_grouped(&mut self, field: NumericField) {
        let at = match field.association {
            Association::Point => self
                .numeric
                .iter()
                .position(|f| f.association == Association::Cell)
                .unwrap_or(self.numeric.len()),
            Association::Cell => self.numeric.len(),
        };
        self.numeric.insert(at, field);
    }

    /// Overwrites a string field in place, or appends a new one
    pub fn upsert_string(&mut self, field: StringField) -> VtkResult<()> {
        if self.numeric.iter().any(|f| f.name == field.name) {
            return Err(VtkError::FieldKindConflict(field.name));
        }
        match self.strings.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.strings.push(field),
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.numeric.clear();
        self.strings.clear();
    }
}
