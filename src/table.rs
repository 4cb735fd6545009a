// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D numeric tables
//!
//! Every point, attribute and field array is held as a dense `f64` matrix.
//! Element types declared in the file only affect encoding.

use nalgebra::{DMatrix, DVector};

pub type Table = DMatrix<f64>;

/// Builds a table from row-major values
pub fn from_row_major(rows: usize, cols: usize, values: &[f64]) -> Table {
    DMatrix::from_row_slice(rows, cols, values)
}

/// Builds a table from equal-length rows; `None` if the rows are ragged
pub fn from_rows<T: Copy + Into<f64>>(rows: &[Vec<T>]) -> Option<Table> {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if rows.iter().any(|r| r.len() != cols) {
        return None;
    }
    let flat: Vec<f64> = rows.iter().flatten().map(|&v| v.into()).collect();
    Some(from_row_major(rows.len(), cols, &flat))
}

/// Single-column table
pub fn column<T: Copy + Into<f64>>(values: &[T]) -> Table {
    let flat: Vec<f64> = values.iter().map(|&v| v.into()).collect();
    DMatrix::from_column_slice(flat.len(), 1, &flat)
}

/// Values in row-major order
pub fn row_major(table: &Table) -> Vec<f64> {
    table.transpose().as_slice().to_vec()
}

/// Row-major values restricted to the first `cols` columns
pub fn row_major_clamped(table: &Table, cols: usize) -> Vec<f64> {
    let cols = cols.min(table.ncols());
    let mut values = Vec::with_capacity(table.nrows() * cols);
    for row in table.row_iter() {
        values.extend(row.iter().take(cols).copied());
    }
    values
}

/// Stacks all values column by column into one vector
pub fn to_column_vector(table: &Table) -> DVector<f64> {
    DVector::from_column_slice(table.as_slice())
}

/// Fixed-width index table to index lists; fails on negative or fractional entries
pub fn index_lists(table: &Table) -> Option<Vec<Vec<u32>>> {
    table
        .row_iter()
        .map(|row| {
            row.iter()
                .map(|&v| {
                    if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                        Some(v as u32)
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect()
}
