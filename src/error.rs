// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the mesh file store

use crate::io::DatasetKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the store
pub type VtkResult<T> = Result<T, VtkError>;

/// Failures raised while reading, writing or querying a dataset
#[derive(Error, Debug)]
pub enum VtkError {
    /// Header tokens absent or unexpected
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// The file's DATASET token disagrees with the kind the store was opened for
    #[error("Dataset kind mismatch: expected {expected}, file declares {found}")]
    DatasetKindMismatch {
        expected: DatasetKind,
        found: DatasetKind,
    },

    /// Declared counts exceed the available data, or a value failed to parse
    #[error("Truncated or corrupt file in {section} at byte {offset}: {reason}")]
    TruncatedOrCorrupt {
        section: String,
        offset: usize,
        reason: String,
    },

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A name is already used by a field of the other kind (numeric vs string)
    #[error("Field '{0}' already exists with a different kind")]
    FieldKindConflict(String),

    /// A table or list does not have the shape the format requires
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Array names are single tokens on disk
    #[error("Invalid array name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VtkError {
    pub(crate) fn corrupt(section: &str, offset: usize, reason: impl Into<String>) -> Self {
        VtkError::TruncatedOrCorrupt {
            section: section.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VtkError::Io {
            path: path.into(),
            source,
        }
    }
}
