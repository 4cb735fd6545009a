// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for the meshvtk binary

pub mod convert;
pub mod reporter;
pub mod summary;

pub use convert::{convert_all, convert_file, discover_inputs, ConvertResult};
pub use reporter::Reporter;
pub use summary::{AttributeSummary, DatasetSummary, FieldSummary};
