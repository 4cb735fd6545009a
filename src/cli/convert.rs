// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch re-encoding of legacy files

use crate::store::{MeshFileStore, StoreOptions};
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File extension picked up when walking directories
pub const VTK_EXTENSION: &str = "vtk";

/// Expands directories to the `*.vtk` files under them; plain files are kept as given
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).follow_links(true) {
                let entry = entry.with_context(|| format!("Failed to walk {:?}", input))?;
                let path = entry.path();
                if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(VTK_EXTENSION) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("Input not found: {:?}", input);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Loads `input` and writes it into `out_dir` under the same file name
pub fn convert_file(input: &Path, out_dir: &Path, options: &StoreOptions) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .with_context(|| format!("Input has no file name: {:?}", input))?;
    let output = out_dir.join(file_name);
    if output == input {
        bail!("Refusing to overwrite input {:?}", input);
    }

    let mut store = MeshFileStore::open_detected(input, options.clone())
        .with_context(|| format!("Failed to load {:?}", input))?;
    // the loaded title wins over the configured default
    let title = store.title().to_string();
    store.set_options(StoreOptions {
        title,
        ..options.clone()
    });
    store
        .save(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    debug!(input = %input.display(), output = %output.display(), "converted");
    Ok(output)
}

/// Outcome of one file in a batch
#[derive(Debug)]
pub struct ConvertResult {
    pub input: PathBuf,
    pub output: Result<PathBuf>,
}

/// Converts every file in parallel; one failure does not stop the others
pub fn convert_all(
    files: &[PathBuf],
    out_dir: &Path,
    options: &StoreOptions,
    progress: Option<&ProgressBar>,
) -> Result<Vec<ConvertResult>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let results = files
        .par_iter()
        .map(|input| {
            let output = convert_file(input, out_dir, options);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            ConvertResult {
                input: input.clone(),
                output,
            }
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{DatasetKind, Encoding};
    use crate::table::Table;
    use tempfile::tempdir;

    fn write_sample(path: &Path) -> Result<()> {
        let mut store = MeshFileStore::new(DatasetKind::PolyData);
        store.set_points(Table::from_row_slice(3, 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]))?;
        store.set_polygons(vec![vec![0, 1, 2]]);
        store.set_title("sample");
        store.save(path)?;
        Ok(())
    }

    #[test]
    fn test_discover_walks_directories() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested)?;
        write_sample(&dir.path().join("a.vtk"))?;
        write_sample(&nested.join("b.vtk"))?;
        std::fs::write(dir.path().join("notes.txt"), "skip me")?;

        let files = discover_inputs(&[dir.path().to_path_buf()])?;
        assert_eq!(files.len(), 2);
        assert!(discover_inputs(&[dir.path().join("missing.vtk")]).is_err());
        Ok(())
    }

    #[test]
    fn test_convert_all_to_binary() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("out");
        write_sample(&dir.path().join("a.vtk"))?;
        std::fs::write(dir.path().join("broken.vtk"), "not a vtk file\n")?;

        let files = discover_inputs(&[dir.path().to_path_buf()])?;
        let options = StoreOptions {
            binary: true,
            ..StoreOptions::default()
        };
        let results = convert_all(&files, &out, &options, None)?;

        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.output.is_ok()).count(), 1);

        let converted = MeshFileStore::open(out.join("a.vtk"), DatasetKind::PolyData)?;
        assert_eq!(converted.encoding(), Some(Encoding::Binary));
        assert_eq!(converted.title(), "sample");
        assert_eq!(converted.polygons(), &[vec![0, 1, 2]]);
        Ok(())
    }
}
