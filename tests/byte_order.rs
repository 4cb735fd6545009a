// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Byte-order detection on binary files

use anyhow::Result;
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use meshvtk::{DatasetKind, MeshFileStore, VtkError};
use std::io::Write;
use tempfile::tempdir;

/// A binary POLYDATA file written by a little-endian producer
fn little_endian_file(sentinel: i32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes.write_all(b"# vtk DataFile Version 3.0\nlittle endian\nBINARY\nDATASET POLYDATA\n")?;
    bytes.write_i32::<LittleEndian>(sentinel)?;
    bytes.write_all(b"\nPOINTS 3 float\n")?;
    for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.5, 0.0] {
        bytes.write_f32::<LittleEndian>(v)?;
    }
    bytes.write_all(b"\nPOLYGONS 1 4\n")?;
    for v in [3i32, 0, 1, 2] {
        bytes.write_i32::<LittleEndian>(v)?;
    }
    bytes.write_all(b"\nPOINT_DATA 3\nFIELD FieldData 1\nweights 1 3 double\n")?;
    for v in [0.125f64, -4.0, 1e10] {
        bytes.write_f64::<LittleEndian>(v)?;
    }
    bytes.write_all(b"\n")?;
    Ok(bytes)
}

#[test]
fn test_little_endian_file_is_swapped() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("le.vtk");
    std::fs::write(&path, little_endian_file(42)?)?;

    let store = MeshFileStore::open(&path, DatasetKind::PolyData)?;
    assert!(store.swap_bytes());
    assert_eq!(store.title(), "little endian");
    assert_eq!(store.points()[(2, 1)], 2.5);
    assert_eq!(store.polygons(), &[vec![0, 1, 2]]);
    assert_eq!(store.field("weights")?.as_slice(), &[0.125, -4.0, 1e10]);
    Ok(())
}

#[test]
fn test_resave_is_big_endian() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("le.vtk");
    let output = dir.path().join("be.vtk");
    std::fs::write(&input, little_endian_file(42)?)?;

    let mut store = MeshFileStore::open(&input, DatasetKind::PolyData)?;
    store.set_binary_write(true);
    store.save(&output)?;

    let bytes = std::fs::read(&output)?;
    let marker = b"DATASET POLYDATA\n";
    let at = bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("dataset line")
        + marker.len();
    assert_eq!(BigEndian::read_i32(&bytes[at..at + 4]), 42);
    assert_eq!(bytes[at + 4], b'\n');

    let reloaded = MeshFileStore::open(&output, DatasetKind::PolyData)?;
    assert!(!reloaded.swap_bytes());
    assert_eq!(reloaded.points(), store.points());
    assert_eq!(reloaded.field("weights")?, store.field("weights")?);
    Ok(())
}

#[test]
fn test_swap_flag_resets_on_next_load() -> Result<()> {
    let dir = tempdir()?;
    let le = dir.path().join("le.vtk");
    let ascii = dir.path().join("ascii.vtk");
    std::fs::write(&le, little_endian_file(42)?)?;

    let mut store = MeshFileStore::open(&le, DatasetKind::PolyData)?;
    store.save(&ascii)?;
    assert!(store.swap_bytes());

    store.load(&ascii)?;
    assert!(!store.swap_bytes());
    Ok(())
}

#[test]
fn test_unknown_sentinel_is_malformed() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bad.vtk");
    std::fs::write(&path, little_endian_file(7)?)?;

    let err = MeshFileStore::open(&path, DatasetKind::PolyData).unwrap_err();
    assert!(matches!(err, VtkError::MalformedHeader(_)), "{err:?}");
    Ok(())
}
