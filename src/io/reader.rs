// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Legacy file reader
//!
//! The whole file is parsed into a fresh [`Dataset`]; callers only see it when
//! every section was read successfully.

use super::binary::BinaryDecoder;
use super::codec::ValueDecoder;
use super::format::{
    Association, DatasetKind, Encoding, ScalarType, BINARY_SENTINEL, DATASET_TOKEN, MAGIC_PREFIX,
};
use super::scanner::Scanner;
use super::section::{field_array_header, next_section, Section};
use super::text::TextDecoder;
use crate::dataset::{Attribute, Dataset, NumericField, StringField};
use crate::error::{VtkError, VtkResult};
use crate::table::{self, Table};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, warn};

/// Parsed header lines
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version_line: String,
    pub title: String,
    pub encoding: Encoding,
    pub kind: DatasetKind,
}

/// Everything a load produces
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub dataset: Dataset,
    pub header: Header,
    pub swap_bytes: bool,
}

/// Parses a complete file image
pub fn read_dataset(bytes: &[u8], kind: DatasetKind, switch_rows_cols: bool) -> VtkResult<ReadOutcome> {
    let mut scanner = Scanner::new(bytes);
    let header = read_header(&mut scanner, kind)?;

    let mut swap_bytes = false;
    let mut decoder: Box<dyn ValueDecoder<'_> + '_> = match header.encoding {
        Encoding::Ascii => Box::new(TextDecoder::new(scanner)),
        Encoding::Binary => {
            swap_bytes = probe_byte_order(&mut scanner)?;
            Box::new(BinaryDecoder::new(scanner, swap_bytes))
        }
    };

    let mut reader = SectionReader::new(kind, switch_rows_cols);
    while let Some(section) = next_section(decoder.scanner())? {
        reader.handle(section, decoder.as_mut())?;
    }

    Ok(ReadOutcome {
        dataset: reader.dataset,
        header,
        swap_bytes,
    })
}

/// Reads and validates the header lines against the expected dataset kind
pub fn read_header(scanner: &mut Scanner<'_>, expected: DatasetKind) -> VtkResult<Header> {
    let header = parse_header(scanner)?;
    if header.kind != expected {
        return Err(VtkError::DatasetKindMismatch {
            expected,
            found: header.kind,
        });
    }
    Ok(header)
}

/// Reads the header lines, accepting either dataset kind
pub fn parse_header(scanner: &mut Scanner<'_>) -> VtkResult<Header> {
    let version_line = next_header_line(scanner, "version")?;
    if !version_line.starts_with(MAGIC_PREFIX) {
        return Err(VtkError::MalformedHeader(format!(
            "line 1 is not a legacy version line: '{}'",
            version_line
        )));
    }

    let title = next_header_line(scanner, "title")?;

    let encoding_line = next_header_line(scanner, "encoding")?;
    let encoding = Encoding::from_token(encoding_line.trim()).ok_or_else(|| {
        VtkError::MalformedHeader(format!("expected ASCII or BINARY, found '{}'", encoding_line.trim()))
    })?;

    match scanner.next_token() {
        Some(DATASET_TOKEN) => {}
        Some(other) => {
            return Err(VtkError::MalformedHeader(format!(
                "expected DATASET, found '{}'",
                other
            )))
        }
        None => return Err(VtkError::MalformedHeader("missing DATASET line".into())),
    }
    let args = scanner.rest_of_line();
    let token = args
        .first()
        .ok_or_else(|| VtkError::MalformedHeader("DATASET line has no type".into()))?;
    let kind = DatasetKind::from_token(token)
        .ok_or_else(|| VtkError::MalformedHeader(format!("unsupported dataset type '{}'", token)))?;

    Ok(Header {
        version_line,
        title,
        encoding,
        kind,
    })
}

fn next_header_line(scanner: &mut Scanner<'_>, what: &str) -> VtkResult<String> {
    let line = scanner
        .read_line()
        .ok_or_else(|| VtkError::MalformedHeader(format!("missing {} line", what)))?;
    let text = String::from_utf8_lossy(line);
    Ok(text.trim_end_matches('\r').to_string())
}

/// Reads the binary sentinel; returns whether later reads must swap bytes
pub fn probe_byte_order(scanner: &mut Scanner<'_>) -> VtkResult<bool> {
    let bytes = scanner
        .take(4, "header")
        .map_err(|_| VtkError::MalformedHeader("missing byte-order marker".into()))?;
    let swap = if BigEndian::read_i32(bytes) == BINARY_SENTINEL {
        false
    } else if LittleEndian::read_i32(bytes) == BINARY_SENTINEL {
        true
    } else {
        return Err(VtkError::MalformedHeader(format!(
            "byte-order marker {:02x?} is not {}",
            bytes, BINARY_SENTINEL
        )));
    };
    scanner.skip_newline();
    debug!(swap_bytes = swap, "probed binary byte order");
    Ok(swap)
}

/// Dispatch state for the section loop
struct SectionReader {
    kind: DatasetKind,
    switch_rows_cols: bool,
    dataset: Dataset,
    association: Association,
    /// Tuple count declared by the last POINT_DATA / CELL_DATA
    attribute_count: Option<usize>,
    points_seen: bool,
    /// VERTICES and LINES cells, which precede polygons in cell data order
    cells_before_polygons: usize,
    /// TRIANGLE_STRIPS cells, which follow them
    cells_after_polygons: usize,
}

impl SectionReader {
    fn new(kind: DatasetKind, switch_rows_cols: bool) -> Self {
        Self {
            kind,
            switch_rows_cols,
            dataset: Dataset::new(),
            association: Association::Point,
            attribute_count: None,
            points_seen: false,
            cells_before_polygons: 0,
            cells_after_polygons: 0,
        }
    }

    fn handle(&mut self, section: Section, decoder: &mut dyn ValueDecoder<'_>) -> VtkResult<()> {
        let offset = decoder.scanner().offset();
        match section {
            Section::Points { count, ty } => {
                let values = decoder.read_values(ty, checked(count, 3, "POINTS", offset)?, "POINTS")?;
                self.dataset.points = table::from_row_major(count, 3, &values);
                self.points_seen = true;
                debug!(count, %ty, "read POINTS");
            }
            Section::Polygons { count, size } => {
                self.require_kind(DatasetKind::PolyData, "POLYGONS", offset)?;
                self.dataset.polygons = read_index_lists(decoder, count, size, "POLYGONS")?;
                debug!(count, "read POLYGONS");
            }
            Section::OtherPolyTopology { keyword, count, size } => {
                self.require_kind(DatasetKind::PolyData, &keyword, offset)?;
                read_index_lists(decoder, count, size, &keyword)?;
                if keyword == "TRIANGLE_STRIPS" {
                    self.cells_after_polygons += count;
                } else {
                    self.cells_before_polygons += count;
                }
                debug!(%keyword, count, "skipped topology block");
            }
            Section::Cells { count, size } => {
                self.require_kind(DatasetKind::UnstructuredGrid, "CELLS", offset)?;
                self.dataset.cells = read_index_lists(decoder, count, size, "CELLS")?;
                debug!(count, "read CELLS");
            }
            Section::CellTypes { count } => {
                self.require_kind(DatasetKind::UnstructuredGrid, "CELL_TYPES", offset)?;
                if count != self.dataset.cells.len() {
                    return Err(VtkError::corrupt(
                        "CELL_TYPES",
                        offset,
                        format!("{} types declared for {} cells", count, self.dataset.cells.len()),
                    ));
                }
                let codes = decoder.read_ints(count, "CELL_TYPES")?;
                self.dataset.cell_types = codes
                    .into_iter()
                    .map(|code| {
                        u8::try_from(code).map_err(|_| {
                            VtkError::corrupt("CELL_TYPES", offset, format!("invalid cell type {}", code))
                        })
                    })
                    .collect::<VtkResult<_>>()?;
            }
            Section::PointData { count } => {
                if self.points_seen && count != self.dataset.point_count() {
                    return Err(VtkError::corrupt(
                        "POINT_DATA",
                        offset,
                        format!("{} tuples declared for {} points", count, self.dataset.point_count()),
                    ));
                }
                self.association = Association::Point;
                self.attribute_count = Some(count);
            }
            Section::CellData { count } => {
                let cells = self.cell_count();
                if count != cells {
                    return Err(VtkError::corrupt(
                        "CELL_DATA",
                        offset,
                        format!("{} tuples declared for {} cells", count, cells),
                    ));
                }
                self.association = Association::Cell;
                self.attribute_count = Some(count);
            }
            Section::Scalars {
                name,
                ty,
                components,
                lookup_table,
            } => {
                let count = self.tuple_count();
                let data = self.read_table(decoder, ty, count, components, "SCALARS", offset)?;
                debug!(%name, %ty, components, ?lookup_table, "read SCALARS");
                self.dataset.attributes_mut(self.association).scalars =
                    Some(Attribute::new(name, ty, data));
            }
            Section::Vectors { name, ty } => {
                let count = self.tuple_count();
                let data = self.read_table(decoder, ty, count, 3, "VECTORS", offset)?;
                debug!(%name, %ty, "read VECTORS");
                self.dataset.attributes_mut(self.association).vectors =
                    Some(Attribute::new(name, ty, data));
            }
            Section::Field { name, arrays } => {
                debug!(%name, arrays, "reading FIELD block");
                for _ in 0..arrays {
                    self.read_field_array(decoder)?;
                }
            }
            Section::Unknown { keyword } => {
                debug!(%keyword, offset, "skipping unrecognized keyword");
            }
        }
        Ok(())
    }

    fn read_field_array(&mut self, decoder: &mut dyn ValueDecoder<'_>) -> VtkResult<()> {
        let offset = decoder.scanner().offset();
        let header = field_array_header(decoder.scanner())?;
        let count = checked(header.tuples, header.components, "FIELD", offset)?;

        match header.ty {
            None => {
                let values = decoder.read_strings(count, "FIELD")?;
                self.dataset.fields.upsert_string(StringField {
                    name: header.name,
                    values,
                })?;
            }
            Some(ScalarType::Bit) => {
                decoder.read_values(ScalarType::Bit, count, "FIELD")?;
                warn!(name = %header.name, "dropped bit field array");
            }
            Some(ty) => {
                let data = self.read_table(decoder, ty, header.tuples, header.components, "FIELD", offset)?;
                self.dataset.fields.upsert(NumericField {
                    name: header.name,
                    ty,
                    association: self.association,
                    data,
                })?;
            }
        }
        Ok(())
    }

    fn read_table(
        &self,
        decoder: &mut dyn ValueDecoder<'_>,
        ty: ScalarType,
        rows: usize,
        cols: usize,
        section: &str,
        offset: usize,
    ) -> VtkResult<Table> {
        let values = decoder.read_values(ty, checked(rows, cols, section, offset)?, section)?;
        let data = self.polygon_rows(table::from_row_major(rows, cols, &values));
        Ok(if self.switch_rows_cols {
            data.transpose()
        } else {
            data
        })
    }

    fn require_kind(&self, kind: DatasetKind, section: &str, offset: usize) -> VtkResult<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(VtkError::corrupt(
                section,
                offset,
                format!("section is not valid in a {} file", self.kind),
            ))
        }
    }

    /// Every cell the file declares, including the topology blocks that are dropped
    fn cell_count(&self) -> usize {
        match self.kind {
            DatasetKind::PolyData => {
                self.cells_before_polygons + self.dataset.polygons.len() + self.cells_after_polygons
            }
            DatasetKind::UnstructuredGrid => self.dataset.cells.len(),
        }
    }

    /// Keeps only the polygon rows of a cell table that also covers dropped cells
    fn polygon_rows(&self, data: Table) -> Table {
        let dropped = self.cells_before_polygons + self.cells_after_polygons;
        if self.association != Association::Cell || dropped == 0 || data.nrows() != self.cell_count() {
            return data;
        }
        data.rows(self.cells_before_polygons, self.dataset.polygons.len())
            .into_owned()
    }

    /// Tuples per attribute array; attributes before any POINT_DATA line describe points
    fn tuple_count(&self) -> usize {
        self.attribute_count
            .unwrap_or_else(|| self.dataset.point_count())
    }
}

fn checked(rows: usize, cols: usize, section: &str, offset: usize) -> VtkResult<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| VtkError::corrupt(section, offset, "declared count overflows"))
}

/// Reads `count` length-prefixed index lists spanning exactly `size` integers
fn read_index_lists(
    decoder: &mut dyn ValueDecoder<'_>,
    count: usize,
    size: usize,
    section: &str,
) -> VtkResult<Vec<Vec<u32>>> {
    let offset = decoder.scanner().offset();
    let flat = decoder.read_ints(size, section)?;
    let mut lists = Vec::with_capacity(count.min(flat.len()));
    let mut cursor = 0usize;

    for i in 0..count {
        let len = *flat.get(cursor).ok_or_else(|| {
            VtkError::corrupt(section, offset, format!("size {} ends before entry {}", size, i))
        })?;
        let len = usize::try_from(len)
            .map_err(|_| VtkError::corrupt(section, offset, format!("negative length {}", len)))?;
        let start = cursor + 1;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= flat.len())
            .ok_or_else(|| {
                VtkError::corrupt(section, offset, format!("entry {} overruns declared size {}", i, size))
            })?;
        let indices = flat[start..end]
            .iter()
            .map(|&v| {
                u32::try_from(v)
                    .map_err(|_| VtkError::corrupt(section, offset, format!("invalid index {}", v)))
            })
            .collect::<VtkResult<Vec<u32>>>()?;
        lists.push(indices);
        cursor = end;
    }

    if cursor != flat.len() {
        return Err(VtkError::corrupt(
            section,
            offset,
            format!("declared size {} but entries use {}", size, cursor),
        ));
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "# vtk DataFile Version 3.0\n\
        square\n\
        ASCII\n\
        DATASET POLYDATA\n\
        POINTS 4 float\n\
        0 0 0\n1 0 0\n1 1 0\n0 1 0\n\
        POLYGONS 1 5\n\
        4 0 1 2 3\n";

    #[test]
    fn test_reads_points_and_polygons() {
        let outcome = read_dataset(SQUARE.as_bytes(), DatasetKind::PolyData, false).unwrap();
        assert_eq!(outcome.header.title, "square");
        assert_eq!(outcome.header.encoding, Encoding::Ascii);
        assert_eq!(outcome.dataset.points.shape(), (4, 3));
        assert_eq!(outcome.dataset.points[(2, 1)], 1.0);
        assert_eq!(outcome.dataset.polygons, vec![vec![0, 1, 2, 3]]);
        assert!(!outcome.swap_bytes);
    }

    #[test]
    fn test_kind_mismatch_before_sections() {
        // the POINTS block is deliberately broken; the kind check must fire first
        let text = "# vtk DataFile Version 3.0\nt\nASCII\nDATASET POLYDATA\nPOINTS 9 float\n1\n";
        let err = read_dataset(text.as_bytes(), DatasetKind::UnstructuredGrid, false).unwrap_err();
        assert!(matches!(
            err,
            VtkError::DatasetKindMismatch {
                expected: DatasetKind::UnstructuredGrid,
                found: DatasetKind::PolyData
            }
        ));
    }

    #[test]
    fn test_lowercase_encoding_rejected() {
        let text = "# vtk DataFile Version 3.0\nt\nascii\nDATASET POLYDATA\n";
        assert!(matches!(
            read_dataset(text.as_bytes(), DatasetKind::PolyData, false),
            Err(VtkError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_missing_magic_rejected() {
        let text = "hello\nt\nASCII\nDATASET POLYDATA\n";
        assert!(matches!(
            read_dataset(text.as_bytes(), DatasetKind::PolyData, false),
            Err(VtkError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_polygon_size_mismatch() {
        let text = SQUARE.replace("POLYGONS 1 5", "POLYGONS 1 6");
        let err = read_dataset(text.as_bytes(), DatasetKind::PolyData, false).unwrap_err();
        assert!(matches!(err, VtkError::TruncatedOrCorrupt { ref section, .. } if section == "POLYGONS"));
    }

    #[test]
    fn test_unknown_keywords_skipped() {
        let text = format!("{}METADATA\nINFORMATION 0\n\n", SQUARE);
        let outcome = read_dataset(text.as_bytes(), DatasetKind::PolyData, false).unwrap();
        assert_eq!(outcome.dataset.polygons.len(), 1);
    }

    #[test]
    fn test_lines_are_consumed() {
        let text = format!("{}LINES 1 3\n2 0 1\nPOINT_DATA 4\nVECTORS v float\n{}", SQUARE, "0 0 1\n".repeat(4));
        let outcome = read_dataset(text.as_bytes(), DatasetKind::PolyData, false).unwrap();
        assert_eq!(outcome.dataset.polygons.len(), 1);
        let vectors = outcome.dataset.point_data.vectors.unwrap();
        assert_eq!(vectors.data.shape(), (4, 3));
    }

    #[test]
    fn test_cell_data_covers_dropped_lines() {
        let text = format!(
            "{}LINES 1 3\n2 0 1\nCELL_DATA 2\nSCALARS area double\nLOOKUP_TABLE default\n0.5\n1.5\n\
             FIELD FieldData 1\nregion 1 2 int\n7 8\n",
            SQUARE
        );
        let outcome = read_dataset(text.as_bytes(), DatasetKind::PolyData, false).unwrap();
        let scalars = outcome.dataset.cell_data.scalars.unwrap();
        assert_eq!(scalars.data.as_slice(), &[1.5]);
        assert_eq!(outcome.dataset.fields.get("region").unwrap().data.as_slice(), &[8.0]);

        // a total that ignores the LINES block is still rejected
        let short = format!("{}LINES 1 3\n2 0 1\nCELL_DATA 1\n", SQUARE);
        assert!(matches!(
            read_dataset(short.as_bytes(), DatasetKind::PolyData, false),
            Err(VtkError::TruncatedOrCorrupt { ref section, .. }) if section == "CELL_DATA"
        ));
    }

    #[test]
    fn test_cell_data_scalars() {
        let text = format!(
            "{}CELL_DATA 1\nSCALARS area double\nLOOKUP_TABLE default\n1.5\n",
            SQUARE
        );
        let outcome = read_dataset(text.as_bytes(), DatasetKind::PolyData, false).unwrap();
        let scalars = outcome.dataset.cell_data.scalars.unwrap();
        assert_eq!(scalars.name, "area");
        assert_eq!(scalars.data[(0, 0)], 1.5);
        assert!(outcome.dataset.point_data.is_empty());
    }

    #[test]
    fn test_unstructured_grid_cells() {
        let text = "# vtk DataFile Version 3.0\ngrid\nASCII\nDATASET UNSTRUCTURED_GRID\n\
            POINTS 4 double\n0 0 0 1 0 0 0 1 0 0 0 1\n\
            CELLS 2 9\n4 0 1 2 3\n3 0 1 2\n\
            CELL_TYPES 2\n10\n5\n";
        let outcome = read_dataset(text.as_bytes(), DatasetKind::UnstructuredGrid, false).unwrap();
        assert_eq!(outcome.dataset.cells, vec![vec![0, 1, 2, 3], vec![0, 1, 2]]);
        assert_eq!(outcome.dataset.cell_types, vec![10, 5]);
    }

    #[test]
    fn test_polygons_in_grid_is_corrupt() {
        let text = "# vtk DataFile Version 3.0\ngrid\nASCII\nDATASET UNSTRUCTURED_GRID\nPOLYGONS 0 0\n";
        assert!(matches!(
            read_dataset(text.as_bytes(), DatasetKind::UnstructuredGrid, false),
            Err(VtkError::TruncatedOrCorrupt { .. })
        ));
    }
}
