// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Legacy file writer
//!
//! Section order is fixed: POINTS, topology, POINT_DATA, CELL_DATA.

use super::codec::ValueEncoder;
use super::format::{
    Association, DatasetKind, Encoding, ScalarType, BINARY_SENTINEL, DATASET_TOKEN, DEFAULT_LOOKUP_TABLE,
    FIELD_BLOCK_NAME, LOOKUP_TABLE_TOKEN, MAGIC, MAX_TITLE_LEN, STRING_TYPE_TOKEN,
};
use crate::dataset::{Attribute, Dataset, NumericField};
use crate::error::{VtkError, VtkResult};
use crate::table::{self, Table};
use std::borrow::Cow;
use std::io;
use tracing::debug;

/// Write-time flags
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub kind: DatasetKind,
    pub title: String,
    pub point_type: ScalarType,
    pub switch_rows_cols: bool,
    pub max_columns: Option<usize>,
}

/// Checks the shape and naming invariants a file must satisfy before anything is written
pub fn validate(dataset: &Dataset, options: &WriteOptions) -> VtkResult<()> {
    let points = &dataset.points;
    if points.nrows() > 0 && points.ncols() != 3 {
        return Err(VtkError::ShapeMismatch {
            what: "point columns",
            expected: 3,
            found: points.ncols(),
        });
    }
    if options.kind == DatasetKind::UnstructuredGrid && dataset.cells.len() != dataset.cell_types.len() {
        return Err(VtkError::ShapeMismatch {
            what: "cell types",
            expected: dataset.cells.len(),
            found: dataset.cell_types.len(),
        });
    }

    let lists = match options.kind {
        DatasetKind::PolyData => &dataset.polygons,
        DatasetKind::UnstructuredGrid => &dataset.cells,
    };
    if let Some(&index) = lists.iter().flatten().find(|&&i| i > i32::MAX as u32) {
        return Err(VtkError::ShapeMismatch {
            what: "largest writable index",
            expected: i32::MAX as usize,
            found: index as usize,
        });
    }

    for field in dataset.fields.numeric() {
        check_name(&field.name)?;
    }
    for field in dataset.fields.strings() {
        check_name(&field.name)?;
    }

    let cells = cell_count(dataset, options.kind);
    for (association, tuples) in [(Association::Point, dataset.point_count()), (Association::Cell, cells)] {
        let attributes = dataset.attributes(association);
        for attribute in [&attributes.scalars, &attributes.vectors].into_iter().flatten() {
            check_name(&attribute.name)?;
        }
        if let Some(scalars) = &attributes.scalars {
            let rows = oriented(&scalars.data, options.switch_rows_cols).nrows();
            if rows != tuples {
                return Err(VtkError::ShapeMismatch {
                    what: "scalar rows",
                    expected: tuples,
                    found: rows,
                });
            }
        }
        if let Some(vectors) = &attributes.vectors {
            let data = oriented(&vectors.data, options.switch_rows_cols);
            if data.nrows() != tuples {
                return Err(VtkError::ShapeMismatch {
                    what: "vector rows",
                    expected: tuples,
                    found: data.nrows(),
                });
            }
            if data.ncols() != 3 {
                return Err(VtkError::ShapeMismatch {
                    what: "vector columns",
                    expected: 3,
                    found: data.ncols(),
                });
            }
        }
    }
    Ok(())
}

fn check_name(name: &str) -> VtkResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(VtkError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Writes the whole dataset through `encoder`
pub fn write_dataset(
    encoder: &mut dyn ValueEncoder,
    dataset: &Dataset,
    options: &WriteOptions,
) -> io::Result<()> {
    write_header(encoder, options)?;
    write_points(encoder, &dataset.points, options.point_type)?;

    match options.kind {
        DatasetKind::PolyData => write_index_lists(encoder, "POLYGONS", &dataset.polygons)?,
        DatasetKind::UnstructuredGrid => {
            write_index_lists(encoder, "CELLS", &dataset.cells)?;
            write_cell_types(encoder, &dataset.cell_types)?;
        }
    }

    let point_fields: Vec<&NumericField> = dataset.fields.numeric_with(Association::Point).collect();
    let strings = dataset.fields.strings();
    if !dataset.point_data.is_empty() || !point_fields.is_empty() || !strings.is_empty() {
        encoder.write_line(&format!("POINT_DATA {}", dataset.point_count()))?;
        write_attributes(encoder, dataset, Association::Point, options)?;
        write_field_block(encoder, &point_fields, strings, options)?;
    }

    let cell_fields: Vec<&NumericField> = dataset.fields.numeric_with(Association::Cell).collect();
    if !dataset.cell_data.is_empty() || !cell_fields.is_empty() {
        encoder.write_line(&format!("CELL_DATA {}", cell_count(dataset, options.kind)))?;
        write_attributes(encoder, dataset, Association::Cell, options)?;
        write_field_block(encoder, &cell_fields, &[], options)?;
    }

    encoder.flush()
}

fn write_header(encoder: &mut dyn ValueEncoder, options: &WriteOptions) -> io::Result<()> {
    let encoding = encoder.encoding();
    encoder.write_line(MAGIC)?;
    encoder.write_line(&sanitize_title(&options.title))?;
    encoder.write_line(encoding.as_str())?;
    encoder.write_line(&format!("{} {}", DATASET_TOKEN, options.kind))?;
    if encoding == Encoding::Binary {
        encoder.write_ints(&[BINARY_SENTINEL as i64])?;
        encoder.end_block()?;
    }
    Ok(())
}

/// Single line, at most `MAX_TITLE_LEN` bytes, cut on a char boundary
fn sanitize_title(title: &str) -> String {
    let mut line: String = title.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
    if line.len() > MAX_TITLE_LEN {
        let mut end = MAX_TITLE_LEN;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        line.truncate(end);
    }
    line
}

fn write_points(encoder: &mut dyn ValueEncoder, points: &Table, ty: ScalarType) -> io::Result<()> {
    encoder.write_line(&format!("POINTS {} {}", points.nrows(), ty))?;
    write_rows(encoder, points, points.ncols(), ty)?;
    debug!(count = points.nrows(), %ty, "wrote POINTS");
    Ok(())
}

fn write_index_lists(encoder: &mut dyn ValueEncoder, keyword: &str, lists: &[Vec<u32>]) -> io::Result<()> {
    let size: usize = lists.iter().map(|l| l.len() + 1).sum();
    encoder.write_line(&format!("{} {} {}", keyword, lists.len(), size))?;
    for list in lists {
        let mut row = Vec::with_capacity(list.len() + 1);
        row.push(list.len() as i64);
        row.extend(list.iter().map(|&i| i as i64));
        encoder.write_ints(&row)?;
    }
    encoder.end_block()?;
    debug!(keyword, count = lists.len(), "wrote topology");
    Ok(())
}

fn write_cell_types(encoder: &mut dyn ValueEncoder, types: &[u8]) -> io::Result<()> {
    encoder.write_line(&format!("CELL_TYPES {}", types.len()))?;
    for &code in types {
        encoder.write_ints(&[code as i64])?;
    }
    encoder.end_block()
}

fn write_attributes(
    encoder: &mut dyn ValueEncoder,
    dataset: &Dataset,
    association: Association,
    options: &WriteOptions,
) -> io::Result<()> {
    let attributes = dataset.attributes(association);
    if let Some(Attribute { name, ty, data }) = &attributes.scalars {
        let data = oriented(data, options.switch_rows_cols);
        let cols = clamp_columns(name, data.ncols(), options.max_columns);
        encoder.write_line(&format!("SCALARS {} {} {}", name, ty, cols))?;
        encoder.write_line(&format!("{} {}", LOOKUP_TABLE_TOKEN, DEFAULT_LOOKUP_TABLE))?;
        write_rows(encoder, &data, cols, *ty)?;
        debug!(%name, ?association, "wrote SCALARS");
    }
    if let Some(Attribute { name, ty, data }) = &attributes.vectors {
        let data = oriented(data, options.switch_rows_cols);
        encoder.write_line(&format!("VECTORS {} {}", name, ty))?;
        write_rows(encoder, &data, 3, *ty)?;
        debug!(%name, ?association, "wrote VECTORS");
    }
    Ok(())
}

fn write_field_block(
    encoder: &mut dyn ValueEncoder,
    numeric: &[&NumericField],
    strings: &[crate::dataset::StringField],
    options: &WriteOptions,
) -> io::Result<()> {
    let arrays = numeric.len() + strings.len();
    if arrays == 0 {
        return Ok(());
    }
    encoder.write_line(&format!("FIELD {} {}", FIELD_BLOCK_NAME, arrays))?;

    for field in numeric {
        let data = oriented(&field.data, options.switch_rows_cols);
        let cols = clamp_columns(&field.name, data.ncols(), options.max_columns);
        encoder.write_line(&format!("{} {} {} {}", field.name, cols, data.nrows(), field.ty))?;
        write_rows(encoder, &data, cols, field.ty)?;
        debug!(name = %field.name, rows = data.nrows(), cols, "wrote numeric field");
    }
    for field in strings {
        encoder.write_line(&format!("{} 1 {} {}", field.name, field.values.len(), STRING_TYPE_TOKEN))?;
        encoder.write_strings(&field.values)?;
        debug!(name = %field.name, count = field.values.len(), "wrote string field");
    }
    Ok(())
}

/// Rows of `table` limited to its first `cols` columns, then the block terminator
fn write_rows(encoder: &mut dyn ValueEncoder, table: &Table, cols: usize, ty: ScalarType) -> io::Result<()> {
    if cols > 0 {
        let values = table::row_major_clamped(table, cols);
        for row in values.chunks(cols) {
            encoder.write_row(ty, row)?;
        }
    }
    encoder.end_block()
}

fn oriented(table: &Table, switch_rows_cols: bool) -> Cow<'_, Table> {
    if switch_rows_cols {
        Cow::Owned(table.transpose())
    } else {
        Cow::Borrowed(table)
    }
}

fn clamp_columns(name: &str, cols: usize, max_columns: Option<usize>) -> usize {
    match max_columns {
        Some(max) if cols > max => {
            debug!(%name, cols, max, "truncating columns on write");
            max
        }
        _ => cols,
    }
}

fn cell_count(dataset: &Dataset, kind: DatasetKind) -> usize {
    match kind {
        DatasetKind::PolyData => dataset.polygons.len(),
        DatasetKind::UnstructuredGrid => dataset.cells.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StringField;
    use crate::io::text::TextEncoder;

    fn options() -> WriteOptions {
        WriteOptions {
            kind: DatasetKind::PolyData,
            title: "square".into(),
            point_type: ScalarType::Float,
            switch_rows_cols: false,
            max_columns: None,
        }
    }

    fn render(dataset: &Dataset, options: &WriteOptions) -> String {
        let mut buffer = Vec::new();
        let mut encoder = TextEncoder::new(&mut buffer);
        write_dataset(&mut encoder, dataset, options).unwrap();
        drop(encoder);
        String::from_utf8(buffer).unwrap()
    }

    fn square() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.points = table::from_row_major(
            4,
            3,
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        );
        dataset.polygons = vec![vec![0, 1, 2, 3]];
        dataset
    }

    #[test]
    fn test_section_order() {
        let mut dataset = square();
        dataset.point_data.scalars = Some(Attribute::new(
            "s",
            ScalarType::Float,
            table::column(&[1.0, 2.0, 3.0, 4.0]),
        ));
        dataset
            .fields
            .upsert(NumericField {
                name: "labels".into(),
                ty: ScalarType::Int,
                association: Association::Point,
                data: table::column(&[1i32, 2, 3, 4]),
            })
            .unwrap();
        dataset
            .fields
            .upsert_string(StringField {
                name: "names".into(),
                values: vec!["a b".into()],
            })
            .unwrap();

        let text = render(&dataset, &options());
        let expected = [
            "POINTS 4 float",
            "POLYGONS 1 5",
            "POINT_DATA 4",
            "SCALARS s float 1",
            "FIELD FieldData 2",
            "labels 1 4 int",
            "names 1 1 string",
        ];
        let order: Vec<usize> = expected
            .iter()
            .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(text.ends_with("names 1 1 string\na b\n"));
    }

    #[test]
    fn test_column_cap_truncates() {
        let mut dataset = square();
        dataset
            .fields
            .upsert(NumericField {
                name: "wide".into(),
                ty: ScalarType::Double,
                association: Association::Point,
                data: table::from_row_major(1, 4, &[1.0, 2.0, 3.0, 4.0]),
            })
            .unwrap();
        let mut options = options();
        options.max_columns = Some(2);

        let text = render(&dataset, &options);
        assert!(text.contains("wide 2 1 double\n1 2\n"));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut dataset = square();
        dataset.point_data.vectors = Some(Attribute::new("v", ScalarType::Float, Table::zeros(3, 3)));
        assert!(matches!(
            validate(&dataset, &options()),
            Err(VtkError::ShapeMismatch { what: "vector rows", .. })
        ));

        let mut grid = square();
        grid.cells = vec![vec![0, 1, 2]];
        let mut options = options();
        options.kind = DatasetKind::UnstructuredGrid;
        assert!(matches!(
            validate(&grid, &options),
            Err(VtkError::ShapeMismatch { what: "cell types", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_names_that_split() {
        let mut dataset = square();
        dataset
            .fields
            .upsert(NumericField {
                name: "left thalamus".into(),
                ty: ScalarType::Int,
                association: Association::Point,
                data: table::column(&[1i32, 2, 3, 4]),
            })
            .unwrap();
        assert!(matches!(
            validate(&dataset, &options()),
            Err(VtkError::InvalidName { ref name, .. }) if name == "left thalamus"
        ));

        let mut dataset = square();
        dataset.point_data.scalars = Some(Attribute::new("", ScalarType::Float, table::column(&[0.0; 4])));
        assert!(matches!(
            validate(&dataset, &options()),
            Err(VtkError::InvalidName { reason: "name is empty", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_indices_past_int_range() {
        let mut dataset = square();
        dataset.polygons = vec![vec![0, 1, i32::MAX as u32 + 1]];
        assert!(matches!(
            validate(&dataset, &options()),
            Err(VtkError::ShapeMismatch { what: "largest writable index", .. })
        ));
    }

    #[test]
    fn test_title_is_single_bounded_line() {
        assert_eq!(sanitize_title("a\nb"), "a b");
        assert_eq!(sanitize_title(&"x".repeat(400)).len(), MAX_TITLE_LEN);
    }
}
