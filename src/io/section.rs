// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Section headers as parse events

use super::format::{ScalarType, LOOKUP_TABLE_TOKEN, STRING_TYPE_TOKEN};
use super::scanner::Scanner;
use crate::error::{VtkError, VtkResult};

/// One section header, parsed from its keyword line
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Points { count: usize, ty: ScalarType },
    Polygons { count: usize, size: usize },
    /// VERTICES, LINES and TRIANGLE_STRIPS share the polygon layout
    OtherPolyTopology { keyword: String, count: usize, size: usize },
    Cells { count: usize, size: usize },
    CellTypes { count: usize },
    PointData { count: usize },
    CellData { count: usize },
    Scalars {
        name: String,
        ty: ScalarType,
        components: usize,
        lookup_table: Option<String>,
    },
    Vectors { name: String, ty: ScalarType },
    Field { name: String, arrays: usize },
    Unknown { keyword: String },
}

/// Reads the next keyword and its header line; `None` at end of input
pub fn next_section(scanner: &mut Scanner<'_>) -> VtkResult<Option<Section>> {
    let raw = match scanner.next_raw_token() {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let offset = scanner.offset();
    let args = scanner.rest_of_line();
    let keyword = match std::str::from_utf8(raw) {
        Ok(keyword) => keyword,
        Err(_) => {
            return Ok(Some(Section::Unknown {
                keyword: String::from_utf8_lossy(raw).into_owned(),
            }))
        }
    };

    let section = match keyword {
        "POINTS" => Section::Points {
            count: count_arg(keyword, &args, 0, offset)?,
            ty: type_arg(keyword, &args, 1, offset)?,
        },
        "POLYGONS" => Section::Polygons {
            count: count_arg(keyword, &args, 0, offset)?,
            size: count_arg(keyword, &args, 1, offset)?,
        },
        "VERTICES" | "LINES" | "TRIANGLE_STRIPS" => Section::OtherPolyTopology {
            keyword: keyword.to_string(),
            count: count_arg(keyword, &args, 0, offset)?,
            size: count_arg(keyword, &args, 1, offset)?,
        },
        "CELLS" => Section::Cells {
            count: count_arg(keyword, &args, 0, offset)?,
            size: count_arg(keyword, &args, 1, offset)?,
        },
        "CELL_TYPES" => Section::CellTypes {
            count: count_arg(keyword, &args, 0, offset)?,
        },
        "POINT_DATA" => Section::PointData {
            count: count_arg(keyword, &args, 0, offset)?,
        },
        "CELL_DATA" => Section::CellData {
            count: count_arg(keyword, &args, 0, offset)?,
        },
        "SCALARS" => {
            let name = name_arg(keyword, &args, offset)?;
            let ty = type_arg(keyword, &args, 1, offset)?;
            let components = match args.get(2) {
                Some(_) => count_arg(keyword, &args, 2, offset)?,
                None => 1,
            };
            let lookup_table = if scanner.peek_token() == Some(LOOKUP_TABLE_TOKEN) {
                scanner.next_token();
                scanner.rest_of_line().first().map(|s| s.to_string())
            } else {
                None
            };
            Section::Scalars {
                name,
                ty,
                components,
                lookup_table,
            }
        }
        "VECTORS" => Section::Vectors {
            name: name_arg(keyword, &args, offset)?,
            ty: type_arg(keyword, &args, 1, offset)?,
        },
        "FIELD" => Section::Field {
            name: name_arg(keyword, &args, offset)?,
            arrays: count_arg(keyword, &args, 1, offset)?,
        },
        other => Section::Unknown {
            keyword: other.to_string(),
        },
    };

    Ok(Some(section))
}

/// Header line of one array inside a FIELD block
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArrayHeader {
    pub name: String,
    pub components: usize,
    pub tuples: usize,
    /// `None` means a string array
    pub ty: Option<ScalarType>,
}

pub fn field_array_header(scanner: &mut Scanner<'_>) -> VtkResult<FieldArrayHeader> {
    let offset = scanner.offset();
    let name = scanner
        .next_token()
        .ok_or_else(|| VtkError::corrupt("FIELD", offset, "missing field array header"))?
        .to_string();
    let args = scanner.rest_of_line();
    let components = count_arg("FIELD", &args, 0, offset)?;
    let tuples = count_arg("FIELD", &args, 1, offset)?;
    let ty = match args.get(2) {
        Some(&STRING_TYPE_TOKEN) => None,
        Some(_) => Some(type_arg("FIELD", &args, 2, offset)?),
        None => return Err(VtkError::corrupt("FIELD", offset, format!("array '{}' has no type", name))),
    };
    Ok(FieldArrayHeader {
        name,
        components,
        tuples,
        ty,
    })
}

fn count_arg(section: &str, args: &[&str], index: usize, offset: usize) -> VtkResult<usize> {
    let token = args.get(index).ok_or_else(|| {
        VtkError::corrupt(section, offset, format!("missing argument {}", index + 1))
    })?;
    token
        .parse::<usize>()
        .map_err(|_| VtkError::corrupt(section, offset, format!("'{}' is not a count", token)))
}

fn type_arg(section: &str, args: &[&str], index: usize, offset: usize) -> VtkResult<ScalarType> {
    let token = args.get(index).ok_or_else(|| {
        VtkError::corrupt(section, offset, "missing element type")
    })?;
    ScalarType::from_token(token)
        .ok_or_else(|| VtkError::corrupt(section, offset, format!("unsupported type '{}'", token)))
}

fn name_arg(section: &str, args: &[&str], offset: usize) -> VtkResult<String> {
    args.first()
        .map(|s| s.to_string())
        .ok_or_else(|| VtkError::corrupt(section, offset, "missing name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Section {
        let mut scanner = Scanner::new(text.as_bytes());
        next_section(&mut scanner).unwrap().unwrap()
    }

    #[test]
    fn test_points_header() {
        assert_eq!(
            parse("POINTS 4 float\n"),
            Section::Points {
                count: 4,
                ty: ScalarType::Float
            }
        );
    }

    #[test]
    fn test_scalars_with_lookup_table() {
        assert_eq!(
            parse("SCALARS labels int 2\nLOOKUP_TABLE default\n1 2\n"),
            Section::Scalars {
                name: "labels".into(),
                ty: ScalarType::Int,
                components: 2,
                lookup_table: Some("default".into()),
            }
        );
    }

    #[test]
    fn test_scalars_without_lookup_table() {
        let mut scanner = Scanner::new(b"SCALARS s double\n0.5\n");
        let section = next_section(&mut scanner).unwrap().unwrap();
        assert!(matches!(section, Section::Scalars { components: 1, lookup_table: None, .. }));
        assert_eq!(scanner.next_token(), Some("0.5"));
    }

    #[test]
    fn test_unknown_keyword_is_an_event() {
        assert_eq!(
            parse("METADATA\nINFORMATION 0\n"),
            Section::Unknown {
                keyword: "METADATA".into()
            }
        );
    }

    #[test]
    fn test_bad_type_token_is_corrupt() {
        let mut scanner = Scanner::new(b"POINTS 4 quaternion\n");
        assert!(matches!(
            next_section(&mut scanner),
            Err(VtkError::TruncatedOrCorrupt { .. })
        ));
    }

    #[test]
    fn test_field_array_headers() {
        let mut scanner = Scanner::new(b"labels 1 4 int\nnames 1 2 string\n");
        let numeric = field_array_header(&mut scanner).unwrap();
        assert_eq!(numeric.ty, Some(ScalarType::Int));
        assert_eq!((numeric.components, numeric.tuples), (1, 4));
        let strings = field_array_header(&mut scanner).unwrap();
        assert_eq!(strings.name, "names");
        assert_eq!(strings.ty, None);
    }

    #[test]
    fn test_end_of_input() {
        let mut scanner = Scanner::new(b"\n\n  ");
        assert_eq!(next_section(&mut scanner).unwrap(), None);
    }
}
