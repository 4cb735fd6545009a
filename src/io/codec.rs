// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Value codec interface shared by the ASCII and binary encodings
//!
//! Section handling is written once against these traits; the concrete
//! codec is picked from the header on load and from the binary flag on save.

use super::format::{Encoding, ScalarType};
use super::scanner::Scanner;
use crate::error::{VtkError, VtkResult};
use std::io;

/// Reads data values that follow a section header
pub trait ValueDecoder<'a> {
    fn encoding(&self) -> Encoding;

    fn scanner(&mut self) -> &mut Scanner<'a>;

    /// `count` values of element type `ty`, widened to f64
    fn read_values(&mut self, ty: ScalarType, count: usize, section: &str) -> VtkResult<Vec<f64>>;

    /// `count` integers stored as `int` (connectivity, cell types)
    fn read_ints(&mut self, count: usize, section: &str) -> VtkResult<Vec<i64>>;

    /// `count` verbatim lines; identical in both encodings
    fn read_strings(&mut self, count: usize, section: &str) -> VtkResult<Vec<String>> {
        let scanner = self.scanner();
        let mut strings = Vec::with_capacity(count.min(scanner.remaining()));
        for i in 0..count {
            let offset = scanner.offset();
            let line = scanner.read_line().ok_or_else(|| {
                VtkError::corrupt(section, offset, format!("expected {} strings, found {}", count, i))
            })?;
            let text = std::str::from_utf8(line)
                .map_err(|_| VtkError::corrupt(section, offset, "string is not valid UTF-8"))?;
            strings.push(text.to_string());
        }
        Ok(strings)
    }
}

/// Writes header lines and data values
pub trait ValueEncoder {
    fn encoding(&self) -> Encoding;

    /// A text line; the newline is appended
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// One table row of element type `ty`
    fn write_row(&mut self, ty: ScalarType, values: &[f64]) -> io::Result<()>;

    /// One row of connectivity integers
    fn write_ints(&mut self, values: &[i64]) -> io::Result<()>;

    /// Closes a data block started after a header line
    fn end_block(&mut self) -> io::Result<()>;

    fn write_strings(&mut self, strings: &[String]) -> io::Result<()> {
        for s in strings {
            self.write_line(s)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()>;
}

/// Shared check used by both decoders when a number cannot be produced
pub(crate) fn short_read(section: &str, offset: usize, expected: usize, found: usize) -> VtkError {
    VtkError::corrupt(
        section,
        offset,
        format!("expected {} values, found {}", expected, found),
    )
}
