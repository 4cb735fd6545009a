// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! ASCII codec

use super::codec::{short_read, ValueDecoder, ValueEncoder};
use super::format::{Encoding, ScalarType};
use super::scanner::Scanner;
use crate::error::{VtkError, VtkResult};
use std::io::{self, Write};

pub struct TextDecoder<'a> {
    scanner: Scanner<'a>,
}

impl<'a> TextDecoder<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self { scanner }
    }

    fn next_number<T: std::str::FromStr>(
        &mut self,
        section: &str,
        expected: usize,
        found: usize,
    ) -> VtkResult<T> {
        let offset = self.scanner.offset();
        let token = self
            .scanner
            .next_token()
            .ok_or_else(|| short_read(section, offset, expected, found))?;
        token.parse::<T>().map_err(|_| {
            VtkError::corrupt(
                section,
                self.scanner.offset() - token.len(),
                format!("'{}' is not a number", token),
            )
        })
    }
}

impl<'a> ValueDecoder<'a> for TextDecoder<'a> {
    fn encoding(&self) -> Encoding {
        Encoding::Ascii
    }

    fn scanner(&mut self) -> &mut Scanner<'a> {
        &mut self.scanner
    }

    fn read_values(&mut self, ty: ScalarType, count: usize, section: &str) -> VtkResult<Vec<f64>> {
        let mut values = Vec::with_capacity(count.min(self.scanner.remaining()));
        for i in 0..count {
            let value = if ty.is_integer() {
                self.next_number::<i64>(section, count, i)? as f64
            } else {
                self.next_number::<f64>(section, count, i)?
            };
            values.push(value);
        }
        Ok(values)
    }

    fn read_ints(&mut self, count: usize, section: &str) -> VtkResult<Vec<i64>> {
        let mut values = Vec::with_capacity(count.min(self.scanner.remaining()));
        for i in 0..count {
            values.push(self.next_number::<i64>(section, count, i)?);
        }
        Ok(values)
    }
}

pub struct TextEncoder<W: Write> {
    out: W,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Formats one value for its declared element type.
/// Floats use the shortest representation that reads back to the same value.
pub fn format_value(ty: ScalarType, value: f64) -> String {
    match ty {
        ScalarType::Float => format!("{}", value as f32),
        ScalarType::Double => format!("{}", value),
        ScalarType::Int | ScalarType::UnsignedChar | ScalarType::Bit => {
            format!("{}", value as i64)
        }
    }
}

impl<W: Write> ValueEncoder for TextEncoder<W> {
    fn encoding(&self) -> Encoding {
        Encoding::Ascii
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }

    fn write_row(&mut self, ty: ScalarType, values: &[f64]) -> io::Result<()> {
        let row: Vec<String> = values.iter().map(|&v| format_value(ty, v)).collect();
        writeln!(self.out, "{}", row.join(" "))
    }

    fn write_ints(&mut self, values: &[i64]) -> io::Result<()> {
        let row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        writeln!(self.out, "{}", row.join(" "))
    }

    fn end_block(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_values_across_lines() {
        let mut decoder = TextDecoder::new(Scanner::new(b"0 0.5 -1e-3\n2 3\n4\n"));
        let values = decoder.read_values(ScalarType::Double, 6, "POINTS").unwrap();
        assert_eq!(values, vec![0.0, 0.5, -1e-3, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_short_read_fails() {
        let mut decoder = TextDecoder::new(Scanner::new(b"1 2 3\n"));
        let err = decoder.read_values(ScalarType::Float, 6, "POINTS").unwrap_err();
        match err {
            VtkError::TruncatedOrCorrupt { section, reason, .. } => {
                assert_eq!(section, "POINTS");
                assert!(reason.contains("expected 6 values, found 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_token_fails() {
        let mut decoder = TextDecoder::new(Scanner::new(b"1 two 3\n"));
        let err = decoder.read_ints(3, "POLYGONS").unwrap_err();
        assert!(matches!(err, VtkError::TruncatedOrCorrupt { offset: 2, .. }));
    }

    #[test]
    fn test_float_format_round_trips() {
        let value = 0.1f32 as f64;
        let text = format_value(ScalarType::Float, value);
        assert_eq!(text, "0.1");
        assert_eq!(text.parse::<f32>().unwrap() as f64, value);
        assert_eq!(format_value(ScalarType::Int, 4.0), "4");
    }

    #[test]
    fn test_encoder_writes_rows_and_strings() {
        let mut buffer = Vec::new();
        {
            let mut encoder = TextEncoder::new(&mut buffer);
            encoder.write_line("POLYGONS 1 5").unwrap();
            encoder.write_ints(&[4, 0, 1, 2, 3]).unwrap();
            encoder
                .write_strings(&["left thalamus".to_string(), "".to_string()])
                .unwrap();
            encoder.end_block().unwrap();
        }
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "POLYGONS 1 5\n4 0 1 2 3\nleft thalamus\n\n"
        );
    }
}
