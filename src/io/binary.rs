// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary codec
//!
//! Files are written big-endian. On read, `swap_bytes` switches every
//! multi-byte value to little-endian, for files from producers that wrote
//! host order on a little-endian machine.

use super::codec::{ValueDecoder, ValueEncoder};
use super::format::{Encoding, ScalarType};
use super::scanner::Scanner;
use crate::error::{VtkError, VtkResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::io::{self, Write};

pub struct BinaryDecoder<'a> {
    scanner: Scanner<'a>,
    swap_bytes: bool,
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(scanner: Scanner<'a>, swap_bytes: bool) -> Self {
        Self {
            scanner,
            swap_bytes,
        }
    }

    fn decode<B: ByteOrder>(ty: ScalarType, bytes: &[u8], count: usize) -> Vec<f64> {
        match ty {
            ScalarType::UnsignedChar => bytes.iter().map(|&b| b as f64).collect(),
            ScalarType::Int => bytes.chunks_exact(4).map(|c| B::read_i32(c) as f64).collect(),
            ScalarType::Float => bytes.chunks_exact(4).map(|c| B::read_f32(c) as f64).collect(),
            ScalarType::Double => bytes.chunks_exact(8).map(B::read_f64).collect(),
            ScalarType::Bit => unpack_bits(bytes, count),
        }
    }
}

/// Most significant bit first, as the legacy writer packs them
fn unpack_bits(bytes: &[u8], count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let bit = (bytes[i / 8] >> (7 - (i % 8))) & 1;
            bit as f64
        })
        .collect()
}

fn pack_bits(values: &[f64]) -> Vec<u8> {
    let mut bytes = vec![0u8; (values.len() + 7) / 8];
    for (i, &value) in values.iter().enumerate() {
        if value != 0.0 {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

fn encoded_len(ty: ScalarType, count: usize) -> Option<usize> {
    match ty.byte_width() {
        Some(width) => count.checked_mul(width),
        None => Some((count + 7) / 8),
    }
}

impl<'a> ValueDecoder<'a> for BinaryDecoder<'a> {
    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn scanner(&mut self) -> &mut Scanner<'a> {
        &mut self.scanner
    }

    fn read_values(&mut self, ty: ScalarType, count: usize, section: &str) -> VtkResult<Vec<f64>> {
        let len = encoded_len(ty, count).ok_or_else(|| {
            VtkError::corrupt(section, self.scanner.offset(), "declared count overflows")
        })?;
        let bytes = self.scanner.take(len, section)?;
        let values = if self.swap_bytes {
            Self::decode::<LittleEndian>(ty, bytes, count)
        } else {
            Self::decode::<BigEndian>(ty, bytes, count)
        };
        Ok(values)
    }

    fn read_ints(&mut self, count: usize, section: &str) -> VtkResult<Vec<i64>> {
        let values = self.read_values(ScalarType::Int, count, section)?;
        Ok(values.into_iter().map(|v| v as i64).collect())
    }
}

pub struct BinaryEncoder<W: Write> {
    out: W,
}

impl<W: Write> BinaryEncoder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ValueEncoder for BinaryEncoder<W> {
    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")
    }

    fn write_row(&mut self, ty: ScalarType, values: &[f64]) -> io::Result<()> {
        match ty {
            ScalarType::UnsignedChar => {
                for &v in values {
                    self.out.write_u8(v as u8)?;
                }
            }
            ScalarType::Int => {
                for &v in values {
                    self.out.write_i32::<BigEndian>(v as i32)?;
                }
            }
            ScalarType::Float => {
                for &v in values {
                    self.out.write_f32::<BigEndian>(v as f32)?;
                }
            }
            ScalarType::Double => {
                for &v in values {
                    self.out.write_f64::<BigEndian>(v)?;
                }
            }
            ScalarType::Bit => self.out.write_all(&pack_bits(values))?,
        }
        Ok(())
    }

    fn write_ints(&mut self, values: &[i64]) -> io::Result<()> {
        for &v in values {
            self.out.write_i32::<BigEndian>(v as i32)?;
        }
        Ok(())
    }

    fn end_block(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
