// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - legacy format tokens, codecs, reading and writing

mod binary;
mod codec;
mod format;
mod reader;
mod scanner;
mod section;
mod text;
mod writer;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use codec::{ValueDecoder, ValueEncoder};
pub use format::{
    cell_type, Association, AttributeKind, DatasetKind, Encoding, ScalarType, BINARY_SENTINEL,
    DEFAULT_TITLE, MAGIC,
};
pub use reader::{parse_header, probe_byte_order, read_dataset, read_header, Header, ReadOutcome};
pub use scanner::Scanner;
pub use section::{next_section, Section};
pub use text::{format_value, TextDecoder, TextEncoder};
pub use writer::{validate, write_dataset, WriteOptions};
