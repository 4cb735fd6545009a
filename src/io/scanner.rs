// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Byte cursor over an in-memory file
//!
//! Header and keyword lines are text in both encodings, so the codecs share
//! this scanner and only differ in how data values are consumed.

use crate::error::{VtkError, VtkResult};

pub struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left to read; bounds preallocation for declared counts
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.data.get(self.pos) {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Next whitespace-delimited run of bytes, crossing line breaks
    pub fn next_raw_token(&mut self) -> Option<&'a [u8]> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(b) = self.data.get(self.pos) {
            if b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        Some(&self.data[start..self.pos])
    }

    /// Next token as text; `None` at end of input or on invalid UTF-8
    pub fn next_token(&mut self) -> Option<&'a str> {
        self.next_raw_token()
            .and_then(|raw| std::str::from_utf8(raw).ok())
    }

    /// Bytes up to the next newline, verbatim; the newline is consumed
    pub fn read_line(&mut self) -> Option<&'a [u8]> {
        if self.is_at_end() {
            return None;
        }
        let start = self.pos;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| start + i)
            .unwrap_or(self.data.len());
        self.pos = (end + 1).min(self.data.len());
        Some(&self.data[start..end])
    }

    /// Remaining tokens of the current line
    pub fn rest_of_line(&mut self) -> Vec<&'a str> {
        match self.read_line() {
            Some(line) => std::str::from_utf8(line)
                .map(|s| s.split_whitespace().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Returns the next token without consuming it
    pub fn peek_token(&mut self) -> Option<&'a str> {
        let saved = self.pos;
        let token = self.next_token();
        self.pos = saved;
        token
    }

    /// Exactly `len` raw bytes
    pub fn take(&mut self, len: usize, section: &str) -> VtkResult<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(VtkError::corrupt(
                section,
                self.pos,
                format!(
                    "expected {} bytes, only {} remain",
                    len,
                    self.data.len().saturating_sub(self.pos)
                ),
            )),
        }
    }

    /// Consumes a single newline if one is next
    pub fn skip_newline(&mut self) {
        if self.data.get(self.pos) == Some(&b'\r') {
            self.pos += 1;
        }
        if self.data.get(self.pos) == Some(&b'\n') {
            self.pos += 1;
        }
    }
}
