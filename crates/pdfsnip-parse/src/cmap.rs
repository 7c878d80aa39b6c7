//! ToUnicode CMap parsing and font text decoding.
//!
//! A CMap is PostScript-like, so it is read with the content stream
//! [`tokenize`] function: each `end*` operator carries the entries of its
//! section as operands.

use std::collections::HashMap;

use crate::error::BackendError;
use crate::tokenizer::{Operand, tokenize};

/// Character code to Unicode mapping from a `/ToUnicode` stream.
#[derive(Debug, Clone, Default)]
pub struct ToUnicode {
    mappings: HashMap<u32, String>,
    /// Byte widths declared by `codespacerange`, ascending.
    code_lengths: Vec<usize>,
}

impl ToUnicode {
    /// Parse a ToUnicode CMap stream.
    ///
    /// Supports `bfchar` and `bfrange` sections (including the array form of
    /// `bfrange`) with UTF-16BE destinations.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Interpreter`] if the stream cannot be tokenized.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let mut cmap = ToUnicode::default();

        for op in tokenize(data)? {
            match op.name.as_str() {
                "endcodespacerange" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let Operand::Str(lo) = &pair[0] {
                            if !cmap.code_lengths.contains(&lo.len()) {
                                cmap.code_lengths.push(lo.len());
                            }
                        }
                    }
                }
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        if let (Operand::Str(src), Operand::Str(dst)) = (&pair[0], &pair[1]) {
                            cmap.note_length(src.len());
                            cmap.mappings.insert(code_of(src), utf16be(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        cmap.add_range(&triple[0], &triple[1], &triple[2]);
                    }
                }
                _ => {}
            }
        }

        cmap.code_lengths.sort_unstable();
        Ok(cmap)
    }

    fn note_length(&mut self, len: usize) {
        if !self.code_lengths.contains(&len) {
            self.code_lengths.push(len);
        }
    }

    fn add_range(&mut self, lo: &Operand, hi: &Operand, dst: &Operand) {
        let (Operand::Str(lo), Operand::Str(hi)) = (lo, hi) else {
            return;
        };
        self.note_length(lo.len());
        let (lo, hi) = (code_of(lo), code_of(hi));
        if hi < lo {
            return;
        }

        match dst {
            Operand::Str(base) => {
                let mut units: Vec<u16> = base
                    .chunks(2)
                    .map(|c| u16::from_be_bytes([c[0], *c.get(1).unwrap_or(&0)]))
                    .collect();
                for code in lo..=hi {
                    self.mappings
                        .insert(code, String::from_utf16_lossy(&units));
                    // Increment the last UTF-16 unit for the next code.
                    if let Some(last) = units.last_mut() {
                        *last = last.wrapping_add(1);
                    }
                }
            }
            Operand::Array(items) => {
                for (code, item) in (lo..=hi).zip(items) {
                    if let Operand::Str(s) = item {
                        self.mappings.insert(code, utf16be(s));
                    }
                }
            }
            _ => {}
        }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Decode shown-string bytes, consuming the shortest declared code
    /// length that has a mapping. Unmapped codes become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let lengths: &[usize] = if self.code_lengths.is_empty() {
            &[1, 2]
        } else {
            &self.code_lengths
        };

        let mut out = String::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let hit = lengths.iter().find_map(|&len| {
                let chunk = bytes.get(pos..pos + len)?;
                self.lookup(code_of(chunk)).map(|s| (len, s))
            });
            match hit {
                Some((len, s)) => {
                    out.push_str(s);
                    pos += len;
                }
                None => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    pos += lengths[0].max(1);
                }
            }
        }
        out
    }
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

fn utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| u16::from_be_bytes([c[0], *c.get(1).unwrap_or(&0)]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decode a shown string without a ToUnicode map.
///
/// UTF-16BE when the string starts with a byte order mark, otherwise each
/// byte is taken as a Latin-1 code point (close to PDFDocEncoding and
/// WinAnsi for printable ASCII).
pub fn decode_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return utf16be(rest);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}
