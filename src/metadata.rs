//! Header of a compressed stream.
//!
//! ```text
//! [1 byte]   entry count E (1..=255), or 0 followed by [1 byte] E - 256
//! E times:   [1 byte] symbol  [1 byte] code length
//! ```
//!
//! Entries are in ascending (length, symbol) order, where the end-of-stream
//! marker ranks as symbol 256. It is therefore always the last entry, stored
//! with symbol byte 0, so the raw symbol bytes of a length class need not
//! ascend: `aaaab` stores `(b, 2)` before `(0, 2)`.

use std::collections::HashSet;
use std::io::{self, Read, Write};

use crate::canonical::{CanonicalCodeTable, CodeLengthTable, MAX_CODE_LENGTH};
use crate::error::{FormatError, HuffmanError, Result};
use crate::frequency::Symbol;

const COUNT_ESCAPE: u8 = 0;
const MAX_ENTRIES: usize = 257;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(Symbol, u8)>,
}

impl Header {
    /// Header for a table whose end-of-stream marker is last in canonical order.
    pub fn from_table(table: &CanonicalCodeTable) -> Self {
        Header {
            entries: table.entries().iter().map(|&(s, c)| (s, c.len)).collect(),
        }
    }

    pub fn entries(&self) -> &[(Symbol, u8)] {
        &self.entries
    }

    pub fn code_lengths(&self) -> CodeLengthTable {
        self.entries.iter().copied().collect()
    }

    /// Bytes taken by the header on disk.
    pub fn encoded_len(&self) -> usize {
        let count_bytes = if self.entries.len() > 255 { 2 } else { 1 };
        count_bytes + 2 * self.entries.len()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let count = self.entries.len();
        if count <= 255 {
            writer.write_all(&[count as u8])?;
        } else {
            writer.write_all(&[COUNT_ESCAPE, (count - 256) as u8])?;
        }
        for &(symbol, length) in &self.entries {
            writer.write_all(&[symbol.header_byte(), length])?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let count = match read_byte(reader)? {
            COUNT_ESCAPE => 256 + read_byte(reader)? as usize,
            n => n as usize,
        };
        if count > MAX_ENTRIES {
            return Err(FormatError::BadEntryCount(count).into());
        }

        let mut entries = Vec::with_capacity(count);
        let mut seen = HashSet::with_capacity(count);
        for index in 0..count {
            let byte = read_byte(reader)?;
            let length = read_byte(reader)?;

            let symbol = if index + 1 == count {
                if byte != 0 {
                    return Err(FormatError::BadEofMarker(byte).into());
                }
                Symbol::Eof
            } else {
                if !seen.insert(byte) {
                    return Err(FormatError::DuplicateSymbol(byte).into());
                }
                Symbol::Byte(byte)
            };

            if length == 0 || length > MAX_CODE_LENGTH {
                return Err(FormatError::BadLength { symbol: byte, length }.into());
            }
            if let Some(&(prev_symbol, prev_length)) = entries.last() {
                if (prev_length, prev_symbol) >= (length, symbol) {
                    return Err(FormatError::OutOfOrder.into());
                }
            }
            entries.push((symbol, length));
        }

        Ok(Header { entries })
    }
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HuffmanError::Format(FormatError::UnexpectedEnd),
        _ => HuffmanError::Io(e),
    })?;
    Ok(byte[0])
}
