use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};

/// An entry of the coding alphabet: one of the 256 byte values, or the
/// end-of-stream marker that terminates every payload.
///
/// `Eof` sorts after every byte, which fixes its place in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Byte(u8),
    Eof,
}

impl Symbol {
    /// Byte value written to the header for this symbol. The end-of-stream
    /// marker is stored as 0 and recognised by its position.
    pub fn header_byte(self) -> u8 {
        match self {
            Symbol::Byte(b) => b,
            Symbol::Eof => 0,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Byte(b) if b.is_ascii_graphic() => write!(f, "'{}' ({})", *b as char, b),
            Symbol::Byte(b) => write!(f, "{:#04x}", b),
            Symbol::Eof => write!(f, "EOF"),
        }
    }
}

/// Occurrence counts for every symbol seen, plus the end-of-stream marker
/// with a count of 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<Symbol, u64>,
}

impl FrequencyTable {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        Self::from_counts(&counts)
    }

    /// Counts every byte of `reader` until it is exhausted.
    pub fn from_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut counts = [0u64; 256];
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for &byte in &buf[..n] {
                counts[byte as usize] += 1;
            }
        }
        Ok(Self::from_counts(&counts))
    }

    fn from_counts(counts: &[u64; 256]) -> Self {
        let mut table: BTreeMap<Symbol, u64> = counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(byte, &count)| (Symbol::Byte(byte as u8), count))
            .collect();
        table.insert(Symbol::Eof, 1);
        FrequencyTable { counts: table }
    }

    pub fn get(&self, symbol: Symbol) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols, the end-of-stream marker included.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Never true: the end-of-stream marker is always present.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Symbols in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}
