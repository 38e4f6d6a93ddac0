//! Canonical code assignment.
//!
//! Codes are a pure function of the per-symbol lengths: symbols are sorted by
//! (length, symbol) and numbered consecutively, shifting left whenever the
//! length grows. Encoder and decoder both run [`CanonicalCodeTable::from_lengths`]
//! so only the lengths ever need to be stored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use crate::error::{FormatError, Result};
use crate::frequency::Symbol;

/// Widest code the 64-bit code register can hold.
pub const MAX_CODE_LENGTH: u8 = 64;

/// A codeword: the low `len` bits of `bits`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    pub const EMPTY: Code = Code { bits: 0, len: 0 };

    pub fn new(bits: u64, len: u8) -> Self {
        Code { bits, len }
    }

    /// Appends one bit on the right.
    pub fn push(&mut self, bit: bool) {
        self.bits = (self.bits << 1) | bit as u64;
        self.len += 1;
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len
            && other.bits.checked_shr((other.len - self.len) as u32).unwrap_or(0) == self.bits
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.len as usize)
    }
}

/// Code length of every symbol in the alphabet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeLengthTable {
    lengths: BTreeMap<Symbol, u8>,
}

impl CodeLengthTable {
    pub fn new() -> Self {
        CodeLengthTable::default()
    }

    pub fn insert(&mut self, symbol: Symbol, length: u8) -> Option<u8> {
        self.lengths.insert(symbol, length)
    }

    pub fn get(&self, symbol: Symbol) -> Option<u8> {
        self.lengths.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn max_length(&self) -> u8 {
        self.lengths.values().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u8)> + '_ {
        self.lengths.iter().map(|(&s, &l)| (s, l))
    }

    /// Entries sorted by (length, symbol), the order codes are numbered in.
    pub fn canonical_order(&self) -> Vec<(Symbol, u8)> {
        let mut entries: Vec<(Symbol, u8)> = self.iter().collect();
        entries.sort_by_key(|&(symbol, length)| (length, symbol));
        entries
    }

    /// Gives the end-of-stream marker the longest code, trading lengths with
    /// the last symbol in canonical order if needed. The marker has the
    /// smallest possible weight, so the trade never makes the output longer.
    /// Afterwards the marker is the final entry in canonical order.
    pub fn reserve_longest_for_eof(&mut self) {
        let Some(eof_len) = self.get(Symbol::Eof) else {
            return;
        };
        let Some(&(last, last_len)) = self.canonical_order().last() else {
            return;
        };
        if last != Symbol::Eof && last_len > eof_len {
            self.lengths.insert(last, eof_len);
            self.lengths.insert(Symbol::Eof, last_len);
        }
    }
}

impl FromIterator<(Symbol, u8)> for CodeLengthTable {
    fn from_iter<I: IntoIterator<Item = (Symbol, u8)>>(iter: I) -> Self {
        CodeLengthTable {
            lengths: iter.into_iter().collect(),
        }
    }
}

/// Bijection between symbols and prefix-free codewords.
#[derive(Debug, Clone)]
pub struct CanonicalCodeTable {
    entries: Vec<(Symbol, Code)>,
    encode: BTreeMap<Symbol, Code>,
    decode: HashMap<Code, Symbol>,
    max_length: u8,
}

impl CanonicalCodeTable {
    /// Numbers the symbols canonically. Fails when the lengths cannot form a
    /// prefix-free code, i.e. a length class holds more codes than remain.
    pub fn from_lengths(lengths: &CodeLengthTable) -> Result<Self> {
        let order = lengths.canonical_order();

        let mut entries = Vec::with_capacity(order.len());
        // u128 so that the overflow check at length 64 cannot itself overflow
        let mut code: u128 = 0;
        let mut current_len = order.first().map(|&(_, l)| l).unwrap_or(0);

        for (symbol, length) in order {
            if length == 0 || length > MAX_CODE_LENGTH {
                return Err(FormatError::BadLength {
                    symbol: symbol.header_byte(),
                    length,
                }
                .into());
            }
            if length != current_len {
                code <<= length - current_len;
                current_len = length;
            }
            if code >> length != 0 {
                return Err(FormatError::OverSubscribed { length }.into());
            }
            let assigned = Code::new(code as u64, length);
            trace!(%symbol, code = %assigned, "assigned canonical code");
            entries.push((symbol, assigned));
            code += 1;
        }

        let encode = entries.iter().copied().collect();
        let decode = entries.iter().map(|&(s, c)| (c, s)).collect();

        Ok(CanonicalCodeTable {
            entries,
            encode,
            decode,
            max_length: current_len,
        })
    }

    pub fn code(&self, symbol: Symbol) -> Option<Code> {
        self.encode.get(&symbol).copied()
    }

    pub fn symbol(&self, code: &Code) -> Option<Symbol> {
        self.decode.get(code).copied()
    }

    /// Entries in canonical (length, symbol) order.
    pub fn entries(&self) -> &[(Symbol, Code)] {
        &self.entries
    }

    pub fn max_length(&self) -> u8 {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn code_lengths(&self) -> CodeLengthTable {
        self.entries.iter().map(|&(s, c)| (s, c.len)).collect()
    }
}

impl fmt::Display for CanonicalCodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, code) in &self.entries {
            writeln!(f, "{:<12} {:>3}  {}", symbol.to_string(), code.len, code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::HuffmanError;

    fn table(pairs: &[(Symbol, u8)]) -> CodeLengthTable {
        pairs.iter().copied().collect()
    }

    fn code_str(t: &CanonicalCodeTable, s: Symbol) -> String {
        t.code(s).unwrap().to_string()
    }

    #[test]
    fn test_aaaab_codes() {
        let lengths = table(&[(Symbol::Byte(b'a'), 1), (Symbol::Byte(b'b'), 2), (Symbol::Eof, 2)]);
        let codes = CanonicalCodeTable::from_lengths(&lengths).unwrap();
        assert_eq!(code_str(&codes, Symbol::Byte(b'a')), "0");
        assert_eq!(code_str(&codes, Symbol::Byte(b'b')), "10");
        assert_eq!(code_str(&codes, Symbol::Eof), "11");
        assert_eq!(codes.max_length(), 2);
    }

    #[test]
    fn test_textbook_example() {
        // A:2 B:1 C:3 D:3 -> B=0 A=10 C=110 D=111
        let lengths = table(&[
            (Symbol::Byte(b'A'), 2),
            (Symbol::Byte(b'B'), 1),
            (Symbol::Byte(b'C'), 3),
            (Symbol::Byte(b'D'), 3),
        ]);
        let codes = CanonicalCodeTable::from_lengths(&lengths).unwrap();
        assert_eq!(code_str(&codes, Symbol::Byte(b'B')), "0");
        assert_eq!(code_str(&codes, Symbol::Byte(b'A')), "10");
        assert_eq!(code_str(&codes, Symbol::Byte(b'C')), "110");
        assert_eq!(code_str(&codes, Symbol::Byte(b'D')), "111");
    }

    #[test]
    fn test_codes_are_prefix_free_and_consecutive() {
        let lengths = table(&[
            (Symbol::Byte(1), 3),
            (Symbol::Byte(2), 3),
            (Symbol::Byte(3), 2),
            (Symbol::Byte(4), 4),
            (Symbol::Byte(5), 4),
            (Symbol::Byte(6), 5),
            (Symbol::Eof, 5),
        ]);
        let codes = CanonicalCodeTable::from_lengths(&lengths).unwrap();
        let entries = codes.entries();
        for (i, (_, a)) in entries.iter().enumerate() {
            for (j, (_, b)) in entries.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{} is a prefix of {}", a, b);
                }
            }
        }
        for pair in entries.windows(2) {
            let (a, b) = (pair[0].1, pair[1].1);
            assert!(a.len <= b.len);
            if a.len == b.len {
                assert_eq!(a.bits + 1, b.bits);
            }
        }
        assert_eq!(codes.code_lengths(), lengths);
    }

    #[test]
    fn test_lone_symbol() {
        let codes = CanonicalCodeTable::from_lengths(&table(&[(Symbol::Eof, 1)])).unwrap();
        assert_eq!(codes.code(Symbol::Eof), Some(Code::new(0, 1)));
    }

    #[test]
    fn test_over_subscribed_lengths_rejected() {
        let lengths = table(&[(Symbol::Byte(1), 1), (Symbol::Byte(2), 1), (Symbol::Eof, 1)]);
        match CanonicalCodeTable::from_lengths(&lengths) {
            Err(HuffmanError::Format(FormatError::OverSubscribed { length: 1 })) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        let lengths = table(&[(Symbol::Byte(9), 0)]);
        assert!(matches!(
            CanonicalCodeTable::from_lengths(&lengths),
            Err(HuffmanError::Format(FormatError::BadLength { symbol: 9, length: 0 }))
        ));
    }

    #[test]
    fn test_full_width_codes() {
        let lengths = table(&[(Symbol::Byte(0), 1), (Symbol::Byte(1), 64), (Symbol::Eof, 64)]);
        let codes = CanonicalCodeTable::from_lengths(&lengths).unwrap();
        assert_eq!(codes.code(Symbol::Byte(1)), Some(Code::new(1 << 63, 64)));
        assert_eq!(codes.code(Symbol::Eof), Some(Code::new((1 << 63) + 1, 64)));
    }

    #[test]
    fn test_reserve_longest_for_eof() {
        let mut lengths = table(&[
            (Symbol::Byte(b'a'), 1),
            (Symbol::Byte(b'b'), 3),
            (Symbol::Byte(b'c'), 3),
            (Symbol::Eof, 2),
        ]);
        lengths.reserve_longest_for_eof();
        assert_eq!(lengths.get(Symbol::Eof), Some(3));
        assert_eq!(lengths.get(Symbol::Byte(b'c')), Some(2));
        assert_eq!(lengths.canonical_order().last(), Some(&(Symbol::Eof, 3)));
    }

    #[test]
    fn test_code_push_and_display() {
        let mut code = Code::EMPTY;
        for bit in [true, false, true, true] {
            code.push(bit);
        }
        assert_eq!(code, Code::new(0b1011, 4));
        assert_eq!(code.to_string(), "1011");
        assert_eq!(Code::new(1, 3).to_string(), "001");
    }
}
