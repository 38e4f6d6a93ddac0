use crate::canonical::Code;

/// Packs bits MSB-first into a growing byte buffer.
#[derive(Default, Debug)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bytes: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            bytes: Vec::with_capacity(bytes),
            bit_count: 0,
        }
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_count % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_count += 1;
    }

    /// Appends the low `bit_length` bits of `bits`, most significant first.
    pub fn push_bits(&mut self, bits: u64, bit_length: u8) {
        for bit_pos in (0..bit_length).rev() {
            self.push_bit((bits >> bit_pos) & 1 != 0);
        }
    }

    pub fn push_code(&mut self, code: Code) {
        self.push_bits(code.bits, code.len);
    }

    /// Removes and returns every completed byte, keeping a trailing partial one.
    pub fn drain_full_bytes(&mut self) -> Vec<u8> {
        let full = self.bit_count / 8;
        let partial = self.bytes.split_off(full);
        self.bit_count -= full * 8;
        std::mem::replace(&mut self.bytes, partial)
    }

    /// Returns the packed bytes. Unused bits of the last byte are zero.
    pub fn flush(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bits MSB-first from a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, position: 0 }
    }

    /// Next bit, or `None` once every bit of the buffer has been read.
    pub fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.bytes.get(self.position / 8)?;
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.next_bit()
    }
}
