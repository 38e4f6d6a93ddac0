use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::bit_stream::{BitReader, BitWriter};
use crate::canonical::{CanonicalCodeTable, Code};
use crate::error::{DecodeError, HuffmanError, Result};
use crate::frequency::{FrequencyTable, Symbol};
use crate::hufftree::HuffmanTree;
use crate::metadata::Header;

const CHUNK_SIZE: usize = 64 * 1024;

/// Byte counts of one compression or decompression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl CodecStats {
    /// Output size as a fraction of input size; 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }
}

/// Code table for one input, built from its symbol frequencies.
#[derive(Debug, Clone)]
pub struct Encoder {
    table: CanonicalCodeTable,
    byte_codes: [Option<Code>; 256],
    eof_code: Code,
}

impl Encoder {
    pub fn new(data: &[u8]) -> Result<Self> {
        Self::from_frequencies(&FrequencyTable::from_bytes(data))
    }

    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let tree = HuffmanTree::from_frequencies(frequencies);
        let mut lengths = tree.code_lengths()?;
        lengths.reserve_longest_for_eof();
        let table = CanonicalCodeTable::from_lengths(&lengths)?;

        let mut byte_codes = [None; 256];
        let mut eof_code = Code::EMPTY;
        for &(symbol, code) in table.entries() {
            match symbol {
                Symbol::Byte(b) => byte_codes[b as usize] = Some(code),
                Symbol::Eof => eof_code = code,
            }
        }

        debug!(
            symbols = table.len(),
            max_length = table.max_length(),
            "built canonical code table"
        );
        Ok(Encoder {
            table,
            byte_codes,
            eof_code,
        })
    }

    pub fn table(&self) -> &CanonicalCodeTable {
        &self.table
    }

    pub fn header(&self) -> Header {
        Header::from_table(&self.table)
    }

    /// Appends the code of every byte in `data`.
    pub fn push_bytes(&self, writer: &mut BitWriter, data: &[u8]) -> Result<()> {
        for &byte in data {
            let code = self.byte_codes[byte as usize].ok_or(HuffmanError::UnknownSymbol(byte))?;
            writer.push_code(code);
        }
        Ok(())
    }

    pub fn push_eof(&self, writer: &mut BitWriter) {
        writer.push_code(self.eof_code);
    }

    /// Header followed by the packed payload and the end-of-stream code.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let header = self.header();
        let mut out = Vec::with_capacity(header.encoded_len() + data.len() / 2 + 1);
        header.write_to(&mut out)?;

        let mut writer = BitWriter::with_capacity(data.len() / 2 + 1);
        self.push_bytes(&mut writer, data)?;
        self.push_eof(&mut writer);
        out.extend_from_slice(&writer.flush());
        Ok(out)
    }
}

/// Code table rebuilt from a stored header.
#[derive(Debug, Clone)]
pub struct Decoder {
    table: CanonicalCodeTable,
}

impl Decoder {
    pub fn from_header(header: &Header) -> Result<Self> {
        let table = CanonicalCodeTable::from_lengths(&header.code_lengths())?;
        Ok(Decoder { table })
    }

    pub fn table(&self) -> &CanonicalCodeTable {
        &self.table
    }

    /// Matches payload bits against the table one bit at a time.
    ///
    /// Pending bits accumulate until they equal a code. A byte code emits
    /// its byte and clears the pending bits; the end-of-stream code finishes
    /// decoding and any padding after it is ignored. Running out of bits
    /// first means the stream was cut short.
    pub fn decode_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(payload);
        let mut output = Vec::with_capacity(payload.len() * 2);
        let mut pending = Code::EMPTY;
        let max_length = self.table.max_length();

        loop {
            let bit = reader.next_bit().ok_or(DecodeError::Truncated {
                decoded: output.len(),
            })?;
            pending.push(bit);

            match self.table.symbol(&pending) {
                Some(Symbol::Eof) => break,
                Some(Symbol::Byte(b)) => {
                    output.push(b);
                    pending = Code::EMPTY;
                }
                None if pending.len >= max_length => {
                    return Err(DecodeError::InvalidCode {
                        bit_offset: reader.position(),
                    }
                    .into());
                }
                None => {}
            }
        }

        debug!(
            decoded = output.len(),
            padding_bits = reader.remaining(),
            "payload decoded"
        );
        Ok(output)
    }
}

/// Whole-buffer and stream entry points.
pub struct HuffmanCodec;

impl HuffmanCodec {
    pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
        Encoder::new(data)?.encode(data)
    }

    pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        let mut cursor = data;
        let header = Header::read_from(&mut cursor)?;
        let decoder = Decoder::from_header(&header)?;
        decoder.decode_payload(cursor)
    }

    /// Reads just the header of a compressed buffer and rebuilds its code table.
    pub fn read_table(data: &[u8]) -> Result<CanonicalCodeTable> {
        let mut cursor = data;
        let header = Header::read_from(&mut cursor)?;
        Ok(Decoder::from_header(&header)?.table)
    }

    /// Two passes over a rewindable source: count frequencies, rewind, then
    /// emit header and payload in chunks.
    pub fn encode_from_file<R: Read + Seek, W: Write>(input: R, output: W) -> Result<CodecStats> {
        let mut input = BufReader::new(input);
        let frequencies = FrequencyTable::from_reader(&mut input)?;
        input.seek(SeekFrom::Start(0))?;

        let encoder = Encoder::from_frequencies(&frequencies)?;
        let header = encoder.header();

        let mut output = BufWriter::new(output);
        header.write_to(&mut output)?;

        let mut stats = CodecStats {
            input_bytes: 0,
            output_bytes: header.encoded_len() as u64,
        };
        let mut writer = BitWriter::with_capacity(CHUNK_SIZE);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            stats.input_bytes += n as u64;
            encoder.push_bytes(&mut writer, &chunk[..n])?;
            let full = writer.drain_full_bytes();
            stats.output_bytes += full.len() as u64;
            output.write_all(&full)?;
        }

        encoder.push_eof(&mut writer);
        let tail = writer.flush();
        stats.output_bytes += tail.len() as u64;
        output.write_all(&tail)?;
        output.flush()?;

        debug!(?stats, "encoded stream");
        Ok(stats)
    }

    /// Decodes the whole input before writing, so a corrupt stream writes nothing.
    pub fn decode_from_file<R: Read, W: Write>(mut input: R, mut output: W) -> Result<CodecStats> {
        let mut compressed = Vec::new();
        input.read_to_end(&mut compressed)?;
        let decoded = Self::decompress(&compressed)?;

        output.write_all(&decoded)?;
        output.flush()?;

        let stats = CodecStats {
            input_bytes: compressed.len() as u64,
            output_bytes: decoded.len() as u64,
        };
        debug!(?stats, "decoded stream");
        Ok(stats)
    }
}
