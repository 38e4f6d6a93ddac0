//! # canonical_huffman
//!
//! Lossless compression of arbitrary byte streams with canonical Huffman codes.
//!
//! A compressed stream stores only the code length of each symbol; both sides
//! rebuild identical codes from those lengths, so the tree never leaves the
//! encoder.
//!
//! ## Quick Start
//!
//! ```rust
//! use canonical_huffman::HuffmanCodec;
//!
//! let compressed = HuffmanCodec::compress(b"aaaab")?;
//! assert_eq!(HuffmanCodec::decompress(&compressed)?, b"aaaab");
//! # Ok::<(), canonical_huffman::HuffmanError>(())
//! ```
//!
//! Files go through [`HuffmanCodec::encode_from_file`] and
//! [`HuffmanCodec::decode_from_file`], which take any reader and writer.

pub mod bit_stream;
pub mod canonical;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod metadata;

// Internal modules - not part of public API
mod min_heap;

// Re-export main types for convenience
pub use canonical::{CanonicalCodeTable, Code, CodeLengthTable};
pub use error::{DecodeError, FormatError, HuffmanError, Result};
pub use frequency::{FrequencyTable, Symbol};
pub use huffman_codec::{CodecStats, Decoder, Encoder, HuffmanCodec};
pub use hufftree::HuffmanTree;
