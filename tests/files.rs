use std::fs::{self, File};
use std::io::Write;

use canonical_huffman::{HuffmanCodec, HuffmanError};
use tempfile::tempdir;

const TEXT: &str = "Hello, world! This is a sample text for Huffman compression. \
                    The quick brown fox jumps over the lazy dog. \
                    Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

#[test]
fn test_file_roundtrip() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("sample.txt");
    let compressed = dir.path().join("sample.huff");
    let restored = dir.path().join("restored.txt");
    fs::write(&original, TEXT.repeat(20)).unwrap();

    let stats = HuffmanCodec::encode_from_file(
        File::open(&original).unwrap(),
        File::create(&compressed).unwrap(),
    )
    .unwrap();
    assert_eq!(stats.input_bytes, TEXT.len() as u64 * 20);
    assert_eq!(stats.output_bytes, fs::metadata(&compressed).unwrap().len());
    assert!(stats.ratio() < 0.7);

    HuffmanCodec::decode_from_file(
        File::open(&compressed).unwrap(),
        File::create(&restored).unwrap(),
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&restored).unwrap(), TEXT.repeat(20));
}

#[test]
fn test_file_matches_in_memory_encoding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary.bin");
    let data: Vec<u8> = (0..100_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    File::create(&path).unwrap().write_all(&data).unwrap();

    let mut streamed = Vec::new();
    HuffmanCodec::encode_from_file(File::open(&path).unwrap(), &mut streamed).unwrap();
    assert_eq!(streamed, HuffmanCodec::compress(&data).unwrap());
}

#[test]
fn test_truncated_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cut.huff");
    let mut compressed = HuffmanCodec::compress(TEXT.as_bytes()).unwrap();
    compressed.pop();
    fs::write(&path, &compressed).unwrap();

    let mut out = Vec::new();
    let err = HuffmanCodec::decode_from_file(File::open(&path).unwrap(), &mut out).unwrap_err();
    assert!(err.is_corrupt_input());
    assert!(matches!(err, HuffmanError::Decode(_)));
    assert!(out.is_empty());
}

#[test]
fn test_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty");
    File::create(&path).unwrap();

    let mut out = Vec::new();
    HuffmanCodec::encode_from_file(File::open(&path).unwrap(), &mut out).unwrap();
    assert_eq!(out, [1, 0, 1, 0]);
}
