// Wavstream -- A streaming RIFF/WAVE container library in Rust
// Copyright 2026 The Wavstream Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! Building blocks for working with the WAVE container.
//!
//! A canonical WAVE file starts with a 44-byte header made of three parts:
//!
//! * The 12-byte RIFF header: the `RIFF` tag, a size, and the `WAVE` tag.
//! * The `fmt ` chunk: an 8-byte chunk header followed by at least 16 bytes
//!   that describe the audio data. Longer chunks carry extension bytes.
//! * The 8-byte header of the `data` chunk. The samples follow it.
//!
//! This module contains the types for each of those parts, and the two
//! functions that tie them together: [`decode_header`] and [`encode_header`].
//! The reader and writer in the crate root are built on top of them.

use std::io;

use crate::read::ReadExt;
use crate::{Error, Result, WavHeader};

/// The tag that every WAVE file starts with.
pub const RIFF_TAG: [u8; 4] = *b"RIFF";

/// The form type that follows the RIFF size.
pub const WAVE_TAG: [u8; 4] = *b"WAVE";

/// The tag of the chunk that describes the audio format.
pub const FMT_TAG: [u8; 4] = *b"fmt ";

/// The tag of the chunk that holds the samples.
pub const DATA_TAG: [u8; 4] = *b"data";

/// The length of the canonical header, up to the first byte of sample data.
pub const HEADER_LEN: u32 = 44;

/// The smallest `fmt ` chunk that can describe the audio data.
pub const MIN_FMT_LEN: u32 = 16;

/// The format tag that is written into every header.
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xfffe;

trait Bytes {
    fn read_4_bytes(&self) -> [u8; 4];
    fn read_le_u16(&self) -> u16;
    fn read_le_u32(&self) -> u32;

    fn write_le_u16(&mut self, x: u16);
    fn write_le_u32(&mut self, x: u32);
}

impl Bytes for [u8] {
    #[inline(always)]
    fn read_4_bytes(&self) -> [u8; 4] {
        [self[0], self[1], self[2], self[3]]
    }

    #[inline(always)]
    fn read_le_u16(&self) -> u16 {
        u16::from_le_bytes([self[0], self[1]])
    }

    #[inline(always)]
    fn read_le_u32(&self) -> u32 {
        u32::from_le_bytes(self.read_4_bytes())
    }

    #[inline(always)]
    fn write_le_u16(&mut self, x: u16) {
        self[..2].copy_from_slice(&x.to_le_bytes());
    }

    #[inline(always)]
    fn write_le_u32(&mut self, x: u32) {
        self[..4].copy_from_slice(&x.to_le_bytes());
    }
}

/// The outermost header of a wav file: the RIFF header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiffHeader {
    /// The size stored after the `RIFF` tag.
    ///
    /// Readers take this value as declared, it is not checked against the
    /// length of the stream. The writer in this crate stores the length of
    /// the complete file here, header included.
    pub len: u32,
}

impl RiffHeader {
    /// Parse the RIFF WAVE header.
    ///
    /// This checks both magic tags, so it can be used to test whether a file
    /// might be a wav file at all.
    pub fn from_bytes(bytes: [u8; 12]) -> Result<RiffHeader> {
        if bytes[..4].read_4_bytes() != RIFF_TAG {
            return Err(Error::FormatError("bad RIFF marker"));
        }
        let result = RiffHeader {
            len: bytes[4..].read_le_u32(),
        };
        if bytes[8..].read_4_bytes() != WAVE_TAG {
            return Err(Error::FormatError("bad WAVE marker"));
        }
        Ok(result)
    }

    /// Serialize the header for writing to a file.
    pub fn to_bytes(self) -> [u8; 12] {
        let mut result: [u8; 12] = *b"RIFF\0\0\0\0WAVE";
        result[4..].write_le_u32(self.len);
        result
    }
}

/// The 8-byte header that precedes the contents of every chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    /// The four-character code that identifies the chunk.
    pub tag: [u8; 4],
    /// The length in bytes of the chunk contents.
    pub len: u32,
}

impl ChunkHeader {
    /// Parse a chunk header, without looking at the tag.
    pub fn from_bytes(bytes: [u8; 8]) -> ChunkHeader {
        ChunkHeader {
            tag: bytes[..4].read_4_bytes(),
            len: bytes[4..].read_le_u32(),
        }
    }

    /// Serialize the chunk header.
    pub fn to_bytes(self) -> [u8; 8] {
        let mut result = [0u8; 8];
        result[..4].copy_from_slice(&self.tag);
        result[4..].write_le_u32(self.len);
        result
    }

    /// Returns the header if it carries `tag`, or a format error otherwise.
    fn expect_tag(self, tag: [u8; 4], msg: &'static str) -> Result<ChunkHeader> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(Error::FormatError(msg))
        }
    }
}

/// The fields that every `fmt ` chunk starts with.
///
/// This is the `WAVEFORMAT` struct plus `wBitsPerSample`, which is what the
/// 16-byte `PCMWAVEFORMAT` struct contains. Larger variants such as
/// `WAVEFORMATEX` and `WAVEFORMATEXTENSIBLE` extend it, but those extensions
/// are not interpreted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FmtChunk {
    /// The field `wFormatTag`.
    pub format_tag: u16,
    /// The field `nChannels`, as stored.
    pub channels: u16,
    /// The field `nSamplesPerSec`.
    pub sample_rate: u32,
    /// The field `nAvgBytesPerSec`.
    pub byte_rate: u32,
    /// The field `nBlockAlign`.
    pub block_align: u16,
    /// The field `wBitsPerSample`.
    pub bits_per_sample: u16,
}

impl FmtChunk {
    /// Parse the first 16 bytes of a `fmt ` chunk.
    pub fn from_bytes(bytes: [u8; 16]) -> FmtChunk {
        FmtChunk {
            format_tag: bytes[0..].read_le_u16(),
            channels: bytes[2..].read_le_u16(),
            sample_rate: bytes[4..].read_le_u32(),
            byte_rate: bytes[8..].read_le_u32(),
            block_align: bytes[12..].read_le_u16(),
            bits_per_sample: bytes[14..].read_le_u16(),
        }
    }

    /// Serialize the 16-byte chunk contents.
    pub fn to_bytes(self) -> [u8; 16] {
        let mut result = [0u8; 16];
        result[0..].write_le_u16(self.format_tag);
        result[2..].write_le_u16(self.channels);
        result[4..].write_le_u32(self.sample_rate);
        result[8..].write_le_u32(self.byte_rate);
        result[12..].write_le_u16(self.block_align);
        result[14..].write_le_u16(self.bits_per_sample);
        result
    }
}

/// Everything that was read from a header by [`decode_header`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderInfo {
    /// The size declared in the RIFF header.
    pub riff_len: u32,
    /// The declared size of the `fmt ` chunk, extension bytes included.
    pub fmt_len: u32,
    /// The leading fields of the `fmt ` chunk.
    pub fmt: FmtChunk,
    /// The declared size of the `data` chunk.
    pub data_len: u32,
}

impl HeaderInfo {
    /// Returns the audio properties.
    ///
    /// The channel count is stored as 16 bits, but only the lower 8 bits are
    /// kept here.
    pub fn header(&self) -> WavHeader {
        WavHeader {
            channels: self.fmt.channels as u8,
            sample_rate: self.fmt.sample_rate,
            bits_per_sample: self.fmt.bits_per_sample,
        }
    }
}

/// Reads a header from the start of a WAVE stream.
///
/// This reads the RIFF header, a `fmt ` chunk and the header of a `data`
/// chunk, in that order, and nothing else. Afterwards the reader is
/// positioned at the first byte of sample data. Extension bytes of the `fmt `
/// chunk are read and discarded.
///
/// Declared sizes are taken as they are: the RIFF size and data size are not
/// compared against the length of the stream. If the stream ends early, the
/// `io::Error` of the short read is returned.
pub fn decode_header<R: io::Read>(reader: &mut R) -> Result<HeaderInfo> {
    let riff = RiffHeader::from_bytes(reader.read_bytes::<12>()?)?;

    let fmt_header = ChunkHeader::from_bytes(reader.read_bytes::<8>()?)
        .expect_tag(FMT_TAG, "bad fmt marker")?;
    if fmt_header.len < MIN_FMT_LEN {
        return Err(Error::FormatError("fmt chunk too small"));
    }

    let fmt = FmtChunk::from_bytes(reader.read_bytes::<16>()?);
    reader.skip_bytes((fmt_header.len - MIN_FMT_LEN) as u64)?;

    let data_header = ChunkHeader::from_bytes(reader.read_bytes::<8>()?)
        .expect_tag(DATA_TAG, "bad data marker")?;

    Ok(HeaderInfo {
        riff_len: riff.len,
        fmt_len: fmt_header.len,
        fmt,
        data_len: data_header.len,
    })
}

/// Serializes the canonical 44-byte header.
///
/// The `fmt ` chunk is always 16 bytes and carries the
/// [`WAVE_FORMAT_EXTENSIBLE`] tag. The byte rate and block align fields are
/// written as zero; they are not derived from the other fields.
pub fn encode_header(header: WavHeader, data_len: u32, total_len: u32) -> [u8; 44] {
    let fmt = FmtChunk {
        format_tag: WAVE_FORMAT_EXTENSIBLE,
        channels: header.channels as u16,
        sample_rate: header.sample_rate,
        byte_rate: 0,
        block_align: 0,
        bits_per_sample: header.bits_per_sample,
    };

    let mut result = [0u8; 44];
    result[0..12].copy_from_slice(&RiffHeader { len: total_len }.to_bytes());
    result[12..20].copy_from_slice(&ChunkHeader { tag: FMT_TAG, len: MIN_FMT_LEN }.to_bytes());
    result[20..36].copy_from_slice(&fmt.to_bytes());
    result[36..44].copy_from_slice(&ChunkHeader { tag: DATA_TAG, len: data_len }.to_bytes());
    result
}

#[cfg(test)]
fn stereo_cd() -> WavHeader {
    WavHeader {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    }
}

#[test]
fn encode_header_matches_canonical_layout() {
    let bytes = encode_header(stereo_cd(), 16, 60);
    assert_eq!(&bytes[..], &b"RIFF\x3c\x00\x00\x00WAVE\
fmt \x10\x00\x00\x00\xfe\xff\x02\x00\x44\xac\x00\x00\x00\x00\x00\x00\x00\x00\x10\x00\
data\x10\x00\x00\x00"[..]);
}

#[test]
fn decode_header_inverts_encode_header() {
    let bytes = encode_header(stereo_cd(), 1000, 1044);
    let mut cursor = io::Cursor::new(&bytes[..]);
    let info = decode_header(&mut cursor).unwrap();

    assert_eq!(info.header(), stereo_cd());
    assert_eq!(info.riff_len, 1044);
    assert_eq!(info.fmt_len, 16);
    assert_eq!(info.data_len, 1000);
    assert_eq!(info.fmt.format_tag, WAVE_FORMAT_EXTENSIBLE);
    assert_eq!(info.fmt.byte_rate, 0);
    assert_eq!(info.fmt.block_align, 0);
    assert_eq!(cursor.position(), 44);
}

#[test]
fn decode_header_skips_fmt_extension() {
    // A WAVEFORMATEX header: 18-byte fmt chunk with cbSize = 0, PCM tag.
    let bytes = b"RIFF\x26\x00\x00\x00WAVE\
fmt \x12\x00\x00\x00\x01\x00\x01\x00\x80\x3e\x00\x00\x00\x7d\x00\x00\x02\x00\x10\x00\x00\x00\
data\x02\x00\x00\x00\x07\x00";
    let mut cursor = io::Cursor::new(&bytes[..]);
    let info = decode_header(&mut cursor).unwrap();

    assert_eq!(info.fmt_len, 18);
    assert_eq!(info.fmt.format_tag, 1);
    assert_eq!(info.fmt.byte_rate, 32000);
    assert_eq!(info.fmt.block_align, 2);
    assert_eq!(info.data_len, 2);
    assert_eq!(info.header(), WavHeader { channels: 1, sample_rate: 16000, bits_per_sample: 16 });
    assert_eq!(cursor.position(), 46);
}

#[test]
fn decode_header_rejects_bad_markers() {
    let good = encode_header(stereo_cd(), 0, 44);
    let cases: [(usize, &'static str); 4] = [
        (0, "bad RIFF marker"),
        (8, "bad WAVE marker"),
        (12, "bad fmt marker"),
        (36, "bad data marker"),
    ];

    for &(offset, expected) in &cases {
        let mut bytes = good;
        bytes[offset + 3] = b'X';
        match decode_header(&mut &bytes[..]) {
            Err(Error::FormatError(msg)) => assert_eq!(msg, expected),
            other => panic!("expected format error at offset {}, got {:?}", offset, other),
        }
    }
}

#[test]
fn decode_header_rejects_small_fmt_chunk() {
    let mut bytes = encode_header(stereo_cd(), 0, 44);
    bytes[16] = 14;
    match decode_header(&mut &bytes[..]) {
        Err(Error::FormatError(msg)) => assert_eq!(msg, "fmt chunk too small"),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn decode_header_stops_after_riff_header_on_rifx() {
    let mut bytes = encode_header(stereo_cd(), 0, 44);
    bytes[3] = b'X';
    let mut cursor = io::Cursor::new(&bytes[..]);
    assert!(matches!(decode_header(&mut cursor), Err(Error::FormatError(_))));
    // Only the RIFF header was consumed.
    assert_eq!(cursor.position(), 12);
}

#[test]
fn decode_header_surfaces_short_reads() {
    let bytes = encode_header(stereo_cd(), 0, 44);
    for len in 0..44 {
        match decode_header(&mut &bytes[..len]) {
            Err(Error::IoError(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("truncation at {} should fail with an io error, got {:?}", len, other),
        }
    }
}

#[test]
fn decode_header_truncates_wide_channel_count() {
    let mut bytes = encode_header(stereo_cd(), 0, 44);
    bytes[22] = 0x03;
    bytes[23] = 0x01;
    let info = decode_header(&mut &bytes[..]).unwrap();
    assert_eq!(info.fmt.channels, 0x0103);
    assert_eq!(info.header().channels, 0x03);
}
