// Wavstream -- A streaming RIFF/WAVE container library in Rust
// Copyright 2026 The Wavstream Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wavstream, a streaming reader and writer for the WAVE container.
//!
//! Wavstream only deals with the container: it turns a byte stream into a
//! [`WavHeader`] plus the raw bytes of the data chunk, and back. Samples are
//! not interpreted.
//!
//! Examples
//! ========
//!
//! The following example wraps 16 bytes of stereo 16-bit audio in a WAVE
//! container, then reads it back.
//!
//! ```
//! use std::io::Cursor;
//! use wavstream::{WavHeader, WavReader, WavWriter};
//!
//! let header = WavHeader {
//!     channels: 2,
//!     sample_rate: 44100,
//!     bits_per_sample: 16,
//! };
//! let payload: Vec<u8> = (0..16).collect();
//!
//! let mut file = Cursor::new(Vec::new());
//! let mut writer = WavWriter::new(&mut file, header).unwrap();
//! writer.write_data(&payload).unwrap();
//! writer.close().unwrap();
//! drop(writer);
//!
//! file.set_position(0);
//! let mut reader = WavReader::new(&mut file).unwrap();
//! assert_eq!(reader.header(), header);
//! let mut buf = [0u8; 16];
//! let n = reader.read_data(&mut buf).unwrap();
//! assert_eq!(&buf[..n], &payload[..]);
//! ```

#![warn(missing_docs)]

use std::io;
use std::result;

use thiserror::Error;

mod read;
pub mod wav;
mod write;

pub use read::WavReader;
pub use write::WavWriter;

/// Specifies properties of the audio data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WavHeader {
    /// The number of channels.
    pub channels: u8,

    /// The number of samples per second.
    ///
    /// A common value is 44100, this is 44.1 kHz which is used for CD audio.
    pub sample_rate: u32,

    /// The number of bits per sample.
    ///
    /// A common value is 16 bits per sample, which is used for CD audio.
    pub bits_per_sample: u16,
}

/// The error type for operations on `WavReader` and `WavWriter`.
#[derive(Debug, Error)]
pub enum Error {
    /// An IO error occurred in the underlying reader or writer.
    ///
    /// This includes a stream that ends within the header.
    #[error("{0}")]
    IoError(#[from] io::Error),
    /// Ill-formed WAVE data was encountered.
    #[error("Ill-formed WAVE file: {0}")]
    FormatError(&'static str),
    /// The reader or writer was used after it had been closed.
    #[error("The reader or writer has been closed.")]
    Closed,
    /// Writing the data would make the file too large for its size fields.
    #[error("The data does not fit in a WAVE file.")]
    DataTooLong,
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::IoError(inner) => return inner,
            Error::FormatError(..) => io::ErrorKind::InvalidData,
            Error::Closed => io::ErrorKind::BrokenPipe,
            Error::DataTooLong => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

/// A type for results generated by Wavstream where the error type is hard-wired.
pub type Result<T> = result::Result<T, Error>;

#[test]
fn write_read_is_lossless() {
    let mut buffer = io::Cursor::new(Vec::new());
    let write_header = WavHeader {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    };
    let payload: Vec<u8> = (0..16).collect();

    {
        let mut writer = WavWriter::new(&mut buffer, write_header).unwrap();
        assert_eq!(writer.write_data(&payload).unwrap(), 16);
        writer.close().unwrap();
    }

    {
        let bytes = buffer.get_ref();
        assert_eq!(bytes.len(), 60);
        assert_eq!(&bytes[4..8], &60u32.to_le_bytes());
        assert_eq!(&bytes[40..44], &16u32.to_le_bytes());
    }

    {
        buffer.set_position(0);
        let mut reader = WavReader::new(&mut buffer).unwrap();
        assert_eq!(write_header, reader.header());
        assert_eq!(reader.data_len(), 16);
        assert_eq!(reader.riff_len(), 60);

        let mut buf = [0u8; 32];
        let n = reader.read_data(&mut buf).unwrap();
        assert_eq!(&buf[..n], &payload[..]);
        assert_eq!(reader.read_data(&mut buf).unwrap(), 0);
    }
}

#[test]
fn write_read_many_chunks_is_lossless() {
    use std::io::Read;

    let mut buffer = io::Cursor::new(Vec::new());
    let write_header = WavHeader {
        channels: 6,
        sample_rate: 96000,
        bits_per_sample: 24,
    };
    let payload: Vec<u8> = (0..5000_u32).map(|x| (x * 7 % 251) as u8).collect();

    {
        let mut writer = WavWriter::new(&mut buffer, write_header).unwrap();
        for chunk in payload.chunks(333) {
            io::Write::write_all(&mut writer, chunk).unwrap();
        }
        assert_eq!(writer.total_len(), 44 + 5000);
        writer.close().unwrap();
    }

    buffer.set_position(0);
    let mut reader = WavReader::new(&mut buffer).unwrap();
    assert_eq!(write_header, reader.header());
    assert_eq!(reader.data_len(), 5000);

    let mut data = Vec::new();
    reader.read_to_end(&mut data).unwrap();
    assert_eq!(data, payload);
}

#[test]
fn rifx_stream_is_rejected() {
    let mut bytes = wav::encode_header(
        WavHeader { channels: 1, sample_rate: 8000, bits_per_sample: 8 }, 0, 44).to_vec();
    bytes[3] = b'X';
    let mut cursor = io::Cursor::new(bytes);

    match WavReader::new(&mut cursor) {
        Err(Error::FormatError(..)) => {}
        Err(err) => panic!("expected a format error, got {:?}", err),
        Ok(..) => panic!("a RIFX stream should not be accepted"),
    }
    assert_eq!(cursor.position(), 12);
}

#[test]
fn errors_convert_to_io_errors() {
    let err: io::Error = Error::FormatError("bad RIFF marker").into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(err.to_string(), "Ill-formed WAVE file: bad RIFF marker");

    let err: io::Error = Error::Closed.into();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

    let inner = io::Error::new(io::ErrorKind::TimedOut, "slow disk");
    let err: io::Error = Error::from(inner).into();
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert_eq!(err.to_string(), "slow disk");
}

#[test]
fn io_error_is_the_source() {
    use std::error::Error as StdError;

    let err = Error::from(io::Error::new(io::ErrorKind::TimedOut, "slow disk"));
    assert_eq!(err.to_string(), "slow disk");
    let source = err.source().expect("io errors should be exposed as the source");
    let inner = source.downcast_ref::<io::Error>().unwrap();
    assert_eq!(inner.kind(), io::ErrorKind::TimedOut);

    assert!(Error::Closed.source().is_none());
}
