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

use std::cmp;
use std::io;

use tracing::debug;

use super::wav::{decode_header, HeaderInfo};
use super::{Error, Result, WavHeader};

/// Extends the functionality of `io::Read` with additional methods.
///
/// The methods may be used on any type that implements `io::Read`.
pub trait ReadExt: io::Read {
    /// Reads exactly `N` bytes and returns them in an array.
    ///
    /// If the stream ends first, the `UnexpectedEof` error of `read_exact` is
    /// returned.
    fn read_bytes<const N: usize>(&mut self) -> io::Result<[u8; N]>;

    /// Skip over `n` bytes.
    fn skip_bytes(&mut self, n: u64) -> io::Result<()>;
}

impl<R> ReadExt for R
    where R: io::Read
{
    #[inline(always)]
    fn read_bytes<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn skip_bytes(&mut self, n: u64) -> io::Result<()> {
        // Read from the input in chunks of 1024 bytes at a time, and discard
        // the result. The declared length comes from the file, so it must not
        // decide how much memory is allocated.
        let mut n_read = 0;
        let mut buf = [0u8; 1024];
        while n_read < n {
            let end = cmp::min(n - n_read, 1024) as usize;
            match self.read(&mut buf[..end]) {
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                Ok(progress) => n_read += progress as u64,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

/// A reader that reads the WAVE container from the underlying reader.
///
/// The header is parsed once, when the reader is constructed. After that,
/// [`read_data`](WavReader::read_data) passes the rest of the stream through
/// unchanged. Reads are not limited to the declared size of the data chunk:
/// if the stream holds more bytes than the header announces, those bytes are
/// returned as well.
///
/// The reader never closes the underlying stream. Pass `&mut stream` to keep
/// ownership, or get the stream back with [`into_inner`](WavReader::into_inner).
pub struct WavReader<R> {
    /// Everything found in the header.
    info: HeaderInfo,

    /// Whether `close` has been called.
    closed: bool,

    /// The reader from which the WAVE container is read.
    reader: R,
}

impl<R> WavReader<R>
    where R: io::Read
{
    /// Attempts to create a reader that reads the WAVE container.
    ///
    /// The header is read immediately, and nothing beyond it. If the header
    /// is ill-formed or the stream ends within the header, no reader is
    /// returned.
    pub fn new(mut reader: R) -> Result<WavReader<R>> {
        let info = decode_header(&mut reader)?;

        debug!(
            channels = info.fmt.channels,
            sample_rate = info.fmt.sample_rate,
            bits_per_sample = info.fmt.bits_per_sample,
            fmt_len = info.fmt_len,
            data_len = info.data_len,
            "decoded WAVE header"
        );

        Ok(WavReader {
            info,
            closed: false,
            reader,
        })
    }

    /// Returns the audio properties found in the header.
    pub fn header(&self) -> WavHeader {
        self.info.header()
    }

    /// Returns everything that was read from the header.
    pub fn info(&self) -> &HeaderInfo {
        &self.info
    }

    /// Returns the size declared in the RIFF header.
    pub fn riff_len(&self) -> u32 {
        self.info.riff_len
    }

    /// Returns the declared size of the `fmt ` chunk.
    pub fn fmt_len(&self) -> u32 {
        self.info.fmt_len
    }

    /// Returns the declared size of the `data` chunk in bytes.
    ///
    /// This is the value stored in the file. It is not checked against the
    /// number of bytes that the stream actually holds.
    pub fn data_len(&self) -> u32 {
        self.info.data_len
    }

    /// Returns the format tag of the `fmt ` chunk.
    pub fn format_tag(&self) -> u16 {
        self.info.fmt.format_tag
    }

    /// Returns the byte rate stored in the `fmt ` chunk.
    pub fn byte_rate(&self) -> u32 {
        self.info.fmt.byte_rate
    }

    /// Returns the block align stored in the `fmt ` chunk.
    pub fn block_align(&self) -> u16 {
        self.info.fmt.block_align
    }

    /// Reads sample data into `buf`, returning the number of bytes read.
    ///
    /// This performs a single `read` on the underlying stream. A return value
    /// of 0 means the stream has ended. After `close`, this returns
    /// `Error::Closed` and does not touch the stream.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(self.reader.read(buf)?)
    }

    /// Marks the reader as closed.
    ///
    /// The underlying stream is left as it is; releasing it is up to the
    /// caller. Closing an already closed reader has no effect.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Destroys the `WavReader` and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> io::Read for WavReader<R>
    where R: io::Read
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_data(buf).map_err(io::Error::from)
    }
}

#[cfg(test)]
fn sample_file(payload: &[u8], trailing: &[u8]) -> Vec<u8> {
    use super::wav::encode_header;

    let header = WavHeader {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 8,
    };
    let mut bytes = encode_header(header, payload.len() as u32, 44 + payload.len() as u32).to_vec();
    bytes.extend_from_slice(payload);
    bytes.extend_from_slice(trailing);
    bytes
}

#[test]
fn read_data_passes_payload_through() {
    let bytes = sample_file(&[2, 3, 5, 7], &[]);
    let mut reader = WavReader::new(&bytes[..]).unwrap();

    assert_eq!(reader.header(), WavHeader { channels: 1, sample_rate: 8000, bits_per_sample: 8 });
    assert_eq!(reader.data_len(), 4);
    assert_eq!(reader.riff_len(), 48);
    assert_eq!(reader.fmt_len(), 16);
    assert_eq!(reader.format_tag(), 0xfffe);

    let mut buf = [0u8; 16];
    let n = reader.read_data(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[2, 3, 5, 7]);
    assert_eq!(reader.read_data(&mut buf).unwrap(), 0);
}

#[test]
fn read_data_does_not_stop_at_declared_data_len() {
    let bytes = sample_file(&[1, 2], &[0xaa, 0xbb, 0xcc]);
    let mut reader = WavReader::new(&bytes[..]).unwrap();
    assert_eq!(reader.data_len(), 2);

    let mut data = Vec::new();
    io::Read::read_to_end(&mut reader, &mut data).unwrap();
    assert_eq!(&data[..], &[1, 2, 0xaa, 0xbb, 0xcc]);
}

#[test]
fn read_after_close_fails_without_io() {
    let bytes = sample_file(&[9, 8, 7], &[]);
    let mut cursor = io::Cursor::new(bytes);

    {
        let mut reader = WavReader::new(&mut cursor).unwrap();
        reader.close();
        reader.close();
        assert!(reader.is_closed());

        let mut buf = [0u8; 4];
        match reader.read_data(&mut buf) {
            Err(Error::Closed) => {}
            other => panic!("expected Error::Closed, got {:?}", other),
        }
        let err = io::Read::read(&mut reader, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    // The stream is still usable, and positioned at the first data byte.
    assert_eq!(cursor.position(), 44);
    let mut rest = Vec::new();
    io::Read::read_to_end(&mut cursor, &mut rest).unwrap();
    assert_eq!(&rest[..], &[9, 8, 7]);
}

#[test]
fn into_inner_returns_positioned_stream() {
    let bytes = sample_file(&[4, 4], &[]);
    let reader = WavReader::new(io::Cursor::new(bytes)).unwrap();
    let cursor = reader.into_inner();
    assert_eq!(cursor.position(), 44);
}

#[test]
fn skip_bytes_reports_early_end() {
    let bytes = [0u8; 10];
    let mut input = &bytes[..];
    input.skip_bytes(4).unwrap();
    assert_eq!(input.len(), 6);

    let err = input.skip_bytes(4000).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
