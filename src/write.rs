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

use std::io;

use tracing::{debug, trace, warn};

use super::wav::{encode_header, HEADER_LEN};
use super::{Error, Result, WavHeader};

/// A writer that wraps sample data in the WAVE container.
///
/// The sizes in the header are only known once all data has been written.
/// Therefore the first write reserves 44 bytes for the header, and `close`
/// seeks back to the start of the stream and writes the real header there.
/// The underlying writer is assumed to be at offset 0.
///
/// After all data has been written, the writer must be closed. If `close` is
/// not called, the writer will be closed upon drop. However, closing involves
/// IO that may fail, and without calling `close`, such a failure cannot be
/// observed.
///
/// The writer never closes the underlying stream. Pass `&mut stream` to keep
/// using it afterwards.
pub struct WavWriter<W> where W: io::Write + io::Seek {
    /// Specifies properties of the audio data.
    header: WavHeader,

    /// Whether the placeholder header has been written already.
    wrote_header: bool,

    /// The writer that will be written to.
    writer: W,

    /// The number of bytes written to the data section.
    ///
    /// This is an `u32` because WAVE cannot accommodate more data.
    data_bytes_written: u32,

    /// Whether `close` has been called.
    closed: bool,
}

impl<W> WavWriter<W> where W: io::Write + io::Seek {
    /// Creates a writer that writes the WAVE container to the underlying writer.
    ///
    /// Nothing is written until the first call to `write_data` or `close`.
    /// Only the channel count, sample rate and bits per sample are taken from
    /// `header`; the byte rate and block align fields of the file are left
    /// at zero.
    pub fn new(writer: W, header: WavHeader) -> Result<WavWriter<W>> {
        Ok(WavWriter {
            header,
            wrote_header: false,
            writer,
            data_bytes_written: 0,
            closed: false,
        })
    }

    /// Returns the audio properties that will be written to the header.
    pub fn header(&self) -> WavHeader {
        self.header
    }

    /// Returns the number of data bytes written so far.
    pub fn data_len(&self) -> u32 {
        self.data_bytes_written
    }

    /// Returns the length of the file so far: the header plus the data.
    ///
    /// This is also the value that `close` stores as the RIFF size.
    pub fn total_len(&self) -> u32 {
        HEADER_LEN + self.data_bytes_written
    }

    /// Returns whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes sample data, returning the number of bytes written.
    ///
    /// The bytes are not interpreted. This performs a single `write` on the
    /// underlying writer, so fewer bytes than `buf.len()` may be written,
    /// exactly as with `io::Write::write`. Only the bytes that were actually
    /// written are counted.
    pub fn write_data(&mut self, buf: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::Closed);
        }

        // The RIFF size counts the header as well, and it must fit in 32 bits.
        if buf.len() as u64 + self.total_len() as u64 > u32::MAX as u64 {
            return Err(Error::DataTooLong);
        }

        // Rewind first, so that a placeholder left partially written by a
        // failed attempt is overwritten instead of followed.
        if !self.wrote_header {
            self.writer.seek(io::SeekFrom::Start(0))?;
            self.writer.write_all(&[0u8; 44])?;
            self.wrote_header = true;
        }

        let n = self.writer.write(buf)?;
        self.data_bytes_written += n as u32;
        trace!(bytes = n, data_len = self.data_bytes_written, "wrote sample data");
        Ok(n)
    }

    /// Writes the final header over the placeholder.
    ///
    /// Seeks the underlying writer to offset 0, writes the header with the
    /// sizes accumulated so far, and flushes. The writer is closed afterwards
    /// even if this fails, in which case the file is left with an incomplete
    /// header. Closing a closed writer returns `Error::Closed`.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.closed = true;

        let header = encode_header(self.header, self.data_bytes_written, self.total_len());
        self.writer.seek(io::SeekFrom::Start(0))?;
        self.writer.write_all(&header)?;
        self.writer.flush()?;

        debug!(
            channels = self.header.channels,
            sample_rate = self.header.sample_rate,
            bits_per_sample = self.header.bits_per_sample,
            data_len = self.data_bytes_written,
            "finalized WAVE header"
        );
        Ok(())
    }
}

impl<W> io::Write for WavWriter<W> where W: io::Write + io::Seek {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_data(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::from(Error::Closed));
        }
        self.writer.flush()
    }
}

impl<W> Drop for WavWriter<W> where W: io::Write + io::Seek {
    fn drop(&mut self) {
        // If the user did not close explicitly, then we should do it now.
        // This can fail, but drop should not panic, so a failure is only
        // logged here.
        if !self.closed {
            if let Err(err) = self.close() {
                warn!(error = %err, "failed to finalize WAVE header on drop");
            }
        }
    }
}

#[cfg(test)]
fn mono_8bit() -> WavHeader {
    WavHeader {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 8,
    }
}

#[test]
fn write_data_reserves_header_once() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
        assert_eq!(writer.write_data(&[1, 2, 3]).unwrap(), 3);
        assert_eq!(writer.write_data(&[4, 5]).unwrap(), 2);
        assert_eq!(writer.data_len(), 5);
        assert_eq!(writer.total_len(), 49);
        std::mem::forget(writer);
    }

    // Without close, the placeholder is still all zeroes.
    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 49);
    assert!(bytes[..44].iter().all(|&b| b == 0));
    assert_eq!(&bytes[44..], &[1, 2, 3, 4, 5]);
}

#[test]
fn close_writes_sizes() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
        writer.write_data(&[0x7f; 100]).unwrap();
        writer.close().unwrap();
    }

    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 144);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[4..8], &144u32.to_le_bytes());
    assert_eq!(&bytes[20..22], &[0xfe, 0xff]);
    // Byte rate and block align are not derived.
    assert_eq!(&bytes[28..34], &[0, 0, 0, 0, 0, 0]);
    assert_eq!(&bytes[40..44], &100u32.to_le_bytes());
}

#[test]
fn close_without_data_writes_empty_file() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
        writer.close().unwrap();
    }

    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 44);
    assert_eq!(&bytes[4..8], &44u32.to_le_bytes());
    assert_eq!(&bytes[40..44], &[0, 0, 0, 0]);
}

#[test]
fn write_and_close_after_close_fail() {
    let mut buffer = io::Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
    writer.write_data(&[1]).unwrap();
    writer.close().unwrap();
    assert!(writer.is_closed());

    match writer.write_data(&[2, 3]) {
        Err(Error::Closed) => {}
        other => panic!("expected Error::Closed, got {:?}", other),
    }
    match writer.close() {
        Err(Error::Closed) => {}
        other => panic!("expected Error::Closed, got {:?}", other),
    }
    assert_eq!(writer.data_len(), 1);
    drop(writer);

    assert_eq!(buffer.get_ref().len(), 45);
}

#[test]
fn drop_closes_writer() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
        writer.write_data(&[10, 20, 30, 40]).unwrap();
    }

    let bytes = buffer.into_inner();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[4..8], &48u32.to_le_bytes());
    assert_eq!(&bytes[40..44], &4u32.to_le_bytes());
}

/// An in-memory sink that can be told to misbehave.
#[cfg(test)]
struct FlakySink {
    inner: io::Cursor<Vec<u8>>,
    /// The most bytes that a single `write` accepts.
    max_write: usize,
    /// Bytes accepted before the next `write` fails once.
    fail_after: Option<usize>,
    /// Seeks that succeed before every further seek fails.
    seeks_left: usize,
}

#[cfg(test)]
impl FlakySink {
    fn new() -> FlakySink {
        FlakySink {
            inner: io::Cursor::new(Vec::new()),
            max_write: usize::MAX,
            fail_after: None,
            seeks_left: usize::MAX,
        }
    }
}

#[cfg(test)]
impl io::Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut len = buf.len().min(self.max_write);
        if let Some(budget) = self.fail_after {
            if budget == 0 {
                self.fail_after = None;
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            len = len.min(budget);
            self.fail_after = Some(budget - len);
        }
        io::Write::write(&mut self.inner, &buf[..len])
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl io::Seek for FlakySink {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        if self.seeks_left == 0 {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"));
        }
        self.seeks_left -= 1;
        io::Seek::seek(&mut self.inner, pos)
    }
}

#[test]
fn failed_close_leaves_writer_closed() {
    let mut sink = FlakySink::new();
    // Only the rewind before the placeholder succeeds.
    sink.seeks_left = 1;
    let mut writer = WavWriter::new(&mut sink, mono_8bit()).unwrap();
    writer.write_data(&[1, 2]).unwrap();

    match writer.close() {
        Err(Error::IoError(err)) => assert_eq!(err.kind(), io::ErrorKind::Unsupported),
        other => panic!("expected an io error, got {:?}", other),
    }
    assert!(writer.is_closed());
    assert!(matches!(writer.write_data(&[3]), Err(Error::Closed)));
    drop(writer);

    // The placeholder was never replaced.
    let bytes = sink.inner.into_inner();
    assert_eq!(bytes.len(), 46);
    assert!(bytes[..44].iter().all(|&b| b == 0));
}

#[test]
fn retry_after_partial_placeholder_keeps_data_at_offset_44() {
    let mut sink = FlakySink::new();
    sink.fail_after = Some(10);
    {
        let mut writer = WavWriter::new(&mut sink, mono_8bit()).unwrap();
        assert!(matches!(writer.write_data(&[1, 2, 3]), Err(Error::IoError(..))));
        assert_eq!(writer.data_len(), 0);
        assert_eq!(writer.write_data(&[1, 2, 3]).unwrap(), 3);
        writer.close().unwrap();
    }

    let bytes = sink.inner.into_inner();
    assert_eq!(bytes.len(), 47);
    assert_eq!(&bytes[40..44], &3u32.to_le_bytes());
    assert_eq!(&bytes[44..], &[1, 2, 3]);

    let mut reader = crate::WavReader::new(&bytes[..]).unwrap();
    let mut buf = [0u8; 8];
    let n = reader.read_data(&mut buf).unwrap();
    assert_eq!(&buf[..n], &[1, 2, 3]);
}

#[test]
fn short_writes_are_counted_as_written() {
    let mut sink = FlakySink::new();
    sink.max_write = 3;
    {
        let mut writer = WavWriter::new(&mut sink, mono_8bit()).unwrap();
        let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        assert_eq!(writer.write_data(&payload).unwrap(), 3);
        assert_eq!(writer.data_len(), 3);
        assert_eq!(writer.total_len(), 47);

        assert_eq!(writer.write_data(&payload[3..]).unwrap(), 3);
        assert_eq!(writer.data_len(), 6);
        assert_eq!(writer.total_len(), 50);

        writer.close().unwrap();
    }

    let bytes = sink.inner.into_inner();
    assert_eq!(bytes.len(), 50);
    assert_eq!(&bytes[4..8], &50u32.to_le_bytes());
    assert_eq!(&bytes[40..44], &6u32.to_le_bytes());
    assert_eq!(&bytes[44..], &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn io_write_supports_write_all() {
    use std::io::Write;

    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
        writer.write_all(&[5; 300]).unwrap();
        writer.flush().unwrap();
        writer.close().unwrap();
        assert!(writer.flush().is_err());
    }
    assert_eq!(buffer.get_ref().len(), 344);
}

#[test]
fn write_data_refuses_to_overflow_riff_size() {
    let mut buffer = io::Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut buffer, mono_8bit()).unwrap();
    writer.data_bytes_written = u32::MAX - HEADER_LEN - 2;

    assert_eq!(writer.write_data(&[1, 2]).unwrap(), 2);
    assert_eq!(writer.total_len(), u32::MAX);
    assert!(matches!(writer.write_data(&[3]), Err(Error::DataTooLong)));
    assert_eq!(writer.total_len(), u32::MAX);
    std::mem::forget(writer);
}
