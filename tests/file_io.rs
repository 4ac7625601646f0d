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

use std::io::{Read, Seek, SeekFrom, Write};

extern crate wavstream;

fn cd_header() -> wavstream::WavHeader {
    wavstream::WavHeader {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    }
}

#[test]
fn round_trip_through_a_real_file() {
    let mut file = tempfile::tempfile().unwrap();
    let payload: Vec<u8> = (0u8..16).collect();

    {
        let mut writer = wavstream::WavWriter::new(&mut file, cd_header()).unwrap();
        writer.write_data(&payload).unwrap();
        writer.close().unwrap();
    }

    // The writer did not close the file; it is still ours to use.
    assert_eq!(file.metadata().unwrap().len(), 60);
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut raw = Vec::new();
    file.read_to_end(&mut raw).unwrap();
    assert_eq!(&raw[0..4], b"RIFF");
    assert_eq!(&raw[4..8], &60u32.to_le_bytes());
    assert_eq!(&raw[40..44], &16u32.to_le_bytes());

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = wavstream::WavReader::new(&mut file).unwrap();
    assert_eq!(reader.header(), cd_header());
    assert_eq!(reader.data_len(), 16);

    let mut data = Vec::new();
    reader.read_to_end(&mut data).unwrap();
    assert_eq!(data, payload);

    reader.close();
    let mut buf = [0u8; 1];
    assert!(matches!(reader.read_data(&mut buf), Err(wavstream::Error::Closed)));
}

#[test]
fn copy_into_writer_with_io_copy() {
    let mut file = tempfile::tempfile().unwrap();
    let payload = vec![0x55u8; 10_000];

    {
        let mut writer = wavstream::WavWriter::new(&mut file, cd_header()).unwrap();
        let copied = std::io::copy(&mut &payload[..], &mut writer).unwrap();
        assert_eq!(copied, 10_000);
        writer.flush().unwrap();
        writer.close().unwrap();
    }

    file.seek(SeekFrom::Start(0)).unwrap();
    let reader = wavstream::WavReader::new(&mut file).unwrap();
    assert_eq!(reader.riff_len(), 10_044);
    assert_eq!(reader.data_len(), 10_000);
}

#[test]
fn truncated_file_is_rejected() {
    let mut file = tempfile::tempfile().unwrap();
    {
        let mut writer = wavstream::WavWriter::new(&mut file, cd_header()).unwrap();
        writer.write_data(&[1, 2, 3, 4]).unwrap();
        writer.close().unwrap();
    }

    file.set_len(30).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    match wavstream::WavReader::new(&mut file) {
        Err(wavstream::Error::IoError(err)) => {
            assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        }
        Err(err) => panic!("expected an io error, got {:?}", err),
        Ok(..) => panic!("a truncated header should not be accepted"),
    }
}
