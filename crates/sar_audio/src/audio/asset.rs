//! Audio file format detection
//!
//! Only the container signature is inspected, decoding is the backend's job.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::audio::PlayError;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// WAV uncompressed
    Wav,
    /// OGG Vorbis compressed
    Ogg,
    /// MP3 compressed
    Mp3,
    /// FLAC lossless
    Flac,
    /// Unknown format
    Unknown,
}

impl AudioFormat {
    /// Detect audio format from the leading magic bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.len() < 4 {
            return Self::Unknown;
        }

        match &bytes[0..4] {
            b"RIFF" if bytes.len() < 12 || &bytes[8..12] == b"WAVE" => Self::Wav,
            b"OggS" => Self::Ogg,
            b"fLaC" => Self::Flac,
            // MP3 can start with ID3 tag or frame sync
            [0xFF, 0xFB | 0xFA | 0xF3 | 0xF2, _, _] => Self::Mp3,
            [b'I', b'D', b'3', _] => Self::Mp3,
            _ => Self::Unknown,
        }
    }

    /// Open an asset and detect its format from the file header
    ///
    /// Missing, unreadable and unrecognised files are all load failures.
    pub fn probe(path: &Path) -> Result<Self, PlayError> {
        if path.as_os_str().is_empty() {
            return Err(PlayError::asset(path, "no such file"));
        }

        let mut file = File::open(path).map_err(|e| PlayError::asset(path, e.to_string()))?;
        let mut header = [0u8; 12];
        let mut filled = 0;
        while filled < header.len() {
            match file.read(&mut header[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(PlayError::asset(path, e.to_string())),
            }
        }

        match Self::detect(&header[..filled]) {
            Self::Unknown => Err(PlayError::asset(path, "unrecognized audio format")),
            format => Ok(format),
        }
    }
}
