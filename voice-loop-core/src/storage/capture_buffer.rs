use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::audio_models::AudioFormatSpec;
use crate::processing::wav_format;

/// The single on-disk capture file.
///
/// Owned by the capture session for one record → play cycle. Starting a new
/// recording discards whatever the previous take left behind; nothing is
/// appended or merged.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header]
/// [raw 16-bit little-endian mono PCM...]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBuffer {
    path: PathBuf,
}

impl CaptureBuffer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the previous take. A missing file is not an error.
    pub fn discard(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Read the whole capture file into memory.
    pub fn load(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Streaming WAV writer for the capture file.
///
/// Writes a placeholder header on open and patches the size fields on
/// close. Once the payload reaches what a RIFF header can describe, further
/// bytes are dropped and [`is_full`](Self::is_full) turns true.
pub struct PcmFileWriter {
    file: Option<BufWriter<File>>,
    data_bytes: u64,
    limit: u64,
}

impl PcmFileWriter {
    /// Create the file (and its parent directory) and write the initial header.
    pub fn create(file_path: &Path, format: &AudioFormatSpec) -> io::Result<Self> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = BufWriter::new(File::create(file_path)?);
        file.write_all(&wav_format::generate_wav_header(format, 0))?;

        Ok(Self {
            file: Some(file),
            data_bytes: 0,
            limit: wav_format::MAX_DATA_SIZE as u64,
        })
    }

    /// Append raw PCM bytes, up to the WAV size limit.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "capture file is closed"))?;
        let room = usize::try_from(self.limit - self.data_bytes).unwrap_or(usize::MAX);
        let accepted = &data[..data.len().min(room)];
        file.write_all(accepted)?;
        self.data_bytes += accepted.len() as u64;
        Ok(())
    }

    /// Whether the payload has reached the WAV size limit.
    pub fn is_full(&self) -> bool {
        self.data_bytes >= self.limit
    }

    /// Patch the header sizes and flush. Returns the PCM payload size.
    pub fn close(&mut self) -> io::Result<u64> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "capture file is closed"))?;

        let mut sizes = [0u8; wav_format::WAV_HEADER_SIZE];
        wav_format::patch_sizes(&mut sizes, self.data_bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        file.seek(SeekFrom::Start(4))?;
        file.write_all(&sizes[4..8])?;
        file.seek(SeekFrom::Start(40))?;
        file.write_all(&sizes[40..44])?;
        file.flush()?;
        Ok(self.data_bytes)
    }
}

/// SHA-256 hex digest of a byte buffer.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("voice_loop_buffer_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn write_and_close_patches_header() {
        let path = temp_file_path("take.wav");
        let mut writer = PcmFileWriter::create(&path, &AudioFormatSpec::VOICE).unwrap();
        writer.write(&[1, 0, 2, 0]).unwrap();
        writer.write(&[3, 0]).unwrap();
        assert_eq!(writer.close().unwrap(), 6);

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 44 + 6);
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([data[40], data[41], data[42], data[43]]), 6);
        assert_eq!(u32::from_le_bytes([data[4], data[5], data[6], data[7]]), 36 + 6);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn writes_past_size_limit_are_dropped() {
        let path = temp_file_path("full.wav");
        let mut writer = PcmFileWriter::create(&path, &AudioFormatSpec::VOICE).unwrap();
        writer.limit = 4;

        writer.write(&[1, 0, 2, 0, 3, 0]).unwrap();
        assert!(writer.is_full());
        writer.write(&[4, 0]).unwrap();
        assert_eq!(writer.close().unwrap(), 4);

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 44 + 4);
        assert_eq!(u32::from_le_bytes([data[40], data[41], data[42], data[43]]), 4);
        assert_eq!(&data[44..], &[1, 0, 2, 0]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn write_after_close_fails() {
        let path = temp_file_path("closed.wav");
        let mut writer = PcmFileWriter::create(&path, &AudioFormatSpec::VOICE).unwrap();
        writer.close().unwrap();
        assert!(writer.write(&[0, 0]).is_err());
        assert!(writer.close().is_err());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn discard_tolerates_missing_file() {
        let buffer = CaptureBuffer::new(temp_file_path("never-written.wav"));
        assert!(buffer.discard().is_ok());
    }

    #[test]
    fn discard_removes_previous_take() {
        let path = temp_file_path("previous.wav");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"old take").unwrap();

        let buffer = CaptureBuffer::new(path.clone());
        assert!(buffer.exists());
        buffer.discard().unwrap();
        assert!(!buffer.exists());
    }

    #[test]
    fn checksum_is_hex_sha256() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
