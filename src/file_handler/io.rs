//! File I/O with encoding detection and atomic writes
//!
//! Notes are read with:
//! - UTF-8 and UTF-16 encoding detection
//! - A size limit so huge files are refused instead of rendered
//!
//! Print documents are written atomically so a browser never opens a
//! half-written file.

use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest note that will be printed (10 MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Detected encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
    /// Not valid UTF-8; decoded lossily
    Unknown,
}

/// Result of reading a note
#[derive(Debug, Clone)]
pub struct FileReadResult {
    pub content: String,
    pub encoding: FileEncoding,
    pub size_bytes: u64,
    /// Whether invalid sequences were replaced
    pub lossy: bool,
}

/// Detect file encoding from raw bytes
fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return FileEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return FileEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return FileEncoding::Utf16Be;
    }

    if std::str::from_utf8(bytes).is_ok() {
        FileEncoding::Utf8
    } else {
        FileEncoding::Unknown
    }
}

fn decode_utf8(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> (String, bool) {
    let mut lossy = false;
    let units = bytes
        .chunks_exact(2)
        .map(|chunk| from_bytes([chunk[0], chunk[1]]));

    let result = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                lossy = true;
                char::REPLACEMENT_CHARACTER
            })
        })
        .collect();
    (result, lossy)
}

/// Decode bytes to a string based on the detected encoding
fn decode_content(bytes: &[u8], encoding: FileEncoding) -> (String, bool) {
    match encoding {
        FileEncoding::Utf8 => decode_utf8(bytes),
        FileEncoding::Utf8Bom => decode_utf8(&bytes[3..]),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
        FileEncoding::Unknown => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

/// Read a note with encoding detection
pub fn read_file_sync(path: impl AsRef<Path>) -> FileResult<FileReadResult> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    if !path.is_file() {
        return Err(FileError::NotFound(path_buf));
    }

    let metadata = std::fs::metadata(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;

    let size_bytes = metadata.len();
    if size_bytes > MAX_FILE_SIZE {
        return Err(FileError::FileTooLarge {
            path: path_buf,
            size: size_bytes,
            max_size: MAX_FILE_SIZE,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::ReadError {
        path: path_buf.clone(),
        source: e,
    })?;

    let encoding = detect_encoding(&bytes);
    let (content, lossy) = decode_content(&bytes, encoding);
    if lossy {
        log::warn!("{} is not valid {:?}; some characters were replaced", path.display(), encoding);
    }

    Ok(FileReadResult {
        content,
        encoding,
        size_bytes,
        lossy,
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let timestamp = chrono::Utc::now().timestamp_millis();
    parent.join(format!(".{}.{}.tmp", filename, timestamp))
}

/// Write content to a file atomically
///
/// The content goes to a temporary sibling first and is renamed into place,
/// so the file is either complete or absent.
pub async fn write_file_atomic(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let temp_path = temp_sibling(path);

    let write_result = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content.as_bytes()).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;
        file.sync_all().await?;
        Ok::<(), std::io::Error>(())
    }
    .await;

    let result = match write_result {
        Ok(()) => tokio::fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(FileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// Write content to a file synchronously using an atomic rename
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let temp_path = temp_sibling(path);

    let result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        std::fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_encoding() {
        assert_eq!(detect_encoding(b"hello"), FileEncoding::Utf8);
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'h']), FileEncoding::Utf8Bom);
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'h', 0]), FileEncoding::Utf16Le);
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0, b'h']), FileEncoding::Utf16Be);
        assert_eq!(detect_encoding(&[0xC3, 0x28]), FileEncoding::Unknown);
    }

    #[test]
    fn test_read_utf16_note() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "# Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        let result = read_file_sync(&path).unwrap();
        assert_eq!(result.content, "# Hi");
        assert_eq!(result.encoding, FileEncoding::Utf16Le);
        assert!(!result.lossy);
    }

    #[test]
    fn test_read_strips_utf8_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, b"\xEF\xBB\xBFtext").unwrap();
        assert_eq!(read_file_sync(&path).unwrap().content, "text");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_file_sync(dir.path().join("absent.md"));
        assert!(matches!(result, Err(FileError::NotFound(_))));
    }

    #[test]
    fn test_atomic_write_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.html");
        write_file_atomic_sync(&path, "<p>one</p>").unwrap();
        write_file_atomic_sync(&path, "<p>two</p>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>two</p>");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_atomic_write_async() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.html");
        write_file_atomic(&path, "<html></html>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn test_atomic_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.html");
        let result = write_file_atomic(&path, "x").await;
        assert!(matches!(result, Err(FileError::WriteError { .. })));
    }
}
