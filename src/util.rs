//! Small helpers shared across Lectern modules.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{LecternError, Result};

/// Maximum size of a lesson file the CLI will read (2 MB).
pub const MAX_LESSON_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| LecternError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(LecternError::validation(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| LecternError::storage(path, e))
}

/// Read and parse a JSON file with the lesson size limit.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let content = read_to_string_with_limit(path, MAX_LESSON_FILE_SIZE)?;
    serde_json::from_str(&content).map_err(|e| {
        LecternError::validation(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts chars rather than bytes so multi-byte text never splits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_with_limit_success() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lesson.json");
        fs::write(&path, "{\"title\": \"Plants\"}").unwrap();

        let content = read_to_string_with_limit(&path, 1000).unwrap();
        assert!(content.contains("Plants"));
    }

    #[test]
    fn test_read_with_limit_nonexistent() {
        let temp = TempDir::new().unwrap();
        let result = read_to_string_with_limit(&temp.path().join("missing.json"), 1000);
        assert!(matches!(result, Err(LecternError::Storage { .. })));
    }

    #[test]
    fn test_read_with_limit_exceeds() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("large.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[b'x'; 1000]).unwrap();

        let err = read_to_string_with_limit(&path, 500)
            .unwrap_err()
            .to_string();
        assert!(err.contains("too large"));
        assert!(err.contains("max 500 bytes"));
    }

    #[test]
    fn test_read_with_limit_at_boundary() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("boundary.json");
        fs::write(&path, "x".repeat(100)).unwrap();

        assert!(read_to_string_with_limit(&path, 100).is_ok());
        assert!(read_to_string_with_limit(&path, 99).is_err());
    }

    #[test]
    fn test_read_json_file_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, LecternError::Validation { .. }));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefgh", 3), "abc...");
        assert_eq!(truncate_chars("ẹ̀kọ́ ẹ̀kọ́", 2).chars().count(), 5);
    }
}
