//! Path validation performed before a stream is opened.
//!
//! Checks here turn the most common misuse (missing file, directory given as a file,
//! missing parent directory) into specific errors instead of raw I/O failures.

use crate::error::{Result, RwioError};
use std::path::Path;

/// Validate that `path` can be opened for reading
///
/// # Error Cases
/// - Path does not exist (`PathNotFound`)
/// - Path points to a directory or other non-file (`NotAFile`)
pub fn validate_readable(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| RwioError::open_failed(path, e))?;

    if !metadata.is_file() {
        return Err(RwioError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Validate that `path` can be created or appended to
///
/// Parent directories are never created; a missing parent is `PathNotFound`.
pub fn validate_writable(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(RwioError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(RwioError::PathNotFound {
                path: parent.to_path_buf(),
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Create a test file with specific content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    #[test]
    fn test_validate_valid_file() {
        let test_file = create_test_file(b"line 1\nline 2\n");
        assert!(validate_readable(test_file.path()).is_ok());
    }

    #[test]
    fn test_validate_empty_file_is_readable() {
        let empty_file = create_test_file(&[]);
        assert!(validate_readable(empty_file.path()).is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let non_existent = Path::new("/this/file/does/not/exist.txt");

        match validate_readable(non_existent).unwrap_err() {
            RwioError::PathNotFound { path } => assert_eq!(path, non_existent),
            other => panic!("Expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        assert!(matches!(
            validate_readable(temp_dir.path()),
            Err(RwioError::NotAFile { .. })
        ));
        assert!(matches!(
            validate_writable(temp_dir.path()),
            Err(RwioError::NotAFile { .. })
        ));
    }

    #[test]
    fn test_validate_writable_requires_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        assert!(validate_writable(&temp_dir.path().join("new.txt")).is_ok());

        let orphan = temp_dir.path().join("missing").join("new.txt");
        match validate_writable(&orphan).unwrap_err() {
            RwioError::PathNotFound { path } => {
                assert_eq!(path, temp_dir.path().join("missing"));
            }
            other => panic!("Expected PathNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_writable_bare_file_name() {
        assert!(validate_writable(Path::new("relative.txt")).is_ok());
    }
}
