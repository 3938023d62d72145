use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::WriteError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), WriteError> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|source| WriteError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
        fs::read_to_string(path)
    }

    /// Write a document so that the destination either does not exist or
    /// holds the complete content.
    ///
    /// The content goes to a temporary file in the destination directory and
    /// is then linked into place without replacing an existing file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), WriteError> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Self::ensure_dir(parent)?;

        let io_error = |source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut temp = NamedTempFile::new_in(parent).map_err(io_error)?;
        temp.write_all(content.as_bytes()).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;

        temp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                WriteError::AlreadyExists(path.to_path_buf())
            } else {
                io_error(e.error)
            }
        })?;

        Ok(())
    }
}
