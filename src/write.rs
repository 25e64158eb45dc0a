//! Materializes output: creates destination directories and writes complete
//! files. Any failure here is fatal for the run.

use std::fs::{self, DirBuilder};
use std::io;
use std::path::{Path, PathBuf};

/// Permission bits for created directories.
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Ensures every directory in `directories` exists, creating missing parents
/// too. Existing directories are left alone.
pub fn make_directories<P: AsRef<Path>>(directories: impl IntoIterator<Item = P>) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIRECTORY_MODE);
    }

    for directory in directories {
        let directory = directory.as_ref();
        builder.create(directory).map_err(|err| Error::CreateDirectory {
            path: directory.to_owned(),
            err,
        })?;
    }
    Ok(())
}

/// Writes `contents` to `path`, replacing whatever was there.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })
}

/// Creates `directory` if needed and writes `contents` to
/// `directory/file_name`.
pub fn write_page(directory: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    make_directories([directory])?;
    let path = directory.join(file_name);
    write_file(&path, contents)?;
    Ok(path)
}

/// Copies the file at `from` to `to`, replacing whatever was there.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map(|_| ()).map_err(|err| Error::Copy {
        from: from.to_owned(),
        to: to.to_owned(),
        err,
    })
}

/// The result of a fallible output operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a destination directory can't be created.
    #[error("creating directory '{}': {err}", path.display())]
    CreateDirectory { path: PathBuf, err: io::Error },

    /// Returned when an output file can't be written.
    #[error("writing '{}': {err}", path.display())]
    WriteFile { path: PathBuf, err: io::Error },

    /// Returned when a file can't be copied into the destination.
    #[error("copying '{}' to '{}': {err}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        err: io::Error,
    },
}

impl Error {
    /// The underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            Error::CreateDirectory { err, .. } => err,
            Error::WriteFile { err, .. } => err,
            Error::Copy { err, .. } => err,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_make_directories_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("03");
        make_directories([&nested, &nested]).unwrap();
        make_directories([&nested]).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_write_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let about = dir.path().join("about");
        let path = write_page(&about, "index.html", "a much longer first version").unwrap();
        write_page(&about, "index.html", "second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn test_write_into_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let result = write_page(&blocker.join("sub"), "index.html", "x");
        assert!(matches!(result, Err(Error::CreateDirectory { .. })));
    }
}
