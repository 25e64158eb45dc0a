//! Reads records from a repository. Each record type keeps its headers in
//! `.emberlog/<type>/headers/<id>` and its bodies in
//! `.emberlog/<type>/bodies/<id>`. Nothing here writes to the repository.

use ini::{Ini, ParseOption};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::record::{Header, Kind};

/// The repository marker directory.
pub const MARKER: &str = ".emberlog";

/// The section of a header file holding the fields.
pub const HEADER_SECTION: &str = "header";

/// Read-only access to the records of a repository.
pub struct Store {
    /// The `.emberlog` directory of the repository.
    root: PathBuf,
}

impl Store {
    /// Opens the repository rooted at `blog_directory`. Fails if the
    /// directory doesn't carry the repository marker.
    pub fn open(blog_directory: &Path) -> Result<Store> {
        let root = blog_directory.join(MARKER);
        match root.is_dir() {
            true => Ok(Store { root }),
            false => Err(Error::NotARepository(blog_directory.to_owned())),
        }
    }

    /// The `.emberlog` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn headers_directory(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.dir_name()).join("headers")
    }

    fn bodies_directory(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.dir_name()).join("bodies")
    }

    /// Lists the ids of all header files of `kind`, in ascending order. A
    /// missing header directory means there are no records of that kind;
    /// file names that aren't ids are ignored.
    pub fn ids(&self, kind: Kind) -> Result<Vec<u64>> {
        let directory = self.headers_directory(kind);
        if !directory.exists() {
            debug!("no {} headers in '{}'", kind, directory.display());
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for result in WalkDir::new(&directory).min_depth(1).max_depth(1) {
            let entry = result.map_err(|err| Error::List {
                path: directory.clone(),
                err,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            match entry.file_name().to_str().and_then(|name| name.parse::<u64>().ok()) {
                Some(id) => ids.push(id),
                None => debug!("ignoring '{}': not a record id", entry.path().display()),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Reads and parses the header of a single record.
    pub fn header(&self, kind: Kind, id: u64) -> Result<Header> {
        let path = self.headers_directory(kind).join(id.to_string());
        let contents = fs::read_to_string(&path).map_err(|err| Error::ReadHeader {
            path: path.clone(),
            err,
        })?;
        parse_header(&contents).map_err(|err| Error::ParseHeader { path, err })
    }

    /// Reads the headers of every record of `kind`. Headers that can't be read
    /// or parsed are reported and skipped so one bad record doesn't abort the
    /// run.
    pub fn headers(&self, kind: Kind) -> Result<Vec<(u64, Header)>> {
        let mut headers = Vec::new();
        for id in self.ids(kind)? {
            match self.header(kind, id) {
                Ok(header) => headers.push((id, header)),
                Err(err) => warn!("skipping {} {}: {}", kind, id, err),
            }
        }
        Ok(headers)
    }

    /// Reads the body of a record. A missing or unreadable body is reported
    /// and treated as empty.
    pub fn body(&self, kind: Kind, id: u64) -> String {
        let path = self.bodies_directory(kind).join(id.to_string());
        match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(err) => {
                warn!("{} {}: reading body '{}': {}", kind, id, path.display(), err);
                String::new()
            }
        }
    }
}

/// Parses header text: INI with the fields in a single `[header]` section.
/// Values are taken literally; backslashes and quotes are not special.
pub fn parse_header(contents: &str) -> std::result::Result<Header, HeaderError> {
    let option = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(contents, option)?;
    let section = ini
        .section(Some(HEADER_SECTION))
        .ok_or(HeaderError::MissingSection)?;
    let field = |key: &str| section.get(key).map(str::to_owned);
    Ok(Header {
        title: field("title"),
        author: field("author"),
        date: field("date"),
        tags: field("tags"),
        url: field("url"),
    })
}

/// Represents a header file that isn't valid.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// Returned when the file isn't valid INI.
    #[error(transparent)]
    Syntax(#[from] ini::ParseError),

    /// Returned when the file has no `[header]` section.
    #[error("no [{}] section", HEADER_SECTION)]
    MissingSection,
}

/// Represents the result of a [`Store`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading from the repository.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the blog directory has no `.emberlog` marker.
    #[error("'{}' is not an emberlog repository", .0.display())]
    NotARepository(PathBuf),

    /// Returned when a header directory can't be listed.
    #[error("listing '{}': {err}", path.display())]
    List { path: PathBuf, err: walkdir::Error },

    /// Returned when a header file can't be read.
    #[error("reading '{}': {err}", path.display())]
    ReadHeader { path: PathBuf, err: io::Error },

    /// Returned when a header file isn't valid.
    #[error("parsing '{}': {err}", path.display())]
    ParseHeader { path: PathBuf, err: HeaderError },
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn repository() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let headers = dir.path().join(MARKER).join("posts").join("headers");
        let bodies = dir.path().join(MARKER).join("posts").join("bodies");
        fs::create_dir_all(&headers).unwrap();
        fs::create_dir_all(&bodies).unwrap();
        fs::write(
            headers.join("1"),
            "[header]\ntitle = First\ndate = 2024-03-01\ntags = Perl, perl\n",
        )
        .unwrap();
        fs::write(bodies.join("1"), "<p>Hello</p>\n").unwrap();
        fs::write(headers.join("2"), "this is not a header\n").unwrap();
        fs::write(headers.join("notes.txt"), "[header]\ntitle = ignored\n").unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Store::open(dir.path()), Err(Error::NotARepository(_))));
    }

    #[test]
    fn test_ids_skip_non_numeric_names() {
        let (_dir, store) = repository();
        assert_eq!(store.ids(Kind::Post).unwrap(), vec![1, 2]);
        assert!(store.ids(Kind::Page).unwrap().is_empty());
    }

    #[test]
    fn test_headers_skip_unparsable_records() {
        let (_dir, store) = repository();
        let headers = store.headers(Kind::Post).unwrap();
        assert_eq!(headers.len(), 1);
        let (id, header) = &headers[0];
        assert_eq!(*id, 1);
        assert_eq!(header.title.as_deref(), Some("First"));
        assert_eq!(header.tags.as_deref(), Some("Perl, perl"));
        assert_eq!(header.author, None);
    }

    #[test]
    fn test_header_values_are_literal() {
        let header = parse_header(
            "[header]\ntitle = C:\\Users\\me\ntags = regex, \\xyz, \"quoted\"\n",
        )
        .unwrap();
        assert_eq!(header.title.as_deref(), Some("C:\\Users\\me"));
        assert_eq!(header.tags.as_deref(), Some("regex, \\xyz, \"quoted\""));

        let header = parse_header("[header]\ntitle = Using \\xyz in regex\n").unwrap();
        assert_eq!(header.title.as_deref(), Some("Using \\xyz in regex"));
    }

    #[test]
    fn test_header_requires_section() {
        assert!(matches!(
            parse_header("title = Stray\n"),
            Err(HeaderError::MissingSection)
        ));
    }

    #[test]
    fn test_bodies() {
        let (_dir, store) = repository();
        assert_eq!(store.body(Kind::Post, 1), "<p>Hello</p>\n");
        assert_eq!(store.body(Kind::Post, 2), "");
    }
}
