//! Defines the [`Record`], [`Header`], [`Kind`], and [`Month`] types. A record
//! is a single post or page; its [`Header`] is the raw metadata parsed from
//! the repository, and [`Record::from_header`] turns a normalized header into
//! the structured form every generator works with.

use chrono::{Datelike, NaiveDate, ParseError};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::normalize::{derive_url, DATE_FORMAT};

/// The two kinds of records a repository holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Post,
    Page,
}

impl Kind {
    /// The name of the repository directory holding records of this kind.
    pub fn dir_name(self) -> &'static str {
        match self {
            Kind::Post => "posts",
            Kind::Page => "pages",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kind::Post => write!(f, "post"),
            Kind::Page => write!(f, "page"),
        }
    }
}

/// The metadata block of a record as it appears on disk. Every field is
/// optional because the repository may be damaged; see
/// [`crate::normalize::normalize`] for how the gaps are filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub tags: Option<String>,
    pub url: Option<String>,
}

/// A calendar month, used as the archive grouping key. Ordering is
/// chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    /// The archive directory for the month, e.g. `2024/03`.
    pub fn dir(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }

    /// The archive URL for the month relative to the site root, e.g.
    /// `2024/03/`.
    pub fn url(&self) -> String {
        format!("{}/", self.dir())
    }
}

/// A post or page after normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Unique within its [`Kind`]; taken from the header file name.
    pub id: u64,
    pub kind: Kind,
    pub date: NaiveDate,
    pub title: String,
    pub author: String,

    /// Case-folded tag names in order of first appearance, without
    /// duplicates. Always empty for pages.
    pub tags: Vec<String>,

    /// URL-safe slug.
    pub url: String,
}

impl Record {
    /// Builds a record from a header that has already been through
    /// [`crate::normalize::normalize`]. Fails only if the date is not a
    /// valid `YYYY-MM-DD` string, which normalization rules out.
    pub fn from_header(id: u64, kind: Kind, header: &Header) -> Result<Record, ParseError> {
        let date = header.date.as_deref().unwrap_or_default();
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)?;
        let title = match header.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => id.to_string(),
        };
        let url = match header.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => id.to_string(),
        };
        Ok(Record {
            id,
            kind,
            date,
            title,
            author: header.author.clone().unwrap_or_default(),
            tags: match kind {
                Kind::Post => split_tags(header.tags.as_deref().unwrap_or_default()),
                Kind::Page => Vec::new(),
            },
            url,
        })
    }

    /// The month the record was published in.
    pub fn month(&self) -> Month {
        Month {
            year: self.date.year(),
            month: self.date.month(),
        }
    }

    /// The output directory of the record relative to the site root, with a
    /// trailing slash: `YYYY/MM/<id>-<url>/` for posts and `<url>/` for pages.
    pub fn path(&self) -> String {
        match self.kind {
            Kind::Post => format!("{}/{}-{}/", self.month().dir(), self.id, self.url),
            Kind::Page => format!("{}/", self.url),
        }
    }

    /// The record's date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Splits a normalized tag field on commas. Names are case-folded and
/// de-duplicated; names whose URL would be empty are dropped.
pub fn split_tags(tags: &str) -> Vec<String> {
    static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*").unwrap());

    let mut names: Vec<String> = Vec::new();
    for name in SEPARATOR.split(tags) {
        let name = name.trim().to_lowercase();
        if name.is_empty() || derive_url(&name).is_empty() || names.contains(&name) {
            continue;
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
mod test {
    use super::*;

    fn header(date: &str, tags: &str) -> Header {
        Header {
            title: Some("Hello, world".to_owned()),
            author: Some("admin".to_owned()),
            date: Some(date.to_owned()),
            tags: Some(tags.to_owned()),
            url: Some("hello-world".to_owned()),
        }
    }

    #[test]
    fn test_post_path() {
        let record = Record::from_header(7, Kind::Post, &header("2024-03-01", "")).unwrap();
        assert_eq!(record.path(), "2024/03/7-hello-world/");
        assert_eq!(record.month().url(), "2024/03/");
    }

    #[test]
    fn test_page_path_ignores_date_and_tags() {
        let record = Record::from_header(3, Kind::Page, &header("2019-11-30", "rust")).unwrap();
        assert_eq!(record.path(), "hello-world/");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_tags_are_case_folded_and_deduplicated() {
        let perl = header("2024-03-01", "Perl, perl, Rust");
        let record = Record::from_header(1, Kind::Post, &perl).unwrap();
        assert_eq!(record.tags, vec!["perl".to_owned(), "rust".to_owned()]);
    }

    #[test]
    fn test_tags_without_url_are_dropped() {
        assert_eq!(split_tags("!!!, ok"), vec!["ok".to_owned()]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(Record::from_header(1, Kind::Post, &header("2024-13-45", "")).is_err());
    }
}
