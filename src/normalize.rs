//! Repairs missing or invalid header fields. Generation has to proceed even
//! over a damaged repository, so nothing here fails: every problem is
//! replaced by a best-effort default and reported at `info` level.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use crate::record::{Header, Kind};

/// The only accepted date format for record headers.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The author used when a header names none.
pub const DEFAULT_AUTHOR: &str = "admin";

static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static COMMAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,[\s,]*").unwrap());
static VALID_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w-]+$").unwrap());
static VALID_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Completes `header` in place. `id` and `kind` identify the record in
/// diagnostics and provide the fallback title; `today` replaces missing or
/// invalid dates.
///
/// Normalizing an already-normalized header leaves it unchanged.
pub fn normalize(header: &mut Header, id: u64, kind: Kind, today: NaiveDate) {
    if is_blank(&header.title) {
        info!("{} {}: missing title, using the id", kind, id);
        header.title = Some(id.to_string());
    }

    header.author = Some(match header.author.as_deref() {
        None | Some("") => {
            info!("{} {}: missing author, using `{}`", kind, id, DEFAULT_AUTHOR);
            DEFAULT_AUTHOR.to_owned()
        }
        Some(author) => {
            let sanitized = sanitize_author(author);
            if sanitized != author {
                info!("{} {}: invalid author `{}`, using `{}`", kind, id, author, sanitized);
            }
            sanitized
        }
    });

    if !is_valid_date(header.date.as_deref().unwrap_or_default()) {
        info!(
            "{} {}: missing or invalid date `{}`, using today",
            kind,
            id,
            header.date.as_deref().unwrap_or_default()
        );
        header.date = Some(today.format(DATE_FORMAT).to_string());
    }

    if kind == Kind::Post {
        let raw = header.tags.take().unwrap_or_default();
        let cleaned = clean_tags(&raw);
        if cleaned != raw {
            info!("{} {}: cleaned up tags `{}`", kind, id, raw);
        }
        header.tags = Some(cleaned);
    }

    header.url = Some(match header.url.as_deref() {
        Some(url) if is_valid_url(url) => url.to_owned(),
        Some(url) if !url.is_empty() => {
            info!("{} {}: invalid url `{}`, deriving it from itself", kind, id, url);
            derive_url_or_id(url, id)
        }
        _ => {
            info!("{} {}: missing url, deriving it from the title", kind, id);
            derive_url_or_id(header.title.as_deref().unwrap_or_default(), id)
        }
    });
}

/// Derives a URL-safe slug: lower-case, drop everything outside word
/// characters, whitespace and hyphens, then turn whitespace runs into single
/// hyphens. May return an empty string.
pub fn derive_url(s: &str) -> String {
    let lower = s.to_lowercase();
    let stripped = FORBIDDEN.replace_all(&lower, "");
    WHITESPACE.replace_all(stripped.trim(), "-").into_owned()
}

/// Whether `url` is already a usable slug.
pub fn is_valid_url(url: &str) -> bool {
    VALID_URL.is_match(url)
}

/// Whether `date` is a real calendar date written as `YYYY-MM-DD`.
pub fn is_valid_date(date: &str) -> bool {
    VALID_DATE.is_match(date) && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

/// Strips characters outside word characters, whitespace and hyphens. An
/// author that ends up empty becomes [`DEFAULT_AUTHOR`].
pub fn sanitize_author(author: &str) -> String {
    let sanitized = FORBIDDEN.replace_all(author, "");
    match sanitized.trim().is_empty() {
        true => DEFAULT_AUTHOR.to_owned(),
        false => sanitized.into_owned(),
    }
}

/// Removes colons, collapses repeated commas and whitespace to a single
/// `", "` separator, and trims separators from both ends.
pub fn clean_tags(tags: &str) -> String {
    let tags = tags.replace(':', "");
    let tags = WHITESPACE.replace_all(&tags, " ");
    let tags = COMMAS.replace_all(&tags, ", ");
    tags.trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_owned()
}

fn derive_url_or_id(s: &str, id: u64) -> String {
    match derive_url(s) {
        url if url.is_empty() => id.to_string(),
        url => url,
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod test {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_empty_header_gets_defaults() {
        let mut header = Header::default();
        normalize(&mut header, 42, Kind::Post, today());
        assert_eq!(
            header,
            Header {
                title: Some("42".to_owned()),
                author: Some("admin".to_owned()),
                date: Some("2026-10-17".to_owned()),
                tags: Some(String::new()),
                url: Some("42".to_owned()),
            }
        );
    }

    #[test]
    fn test_url_is_derived_from_title() {
        let mut header = Header {
            title: Some("Hello, World: Part 2!".to_owned()),
            ..Header::default()
        };
        normalize(&mut header, 1, Kind::Post, today());
        assert_eq!(header.url.as_deref(), Some("hello-world-part-2"));
    }

    #[test]
    fn test_invalid_url_is_derived_from_itself() {
        let mut header = Header {
            title: Some("Ignored".to_owned()),
            url: Some("About Me?".to_owned()),
            ..Header::default()
        };
        normalize(&mut header, 1, Kind::Page, today());
        assert_eq!(header.url.as_deref(), Some("about-me"));
    }

    #[test]
    fn test_author_is_sanitized_and_reassigned() {
        let mut header = Header {
            author: Some("J. Random <hacker>".to_owned()),
            ..Header::default()
        };
        normalize(&mut header, 1, Kind::Post, today());
        assert_eq!(header.author.as_deref(), Some("J Random hacker"));

        assert_eq!(sanitize_author("!!!"), DEFAULT_AUTHOR);
    }

    #[test]
    fn test_invalid_dates_are_replaced() {
        for date in ["", "2024-3-1", "01/03/2024", "2024-02-30"] {
            let mut header = Header {
                date: Some(date.to_owned()),
                ..Header::default()
            };
            normalize(&mut header, 1, Kind::Post, today());
            assert_eq!(header.date.as_deref(), Some("2026-10-17"), "date `{}`", date);
        }
    }

    #[test]
    fn test_clean_tags() {
        assert_eq!(clean_tags(",, perl ,rust,,"), "perl, rust");
        assert_eq!(clean_tags("a:b,   c"), "ab, c");
        assert_eq!(clean_tags("web  dev, rust"), "web dev, rust");
        assert_eq!(clean_tags(""), "");
    }

    #[test]
    fn test_pages_keep_their_tag_field() {
        let mut header = Header {
            tags: Some(",,x".to_owned()),
            ..Header::default()
        };
        normalize(&mut header, 1, Kind::Page, today());
        assert_eq!(header.tags.as_deref(), Some(",,x"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let headers = vec![
            Header::default(),
            Header {
                title: Some("  Spaced   Title ".to_owned()),
                author: Some("@@@".to_owned()),
                date: Some("2024-03-01".to_owned()),
                tags: Some(" :Perl:, ,perl ,, ".to_owned()),
                url: Some("Not Valid!".to_owned()),
            },
            Header {
                title: Some("???".to_owned()),
                author: Some("Jane-Doe".to_owned()),
                date: Some("yesterday".to_owned()),
                tags: None,
                url: None,
            },
        ];
        for mut header in headers {
            normalize(&mut header, 9, Kind::Post, today());
            let once = header.clone();
            normalize(&mut header, 9, Kind::Post, today());
            assert_eq!(once, header);
        }
    }
}
