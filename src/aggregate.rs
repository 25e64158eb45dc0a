//! Builds the [`Site`]: the ordered record lists plus the tag and month
//! indices every generator reads from. Aggregation is pure; all I/O has
//! already happened in [`crate::store`].

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::Locale;
use crate::normalize::{derive_url, normalize};
use crate::record::{Header, Kind, Month, Record};

/// One entry of the tag index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEntry {
    /// The case-folded tag name.
    pub name: String,

    /// The slug of the tag's archive directory, fixed on first sight.
    pub url: String,

    /// The number of posts carrying the tag.
    pub count: usize,
}

/// One entry of the month index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthEntry {
    pub month: Month,

    /// Localized `"Month YYYY"` label.
    pub label: String,

    /// `YYYY/MM/`, fixed on first sight.
    pub url: String,

    /// The number of posts published in the month.
    pub count: usize,
}

/// Everything one generation run knows about the repository.
#[derive(Clone, Debug, Default)]
pub struct Site {
    /// Posts, most recent first.
    pub posts: Vec<Record>,

    /// Pages, most recent first.
    pub pages: Vec<Record>,

    /// Tags keyed by name, in alphabetical order.
    pub tags: BTreeMap<String, TagEntry>,

    /// Months in chronological order; iterate in reverse for most recent
    /// first.
    pub months: BTreeMap<Month, MonthEntry>,
}

impl Site {
    /// Normalizes the raw headers of both record types and aggregates them.
    /// Headers whose date can't be parsed even after normalization are
    /// reported and skipped.
    pub fn from_headers(
        posts: Vec<(u64, Header)>,
        pages: Vec<(u64, Header)>,
        locale: &Locale,
        today: NaiveDate,
    ) -> Site {
        let records = |kind: Kind, headers: Vec<(u64, Header)>| -> Vec<Record> {
            headers
                .into_iter()
                .filter_map(|(id, mut header)| {
                    normalize(&mut header, id, kind, today);
                    match Record::from_header(id, kind, &header) {
                        Ok(record) => Some(record),
                        Err(err) => {
                            warn!("skipping {} {}: {}", kind, id, err);
                            None
                        }
                    }
                })
                .collect()
        };
        aggregate(records(Kind::Post, posts), records(Kind::Page, pages), locale)
    }

    /// Looks up the archive slug of a tag.
    pub fn tag_url(&self, name: &str) -> String {
        match self.tags.get(name) {
            Some(entry) => entry.url.clone(),
            None => derive_url(name),
        }
    }
}

/// Orders `posts` and `pages` by date, then id, most recent first, and builds
/// the tag and month indices from the posts. Month labels come from `locale`.
pub fn aggregate(mut posts: Vec<Record>, mut pages: Vec<Record>, locale: &Locale) -> Site {
    sort_records(&mut posts);
    sort_records(&mut pages);

    let mut tags: BTreeMap<String, TagEntry> = BTreeMap::new();
    let mut months: BTreeMap<Month, MonthEntry> = BTreeMap::new();

    for post in &posts {
        for name in &post.tags {
            tags.entry(name.clone())
                .and_modify(|entry| entry.count += 1)
                .or_insert_with(|| TagEntry {
                    name: name.clone(),
                    url: derive_url(name),
                    count: 1,
                });
        }

        let month = post.month();
        months
            .entry(month)
            .and_modify(|entry| entry.count += 1)
            .or_insert_with(|| MonthEntry {
                month,
                label: format!("{} {}", locale.month_name(month.month), month.year),
                url: month.url(),
                count: 1,
            });
    }

    Site {
        posts,
        pages,
        tags,
        months,
    }
}

fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod test {
    use super::*;

    fn header(date: &str, tags: &str) -> Header {
        Header {
            title: Some(format!("Post from {}", date)),
            date: Some(date.to_owned()),
            tags: Some(tags.to_owned()),
            ..Header::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_single_post_scenario() {
        let site = Site::from_headers(
            vec![(1, header("2024-03-01", "Perl, perl"))],
            Vec::new(),
            &Locale::default(),
            today(),
        );

        assert_eq!(site.tags.len(), 1);
        assert_eq!(
            site.tags["perl"],
            TagEntry {
                name: "perl".to_owned(),
                url: "perl".to_owned(),
                count: 1,
            }
        );

        assert_eq!(site.months.len(), 1);
        let entry = site.months.values().next().unwrap();
        assert_eq!(entry.label, "March 2024");
        assert_eq!(entry.url, "2024/03/");
        assert_eq!(entry.count, 1);

        assert_eq!(site.posts[0].path(), "2024/03/1-post-from-2024-03-01/");
    }

    #[test]
    fn test_posts_are_ordered_by_date_then_id() {
        let site = Site::from_headers(
            vec![
                (1, header("2024-01-05", "")),
                (2, header("2024-02-01", "")),
                (3, header("2024-01-05", "")),
                (4, header("2023-12-31", "")),
            ],
            Vec::new(),
            &Locale::default(),
            today(),
        );
        let ids: Vec<u64> = site.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_tag_counts_merge_case_insensitively() {
        let site = Site::from_headers(
            vec![
                (1, header("2024-01-01", "Rust, Web Dev")),
                (2, header("2024-01-02", "rust")),
                (3, header("2024-02-03", "RUST, web dev, misc")),
            ],
            Vec::new(),
            &Locale::default(),
            today(),
        );
        let counts: Vec<(&str, &str, usize)> = site
            .tags
            .values()
            .map(|t| (t.name.as_str(), t.url.as_str(), t.count))
            .collect();
        assert_eq!(
            counts,
            vec![("misc", "misc", 1), ("rust", "rust", 3), ("web dev", "web-dev", 2)]
        );
    }

    #[test]
    fn test_month_counts() {
        let site = Site::from_headers(
            vec![
                (1, header("2024-01-01", "")),
                (2, header("2024-01-31", "")),
                (3, header("2023-01-15", "")),
            ],
            Vec::new(),
            &Locale::default(),
            today(),
        );
        let counts: Vec<(String, usize)> = site
            .months
            .values()
            .rev()
            .map(|m| (m.label.clone(), m.count))
            .collect();
        assert_eq!(
            counts,
            vec![("January 2024".to_owned(), 2), ("January 2023".to_owned(), 1)]
        );
    }

    #[test]
    fn test_pages_do_not_contribute_to_indices() {
        let site = Site::from_headers(
            Vec::new(),
            vec![(1, header("2024-01-01", "about"))],
            &Locale::default(),
            today(),
        );
        assert_eq!(site.pages.len(), 1);
        assert!(site.tags.is_empty());
        assert!(site.months.is_empty());
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let headers = vec![
            (5, header("2024-01-01", "a, b")),
            (2, header("2024-01-01", "b")),
            (9, header("2022-06-01", "c")),
        ];
        let first = Site::from_headers(headers.clone(), Vec::new(), &Locale::default(), today());
        let mut reversed = headers;
        reversed.reverse();
        let second = Site::from_headers(reversed, Vec::new(), &Locale::default(), today());
        assert_eq!(first.posts, second.posts);
        assert_eq!(first.tags, second.tags);
        assert_eq!(first.months, second.months);
    }
}
