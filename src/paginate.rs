//! Splits a stream of rendered post fragments into fixed-size archive pages.
//!
//! Fragments arrive in document order, each tagged with the group (a month or
//! a tag) it belongs to. The [`Paginator`] accumulates them into the current
//! page and flushes the page when the group changes, when a post arrives for
//! a page that is already full, or when the stream ends. Because a full page
//! is only flushed once the next post has actually arrived, a page links to
//! its successor exactly when that successor is going to exist, and no page
//! is ever empty.
//!
//! The first page of a group is `index.<ext>`; later pages are numbered from
//! one: `index1.<ext>`, `index2.<ext>`, and so on.

use crate::config::Locale;

/// A finished archive page, ready to be rendered and written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flush {
    /// The group's directory relative to the site root, e.g. `2024/03`.
    pub directory: String,

    /// The page's file name within `directory`.
    pub file_name: String,

    /// Zero-based page number within the group.
    pub number: usize,

    /// File name of the previous page, if any.
    pub prev: Option<String>,

    /// File name of the next page, if any.
    pub next: Option<String>,

    /// The page body: heading, fragments, and navigation.
    pub body: String,
}

struct Group {
    directory: String,
    name: String,
    number: usize,
}

/// The pagination state machine. See the module documentation.
pub struct Paginator<'a> {
    capacity: usize,
    heading: &'a str,
    locale: &'a Locale,
    extension: &'a str,
    current: Option<Group>,
    body: String,
    count: usize,
}

impl<'a> Paginator<'a> {
    /// Creates a paginator that puts at most `capacity` posts on a page and
    /// heads each page with `"<heading> <group name>"`.
    pub fn new(
        capacity: usize,
        heading: &'a str,
        locale: &'a Locale,
        extension: &'a str,
    ) -> Paginator<'a> {
        Paginator {
            capacity: capacity.max(1),
            heading,
            locale,
            extension,
            current: None,
            body: String::new(),
            count: 0,
        }
    }

    /// Adds the next fragment. `directory` identifies the group and `name` is
    /// its display name. Any page completed by this call is passed to `sink`.
    pub fn push<E>(
        &mut self,
        directory: &str,
        name: &str,
        fragment: &str,
        sink: &mut impl FnMut(Flush) -> Result<(), E>,
    ) -> Result<(), E> {
        let same_group = match &self.current {
            Some(group) => group.directory == directory,
            None => false,
        };

        if same_group {
            if self.count >= self.capacity {
                self.flush(true, sink)?;
                if let Some(group) = &mut self.current {
                    group.number += 1;
                }
            }
        } else {
            if self.current.is_some() {
                self.flush(false, sink)?;
            }
            self.current = Some(Group {
                directory: directory.to_owned(),
                name: name.to_owned(),
                number: 0,
            });
        }

        self.body.push_str(fragment);
        self.count += 1;
        Ok(())
    }

    /// Flushes whatever is left once the stream has ended.
    pub fn finish<E>(mut self, sink: &mut impl FnMut(Flush) -> Result<(), E>) -> Result<(), E> {
        if self.count > 0 {
            self.flush(false, sink)?;
        }
        Ok(())
    }

    fn flush<E>(
        &mut self,
        has_next: bool,
        sink: &mut impl FnMut(Flush) -> Result<(), E>,
    ) -> Result<(), E> {
        let group = match &self.current {
            Some(group) if self.count > 0 => group,
            _ => return Ok(()),
        };

        let prev = match group.number {
            0 => None,
            n => Some(page_file_name(n - 1, self.extension)),
        };
        let next = match has_next {
            true => Some(page_file_name(group.number + 1, self.extension)),
            false => None,
        };

        let mut body = format!("<h2 class=\"heading\">{} {}</h2>\n\n", self.heading, group.name);
        body.push_str(&self.body);
        if prev.is_some() || next.is_some() {
            body.push_str("<div class=\"navigation\">\n");
            if let Some(prev) = &prev {
                body.push_str(&format!(
                    "  <div class=\"previous\"><a href=\"{}\">{}</a></div>\n",
                    prev, self.locale.previous
                ));
            }
            if let Some(next) = &next {
                body.push_str(&format!(
                    "  <div class=\"next\"><a href=\"{}\">{}</a></div>\n",
                    next, self.locale.next
                ));
            }
            body.push_str("</div>\n");
        }

        let flush = Flush {
            directory: group.directory.clone(),
            file_name: page_file_name(group.number, self.extension),
            number: group.number,
            prev,
            next,
            body,
        };
        self.body.clear();
        self.count = 0;
        sink(flush)
    }
}

/// `index.<ext>` for the first page of a group, `index<n>.<ext>` after that.
pub fn page_file_name(number: usize, extension: &str) -> String {
    match number {
        0 => format!("index.{}", extension),
        n => format!("index{}.{}", n, extension),
    }
}

/// The relative path from a directory back to the site root: `./` for the
/// root itself, `../` for each level below it.
pub fn root_for(directory: &str) -> String {
    let depth = directory.split('/').filter(|part| !part.is_empty()).count();
    match depth {
        0 => "./".to_owned(),
        n => "../".repeat(n),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::convert::Infallible;

    fn run(capacity: usize, items: &[(&str, &str)]) -> Vec<Flush> {
        let locale = Locale::default();
        let mut pages = Vec::new();
        let mut sink = |flush: Flush| -> Result<(), Infallible> {
            pages.push(flush);
            Ok(())
        };
        let mut paginator = Paginator::new(capacity, "Archive for", &locale, "html");
        for (group, fragment) in items {
            paginator.push(group, group, fragment, &mut sink).unwrap();
        }
        paginator.finish(&mut sink).unwrap();
        pages
    }

    #[test]
    fn test_two_full_pages_plus_one() {
        let items: Vec<(&str, &str)> = (0..7).map(|_| ("2024/03", "<p>post</p>\n")).collect();
        let pages = run(3, &items);

        assert_eq!(pages.len(), 3);
        let links: Vec<(&str, Option<&str>, Option<&str>)> = pages
            .iter()
            .map(|p| (p.file_name.as_str(), p.prev.as_deref(), p.next.as_deref()))
            .collect();
        assert_eq!(
            links,
            vec![
                ("index.html", None, Some("index1.html")),
                ("index1.html", Some("index.html"), Some("index2.html")),
                ("index2.html", Some("index1.html"), None),
            ]
        );
        assert_eq!(pages[0].body.matches("<p>post</p>").count(), 3);
        assert_eq!(pages[2].body.matches("<p>post</p>").count(), 1);
    }

    #[test]
    fn test_exactly_full_page_has_no_next_link() {
        let items: Vec<(&str, &str)> = (0..3).map(|_| ("tags/rust", "x")).collect();
        let pages = run(3, &items);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].next, None);
        assert!(!pages[0].body.contains("navigation"));
    }

    #[test]
    fn test_group_change_flushes() {
        let pages = run(10, &[("2024/03", "a"), ("2024/03", "b"), ("2024/02", "c")]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].directory, "2024/03");
        assert_eq!(pages[0].next, None);
        assert_eq!(pages[1].directory, "2024/02");
        assert_eq!(pages[1].file_name, "index.html");
        assert!(pages[1].body.starts_with("<h2 class=\"heading\">Archive for 2024/02</h2>"));
    }

    #[test]
    fn test_no_page_is_empty() {
        let items: Vec<(&str, &str)> = [
            "2024/03", "2024/03", "2024/02", "2024/01", "2024/01", "2024/01", "2024/01", "2023/12",
        ]
        .iter()
        .map(|group| (*group, "<p>post</p>"))
        .collect();
        let pages = run(2, &items);
        assert_eq!(pages.len(), 5);
        for page in &pages {
            assert!(page.body.contains("<p>post</p>"), "empty page {:?}", page);
        }
        assert!(run(2, &[]).is_empty());
    }

    #[test]
    fn test_sink_errors_propagate() {
        let locale = Locale::default();
        let mut sink = |_: Flush| -> Result<(), &'static str> { Err("disk full") };
        let mut paginator = Paginator::new(1, "Archive for", &locale, "html");
        paginator.push("a", "a", "x", &mut sink).unwrap();
        assert_eq!(paginator.push("a", "a", "y", &mut sink), Err("disk full"));
    }

    #[test]
    fn test_root_for() {
        assert_eq!(root_for(""), "./");
        assert_eq!(root_for("about"), "../");
        assert_eq!(root_for("2024/03"), "../../");
        assert_eq!(root_for("2024/03/1-hello/"), "../../../");
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name(0, "php"), "index.php");
        assert_eq!(page_file_name(4, "html"), "index4.html");
    }
}
