//! Month and tag archives. Both walk the sorted post list and feed a
//! [`Paginator`]: the month archive in a single pass keyed by `YYYY/MM`, the
//! tag archive in one pass per tag directory over the posts carrying it. The
//! month pass also writes a year index the first time it reaches a new year.

use std::collections::BTreeMap;

use crate::generate::Generator;
use crate::paginate::{Flush, Paginator};
use crate::template::list;
use crate::write;

impl<'a> Generator<'a> {
    /// Post entries for pages two levels below the site root, which is where
    /// both month (`YYYY/MM/`) and tag (`tags/<tag>/`) pages live.
    fn archive_entries(&self) -> Vec<String> {
        (0..self.site.posts.len())
            .map(|index| self.entry(index, "../../"))
            .collect()
    }

    /// Tag names by archive slug. Names that reduce to the same slug share
    /// one directory.
    fn tag_directories(&self) -> BTreeMap<&'a str, Vec<&'a str>> {
        let site = self.site;
        let mut directories: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for tag in site.tags.values() {
            directories.entry(&tag.url).or_default().push(&tag.name);
        }
        directories
    }

    /// Writes the month archive and the year indices. Returns the number of
    /// archive pages written.
    pub fn write_archive(&mut self) -> write::Result<usize> {
        let site = self.site;
        let config = self.config;
        let locale = self.locale;
        let entries = self.archive_entries();
        let before = self.written;

        let mut paginator =
            Paginator::new(config.page_size, &locale.archive, locale, &config.extension);
        let mut year = None;
        let mut years = 0;
        for (post, entry) in site.posts.iter().zip(&entries) {
            let month = post.month();
            if year != Some(month.year) {
                year = Some(month.year);
                self.write_year_index(month.year)?;
                years += 1;
            }

            let label = match site.months.get(&month) {
                Some(entry) => entry.label.clone(),
                None => format!("{} {}", locale.month_name(month.month), month.year),
            };
            paginator.push(&month.dir(), &label, entry, &mut |flush: Flush| {
                self.emit(&flush.directory, &flush.file_name, &flush.body)
            })?;
        }
        paginator.finish(&mut |flush: Flush| {
            self.emit(&flush.directory, &flush.file_name, &flush.body)
        })?;

        Ok(self.written - before - years)
    }

    /// Writes `YYYY/index.<ext>` listing the months of `year` that have
    /// posts, most recent first.
    fn write_year_index(&mut self, year: i32) -> write::Result<()> {
        let site = self.site;
        let months = list(
            site.months
                .values()
                .rev()
                .filter(|entry| entry.month.year == year)
                .map(|entry| {
                    format!(
                        "<li><a href=\"../{}\">{}</a> ({})</li>",
                        entry.url, entry.label, entry.count
                    )
                }),
        );
        let body = format!(
            "<h2 class=\"heading\">{} {}</h2>\n\n{}\n",
            self.locale.archive, year, months
        );
        let file_name = self.file_name();
        self.emit(&format!("{:04}", year), &file_name, &body)
    }

    /// Writes one paginated archive per tag directory plus the `tags/`
    /// overview. Returns the number of tag archive pages written.
    pub fn write_tags(&mut self) -> write::Result<usize> {
        let site = self.site;
        let config = self.config;
        let locale = self.locale;
        let entries = self.archive_entries();
        let before = self.written;

        let mut overview = Vec::new();
        for (url, names) in self.tag_directories() {
            let directory = format!("tags/{}", url);
            let name = names.join(", ");
            let mut paginator =
                Paginator::new(config.page_size, &locale.tags, locale, &config.extension);
            let mut count = 0;
            for (post, entry) in site.posts.iter().zip(&entries) {
                if !post.tags.iter().any(|tag| names.contains(&tag.as_str())) {
                    continue;
                }
                count += 1;
                paginator.push(&directory, &name, entry, &mut |flush: Flush| {
                    self.emit(&flush.directory, &flush.file_name, &flush.body)
                })?;
            }
            paginator.finish(&mut |flush: Flush| {
                self.emit(&flush.directory, &flush.file_name, &flush.body)
            })?;
            overview.push(format!("<li><a href=\"{}/\">{}</a> ({})</li>", url, name, count));
        }
        let pages = self.written - before;

        let body = format!(
            "<h2 class=\"heading\">{}</h2>\n\n{}\n",
            locale.tag_overview,
            list(overview.into_iter())
        );
        let file_name = self.file_name();
        self.emit("tags", &file_name, &body)?;
        Ok(pages)
    }
}
