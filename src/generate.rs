//! Defines the [`Generator`], which turns an aggregated [`Site`] into output
//! files: one page per post and per static page, the front page, and the
//! stylesheet. The month and tag archives live in [`crate::archive`] and the
//! feed in [`crate::feed`].

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::aggregate::Site;
use crate::config::{Config, Locale};
use crate::paginate::root_for;
use crate::record::{Kind, Record};
use crate::store::Store;
use crate::template::Renderer;
use crate::write::{self, copy_file, make_directories, write_page};

static BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<!--\s*break\s*-->").unwrap());

/// Splits off the excerpt of a body: everything before the first
/// `<!-- break -->` marker. The flag tells whether anything was cut.
pub fn excerpt(body: &str) -> (&str, bool) {
    match BREAK.find(body) {
        Some(m) => (&body[..m.start()], true),
        None => (body, false),
    }
}

/// Writes the pages of one generation run.
pub struct Generator<'a> {
    pub(crate) config: &'a Config,
    pub(crate) locale: &'a Locale,
    pub(crate) site: &'a Site,
    pub(crate) store: &'a Store,
    pub(crate) destination: &'a Path,
    pub(crate) renderer: Renderer<'a>,

    /// Whether tag archives exist, i.e. whether tags in post headings should
    /// be links.
    pub(crate) link_tags: bool,

    /// Post bodies, parallel to `site.posts`.
    pub(crate) bodies: Vec<String>,

    /// The number of files written so far.
    pub(crate) written: usize,
}

impl<'a> Generator<'a> {
    /// Creates a generator and loads every post body once.
    pub fn new(
        config: &'a Config,
        locale: &'a Locale,
        site: &'a Site,
        store: &'a Store,
        destination: &'a Path,
        renderer: Renderer<'a>,
        link_tags: bool,
    ) -> Generator<'a> {
        let bodies = site
            .posts
            .iter()
            .map(|post| store.body(Kind::Post, post.id))
            .collect();
        Generator {
            config,
            locale,
            site,
            store,
            destination,
            renderer,
            link_tags,
            bodies,
            written: 0,
        }
    }

    /// The number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn file_name(&self) -> String {
        format!("index.{}", self.config.extension)
    }

    /// Renders `body` through the theme and writes it to
    /// `<destination>/<directory>/<file_name>`. `directory` is relative to the
    /// site root and determines the relative root the theme is rendered for.
    pub(crate) fn emit(
        &mut self,
        directory: &str,
        file_name: &str,
        body: &str,
    ) -> write::Result<()> {
        let page = self.renderer.render(&root_for(directory), body);
        let path = write_page(&self.destination.join(directory), file_name, &page)?;
        debug!("wrote '{}'", path.display());
        self.written += 1;
        Ok(())
    }

    /// The "posted on ... by ..., tagged as ..." line under a record's title.
    fn information(&self, record: &Record, root: &str) -> String {
        let date = match record.kind {
            Kind::Post => format!(
                "<a href=\"{}{}\">{}</a>",
                root,
                record.month().url(),
                record.date_string()
            ),
            Kind::Page => record.date_string(),
        };
        let mut out = format!(
            "<div class=\"information\">{} {} {} {}",
            self.locale.posted_on, date, self.locale.by, record.author
        );
        if !record.tags.is_empty() {
            let tags: Vec<String> = record
                .tags
                .iter()
                .map(|name| match self.link_tags {
                    true => format!(
                        "<a href=\"{}tags/{}/\">{}</a>",
                        root,
                        self.site.tag_url(name),
                        name
                    ),
                    false => name.clone(),
                })
                .collect();
            out.push_str(&format!(", {} {}", self.locale.tagged_as, tags.join(", ")));
        }
        out.push_str("</div>\n");
        out
    }

    /// A post as it appears on the front page and in archives: linked title,
    /// information line, excerpt, and a "read more" link if the body was cut.
    pub(crate) fn entry(&self, index: usize, root: &str) -> String {
        let post = &self.site.posts[index];
        let (summary, summarized) = excerpt(&self.bodies[index]);
        let mut out = format!(
            "<div class=\"post\">\n<h2 class=\"post\"><a href=\"{}{}\">{}</a></h2>\n",
            root,
            post.path(),
            post.title
        );
        out.push_str(&self.information(post, root));
        out.push_str(summary.trim_end());
        out.push('\n');
        if summarized {
            out.push_str(&format!(
                "<p><a href=\"{}{}\" class=\"more\">{}</a></p>\n",
                root,
                post.path(),
                self.locale.more
            ));
        }
        out.push_str("</div>\n\n");
        out
    }

    /// A record on its own page: title, information line, and the full body.
    fn full(&self, record: &Record, body: &str, root: &str) -> String {
        let class = match record.kind {
            Kind::Post => "post",
            Kind::Page => "page",
        };
        let mut out = format!(
            "<div class=\"{}\">\n<h2 class=\"{}\">{}</h2>\n",
            class, class, record.title
        );
        out.push_str(&self.information(record, root));
        out.push_str(body.trim_end());
        out.push_str("\n</div>\n");
        out
    }

    /// Writes one page per post at `YYYY/MM/<id>-<url>/`.
    pub fn write_posts(&mut self) -> write::Result<usize> {
        let site = self.site;
        let file_name = self.file_name();
        for (index, post) in site.posts.iter().enumerate() {
            let directory = post.path();
            let body = self.full(post, &self.bodies[index], &root_for(&directory));
            self.emit(&directory, &file_name, &body)?;
        }
        Ok(site.posts.len())
    }

    /// Writes one page per static page at `<url>/`.
    pub fn write_pages(&mut self) -> write::Result<usize> {
        let site = self.site;
        let file_name = self.file_name();
        for page in &site.pages {
            let directory = page.path();
            let content = self.store.body(Kind::Page, page.id);
            let body = self.full(page, &content, &root_for(&directory));
            self.emit(&directory, &file_name, &body)?;
        }
        Ok(site.pages.len())
    }

    /// Writes the front page listing the most recent posts.
    pub fn write_index(&mut self) -> write::Result<()> {
        let count = self.site.posts.len().min(self.config.page_size);
        let body: String = (0..count).map(|index| self.entry(index, "./")).collect();
        let file_name = self.file_name();
        self.emit("", &file_name, &body)
    }

    /// Copies the theme stylesheet to the destination root. A missing
    /// stylesheet is reported and skipped.
    pub fn copy_stylesheet(&mut self) -> write::Result<bool> {
        let source = self.store.root().join("style").join(&self.config.style);
        if !source.is_file() {
            warn!("stylesheet '{}' not found, skipping it", source.display());
            return Ok(false);
        }
        make_directories([self.destination])?;
        copy_file(&source, &self.destination.join(&self.config.style))?;
        self.written += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("<p>one</p><!-- break --><p>two</p>"), ("<p>one</p>", true));
        assert_eq!(excerpt("<p>one</p><!--BREAK--><p>two</p>"), ("<p>one</p>", true));
        assert_eq!(excerpt("<p>whole</p>"), ("<p>whole</p>", false));
    }
}
