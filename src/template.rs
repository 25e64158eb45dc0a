//! Renders pages through the theme. A theme is an HTML file containing
//! comment-style placeholders such as `<!-- title -->` (matched
//! case-insensitively). Each placeholder maps to a function of the render
//! [`Context`] and the relative path from the page back to the site root.
//!
//! Everything but `<!-- content -->` is identical for all pages at the same
//! depth of the output tree, so the [`Renderer`] fills it in once per
//! relative root and caches the result; rendering a page then only has to
//! substitute its body.

use chrono::{Datelike, NaiveDateTime};
use regex::{NoExpand, Regex};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::aggregate::Site;
use crate::config::Config;

/// Which parts of the site are being generated. Sidebar lists and the feed
/// link are left empty for parts that aren't.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sections {
    pub archive: bool,
    pub pages: bool,
    pub tags: bool,
    pub rss: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Sections {
            archive: true,
            pages: true,
            tags: true,
            rss: true,
        }
    }
}

/// Everything placeholders are computed from.
pub struct Context<'a> {
    pub config: &'a Config,
    pub site: &'a Site,
    pub sections: Sections,

    /// The time of the generation run, used for the date meta tag and the
    /// copyright year.
    pub generated: NaiveDateTime,
}

type Fragment = fn(&Context, &str) -> String;

const PLACEHOLDERS: &[(&str, Fragment)] = &[
    ("content-type", content_type),
    ("generator", generator),
    ("date", date),
    ("stylesheet", stylesheet),
    ("rss", rss),
    ("title", title),
    ("subtitle", subtitle),
    ("name", name),
    ("year", year),
    ("archive", archive),
    ("pages", pages),
    ("tags", tags),
];

static MARKERS: LazyLock<Vec<(Regex, Fragment)>> = LazyLock::new(|| {
    PLACEHOLDERS
        .iter()
        .map(|(name, fragment)| (marker(name), *fragment))
        .collect()
});

static CONTENT: LazyLock<Regex> = LazyLock::new(|| marker("content"));

fn marker(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)<!--\s*{}\s*-->", regex::escape(name))).unwrap()
}

/// Renders page bodies into the theme, caching the theme per relative root.
pub struct Renderer<'a> {
    theme: String,
    context: Context<'a>,
    cache: HashMap<String, String>,
}

impl<'a> Renderer<'a> {
    /// Loads the theme from `path`. The site can't be produced without a
    /// theme, so failing to read it is an error.
    pub fn from_file(path: &Path, context: Context<'a>) -> Result<Renderer<'a>> {
        let theme = fs::read_to_string(path).map_err(|err| Error::OpenTheme {
            path: path.to_owned(),
            err,
        })?;
        Ok(Renderer::new(theme, context))
    }

    pub fn new(theme: String, context: Context<'a>) -> Renderer<'a> {
        Renderer {
            theme,
            context,
            cache: HashMap::new(),
        }
    }

    /// Renders `content` for a page whose path back to the site root is
    /// `root` (`./`, `../`, `../../`, ...).
    pub fn render(&mut self, root: &str, content: &str) -> String {
        let theme = &self.theme;
        let context = &self.context;
        let template = self
            .cache
            .entry(root.to_owned())
            .or_insert_with(|| prepare(theme, context, root));
        CONTENT.replace_all(template, NoExpand(content)).into_owned()
    }

    /// The number of relative roots the theme has been prepared for.
    pub fn cached_roots(&self) -> usize {
        self.cache.len()
    }
}

/// Substitutes every placeholder except the body.
fn prepare(theme: &str, context: &Context, root: &str) -> String {
    let mut out = theme.to_owned();
    for (marker, fragment) in MARKERS.iter() {
        if marker.is_match(&out) {
            out = marker
                .replace_all(&out, NoExpand(&fragment(context, root)))
                .into_owned();
        }
    }
    out
}

fn content_type(context: &Context, _root: &str) -> String {
    format!(
        "<meta http-equiv=\"Content-Type\" content=\"text/html; charset={}\">",
        context.config.encoding
    )
}

fn generator(_context: &Context, _root: &str) -> String {
    format!(
        "<meta name=\"Generator\" content=\"emberlog {}\">",
        env!("CARGO_PKG_VERSION")
    )
}

fn date(context: &Context, _root: &str) -> String {
    format!(
        "<meta name=\"Date\" content=\"{}\">",
        context.generated.format("%Y-%m-%dT%H:%M:%S")
    )
}

fn stylesheet(context: &Context, root: &str) -> String {
    format!(
        "<link rel=\"stylesheet\" href=\"{}{}\" type=\"text/css\">",
        root, context.config.style
    )
}

fn rss(context: &Context, root: &str) -> String {
    match context.sections.rss {
        true => format!(
            "<link rel=\"alternate\" href=\"{}index.rss\" title=\"RSS Feed\" \
             type=\"application/rss+xml\">",
            root
        ),
        false => String::new(),
    }
}

fn title(context: &Context, _root: &str) -> String {
    context.config.title.clone()
}

fn subtitle(context: &Context, _root: &str) -> String {
    context.config.subtitle.clone()
}

fn name(context: &Context, _root: &str) -> String {
    context.config.author.clone()
}

fn year(context: &Context, _root: &str) -> String {
    context.generated.year().to_string()
}

fn archive(context: &Context, root: &str) -> String {
    if !context.sections.archive {
        return String::new();
    }
    list(context.site.months.values().rev().map(|month| {
        format!(
            "<li><a href=\"{}{}\">{}</a> ({})</li>",
            root, month.url, month.label, month.count
        )
    }))
}

fn pages(context: &Context, root: &str) -> String {
    if !context.sections.pages {
        return String::new();
    }
    list(context.site.pages.iter().map(|page| {
        format!("<li><a href=\"{}{}\">{}</a></li>", root, page.path(), page.title)
    }))
}

fn tags(context: &Context, root: &str) -> String {
    if !context.sections.tags {
        return String::new();
    }
    list(context.site.tags.values().map(|tag| {
        format!(
            "<li><a href=\"{}tags/{}/\">{}</a> ({})</li>",
            root, tag.url, tag.name, tag.count
        )
    }))
}

/// Wraps list items in a `<ul>`; no items, no list.
pub fn list(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    match items.is_empty() {
        true => String::new(),
        false => format!("<ul>\n{}\n</ul>", items.join("\n")),
    }
}

/// Represents the result of loading a theme.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a theme.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the theme file can't be read.
    #[error("opening theme file '{}': {err}", path.display())]
    OpenTheme { path: PathBuf, err: io::Error },
}
