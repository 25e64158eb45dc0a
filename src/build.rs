//! Exports the [`build_site`] function which stitches together the high-level
//! steps of generating the site: opening the repository ([`crate::store`]),
//! loading the configuration and language ([`crate::config`]), normalizing and
//! aggregating the records ([`crate::aggregate`]), loading the theme
//! ([`crate::template`]), and writing pages, archives, the front page, the
//! feed, and the stylesheet ([`crate::generate`]).

use chrono::Local;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::aggregate::Site;
use crate::config::{Config, Error as ConfigError, Locale};
use crate::feed::base_url;
use crate::generate::Generator;
use crate::record::Kind;
use crate::store::{Error as StoreError, Store};
use crate::template::{Context, Error as TemplateError, Renderer, Sections};
use crate::write::Error as WriteError;

/// Exit status for failures caused by missing permissions.
pub const EXIT_PERMISSION: u8 = 13;

/// Exit status for any other fatal failure.
pub const EXIT_FAILURE: u8 = 1;

/// Selects which parts of the site to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub posts: bool,
    pub pages: bool,
    pub tags: bool,
    pub rss: bool,
    pub index: bool,
    pub css: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            posts: true,
            pages: true,
            tags: true,
            rss: true,
            index: true,
            css: true,
        }
    }
}

impl Options {
    /// Tags and the feed are both made of posts, so neither survives
    /// disabling posts.
    pub fn normalized(mut self) -> Options {
        if !self.posts {
            self.tags = false;
            self.rss = false;
        }
        self
    }
}

/// What a run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pages: usize,
    pub archive_pages: usize,
    pub tag_pages: usize,
    pub index: bool,
    pub rss: bool,
    pub stylesheet: bool,

    /// Every file written, including year indices and the tag overview.
    pub files: usize,
}

/// Builds the site for the repository at `blog_directory` into
/// `destination`.
pub fn build_site(
    blog_directory: &Path,
    destination: &Path,
    options: &Options,
) -> Result<Summary> {
    let options = options.normalized();
    let store = Store::open(blog_directory)?;
    let config = Config::from_file(&store.root().join("config"))?;
    let locale = Locale::from_file(&store.root().join("lang").join(&config.lang))?;
    debug!("loaded configuration {:?}", config);

    let posts = match options.posts {
        true => store.headers(Kind::Post)?,
        false => Vec::new(),
    };
    let pages = store.headers(Kind::Page)?;
    let now = Local::now();
    let site = Site::from_headers(posts, pages, &locale, now.date_naive());
    info!(
        "found {} posts, {} pages, {} tags",
        site.posts.len(),
        site.pages.len(),
        site.tags.len()
    );

    let feed = match options.rss {
        true => base_url(&config),
        false => None,
    };
    let context = Context {
        config: &config,
        site: &site,
        sections: Sections {
            archive: options.posts,
            pages: options.pages,
            tags: options.tags,
            rss: feed.is_some(),
        },
        generated: now.naive_local(),
    };
    let theme = store.root().join("theme").join(&config.theme);
    let renderer = Renderer::from_file(&theme, context)?;
    let mut generator = Generator::new(
        &config,
        &locale,
        &site,
        &store,
        destination,
        renderer,
        options.tags,
    );

    let mut summary = Summary::default();
    if options.posts {
        summary.posts = generator.write_posts()?;
        summary.archive_pages = generator.write_archive()?;
    }
    if options.tags {
        summary.tag_pages = generator.write_tags()?;
    }
    if options.pages {
        summary.pages = generator.write_pages()?;
    }
    if options.index {
        generator.write_index()?;
        summary.index = true;
    }
    if let Some(base) = &feed {
        generator.write_rss(base)?;
        summary.rss = true;
    }
    if options.css {
        summary.stylesheet = generator.copy_stylesheet()?;
    }
    summary.files = generator.written();

    info!(
        "wrote {} files to '{}': {} posts, {} pages, {} archive pages, {} tag pages",
        summary.files,
        destination.display(),
        summary.posts,
        summary.pages,
        summary.archive_pages,
        summary.tag_pages
    );
    Ok(summary)
}

/// The result of building a site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Every variant is fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the repository can't be opened or listed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Returned when the configuration or language file is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Returned when the theme can't be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Returned when output can't be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl Error {
    /// The I/O error behind this error, if there is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::Store(StoreError::List { err, .. }) => err.io_error(),
            Error::Store(StoreError::ReadHeader { err, .. }) => Some(err),
            Error::Store(_) => None,
            Error::Config(ConfigError::Read { err, .. }) => Some(err),
            Error::Config(ConfigError::Parse { .. }) => None,
            Error::Template(TemplateError::OpenTheme { err, .. }) => Some(err),
            Error::Write(err) => Some(err.io_error()),
        }
    }

    /// The process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::PermissionDenied) => EXIT_PERMISSION,
            _ => EXIT_FAILURE,
        }
    }
}
