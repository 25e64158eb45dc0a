//! Loads the repository configuration and the localization strings. Both are
//! INI files read through the [`config`] crate and turned into plain values
//! that are built once per run and handed to every component by reference.

use config::{Config as Source, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The number of posts per page when `blog.posts` is absent or invalid.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Deserialize, Default)]
struct Settings {
    #[serde(default)]
    core: CoreSection,
    #[serde(default)]
    blog: BlogSection,
    #[serde(default)]
    user: UserSection,
}

#[derive(Deserialize, Default)]
struct CoreSection {
    extension: Option<String>,
    encoding: Option<String>,
}

#[derive(Deserialize, Default)]
struct BlogSection {
    title: Option<String>,
    subtitle: Option<String>,
    theme: Option<String>,
    style: Option<String>,
    lang: Option<String>,
    url: Option<String>,
    posts: Option<String>,
}

#[derive(Deserialize, Default)]
struct UserSection {
    name: Option<String>,
}

/// The site configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `core.extension`: the suffix of generated pages.
    pub extension: String,

    /// `core.encoding`: the charset announced in pages and the feed.
    pub encoding: String,

    /// `blog.title`
    pub title: String,

    /// `blog.subtitle`
    pub subtitle: String,

    /// `blog.theme`: file name of the theme under `.emberlog/theme/`.
    pub theme: String,

    /// `blog.style`: file name of the stylesheet under `.emberlog/style/`.
    pub style: String,

    /// `blog.lang`: file name of the language file under `.emberlog/lang/`.
    pub lang: String,

    /// `blog.url`: the base URL of the published site. Required for RSS.
    pub url: Option<String>,

    /// `blog.posts`: posts per archive page, on the front page and in the
    /// feed.
    pub page_size: usize,

    /// `user.name`
    pub author: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extension: "html".to_owned(),
            encoding: "UTF-8".to_owned(),
            title: "My Blog".to_owned(),
            subtitle: "yet another blog".to_owned(),
            theme: "default.html".to_owned(),
            style: "default.css".to_owned(),
            lang: "en_US".to_owned(),
            url: None,
            page_size: DEFAULT_PAGE_SIZE,
            author: "admin".to_owned(),
        }
    }
}

impl Config {
    /// Reads the configuration file at `path`. An unreadable or malformed
    /// file is an error; absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Config::parse(&contents).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })
    }

    /// Parses configuration text in INI format.
    pub fn parse(contents: &str) -> std::result::Result<Config, ConfigError> {
        let settings: Settings = Source::builder()
            .add_source(File::from_str(contents, FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        let defaults = Config::default();
        let or = |value: Option<String>, default: String| match value {
            Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
            _ => default,
        };

        let page_size = match settings.blog.posts.as_deref().map(str::trim) {
            None | Some("") => defaults.page_size,
            Some(posts) => match posts.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("blog.posts: invalid value `{}`, using {}", posts, DEFAULT_PAGE_SIZE);
                    DEFAULT_PAGE_SIZE
                }
            },
        };

        Ok(Config {
            extension: or(settings.core.extension, defaults.extension),
            encoding: or(settings.core.encoding, defaults.encoding),
            title: or(settings.blog.title, defaults.title),
            subtitle: or(settings.blog.subtitle, defaults.subtitle),
            theme: or(settings.blog.theme, defaults.theme),
            style: or(settings.blog.style, defaults.style),
            lang: or(settings.blog.lang, defaults.lang),
            url: settings
                .blog
                .url
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            page_size,
            author: or(settings.user.name, defaults.author),
        })
    }
}

#[derive(Deserialize, Default)]
struct LocaleFile {
    #[serde(default)]
    lang: HashMap<String, String>,
}

/// Translated month names and user-interface strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    pub months: [String; 12],

    /// Heading prefix of month archive pages.
    pub archive: String,

    /// Heading prefix of tag archive pages.
    pub tags: String,

    /// Heading of the page listing every tag.
    pub tag_overview: String,

    /// Link to the previous (newer) archive page.
    pub previous: String,

    /// Link to the next (older) archive page.
    pub next: String,

    /// Link from an excerpt to the full post.
    pub more: String,

    pub posted_on: String,
    pub by: String,
    pub tagged_as: String,
}

const MONTH_KEYS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

impl Default for Locale {
    fn default() -> Self {
        Locale {
            months: MONTH_KEYS.map(|key| {
                let mut name = key.to_owned();
                name[..1].make_ascii_uppercase();
                name
            }),
            archive: "Archive for".to_owned(),
            tags: "Posts tagged as".to_owned(),
            tag_overview: "Tags".to_owned(),
            previous: "&laquo; Newer posts".to_owned(),
            next: "Older posts &raquo;".to_owned(),
            more: "Read more &raquo;".to_owned(),
            posted_on: "Posted on".to_owned(),
            by: "by".to_owned(),
            tagged_as: "tagged as".to_owned(),
        }
    }
}

impl Locale {
    /// Reads the language file at `path`. A missing file yields the English
    /// defaults; a file that exists but can't be read or parsed is an error.
    pub fn from_file(path: &Path) -> Result<Locale> {
        if !path.exists() {
            debug!("no language file at '{}', using English", path.display());
            return Ok(Locale::default());
        }
        let contents = fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        Locale::parse(&contents).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })
    }

    /// Parses a language file in INI format. Keys live in a `[lang]` section;
    /// absent keys keep their English defaults.
    pub fn parse(contents: &str) -> std::result::Result<Locale, ConfigError> {
        let file: LocaleFile = Source::builder()
            .add_source(File::from_str(contents, FileFormat::Ini))
            .build()?
            .try_deserialize()?;

        let mut locale = Locale::default();
        let pick = |key: &str, field: &mut String| {
            if let Some(value) = file.lang.get(key).filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_owned();
            }
        };

        for (key, month) in MONTH_KEYS.iter().zip(locale.months.iter_mut()) {
            pick(key, month);
        }
        pick("archive", &mut locale.archive);
        pick("tags", &mut locale.tags);
        pick("tag_overview", &mut locale.tag_overview);
        pick("previous", &mut locale.previous);
        pick("next", &mut locale.next);
        pick("more", &mut locale.more);
        pick("posted_on", &mut locale.posted_on);
        pick("by", &mut locale.by);
        pick("tagged_as", &mut locale.tagged_as);
        Ok(locale)
    }

    /// The localized name of `month` (1-based). Out-of-range months render as
    /// their number.
    pub fn month_name(&self, month: u32) -> String {
        match month {
            1..=12 => self.months[month as usize - 1].clone(),
            _ => month.to_string(),
        }
    }
}

/// Represents the result of loading a configuration or language file.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a configuration or language file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the file can't be read.
    #[error("reading '{}': {err}", path.display())]
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the file isn't valid INI.
    #[error("parsing '{}': {err}", path.display())]
    Parse { path: PathBuf, err: ConfigError },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_config() {
        let config = Config::parse(
            "[core]\nextension = php\n\n\
             [blog]\ntitle = Notes\nurl = https://example.org/\nposts = 5\n\n\
             [user]\nname = Jane\n",
        )
        .unwrap();
        assert_eq!(config.extension, "php");
        assert_eq!(config.title, "Notes");
        assert_eq!(config.url.as_deref(), Some("https://example.org/"));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.author, "Jane");
        assert_eq!(config.encoding, "UTF-8");
    }

    #[test]
    fn test_invalid_page_size_falls_back() {
        let config = Config::parse("[blog]\nposts = lots\n").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        let config = Config::parse("[blog]\nposts = 0\n").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(&dir.path().join("config")),
            Err(Error::Read { .. })
        ));
    }

    #[test]
    fn test_locale_defaults_to_english() {
        let locale = Locale::default();
        assert_eq!(locale.month_name(3), "March");
        assert_eq!(locale.month_name(12), "December");

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Locale::from_file(&dir.path().join("en_US")).unwrap(), locale);
    }

    #[test]
    fn test_locale_overrides() {
        let locale =
            Locale::parse("[lang]\nmarch = Březen\narchive = Archiv\ntag_overview = Štítky\n")
                .unwrap();
        assert_eq!(locale.month_name(3), "Březen");
        assert_eq!(locale.month_name(4), "April");
        assert_eq!(locale.archive, "Archiv");
        assert_eq!(locale.tag_overview, "Štítky");
        assert_eq!(locale.next, Locale::default().next);
    }
}
