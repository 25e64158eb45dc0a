//! Support for creating the RSS 2.0 feed from the most recent posts.

use regex::Regex;
use rss::{Category, CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::sync::LazyLock;
use tracing::warn;
use url::Url;

use crate::aggregate::Site;
use crate::config::Config;
use crate::generate::{excerpt, Generator};
use crate::write::{self, make_directories, write_file};

/// The maximum number of characters in an item title or description.
pub const DESCRIPTION_LIMIT: usize = 500;

/// The feed's file name at the destination root.
pub const FEED_FILE: &str = "index.rss";

/// The base URL of the published site with a trailing slash, or `None` if
/// `blog.url` is unset or invalid. Both cases are reported: without a base
/// URL the feed can't link anywhere, so it is skipped.
pub fn base_url(config: &Config) -> Option<Url> {
    let Some(url) = config.url.as_deref() else {
        warn!("blog.url is not set, skipping the RSS feed");
        return None;
    };
    let url = match url.ends_with('/') {
        true => url.to_owned(),
        false => format!("{}/", url),
    };
    match Url::parse(&url) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!("blog.url `{}` is invalid ({}), skipping the RSS feed", url, err);
            None
        }
    }
}

/// Removes tags and entity-like sequences so feed text can't produce
/// malformed XML, collapses whitespace, and cuts the result to
/// [`DESCRIPTION_LIMIT`] characters.
pub fn plain_text(html: &str) -> String {
    static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());
    static ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#?\w*;?").unwrap());
    static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

    let text = MARKUP.replace_all(html, " ");
    let text = ENTITY.replace_all(&text, "");
    let text = WHITESPACE.replace_all(text.trim(), " ");
    text.chars().take(DESCRIPTION_LIMIT).collect()
}

/// Builds the feed channel for the `config.page_size` most recent posts.
/// `bodies` is parallel to `site.posts`.
pub fn channel(config: &Config, base: &Url, site: &Site, bodies: &[String]) -> Channel {
    let items: Vec<Item> = site
        .posts
        .iter()
        .zip(bodies)
        .take(config.page_size)
        .map(|(post, body)| {
            let link = base
                .join(&post.path())
                .map(String::from)
                .unwrap_or_else(|_| format!("{}{}", base, post.path()));
            let categories: Vec<Category> = post
                .tags
                .iter()
                .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                .collect();
            let (summary, _) = excerpt(body);
            ItemBuilder::default()
                .title(plain_text(&post.title))
                .link(link.clone())
                .guid(GuidBuilder::default().permalink(true).value(link).build())
                .description(plain_text(summary))
                .pub_date(
                    post.date
                        .and_hms_opt(0, 0, 0)
                        .map(|date| date.and_utc().to_rfc2822()),
                )
                .categories(categories)
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(plain_text(&config.title))
        .link(base.to_string())
        .description(plain_text(&config.subtitle))
        .generator(format!("emberlog {}", env!("CARGO_PKG_VERSION")))
        .items(items)
        .build()
}

impl Generator<'_> {
    /// Writes `index.rss` to the destination root, linking items under
    /// `base`.
    pub fn write_rss(&mut self, base: &Url) -> write::Result<()> {
        let feed = channel(self.config, base, self.site, &self.bodies);
        make_directories([self.destination])?;
        write_file(&self.destination.join(FEED_FILE), &feed.to_string())?;
        self.written += 1;
        Ok(())
    }
}
