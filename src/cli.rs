//! Command-line interface definitions.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

use emberlog::build::Options;

/// Generates a static blog from an emberlog repository
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub blogdir: PathBuf,

    /// Destination directory for the generated site
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub destdir: PathBuf,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report progress; repeat for debugging output
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Don't generate posts, archives, tags, or the feed
    #[arg(short = 'P', long)]
    pub no_posts: bool,

    /// Don't generate static pages
    #[arg(short = 'p', long)]
    pub no_pages: bool,

    /// Don't generate tag archives
    #[arg(short = 'T', long)]
    pub no_tags: bool,

    /// Don't generate the RSS feed
    #[arg(short = 'r', long)]
    pub no_rss: bool,

    /// Don't generate the front page
    #[arg(short = 'I', long)]
    pub no_index: bool,

    /// Don't copy the stylesheet
    #[arg(short = 'c', long)]
    pub no_css: bool,
}

impl Cli {
    /// The most detailed level that gets logged.
    pub fn level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            (false, _) => Level::DEBUG,
        }
    }

    pub fn options(&self) -> Options {
        Options {
            posts: !self.no_posts,
            pages: !self.no_pages,
            tags: !self.no_tags,
            rss: !self.no_rss,
            index: !self.no_index,
            css: !self.no_css,
        }
        .normalized()
    }
}
