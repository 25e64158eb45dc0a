//! The library code for the `emberlog` static blog generator. A run is a
//! one-way pipeline:
//!
//! 1. Reading record headers from the repository ([`crate::store`])
//! 2. Repairing missing or invalid header fields ([`crate::normalize`])
//! 3. Ordering the records and building the tag and month indices
//!    ([`crate::aggregate`])
//! 4. Generating pages ([`crate::generate`]), month and tag archives
//!    ([`crate::archive`], [`crate::paginate`]), and the feed
//!    ([`crate::feed`]), each rendered through the theme
//!    ([`crate::template`]) and written to disk ([`crate::write`])
//!
//! The archives are the most involved step: posts are walked in order and cut
//! into fixed-size pages per month and per tag, with previous/next links
//! between the pages of each group. [`crate::build::build_site`] ties the
//! steps together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod aggregate;
pub mod archive;
pub mod build;
pub mod config;
pub mod feed;
pub mod generate;
pub mod normalize;
pub mod paginate;
pub mod record;
pub mod store;
pub mod template;
pub mod write;
