//! The library code for the `cairn` static site generator. A generation run
//! breaks down into a handful of steps:
//!
//! 1. Parsing posts from the content directory ([`crate::post`], with the
//!    frontmatter handled by [`crate::frontmatter`])
//! 2. Rendering every page: one per post, including its related posts
//!    ([`crate::related`]), the posts index, the pillars index, and one
//!    landing page per cluster ([`crate::write`], [`crate::html`])
//! 3. Merging the run's URLs into the sitemap ([`crate::sitemap`]) and the
//!    `llms.txt` discovery index ([`crate::discovery`])
//!
//! [`build::build_site`] runs all of them. Separately, [`release`] promotes
//! one draft into the content directory so the next run publishes it.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod discovery;
pub mod frontmatter;
pub mod html;
pub mod markdown;
pub mod post;
pub mod related;
pub mod release;
pub mod sitemap;
pub mod write;
