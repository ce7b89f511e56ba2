//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a generation run: loading the footer, parsing the posts
//! ([`crate::post`]), rendering and writing every page ([`crate::write`]), and
//! merging the run's URLs into the sitemap ([`crate::sitemap`]) and the
//! discovery index ([`crate::discovery`]).
//!
//! A failed run leaves whatever it already wrote in place; every output is a
//! regeneration, so running again repairs it.

use crate::config::{Config, Site};
use crate::post::{Error as ParseError, Parser as PostParser, Post};
use crate::write::{pages, Error as WriteError, Page, Writer};
use crate::{discovery, sitemap};
use chrono::{NaiveDate, Utc};
use log::debug;
use std::fmt;

/// How many of the newest posts are listed in the discovery index.
const DISCOVERY_POST_COUNT: usize = 10;

/// A summary of a completed run.
#[derive(Debug, PartialEq, Eq)]
pub struct Summary {
    /// The number of posts rendered.
    pub posts: usize,

    /// The number of pages written, posts included.
    pub pages: usize,

    /// The number of URLs in the sitemap after the merge.
    pub sitemap_urls: usize,
}

/// Builds the site from a [`Config`], stamping the sitemap with today's date.
pub fn build_site(config: &Config) -> Result<Summary> {
    build_site_on(config, Utc::now().naive_utc().date())
}

/// Builds the site from a [`Config`], stamping the sitemap with `lastmod`.
pub fn build_site_on(config: &Config, lastmod: NaiveDate) -> Result<Summary> {
    let site = config.site();

    let posts = PostParser::new(&config.content_directory).parse_posts()?;
    let pages = pages(&site, &posts);
    Writer::new(config).write_pages(&pages)?;

    let urls: Vec<String> = pages.iter().map(|p| p.url.to_string()).collect();
    let sitemap_urls = sitemap::update(&config.sitemap_path, &urls, lastmod)?;
    discovery::update(&config.discovery_path, &discovery_urls(&site, &posts, &pages))?;

    debug!("rendered {} posts into {} pages", posts.len(), pages.len());
    Ok(Summary {
        posts: posts.len(),
        pages: pages.len(),
        sitemap_urls,
    })
}

/// The curated URL list for the discovery index: the pillars index, the
/// posts index, every cluster page and the newest posts.
fn discovery_urls(site: &Site, posts: &[Post], pages: &[Page]) -> Vec<String> {
    let mut urls = vec![
        site.url("pillars/index.html").to_string(),
        site.url("insights/index.html").to_string(),
    ];
    urls.extend(
        site.clusters
            .iter()
            .map(|c| site.url(&crate::write::pillar_href(c)).to_string()),
    );
    // post pages come first in `pages`, in the same order as `posts`
    urls.extend(
        pages
            .iter()
            .take(posts.len().min(DISCOVERY_POST_COUNT))
            .map(|p| p.url.to_string()),
    );
    urls
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing
/// pages, or updating the sitemap and discovery index.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{test_site, PROJECT_FILE};
    use crate::post::{by_recency, test_post};
    use std::fs;
    use std::path::Path;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(PROJECT_FILE), "site_base: https://example.com\n").unwrap();
        fs::write(
            root.join("index.html"),
            "<html><body><footer>Shared footer</footer></body></html>",
        )
        .unwrap();
        fs::write(
            root.join("sitemap.xml"),
            "<urlset><url><loc>https://example.com/about.html</loc></url></urlset>",
        )
        .unwrap();

        let content = root.join("content/insights");
        fs::create_dir_all(content.join("_drafts")).unwrap();
        fs::write(
            content.join("a.md"),
            "---\ntitle: Post A\ncluster: agency-execution\ntags: [\"t1\", \"t2\"]\npublish_on: 2024-01-02\n---\nBody A",
        )
        .unwrap();
        fs::write(
            content.join("b.md"),
            "---\ntitle: Post B\ncluster: agency-execution\ntags: [\"t2\"]\npublish_on: 2024-01-01\n---\nBody B",
        )
        .unwrap();
        fs::write(content.join("raw-notes.txt"), "No frontmatter here.").unwrap();
        fs::write(content.join("_drafts").join("wip.md"), "Not yet").unwrap();
        dir
    }

    fn read(root: &Path, path: &str) -> String {
        fs::read_to_string(root.join(path)).unwrap()
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let dir = project();
        let root = dir.path();
        let config = Config::from_directory(root).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let summary = build_site_on(&config, date)?;
        assert_eq!(3, summary.posts);
        assert_eq!(3 + 2 + 5, summary.pages);
        assert_eq!(summary.pages + 1, summary.sitemap_urls);

        let a = read(root, "insights/a.html");
        assert!(a.contains("<footer>Shared footer</footer>"));
        assert!(a.contains(r#"<li><a href="b.html">Post B</a></li>"#));
        assert!(!root.join("insights/wip.html").exists());

        let notes = read(root, "insights/raw-notes.html");
        assert!(notes.contains("<h1>raw-notes</h1>"));
        assert!(notes.contains("<p>No frontmatter here.</p>"));

        let index = read(root, "insights/index.html");
        assert!(index.find("a.html").unwrap() < index.find("b.html").unwrap());
        assert!(index.find("b.html").unwrap() < index.find("raw-notes.html").unwrap());

        let pillar = read(root, "pillars/agency-execution/index.html");
        assert!(pillar.contains("/insights/a.html"));
        assert!(!pillar.contains("/insights/raw-notes.html"));
        assert!(root.join("pillars/operator-leverage/index.html").is_file());

        let sitemap = read(root, "sitemap.xml");
        assert!(sitemap.contains("<loc>https://example.com/about.html</loc>"));
        assert!(sitemap.contains("<loc>https://example.com/insights/a.html</loc>"));
        assert!(sitemap.contains("<lastmod>2024-02-01</lastmod>"));

        let llms = read(root, "llms.txt");
        assert_eq!(
            "# llms.txt\n## Insights index (auto)\n\
             - https://example.com/pillars/index.html\n\
             - https://example.com/insights/index.html\n\
             - https://example.com/pillars/virtual-events-os/index.html\n\
             - https://example.com/pillars/agency-execution/index.html\n\
             - https://example.com/pillars/brand-growth-infrastructure/index.html\n\
             - https://example.com/pillars/ai-agentic-operations/index.html\n\
             - https://example.com/pillars/operator-leverage/index.html\n\
             - https://example.com/insights/a.html\n\
             - https://example.com/insights/b.html\n\
             - https://example.com/insights/raw-notes.html\n",
            llms
        );
        Ok(())
    }

    #[test]
    fn test_build_site_is_repeatable() -> Result<()> {
        let dir = project();
        let root = dir.path();
        let config = Config::from_directory(root).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        build_site_on(&config, date)?;
        let first = (
            read(root, "insights/a.html"),
            read(root, "sitemap.xml"),
            read(root, "llms.txt"),
        );
        build_site_on(&config, date)?;
        let second = (
            read(root, "insights/a.html"),
            read(root, "sitemap.xml"),
            read(root, "llms.txt"),
        );
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_missing_footer_source_falls_back() -> Result<()> {
        let dir = project();
        let root = dir.path();
        fs::remove_file(root.join("index.html")).unwrap();
        let config = Config::from_directory(root).unwrap();

        build_site_on(&config, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())?;
        assert!(read(root, "insights/index.html").contains("For pricing or a production quote"));
        Ok(())
    }

    #[test]
    fn test_missing_content_directory_is_fatal() {
        let dir = project();
        let root = dir.path();
        fs::remove_dir_all(root.join("content")).unwrap();
        let config = Config::from_directory(root).unwrap();
        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_discovery_lists_ten_newest_posts() {
        let site = test_site();
        let mut posts: Vec<Post> = (0..13)
            .map(|i| {
                let date = format!("2024-01-{:02}", i + 1);
                test_post(&format!("p{:02}", i), None, &[], Some(&date))
            })
            .collect();
        posts.sort_by(by_recency);
        let pages = pages(&site, &posts);

        let urls = discovery_urls(&site, &posts, &pages);
        assert_eq!(2 + site.clusters.len() + DISCOVERY_POST_COUNT, urls.len());
        let newest = &urls[2 + site.clusters.len()..];
        assert_eq!("https://example.com/insights/p12.html", newest[0]);
        assert_eq!("https://example.com/insights/p03.html", newest[9]);
        assert!(!urls.iter().any(|u| u.ends_with("/p02.html")));
    }
}
