//! Builds every output [`Page`] from a set of [`Post`]s (post pages, the posts
//! index, the pillars index and one landing page per cluster) and writes
//! them to disk with [`Writer`].
//!
//! Building is pure: [`pages`] is a function of the posts and the [`Site`],
//! which keeps the rendering testable without touching the file system.

use crate::config::{Cluster, Config, Site};
use crate::html::{escape, wrap_page, Shell};
use crate::markdown;
use crate::post::{by_recency, Post};
use crate::related::{related, MAX_RELATED};
use log::debug;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// The navigation path of the posts index.
const POSTS_INDEX_HREF: &str = "/insights/index.html";

/// The navigation path of the pillars index.
const PILLARS_INDEX_HREF: &str = "/pillars/index.html";

const DEFAULT_DESCRIPTION: &str =
    "Calm, authoritative execution guidance for virtual events, branding/marketing, and AI systems.";

/// An output HTML file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// The page's canonical absolute URL.
    pub url: Url,

    /// The target location of the page relative to the site root.
    pub file_path: PathBuf,

    /// The complete HTML document.
    pub html: String,
}

/// The root-relative path of a cluster's landing page.
pub fn pillar_href(cluster: &Cluster) -> String {
    format!("/pillars/{}/index.html", cluster.pillar_slug)
}

/// The root-relative path of a post page.
pub fn post_href(post: &Post) -> String {
    format!("/insights/{}", post.file_name())
}

fn page(site: &Site, href: &str, html: String) -> Page {
    Page {
        url: site.url(href),
        file_path: PathBuf::from(href.trim_start_matches('/')),
        html,
    }
}

fn cta(site: &Site) -> String {
    let email = escape(&site.contact_email);
    format!(
        r#"<section class="card" style="margin-top:20px">
      <h2>Need execution support?</h2>
      <p>If you want a calm team to execute a large virtual event, branding/marketing delivery, or practical AI/agentic workflows, email <a href="mailto:{email}">{email}</a> with a short overview and target date.</p>
    </section>"#,
        email = email
    )
}

fn cluster_link(cluster: &Cluster) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        escape(&pillar_href(cluster)),
        escape(&cluster.name)
    )
}

/// Renders the page for `post`. `posts` is the full post set, from which the
/// related posts are ranked.
pub fn post_page(site: &Site, posts: &[Post], post: &Post) -> Page {
    let cluster = site.cluster(post.cluster.as_deref());

    let mut body_html = String::new();
    markdown::to_html(&mut body_html, &post.body);

    let lede = if post.excerpt.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="lede">{}</p>"#, escape(&post.excerpt))
    };

    let mut meta = String::new();
    if let Some(date) = &post.publish_on {
        meta.push_str(&format!(
            "<div><strong>Publish date:</strong> {}</div>",
            escape(date)
        ));
    }
    if let Some(cluster) = cluster {
        meta.push_str(&format!(
            "<div><strong>Cluster:</strong> {}</div>",
            cluster_link(cluster)
        ));
    }

    let (pillar_url, pillar_name) = match cluster {
        Some(cluster) => (pillar_href(cluster), escape(&cluster.name)),
        None => (PILLARS_INDEX_HREF.to_owned(), String::from("pillar")),
    };

    let related = related(posts, post, MAX_RELATED);
    let related_html = if related.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = related
            .iter()
            .map(|r| {
                format!(
                    r#"<li><a href="{}.html">{}</a></li>"#,
                    escape(&r.post.slug),
                    escape(&r.post.title)
                )
            })
            .collect();
        format!(
            r#"<section class="card" style="margin-top:20px">
      <h2>Related</h2>
      <ul>{}</ul>
    </section>"#,
            items.join("")
        )
    };

    let body = format!(
        r#"<article class="article">
  <h1>{title}</h1>
  {lede}
  <div class="meta">{meta}</div>
  <div class="article-body">
{body_html}
  </div>
  <div style="margin-top:16px"><a class="btn" href="{pillar_url}">View the {pillar_name} page</a></div>
  {cta}
  {related_html}
</article>"#,
        title = escape(&post.title),
        lede = lede,
        meta = meta,
        body_html = body_html,
        pillar_url = escape(&pillar_url),
        pillar_name = pillar_name,
        cta = cta(site),
        related_html = related_html,
    );

    let href = post_href(post);
    let canonical = site.url(&href);
    let title = format!("{} — {}", post.title, site.name);
    let description = if post.excerpt.is_empty() {
        DEFAULT_DESCRIPTION
    } else {
        post.excerpt.as_str()
    };
    let html = wrap_page(
        site,
        &Shell {
            title: &title,
            description,
            canonical: canonical.as_str(),
            active_href: POSTS_INDEX_HREF,
            body: &body,
        },
    );
    page(site, &href, html)
}

/// Returns `posts` ordered by [`by_recency`].
fn sorted<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<&'a Post> {
    let mut posts: Vec<&Post> = posts.collect();
    posts.sort_by(|a, b| by_recency(a, b));
    posts
}

/// Renders the aggregate posts index, newest first.
pub fn posts_index_page(site: &Site, posts: &[Post]) -> Page {
    let items: Vec<String> = sorted(posts.iter())
        .into_iter()
        .map(|p| {
            let excerpt = if p.excerpt.is_empty() {
                String::new()
            } else {
                format!(r#"<div class="list-excerpt">{}</div>"#, escape(&p.excerpt))
            };
            let mut meta = p.publish_on.as_deref().map(escape).unwrap_or_default();
            if let Some(cluster) = site.cluster(p.cluster.as_deref()) {
                meta.push_str(" • ");
                meta.push_str(&cluster_link(cluster));
            }
            format!(
                r#"<li class="list-item">
  <div class="list-title"><a href="{slug}.html">{title}</a></div>
  {excerpt}
  <div class="list-meta">{meta}</div>
</li>"#,
                slug = escape(&p.slug),
                title = escape(&p.title),
                excerpt = excerpt,
                meta = meta,
            )
        })
        .collect();

    let email = escape(&site.contact_email);
    let body = format!(
        r#"<section class="article">
  <h1>Insights</h1>
  <p class="lede">Calm, operator-grade explainers on virtual events, brand credibility, agency execution, and practical AI systems. For quotes/pricing: <a href="mailto:{email}">{email}</a>.</p>
  <ul class="list">{items}</ul>
</section>"#,
        email = email,
        items = items.join("\n"),
    );

    let canonical = site.url(POSTS_INDEX_HREF);
    let html = wrap_page(
        site,
        &Shell {
            title: &format!("Insights — {}", site.name),
            description: "Operator-grade guidance on virtual events, branding/marketing delivery, and practical AI systems.",
            canonical: canonical.as_str(),
            active_href: POSTS_INDEX_HREF,
            body: &body,
        },
    );
    page(site, POSTS_INDEX_HREF, html)
}

/// Renders the index of every configured cluster.
pub fn pillars_index_page(site: &Site) -> Page {
    let cards: Vec<String> = site
        .clusters
        .iter()
        .map(|c| {
            format!(
                r#"<li class="list-item">
  <div class="list-title">{link}</div>
  <div class="list-excerpt">Best answers and a structured entry point for {lower}.</div>
</li>"#,
                link = cluster_link(c),
                lower = escape(&c.name.to_lowercase()),
            )
        })
        .collect();

    let body = format!(
        r#"<section class="article">
  <h1>Pillars</h1>
  <p class="lede">Choose a pillar to browse structured guidance and related posts.</p>
  <ul class="list">{}</ul>
</section>"#,
        cards.join("\n")
    );

    let canonical = site.url(PILLARS_INDEX_HREF);
    let html = wrap_page(
        site,
        &Shell {
            title: &format!("Pillars — {}", site.name),
            description: "Cluster pillars for virtual events, agency execution, brand/growth, and AI operations.",
            canonical: canonical.as_str(),
            active_href: PILLARS_INDEX_HREF,
            body: &body,
        },
    );
    page(site, PILLARS_INDEX_HREF, html)
}

/// Renders the landing page for `cluster`, listing its posts newest first.
/// A cluster without posts still gets a page with an empty list.
pub fn pillar_page(site: &Site, posts: &[Post], cluster: &Cluster) -> Page {
    let items: Vec<String> = sorted(
        posts
            .iter()
            .filter(|p| p.cluster.as_deref() == Some(cluster.id.as_str())),
    )
    .into_iter()
    .map(|p| {
        format!(
            r#"<li><a href="{}">{}</a></li>"#,
            escape(&post_href(p)),
            escape(&p.title)
        )
    })
    .collect();

    let email = escape(&site.contact_email);
    let body = format!(
        r#"<section class="article">
  <h1>{name}</h1>
  <p class="lede">If you want a calm team to execute a large virtual event, branding/marketing delivery, or practical AI/agentic workflows, email <a href="mailto:{email}">{email}</a>.</p>
  <section class="card">
    <h2>What this pillar covers</h2>
    <ul>
      <li>Clear scope and roles</li>
      <li>Repeatable checklists and gates</li>
      <li>Professional delivery that reduces chaos</li>
      <li>Practical systems (including AI workflows) that hold up in real operations</li>
    </ul>
  </section>
  <section class="card" style="margin-top:18px">
    <h2>Posts in this pillar</h2>
    <ul>{items}</ul>
  </section>
  <section class="card" style="margin-top:18px">
    <h2>Get a quote</h2>
    <p>Email <a href="mailto:{email}">{email}</a> with (1) what you’re trying to execute, (2) target date, and (3) rough budget range. We’ll respond with the fastest viable plan.</p>
  </section>
</section>"#,
        name = escape(&cluster.name),
        email = email,
        items = items.join(""),
    );

    let href = pillar_href(cluster);
    let canonical = site.url(&href);
    let html = wrap_page(
        site,
        &Shell {
            title: &format!("{} — {}", cluster.name, site.name),
            description: &format!("Structured guidance and best answers for {}.", cluster.name),
            canonical: canonical.as_str(),
            active_href: PILLARS_INDEX_HREF,
            body: &body,
        },
    );
    page(site, &href, html)
}

/// Builds every page of the site: one per post (in the order of `posts`),
/// then the posts index, the pillars index, and one page per cluster.
pub fn pages(site: &Site, posts: &[Post]) -> Vec<Page> {
    let mut pages: Vec<Page> = posts.iter().map(|p| post_page(site, posts, p)).collect();
    pages.push(posts_index_page(site, posts));
    pages.push(pillars_index_page(site));
    pages.extend(site.clusters.iter().map(|c| pillar_page(site, posts, c)));
    pages
}

/// Responsible for writing [`Page`]s under the site root.
pub struct Writer<'a> {
    /// The directory each [`Page::file_path`] is relative to.
    pub root_output_directory: &'a Path,
}

impl<'a> Writer<'a> {
    pub fn new(config: &'a Config) -> Writer<'a> {
        Writer {
            root_output_directory: &config.root_output_directory,
        }
    }

    /// Writes `pages` to disk, creating parent directories as needed.
    /// Existing files are overwritten.
    pub fn write_pages(&self, pages: &[Page]) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages {
            let path = self.root_output_directory.join(&page.file_path);
            if let Some(dir) = path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            std::fs::write(&path, &page.html).map_err(|err| Error {
                path: path.clone(),
                err,
            })?;
            debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing a page (or creating its directory) to disk.
#[derive(Debug)]
pub struct Error {
    pub path: PathBuf,
    pub err: io::Error,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Writing '{}': {}", self.path.display(), self.err)
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}
