//! The page shell shared by every generated page: escaping, the navigation
//! header, the footer, and [`wrap_page`] which stitches them around a body.

use crate::config::Site;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::Path;

static FOOTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<footer.*</footer>").expect("footer pattern is valid"));

/// A primary navigation link. Hrefs are root-relative so nested pages (e.g.
/// `/pillars/{slug}/index.html`) resolve them the same way.
struct NavLink {
    href: &'static str,
    label: &'static str,
    class: &'static str,
}

const NAV_LINKS: &[NavLink] = &[
    NavLink {
        href: "/",
        label: "Home",
        class: "primary",
    },
    NavLink {
        href: "/started-business.html",
        label: "Start here",
        class: "",
    },
    NavLink {
        href: "/articles.html",
        label: "Articles",
        class: "",
    },
    NavLink {
        href: "/insights/index.html",
        label: "Insights",
        class: "",
    },
    NavLink {
        href: "/pillars/index.html",
        label: "Pillars",
        class: "",
    },
    NavLink {
        href: "/atlas.html",
        label: "Atlas",
        class: "",
    },
    NavLink {
        href: "/selected-work.html",
        label: "Work",
        class: "",
    },
    NavLink {
        href: "/how-west-peek-helps.html",
        label: "How we help",
        class: "",
    },
];

/// Escapes `&`, `<`, `>` and `"` so `s` is safe in text nodes and
/// double-quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Normalizes a navigation path so that `index.html`, `/index.html` and `/`
/// are the same page, and `foo.html`, `./foo.html` and `/foo.html` are too.
pub fn normalize_href(href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    let rooted = if href.starts_with('/') {
        href.to_owned()
    } else {
        format!("/{}", href.trim_start_matches("./"))
    };
    if rooted == "/index.html" {
        String::from("/")
    } else {
        rooted
    }
}

/// Renders the site header, marking the link for `active_href` as active.
pub fn header(site: &Site, active_href: &str) -> String {
    let active = normalize_href(active_href);
    let links: Vec<String> = NAV_LINKS
        .iter()
        .map(|link| {
            let class = if normalize_href(link.href) == active {
                format!("{} active", link.class)
            } else {
                link.class.to_owned()
            };
            format!(
                r#"<a class="{}" href="{}">{}</a>"#,
                class.trim(),
                link.href,
                escape(link.label)
            )
        })
        .collect();

    format!(
        r#"<header>
  <div class="header-inner">
    <div class="brand">
      <a aria-label="{name} home" href="/">
        <img alt="{name} logo" src="/assets/west-peek-productions-logo.jpeg">
      </a>
      <div class="name">{name}</div>
    </div>
    <nav aria-label="Primary" class="nav">
      {links}
    </nav>
  </div>
</header>"#,
        name = escape(&site.name),
        links = links.join("\n"),
    )
}

/// The footer used when the footer source page can't be read or has no
/// `<footer>` element.
pub fn fallback_footer(contact_email: &str) -> String {
    let email = escape(contact_email);
    format!(
        r#"<footer><div class="footer-grid"><div>For pricing or a production quote: <a href="mailto:{email}">{email}</a></div></div></footer>"#,
        email = email
    )
}

/// Extracts the `<footer>...</footer>` element from `html`, if present.
pub fn extract_footer(html: &str) -> Option<&str> {
    FOOTER_PATTERN.find(html).map(|m| m.as_str())
}

/// Reads the shared footer from an existing page. A missing page or a page
/// without a footer degrades to [`fallback_footer`].
pub fn load_footer(source: &Path, contact_email: &str) -> String {
    match std::fs::read_to_string(source) {
        Ok(html) => match extract_footer(&html) {
            Some(footer) => {
                debug!("using footer from `{}`", source.display());
                footer.to_owned()
            }
            None => {
                warn!("no <footer> in `{}`; using the built-in footer", source.display());
                fallback_footer(contact_email)
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("`{}` not found; using the built-in footer", source.display());
            fallback_footer(contact_email)
        }
        Err(e) => {
            warn!("reading `{}`: {}; using the built-in footer", source.display(), e);
            fallback_footer(contact_email)
        }
    }
}

/// The pieces of a page that vary from page to page.
pub struct Shell<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub canonical: &'a str,

    /// The navigation path highlighted in the header.
    pub active_href: &'a str,

    /// Trusted HTML placed inside `<main>`.
    pub body: &'a str,
}

/// Wraps `shell.body` in the full document: head metadata, header, and the
/// site's shared footer.
pub fn wrap_page(site: &Site, shell: &Shell) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <meta name="description" content="{description}">
  <link rel="stylesheet" href="/assets/site.css">
  <link rel="canonical" href="{canonical}">
</head>
<body>
{header}
<main class="main">
{body}
</main>
{footer}
</body>
</html>"#,
        title = escape(shell.title),
        description = escape(shell.description),
        canonical = escape(shell.canonical),
        header = header(site, shell.active_href),
        body = shell.body,
        footer = site.footer,
    )
}
