//! Sitemap merging.
//!
//! The persisted sitemap is only ever grown: every URL already listed survives
//! a run, the run's URLs are added, and the whole file is rewritten sorted and
//! de-duplicated. Every entry is stamped with the run's date, so per-URL
//! modification dates are not tracked.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

static LOC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<loc>([^<]+)</loc>").expect("loc pattern is valid"));

/// Returns the `<loc>` values of a sitemap document in document order.
pub fn parse_urls(xml: &str) -> Vec<String> {
    LOC_PATTERN
        .captures_iter(xml)
        .map(|c| unescape_xml(c[1].trim()))
        .collect()
}

/// Unions `existing` and `generated`, de-duplicated and sorted ascending.
pub fn merge<I, J>(existing: I, generated: J) -> Vec<String>
where
    I: IntoIterator<Item = String>,
    J: IntoIterator<Item = String>,
{
    existing
        .into_iter()
        .chain(generated)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Renders a sitemap with every URL stamped with `lastmod`.
pub fn to_xml(urls: &[String], lastmod: NaiveDate) -> String {
    let lastmod = lastmod.format("%Y-%m-%d");
    let mut xml = String::with_capacity(128 + urls.len() * 96);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{}">"#, SITEMAP_NS));
    xml.push('\n');
    for url in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(url)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Reads the sitemap at `path` (treating a missing file as empty), merges
/// `generated` into it and rewrites it. Returns the number of URLs written.
pub fn update(path: &Path, generated: &[String], lastmod: NaiveDate) -> io::Result<usize> {
    let existing = match std::fs::read_to_string(path) {
        Ok(xml) => parse_urls(&xml),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e),
    };
    let urls = merge(existing, generated.iter().cloned());
    std::fs::write(path, to_xml(&urls, lastmod))?;
    Ok(urls.len())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod test {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_to_xml() {
        let xml = to_xml(&strings(&["https://example.com/?a=1&b=2"]), date());
        assert_eq!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
             \x20 <url>\n\
             \x20   <loc>https://example.com/?a=1&amp;b=2</loc>\n\
             \x20   <lastmod>2024-03-04</lastmod>\n\
             \x20 </url>\n\
             </urlset>\n",
            xml
        );
        assert_eq!(strings(&["https://example.com/?a=1&b=2"]), parse_urls(&xml));
    }

    #[test]
    fn test_merge_is_a_sorted_union() {
        let merged = merge(
            strings(&["https://e.com/z.html", "https://e.com/a.html"]),
            strings(&["https://e.com/m.html", "https://e.com/a.html"]),
        );
        assert_eq!(
            strings(&["https://e.com/a.html", "https://e.com/m.html", "https://e.com/z.html"]),
            merged
        );
    }

    #[test]
    fn test_update_preserves_existing_urls() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");

        assert_eq!(1, update(&path, &strings(&["https://e.com/about.html"]), date())?);
        assert_eq!(
            2,
            update(
                &path,
                &strings(&["https://e.com/insights/a.html", "https://e.com/about.html"]),
                date()
            )?
        );

        let urls = parse_urls(&std::fs::read_to_string(&path)?);
        assert_eq!(
            strings(&["https://e.com/about.html", "https://e.com/insights/a.html"]),
            urls
        );
        Ok(())
    }

    #[test]
    fn test_update_restamps_every_url() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sitemap.xml");
        std::fs::write(
            &path,
            "<urlset><url><loc>https://e.com/old.html</loc><lastmod>2001-01-01</lastmod></url></urlset>",
        )?;

        update(&path, &[], date())?;
        let xml = std::fs::read_to_string(&path)?;
        assert!(xml.contains("<loc>https://e.com/old.html</loc>"));
        assert!(!xml.contains("2001-01-01"));
        assert!(xml.contains("<lastmod>2024-03-04</lastmod>"));
        Ok(())
    }
}
