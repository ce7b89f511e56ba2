//! Maintains the auto-generated section of the `llms.txt` discovery document.
//! The section starts at [`SECTION_HEADING`] and runs to the end of the file;
//! everything before it is left alone.

use std::io;
use std::path::Path;

/// The heading that opens the generated section.
pub const SECTION_HEADING: &str = "## Insights index (auto)";

/// The document used when none exists yet.
const DEFAULT_DOCUMENT: &str = "# llms.txt\n";

/// Replaces the generated section of `document` with a list of `urls`.
/// Applying it to its own output with the same `urls` changes nothing.
pub fn merge(document: &str, urls: &[String]) -> String {
    let marker = format!("\n{}", SECTION_HEADING);
    let preserved = match document.find(&marker) {
        Some(i) => &document[..i],
        None => document,
    };

    let mut out = preserved.trim_end().to_owned();
    out.push_str(&marker);
    out.push('\n');
    for url in urls {
        out.push_str("- ");
        out.push_str(url);
        out.push('\n');
    }
    out
}

/// Reads the discovery document at `path` (or a minimal default if there is
/// none), replaces its generated section, and writes it back.
pub fn update(path: &Path, urls: &[String]) -> io::Result<()> {
    let document = match std::fs::read_to_string(path) {
        Ok(document) => document,
        Err(e) if e.kind() == io::ErrorKind::NotFound => DEFAULT_DOCUMENT.to_owned(),
        Err(e) => return Err(e),
    };
    std::fs::write(path, merge(&document, urls))
}

#[cfg(test)]
mod test {
    use super::*;

    fn urls() -> Vec<String> {
        vec![
            String::from("https://e.com/pillars/index.html"),
            String::from("https://e.com/insights/index.html"),
        ]
    }

    #[test]
    fn test_merge_default_document() {
        assert_eq!(
            "# llms.txt\n## Insights index (auto)\n\
             - https://e.com/pillars/index.html\n\
             - https://e.com/insights/index.html\n",
            merge(DEFAULT_DOCUMENT, &urls())
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let document = "# Site\n\nHand-written notes.\n\n";
        let once = merge(document, &urls());
        let twice = merge(&once, &urls());
        assert_eq!(once, twice);
        assert!(once.starts_with("# Site\n\nHand-written notes.\n## Insights"));
    }

    #[test]
    fn test_merge_replaces_stale_section() {
        let stale = merge("# Site\n", &[String::from("https://e.com/gone.html")]);
        let fresh = merge(&stale, &urls());
        assert!(!fresh.contains("gone.html"));
        assert_eq!(1, fresh.matches(SECTION_HEADING).count());
    }

    #[test]
    fn test_update_creates_missing_document() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("llms.txt");
        update(&path, &urls())?;
        let first = std::fs::read_to_string(&path)?;
        update(&path, &urls())?;
        assert_eq!(first, std::fs::read_to_string(&path)?);
        assert!(first.starts_with(DEFAULT_DOCUMENT));
        Ok(())
    }
}
