//! Promotes one pending draft into the published content directory per call.
//! The oldest-named draft goes first; its file name is normalized into a slug
//! and it never overwrites an existing post.

use crate::post::SOURCE_EXTENSIONS;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The stem used when a draft's name normalizes to nothing.
const PLACEHOLDER_STEM: &str = "post";

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_").expect("date prefix pattern is valid"));

/// The result of a [`release_one`] call.
#[derive(Debug, PartialEq, Eq)]
pub struct Release {
    /// The number of drafts waiting before the call.
    pub available: usize,
    pub outcome: Outcome,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// There was nothing to release.
    NoDrafts,

    /// `from` was moved to `to`. `renamed` is set when the normalized name
    /// was taken and a suffix had to be added.
    Released {
        from: PathBuf,
        to: PathBuf,
        renamed: bool,
    },
}

/// Normalizes a draft file name: a leading `YYYY-MM-DD_` is dropped, the
/// stem is slugified and the extension is lower-cased, e.g.
/// `2024-05-01_My Great Post!.md` becomes `my-great-post.md`.
pub fn normalize_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    let slug = slug::slugify(DATE_PREFIX.replace(&stem, ""));
    let stem = if slug.is_empty() {
        PLACEHOLDER_STEM
    } else {
        slug.as_str()
    };
    format!("{}{}", stem, extension)
}

/// Lists the releasable drafts in `drafts_dir`, sorted by file name. A
/// missing directory has no drafts.
pub fn pending_drafts(drafts_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(drafts_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut drafts = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| SOURCE_EXTENSIONS.contains(&e));
        if entry.file_type()?.is_file() && is_source {
            drafts.push(path);
        }
    }
    drafts.sort();
    Ok(drafts)
}

/// Picks a destination for `file_name` in `content_dir` that doesn't exist
/// yet, adding a six-digit time-derived suffix to the stem when needed.
fn destination(content_dir: &Path, file_name: &str) -> (PathBuf, bool) {
    let to = content_dir.join(file_name);
    if !to.exists() {
        return (to, false);
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut suffix = Utc::now().timestamp_millis().rem_euclid(1_000_000);
    loop {
        let candidate = content_dir.join(format!("{}-{:06}{}", stem, suffix, extension));
        if !candidate.exists() {
            return (candidate, true);
        }
        suffix = (suffix + 1) % 1_000_000;
    }
}

/// Moves the first pending draft into `content_dir`.
pub fn release_one(drafts_dir: &Path, content_dir: &Path) -> Result<Release> {
    let drafts = pending_drafts(drafts_dir)?;
    let available = drafts.len();
    let from = match drafts.into_iter().next() {
        Some(from) => from,
        None => {
            return Ok(Release {
                available,
                outcome: Outcome::NoDrafts,
            })
        }
    };

    let file_name = from
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidFileName(from.clone()))?;
    let (to, renamed) = destination(content_dir, &normalize_file_name(file_name));
    std::fs::rename(&from, &to)?;

    Ok(Release {
        available,
        outcome: Outcome::Released { from, to, renamed },
    })
}

/// Represents the result of a draft-release operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error releasing a draft.
#[derive(Debug)]
pub enum Error {
    /// Returned when a draft's file name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned for I/O errors listing or moving drafts.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidFileName(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_normalize_file_name() {
        assert_eq!("my-great-post.md", normalize_file_name("2024-05-01_My Great Post!.md"));
        assert_eq!("notes.txt", normalize_file_name("--Notes--.TXT"));
        assert_eq!("a-b-c.md", normalize_file_name("a__b  c.md"));
        assert_eq!("post.md", normalize_file_name("2024-05-01_!!!.md"));
        assert_eq!("2024-05-01.md", normalize_file_name("2024-05-01.md"));
    }

    #[test]
    fn test_no_drafts_directory() {
        let dir = tempfile::tempdir().unwrap();
        let release = release_one(&dir.path().join("_drafts"), dir.path()).unwrap();
        assert_eq!(
            Release {
                available: 0,
                outcome: Outcome::NoDrafts
            },
            release
        );
    }

    #[test]
    fn test_releases_oldest_draft_and_avoids_collisions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let content = dir.path();
        let drafts = content.join("_drafts");
        fs::create_dir(&drafts)?;
        fs::write(drafts.join("2024-05-01_My Great Post!.md"), "first")?;
        fs::write(drafts.join("2024-06-01_my great post.md"), "second")?;
        fs::write(drafts.join("ignored.png"), "")?;

        let first = release_one(&drafts, content)?;
        assert_eq!(2, first.available);
        assert_eq!(
            Outcome::Released {
                from: drafts.join("2024-05-01_My Great Post!.md"),
                to: content.join("my-great-post.md"),
                renamed: false,
            },
            first.outcome
        );
        assert_eq!("first", fs::read_to_string(content.join("my-great-post.md"))?);

        let second = release_one(&drafts, content)?;
        assert_eq!(1, second.available);
        match second.outcome {
            Outcome::Released { to, renamed, .. } => {
                assert!(renamed);
                let name = to.file_name().unwrap().to_str().unwrap().to_owned();
                assert!(name.starts_with("my-great-post-"));
                assert!(name.ends_with(".md"));
                assert_eq!("my-great-post-".len() + 6 + ".md".len(), name.len());
                assert_eq!("second", fs::read_to_string(&to)?);
            }
            Outcome::NoDrafts => panic!("expected a release"),
        }
        assert_eq!("first", fs::read_to_string(content.join("my-great-post.md"))?);

        let third = release_one(&drafts, content)?;
        assert_eq!(Outcome::NoDrafts, third.outcome);
        Ok(())
    }
}
