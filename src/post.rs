//! Defines the [`Post`] type, the mapping from a parsed source document into
//! a [`Post`], and the [`Parser`] which loads every published post from the
//! content directory.

use crate::frontmatter::{self, Frontmatter};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The extensions of post source files.
pub const SOURCE_EXTENSIONS: &[&str] = &["md", "txt"];

/// Represents a published post. Posts live for a single generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    /// The file name less its extension. It keys the post's URL and output
    /// path, so it must be unique within a run.
    pub slug: String,

    /// The post's title. Defaults to `slug`.
    pub title: String,

    /// A one-line summary; empty when absent.
    pub excerpt: String,

    /// The id of the post's [`crate::config::Cluster`], if any.
    pub cluster: Option<String>,

    /// Unique tags in the order they were first listed.
    pub tags: Vec<String>,

    /// A sortable `YYYY-MM-DD` date, if any.
    pub publish_on: Option<String>,

    /// The raw markdown body.
    pub body: String,
}

impl Post {
    /// Builds a post from its slug and parsed frontmatter and body.
    pub fn from_record(slug: &str, frontmatter: &Frontmatter, body: &str) -> Post {
        let mut tags: Vec<String> = Vec::new();
        for tag in frontmatter.list("tags").unwrap_or_default() {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        Post {
            slug: slug.to_owned(),
            title: frontmatter.text("title").unwrap_or(slug).to_owned(),
            excerpt: frontmatter.text("excerpt").unwrap_or_default().to_owned(),
            cluster: frontmatter.text("cluster").map(str::to_owned),
            tags,
            publish_on: frontmatter.text("publish_on").map(str::to_owned),
            body: body.to_owned(),
        }
    }

    /// Parses a post from the full contents of its source file.
    pub fn from_source(slug: &str, input: &str) -> Post {
        let record = frontmatter::parse(input);
        Post::from_record(slug, &record.frontmatter, record.body)
    }

    /// The post's file name in the posts output directory.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Orders posts newest first. Undated posts come after every dated post and
/// ties are broken by slug so the order never depends on directory order.
pub fn by_recency(a: &Post, b: &Post) -> Ordering {
    b.publish_on
        .cmp(&a.publish_on)
        .then_with(|| a.slug.cmp(&b.slug))
}

/// Loads [`Post`]s from a content directory.
pub struct Parser<'a> {
    /// The directory holding the published source files. Only its direct
    /// children are read, so the drafts subdirectory is never picked up.
    source_directory: &'a Path,
}

impl<'a> Parser<'a> {
    pub fn new(source_directory: &'a Path) -> Parser<'a> {
        Parser { source_directory }
    }

    /// Reads every `.md` and `.txt` file directly under the source
    /// directory and returns the posts ordered by [`by_recency`].
    pub fn parse_posts(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(self.source_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }
            posts.push(self.parse_post(entry.path())?);
        }

        posts.sort_by(by_recency);
        Ok(posts)
    }

    fn parse_post(&self, path: &Path) -> Result<Post> {
        match Self::_parse_post(path) {
            Ok(post) => Ok(post),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(path: &Path) -> Result<Post> {
        let slug = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| InvalidFileNameError(path.to_owned()))?;
        let contents = std::fs::read_to_string(path)?;
        Ok(Post::from_source(slug, &contents))
    }
}

fn is_source_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => SOURCE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {}

/// Represents the result of a [`Post`]-loading operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading [`Post`]s. Malformed frontmatter is never an
/// error; only the file system can fail.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors reading a source file.
    Io(std::io::Error),

    /// Returned for errors walking the content directory.
    WalkDir(walkdir::Error),

    /// Returned when a source file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the content directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
pub(crate) fn test_post(
    slug: &str,
    cluster: Option<&str>,
    tags: &[&str],
    publish_on: Option<&str>,
) -> Post {
    Post {
        slug: slug.to_owned(),
        title: slug.to_uppercase(),
        excerpt: String::new(),
        cluster: cluster.map(str::to_owned),
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        publish_on: publish_on.map(str::to_owned),
        body: String::new(),
    }
}
