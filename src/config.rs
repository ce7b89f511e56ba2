//! Loads the project configuration. A project is a directory containing a
//! `cairn.yaml` file; [`Config::from_directory`] searches upward from a
//! starting directory the same way `git` finds its repository root.

use crate::html;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "cairn.yaml";

/// A fixed topical grouping of posts. Posts refer to clusters by `id`; the
/// cluster's landing page lives at `/pillars/{pillar_slug}/index.html`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub pillar_slug: String,
}

impl Cluster {
    fn new(id: &str, name: &str) -> Cluster {
        Cluster {
            id: id.to_owned(),
            name: name.to_owned(),
            pillar_slug: id.to_owned(),
        }
    }
}

/// The five clusters used when the project file doesn't list its own.
pub fn default_clusters() -> Vec<Cluster> {
    vec![
        Cluster::new("virtual-events-os", "Virtual Events OS"),
        Cluster::new("agency-execution", "Agency Execution Systems"),
        Cluster::new(
            "brand-growth-infrastructure",
            "Brand & Growth Infrastructure",
        ),
        Cluster::new("ai-agentic-operations", "AI & Agentic Operations"),
        Cluster::new("operator-leverage", "Operator & Founder Leverage"),
    ]
}

fn default_site_name() -> String {
    String::from("West Peek Productions")
}

fn default_contact_email() -> String {
    String::from("scooter@westpeek.ventures")
}

fn default_content_directory() -> PathBuf {
    PathBuf::from("content/insights")
}

/// The absolute URL every generated link hangs off of. Its path always ends
/// in `/`, so `https://example.com/blog` and `https://example.com/blog/` name
/// the same base, and URLs that can't carry a path (`mailto:`, `data:`) are
/// rejected when the project file is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Url")]
pub struct SiteBase(Url);

impl SiteBase {
    pub fn parse(input: &str) -> Result<SiteBase> {
        SiteBase::try_from(Url::parse(input)?)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Appends a root-relative path (e.g. `insights/index.html`) to the base.
    /// Each `/`-separated part becomes one path segment, so characters like
    /// `?` or `#` in a slug are percent-encoded instead of starting a query.
    pub fn join(&self, path: &str) -> Url {
        let mut url = self.0.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}

impl TryFrom<Url> for SiteBase {
    type Error = anyhow::Error;

    fn try_from(mut url: Url) -> Result<SiteBase> {
        if url.cannot_be_a_base() {
            return Err(anyhow!("`{}` can't be used as a site base URL", url));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(SiteBase(url))
    }
}

#[derive(Deserialize)]
struct Project {
    site_base: SiteBase,

    #[serde(default = "default_site_name")]
    site_name: String,

    #[serde(default = "default_contact_email")]
    contact_email: String,

    #[serde(default = "default_content_directory")]
    content_directory: PathBuf,

    #[serde(default = "default_clusters")]
    clusters: Vec<Cluster>,
}

/// Read-only site settings shared by every page of a run. Built by
/// [`Config::site`], which loads the shared footer.
#[derive(Clone, Debug)]
pub struct Site {
    pub base: SiteBase,

    /// The brand name shown in the header and page titles.
    pub name: String,

    /// The address used by call-to-action blocks.
    pub contact_email: String,

    pub clusters: Vec<Cluster>,

    /// The footer markup shared by every generated page.
    pub footer: String,
}

impl Site {
    pub fn new(
        base: SiteBase,
        name: String,
        contact_email: String,
        clusters: Vec<Cluster>,
        footer: String,
    ) -> Site {
        Site {
            base,
            name,
            contact_email,
            clusters,
            footer,
        }
    }

    /// Returns the cluster whose `id` matches, if any. An unknown id is
    /// treated the same as no cluster.
    pub fn cluster(&self, id: Option<&str>) -> Option<&Cluster> {
        let id = id?;
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Joins a root-relative path (e.g. `insights/index.html`) onto the base
    /// URL.
    pub fn url(&self, path: &str) -> Url {
        self.base.join(path)
    }
}

/// Everything a run needs: the site settings plus the input and output
/// locations.
#[derive(Clone, Debug)]
pub struct Config {
    pub site_base: SiteBase,

    pub site_name: String,

    pub contact_email: String,

    pub clusters: Vec<Cluster>,

    /// The directory holding published source files.
    pub content_directory: PathBuf,

    /// The holding area for unreleased drafts. Never read by a build.
    pub drafts_directory: PathBuf,

    /// The site root; all output paths hang off of it.
    pub root_output_directory: PathBuf,

    /// Where post pages and the posts index are written.
    pub posts_output_directory: PathBuf,

    /// Where the pillars index and the cluster landing pages are written.
    pub pillars_output_directory: PathBuf,

    pub sitemap_path: PathBuf,

    /// The `llms.txt` discovery document.
    pub discovery_path: PathBuf,

    /// The existing page whose footer is reused on every generated page.
    pub footer_source: PathBuf,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::new(project_root, project)),
        }
    }

    fn new(project_root: &Path, project: Project) -> Config {
        let content_directory = project_root.join(&project.content_directory);
        Config {
            site_base: project.site_base,
            site_name: project.site_name,
            contact_email: project.contact_email,
            clusters: project.clusters,
            drafts_directory: content_directory.join("_drafts"),
            content_directory,
            root_output_directory: project_root.to_owned(),
            posts_output_directory: project_root.join("insights"),
            pillars_output_directory: project_root.join("pillars"),
            sitemap_path: project_root.join("sitemap.xml"),
            discovery_path: project_root.join("llms.txt"),
            footer_source: project_root.join("index.html"),
        }
    }

    /// Builds the [`Site`] for a run, reading the shared footer from
    /// [`Config::footer_source`] (or falling back to a minimal one).
    pub fn site(&self) -> Site {
        Site::new(
            self.site_base.clone(),
            self.site_name.clone(),
            self.contact_email.clone(),
            self.clusters.clone(),
            html::load_footer(&self.footer_source, &self.contact_email),
        )
    }
}

#[cfg(test)]
pub(crate) fn test_site() -> Site {
    Site::new(
        SiteBase::parse("https://example.com").unwrap(),
        default_site_name(),
        default_contact_email(),
        default_clusters(),
        String::from("<footer>test footer</footer>"),
    )
}
