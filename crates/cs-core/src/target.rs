use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TargetKind
// ---------------------------------------------------------------------------

/// Which configuration file a [`Target`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Default target pointing at the main config path.
    Main,
    /// Dev config path, either in the originating repo or a default target.
    Dev,
    /// Main config path in the originating repository.
    Config,
    /// Config file found in the organization's config repository.
    OrgConfig,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Main => write!(f, "main"),
            TargetKind::Dev => write!(f, "dev"),
            TargetKind::Config => write!(f, "config"),
            TargetKind::OrgConfig => write!(f, "org-config"),
        }
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// A configuration file in a specific repository that may be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub owner: String,
    pub repo: String,
    /// Local checkout hint (`owner/repo`).
    pub local_dir: PathBuf,
    pub url: String,
    pub file_path: String,
    pub readonly: bool,
}

impl Target {
    /// Build a target whose URL is the canonical `https://github.com/{owner}/{repo}.git`.
    pub fn new(
        kind: TargetKind,
        owner: impl Into<String>,
        repo: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        Self {
            kind,
            url: format!("https://github.com/{owner}/{repo}.git"),
            local_dir: PathBuf::from(&owner).join(&repo),
            owner,
            repo,
            file_path: file_path.into(),
            readonly: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Identity key: `owner/repo/kind`.
    pub fn id(&self) -> String {
        format!("{}/{}/{}", self.owner, self.repo, self.kind)
    }
}

// ---------------------------------------------------------------------------
// TargetMap
// ---------------------------------------------------------------------------

/// Insertion-ordered set of targets keyed by [`Target::id`].
///
/// Inserting a target whose id is already present replaces the existing
/// entry in place, so each `(owner, repo, kind)` appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetMap {
    entries: Vec<Target>,
}

impl TargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the replaced target, if any.
    pub fn insert(&mut self, target: Target) -> Option<Target> {
        let id = target.id();
        match self.entries.iter_mut().find(|t| t.id() == id) {
            Some(existing) => Some(std::mem::replace(existing, target)),
            None => {
                self.entries.push(target);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Target> {
        self.entries.iter().find(|t| t.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter()
    }

    /// Targets the acting user may edit.
    pub fn writable(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter().filter(|t| !t.readonly)
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(Target::id).collect()
    }
}

impl<'a> IntoIterator for &'a TargetMap {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Target> for TargetMap {
    fn from_iter<I: IntoIterator<Item = Target>>(iter: I) -> Self {
        let mut map = TargetMap::new();
        for target in iter {
            map.insert(target);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// GitHub URL parsing
// ---------------------------------------------------------------------------

fn github_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"github\.com/([^/]+)/([^/]+?)(?:\.git)?$").expect("static regex is valid")
    })
}

/// Extract `(owner, repo)` from a `github.com/{owner}/{repo}[.git]` URL.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let caps = github_url_pattern().captures(url.trim())?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
