use std::fmt;

use serde::{Deserialize, Serialize};

/// Ref used for repository locations that do not pin one.
pub const DEFAULT_PLUGIN_REF: &str = "main";

/// Where a plugin's manifest can be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginLocation {
    /// Manifest served at a literal URL.
    Url { url: String },
    /// `manifest.json` at the root of a repository.
    Repo {
        owner: String,
        repo: String,
        git_ref: Option<String>,
    },
}

impl PluginLocation {
    pub fn url(url: impl Into<String>) -> Self {
        PluginLocation::Url { url: url.into() }
    }

    pub fn repo(owner: impl Into<String>, repo: impl Into<String>, git_ref: Option<&str>) -> Self {
        PluginLocation::Repo {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: git_ref.map(str::to_string),
        }
    }

    /// Stable manifest cache key: the URL itself, or `owner/repo/ref`.
    pub fn cache_key(&self) -> String {
        match self {
            PluginLocation::Url { url } => url.clone(),
            PluginLocation::Repo {
                owner,
                repo,
                git_ref,
            } => format!(
                "{owner}/{repo}/{}",
                git_ref.as_deref().unwrap_or(DEFAULT_PLUGIN_REF)
            ),
        }
    }

    /// Parse the `plugin` field of a `uses` entry.
    ///
    /// `http...` values point at a deployed plugin and resolve to its
    /// `/manifest.json`. Everything else must look like `owner/repo[@ref]`.
    pub fn from_plugin_reference(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.starts_with("http") {
            let base = reference.trim_end_matches('/');
            return Some(PluginLocation::url(format!("{base}/manifest.json")));
        }

        let mut parts = reference.split('/');
        let owner = parts.next()?;
        let repo_and_ref = parts.next()?;
        let mut split = repo_and_ref.splitn(2, '@');
        let repo = split.next()?;
        let git_ref = split.next().filter(|r| !r.is_empty());

        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(PluginLocation::repo(owner, repo, git_ref))
    }
}

impl fmt::Display for PluginLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginLocation::Url { url } => write!(f, "{url}"),
            PluginLocation::Repo { .. } => write!(f, "{}", self.cache_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_reference_with_ref() {
        let loc = PluginLocation::from_plugin_reference("acme/daemon-pricing@v2").unwrap();
        assert_eq!(loc, PluginLocation::repo("acme", "daemon-pricing", Some("v2")));
        assert_eq!(loc.cache_key(), "acme/daemon-pricing/v2");
    }

    #[test]
    fn repo_reference_defaults_to_main_key() {
        let loc = PluginLocation::from_plugin_reference("acme/daemon-pricing").unwrap();
        assert_eq!(loc, PluginLocation::repo("acme", "daemon-pricing", None));
        assert_eq!(loc.cache_key(), "acme/daemon-pricing/main");
    }

    #[test]
    fn http_reference_appends_manifest_path() {
        let loc = PluginLocation::from_plugin_reference("https://plugin.example.dev").unwrap();
        assert_eq!(
            loc,
            PluginLocation::url("https://plugin.example.dev/manifest.json")
        );
    }

    #[test]
    fn malformed_reference_is_dropped() {
        assert!(PluginLocation::from_plugin_reference("just-a-name").is_none());
        assert!(PluginLocation::from_plugin_reference("/repo").is_none());
        assert!(PluginLocation::from_plugin_reference("owner/").is_none());
        assert!(PluginLocation::from_plugin_reference("").is_none());
    }
}
