//! Plugin manifest retrieval with a per-run cache.

use ahash::AHashMap;
use cs_core::manifest::{Manifest, ManifestError};
use cs_core::plugin::{PluginLocation, DEFAULT_PLUGIN_REF};
use cs_core::vcs::{VcsError, VersionControl};
use thiserror::Error;
use tracing::{debug, warn};

const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum ManifestFetchError {
    #[error("failed to fetch manifest for {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: VcsError,
    },

    #[error("manifest not found for {location}")]
    NotFound { location: String },

    #[error("manifest for {location} is not valid JSON: {message}")]
    Parse { location: String, message: String },

    #[error("{source} ({location})")]
    Invalid {
        location: String,
        #[source]
        source: ManifestError,
    },
}

/// Manifests already decoded during this run, keyed by
/// [`PluginLocation::cache_key`]. Only successful fetches are stored.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: AHashMap<String, Manifest>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, location: &PluginLocation) -> Option<&Manifest> {
        self.entries.get(&location.cache_key())
    }

    pub fn insert(&mut self, location: &PluginLocation, manifest: Manifest) {
        self.entries.insert(location.cache_key(), manifest);
    }

    pub fn contains(&self, location: &PluginLocation) -> bool {
        self.entries.contains_key(&location.cache_key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Manifests resolved for one configuration, in location order.
#[derive(Debug, Default)]
pub struct ResolvedManifests {
    pub manifests: Vec<Manifest>,
    /// Locations that could not be resolved. They are left out of
    /// `manifests` and never abort the run.
    pub warnings: Vec<ManifestFetchError>,
}

pub async fn resolve_manifests(
    vcs: &dyn VersionControl,
    locations: &[PluginLocation],
    cache: &mut ManifestCache,
) -> ResolvedManifests {
    let mut resolved = ResolvedManifests::default();

    for location in locations {
        if let Some(manifest) = cache.get(location) {
            debug!(%location, "manifest cache hit");
            resolved.manifests.push(manifest.clone());
            continue;
        }

        match fetch_manifest(vcs, location).await {
            Ok(manifest) => {
                cache.insert(location, manifest.clone());
                resolved.manifests.push(manifest);
            }
            Err(e) => {
                warn!(error = %e, "skipping plugin manifest");
                resolved.warnings.push(e);
            }
        }
    }

    resolved
}

pub async fn fetch_manifest(
    vcs: &dyn VersionControl,
    location: &PluginLocation,
) -> Result<Manifest, ManifestFetchError> {
    let name = location.to_string();
    let fetch_error = |source: VcsError| ManifestFetchError::Fetch {
        location: name.clone(),
        source,
    };

    let value = match location {
        PluginLocation::Url { url } => vcs.fetch_json(url).await.map_err(fetch_error)?,
        PluginLocation::Repo {
            owner,
            repo,
            git_ref,
        } => {
            let git_ref = git_ref.as_deref().unwrap_or(DEFAULT_PLUGIN_REF);
            let text = vcs
                .get_file_content(owner, repo, MANIFEST_FILE, Some(git_ref))
                .await
                .map_err(fetch_error)?
                .ok_or_else(|| ManifestFetchError::NotFound {
                    location: name.clone(),
                })?;
            serde_json::from_str(&text).map_err(|e| ManifestFetchError::Parse {
                location: name.clone(),
                message: e.to_string(),
            })?
        }
    };

    Manifest::decode(value).map_err(|source| ManifestFetchError::Invalid {
        location: name,
        source,
    })
}
