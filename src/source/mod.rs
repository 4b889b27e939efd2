pub mod github;

pub use github::GitHubClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::platform::SourceBlob;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for the tarball of {git_ref}")]
    Status { status: u16, git_ref: String },

    #[error("GitHub redirected without a Location header for the tarball of {0}")]
    MissingLocation(String),

    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),
}

/// Answer to a HEAD request on the tarball endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarballLocation {
    pub status: u16,
    pub url: String,
}

/// A tarball the platform can fetch, pinned to the PR head commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    pub download_url: String,
    pub version: String,
}

impl From<SourceReference> for SourceBlob {
    fn from(source: SourceReference) -> Self {
        SourceBlob {
            url: source.download_url,
            version: source.version,
        }
    }
}

/// Source-control operations the reconciler needs.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Locate a downloadable snapshot of `git_ref` without downloading it.
    async fn resolve_tarball(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<TarballLocation, SourceError>;
}
