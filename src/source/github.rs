use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Url;
use tracing::{debug, instrument};

use super::{SourceControl, SourceError, TarballLocation};

const AGENT: &str = concat!("review-apps/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client, limited to tarball resolution.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl GitHubClient {
    /// Redirects are not followed: the redirect target is the answer, and
    /// following it would start the download the platform is meant to do.
    pub fn new(base_url: &str, token: &str) -> Result<Self, SourceError> {
        let base_url =
            Url::parse(base_url).map_err(|_| SourceError::InvalidUrl(base_url.to_string()))?;
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    /// A ref like `feature/x#1` becomes the single segment `feature%2Fx%231`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    #[instrument(skip(self))]
    async fn resolve_tarball(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<TarballLocation, SourceError> {
        let url = self.endpoint(&["repos", owner, repo, "tarball", git_ref])?;
        debug!(%url, "resolving tarball location");

        let response = self
            .client
            .head(url)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        let location = if status.is_redirection() {
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| SourceError::MissingLocation(git_ref.to_string()))?
        } else if status.is_success() {
            response.url().to_string()
        } else {
            return Err(SourceError::Status {
                status: status.as_u16(),
                git_ref: git_ref.to_string(),
            });
        };

        debug!(status = status.as_u16(), location = %location, "resolved tarball");
        Ok(TarballLocation {
            status: status.as_u16(),
            url: location,
        })
    }
}
