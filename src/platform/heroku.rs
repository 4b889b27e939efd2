use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, Response, Url};
use tracing::{debug, instrument};

use super::types::{Build, CreateBuildRequest, CreateReviewAppRequest, ReviewApp};
use super::{Platform, PlatformError};
use crate::config::Config;

const HEROKU_ACCEPT: &str = "application/vnd.heroku+json; version=3";
const AGENT: &str = concat!("review-apps/", env!("CARGO_PKG_VERSION"));

/// Heroku Platform API v3 client.
pub struct HerokuClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl HerokuClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, PlatformError> {
        let base_url =
            Url::parse(base_url).map_err(|_| PlatformError::InvalidUrl(base_url.to_string()))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: token.to_string(),
        })
    }

    /// Build a client from config, failing when no API token is available.
    pub fn from_config(config: &Config) -> Result<Self, PlatformError> {
        let token = config.heroku_token().ok_or(PlatformError::MissingToken)?;
        Self::new(config.heroku_api_url(), token)
    }

    /// Append path segments to the base URL; ids are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PlatformError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PlatformError> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, HEROKU_ACCEPT)
            .header(USER_AGENT, AGENT)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Platform for HerokuClient {
    #[instrument(skip(self))]
    async fn list_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>, PlatformError> {
        let url = self.endpoint(&["pipelines", pipeline_id, "review-apps"])?;
        debug!(%url, "listing review apps");
        let apps = self
            .send(self.client.get(url))
            .await?
            .json::<Vec<ReviewApp>>()
            .await?;
        Ok(apps)
    }

    #[instrument(skip(self, request), fields(pipeline = %request.pipeline, pr = request.pr_number))]
    async fn create_review_app(
        &self,
        request: &CreateReviewAppRequest,
    ) -> Result<ReviewApp, PlatformError> {
        let app = self
            .send(self.client.post(self.endpoint(&["review-apps"])?).json(request))
            .await?
            .json::<ReviewApp>()
            .await?;
        debug!(review_app = %app.id, status = %app.status, "platform accepted review app");
        Ok(app)
    }

    #[instrument(skip(self, request))]
    async fn create_build(
        &self,
        app_id: &str,
        request: &CreateBuildRequest,
    ) -> Result<Build, PlatformError> {
        let build = self
            .send(
                self.client
                    .post(self.endpoint(&["apps", app_id, "builds"])?)
                    .json(request),
            )
            .await?
            .json::<Build>()
            .await?;
        debug!(build = %build.id, status = %build.status, "platform accepted build");
        Ok(build)
    }

    #[instrument(skip(self))]
    async fn delete_review_app(&self, review_app_id: &str) -> Result<(), PlatformError> {
        let url = self.endpoint(&["review-apps", review_app_id])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
