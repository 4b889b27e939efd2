pub mod heroku;
pub mod types;

pub use heroku::HerokuClient;
pub use types::{
    Build, CreateBuildRequest, CreateReviewAppRequest, ReviewApp, ReviewAppStatus, SourceBlob,
};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Heroku API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Heroku API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Couldn't connect to Heroku, make sure the HEROKU_API_TOKEN is set")]
    MissingToken,

    #[error("Invalid Heroku API URL: {0}")]
    InvalidUrl(String),
}

/// The deployment platform operations the reconciler needs.
/// Each call is a single request; nothing here retries.
#[async_trait]
pub trait Platform: Send + Sync {
    /// All review apps under the pipeline, in the platform's order.
    async fn list_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>, PlatformError>;

    async fn create_review_app(
        &self,
        request: &CreateReviewAppRequest,
    ) -> Result<ReviewApp, PlatformError>;

    async fn create_build(
        &self,
        app_id: &str,
        request: &CreateBuildRequest,
    ) -> Result<Build, PlatformError>;

    async fn delete_review_app(&self, review_app_id: &str) -> Result<(), PlatformError>;
}
