pub mod locate;

pub use locate::{locate, Located};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::context::{Action, RequestContext};
use crate::platform::{CreateBuildRequest, CreateReviewAppRequest, Platform, PlatformError};
use crate::report::{Outcome, Reporter};
use crate::source::{SourceControl, SourceError, SourceReference};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Couldn't connect to GitHub, make sure the GITHUB_TOKEN secret is set")]
    MissingSourceToken,

    #[error("No review app found for PR #{pr_number}; create one before updating")]
    NoReviewApp { pr_number: u64 },

    #[error("Review app {review_app_id} for PR #{pr_number} is errored; not building on it")]
    ErroredReviewApp {
        pr_number: u64,
        review_app_id: String,
    },
}

/// Drives one requested action against the platform for one PR.
///
/// Holds borrowed handles only. `source` is `None` when no GitHub token was
/// configured; create and update refuse to run without it.
pub struct Reconciler<'a> {
    context: &'a RequestContext,
    platform: &'a dyn Platform,
    source: Option<&'a dyn SourceControl>,
    reporter: &'a Reporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        context: &'a RequestContext,
        platform: &'a dyn Platform,
        source: Option<&'a dyn SourceControl>,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            context,
            platform,
            source,
            reporter,
        }
    }

    /// Perform the requested action. Never fails: errors are reported here
    /// and come back as `Outcome::Failed`.
    #[instrument(skip(self), fields(action = %self.context.action, pr = self.context.pr_number))]
    pub async fn reconcile(&self) -> Outcome {
        let result = match &self.context.action {
            Action::Create => self.create().await,
            Action::Update => self.update().await,
            Action::Destroy => self.destroy().await,
            Action::Unknown(raw) => {
                debug!(
                    action = %raw,
                    "Invalid action, no action was performed, use one of 'create', 'update' or 'destroy'"
                );
                return Outcome::Ignored {
                    action: raw.clone(),
                };
            }
        };

        result.unwrap_or_else(|err| {
            self.reporter.error(
                &format!("Failed to {} review app", self.context.action),
                Some(&err),
            );
            Outcome::Failed(err)
        })
    }

    async fn destroy(&self) -> Result<Outcome, ReconcileError> {
        info!("fetching review apps list");
        let located = locate(
            self.platform,
            self.reporter,
            &self.context.pipeline_id,
            self.context.pr_number,
        )
        .await?;

        // Errored apps are still torn down.
        let Some(app) = located.any() else {
            return Ok(Outcome::NothingToDestroy);
        };

        info!(review_app = %app.id, "destroying review app");
        self.platform.delete_review_app(&app.id).await?;
        info!(review_app = %app.id, "review app destroyed");
        Ok(Outcome::Destroyed {
            review_app_id: app.id,
        })
    }

    /// No check for an existing review app: the platform decides what a
    /// second create for the same PR means.
    async fn create(&self) -> Result<Outcome, ReconcileError> {
        let source = self.source_control()?;
        let reference = self.resolve_source(source).await?;

        let request = CreateReviewAppRequest {
            branch: self.context.branch_ref.clone(),
            pipeline: self.context.pipeline_id.clone(),
            source_blob: reference.into(),
            pr_number: self.context.pr_number,
        };

        info!("creating review app");
        debug!(payload = %serde_json::to_string(&request).unwrap_or_default(), "review app request");
        let app = self.platform.create_review_app(&request).await?;
        info!(review_app = %app.id, status = %app.status, "review app created");

        Ok(Outcome::Created {
            review_app_id: app.id,
        })
    }

    /// Builds only on a review app that exists and is not errored.
    async fn update(&self) -> Result<Outcome, ReconcileError> {
        let source = self.source_control()?;

        let pr_number = self.context.pr_number;
        let located = locate(
            self.platform,
            self.reporter,
            &self.context.pipeline_id,
            pr_number,
        )
        .await?;
        if let Located::Errored(app) = &located {
            return Err(ReconcileError::ErroredReviewApp {
                pr_number,
                review_app_id: app.id.clone(),
            });
        }
        let app = located
            .usable()
            .ok_or(ReconcileError::NoReviewApp { pr_number })?;

        let reference = self.resolve_source(source).await?;
        let request = CreateBuildRequest {
            source_blob: reference.into(),
        };
        let target = app.build_target();

        info!(review_app = %app.id, app = %target, "updating review app");
        debug!(payload = %serde_json::to_string(&request).unwrap_or_default(), "build request");
        let build = self.platform.create_build(target, &request).await?;
        info!(build = %build.id, status = %build.status, "review app updated");

        Ok(Outcome::Updated {
            app_id: target.to_string(),
            build_id: build.id,
        })
    }

    fn source_control(&self) -> Result<&'a dyn SourceControl, ReconcileError> {
        self.source.ok_or(ReconcileError::MissingSourceToken)
    }

    async fn resolve_source(
        &self,
        source: &dyn SourceControl,
    ) -> Result<SourceReference, ReconcileError> {
        let ctx = self.context;
        let location = source
            .resolve_tarball(&ctx.repo_owner, &ctx.repo_name, &ctx.branch_ref)
            .await?;
        debug!(status = location.status, url = %location.url, "tarball resolved");

        Ok(SourceReference {
            download_url: location.url,
            version: ctx.commit_sha.clone(),
        })
    }
}
