use tracing::{debug, info, instrument};

use crate::platform::{Platform, PlatformError, ReviewApp, ReviewAppStatus};
use crate::report::Reporter;

/// Result of looking up the review app for a PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Usable(ReviewApp),
    /// Present, but the platform gave up on it; not safe to build on.
    Errored(ReviewApp),
    Missing,
}

impl Located {
    /// The app, if it can take a new build.
    pub fn usable(self) -> Option<ReviewApp> {
        match self {
            Located::Usable(app) => Some(app),
            Located::Errored(_) | Located::Missing => None,
        }
    }

    /// The app regardless of its status.
    pub fn any(self) -> Option<ReviewApp> {
        match self {
            Located::Usable(app) | Located::Errored(app) => Some(app),
            Located::Missing => None,
        }
    }
}

/// Find the review app for `pr_number` under a pipeline.
///
/// Lists the pipeline's review apps (one page, as returned) and takes the
/// first whose PR number matches. Nothing is cached; every call re-lists.
/// An errored match is reported as a notice.
#[instrument(skip(platform, reporter))]
pub async fn locate(
    platform: &dyn Platform,
    reporter: &Reporter,
    pipeline_id: &str,
    pr_number: u64,
) -> Result<Located, PlatformError> {
    let apps = platform.list_review_apps(pipeline_id).await?;
    info!(count = apps.len(), "listed {} review apps", apps.len());

    debug!("finding review app for PR #{pr_number}");
    let located = select(apps, pr_number);
    match &located {
        Located::Usable(app) => info!(
            review_app = %app.id,
            status = %app.status,
            branch = ?app.branch,
            "found review app for PR #{pr_number}"
        ),
        Located::Errored(app) => reporter.notice(&format!(
            "Found review app {} for PR #{pr_number}, but status is \"{}\"",
            app.id, app.status
        )),
        Located::Missing => info!("no review app found for PR #{pr_number}"),
    }
    Ok(located)
}

/// First match in platform order wins.
pub fn select(apps: Vec<ReviewApp>, pr_number: u64) -> Located {
    match apps.into_iter().find(|app| app.pr_number == Some(pr_number)) {
        Some(app) if app.status == ReviewAppStatus::Errored => Located::Errored(app),
        Some(app) => Located::Usable(app),
        None => Located::Missing,
    }
}
