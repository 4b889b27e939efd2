use serde::{Deserialize, Serialize};

/// Lifecycle state of a review app as the platform reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAppStatus {
    Pending,
    Creating,
    Created,
    Deleting,
    Deleted,
    Errored,
    /// Any value this tool does not know about yet
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ReviewAppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReviewAppStatus::Pending => "pending",
            ReviewAppStatus::Creating => "creating",
            ReviewAppStatus::Created => "created",
            ReviewAppStatus::Deleting => "deleting",
            ReviewAppStatus::Deleted => "deleted",
            ReviewAppStatus::Errored => "errored",
            ReviewAppStatus::Other => "other",
        };
        f.write_str(s)
    }
}

/// A review app under a pipeline. Only the fields the reconciler reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewApp {
    pub id: String,
    /// Absent for review apps created from a branch rather than a PR
    #[serde(default)]
    pub pr_number: Option<u64>,
    pub status: ReviewAppStatus,
    #[serde(default)]
    pub branch: Option<String>,
    /// The app backing the review app, once the platform has provisioned it
    #[serde(default)]
    pub app: Option<AppRef>,
}

impl ReviewApp {
    /// Id of the app that builds should be posted to.
    pub fn build_target(&self) -> &str {
        self.app.as_ref().map_or(self.id.as_str(), |app| app.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: String,
}

/// Where the platform fetches the source tarball from, and which commit it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBlob {
    pub url: String,
    pub version: String,
}

/// Body of `POST /review-apps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReviewAppRequest {
    pub branch: String,
    pub pipeline: String,
    pub source_blob: SourceBlob,
    pub pr_number: u64,
}

/// Body of `POST /apps/{id}/builds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBuildRequest {
    pub source_blob: SourceBlob,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Build {
    pub id: String,
    #[serde(default)]
    pub status: String,
}
