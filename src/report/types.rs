use crate::reconcile::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationLevel {
    Notice,
    Error,
}

impl AnnotationLevel {
    /// Workflow command name understood by the Actions runner.
    pub fn command(self) -> &'static str {
        match self {
            AnnotationLevel::Notice => "notice",
            AnnotationLevel::Error => "error",
        }
    }
}

/// A notice or error as it was reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub level: AnnotationLevel,
    pub message: String,
}

/// How a run ended. Exactly one per invocation.
#[derive(Debug)]
pub enum Outcome {
    /// PR comes from a fork; nothing was attempted
    SkippedFork,
    /// The action input was not one we act on
    Ignored { action: String },
    Created { review_app_id: String },
    Updated { app_id: String, build_id: String },
    Destroyed { review_app_id: String },
    /// Destroy found no review app for the PR
    NothingToDestroy,
    Failed(ReconcileError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::SkippedFork => write!(f, "skipped: PR comes from a fork"),
            Outcome::Ignored { action } => write!(f, "no action performed for {action:?}"),
            Outcome::Created { review_app_id } => write!(f, "review app {review_app_id} created"),
            Outcome::Updated { app_id, build_id } => {
                write!(f, "build {build_id} started on app {app_id}")
            }
            Outcome::Destroyed { review_app_id } => {
                write!(f, "review app {review_app_id} destroyed")
            }
            Outcome::NothingToDestroy => write!(f, "no review app to destroy"),
            Outcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}
