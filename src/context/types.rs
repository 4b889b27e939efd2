use serde::{Deserialize, Serialize};

/// The lifecycle step requested by the workflow's `action` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Destroy,
    /// Anything else, kept verbatim for the log line.
    Unknown(String),
}

impl Action {
    pub fn parse(raw: &str) -> Action {
        match raw.trim() {
            "create" => Action::Create,
            "update" => Action::Update,
            "destroy" => Action::Destroy,
            other => Action::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Destroy => write!(f, "destroy"),
            Action::Unknown(raw) => write!(f, "unknown({raw:?})"),
        }
    }
}

/// Everything one run knows about the triggering pull request.
/// Built once by `context::extract` and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    pub pr_number: u64,
    /// Head branch name (e.g., "feature/checkout")
    pub branch_ref: String,
    /// Head commit; becomes the source blob version
    pub commit_sha: String,
    pub is_fork: bool,
    /// Base repository owner
    pub repo_owner: String,
    /// Base repository name
    pub repo_name: String,
    pub pipeline_id: String,
    pub action: Action,
}

/// Values that come from the workflow rather than the event payload.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// Raw `action` input
    pub action: String,
    pub pipeline_id: Option<String>,
    /// `owner/name` from GITHUB_REPOSITORY, used when the payload lacks `repository`
    pub repository: Option<String>,
}

/// The subset of a `pull_request` webhook payload this tool reads.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub pull_request: Option<PullRequestEvent>,
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    pub head: Head,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Head {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
    /// `null` when the fork behind the PR has been deleted
    pub repo: Option<HeadRepo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadRepo {
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("create"), Action::Create);
        assert_eq!(Action::parse(" update\n"), Action::Update);
        assert_eq!(Action::parse("destroy"), Action::Destroy);
        assert_eq!(Action::parse("Destroy"), Action::Unknown("Destroy".to_string()));
        assert_eq!(Action::parse(""), Action::Unknown(String::new()));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Create.to_string(), "create");
        assert_eq!(Action::Unknown("redeploy".into()).to_string(), "unknown(\"redeploy\")");
    }

    #[test]
    fn test_head_ref_rename() {
        let head: Head =
            serde_json::from_str(r#"{"ref": "main", "sha": "abc", "repo": null}"#).unwrap();
        assert_eq!(head.git_ref, "main");
        assert!(head.repo.is_none());
    }
}
