pub mod types;

pub use types::{Action, EventPayload, Inputs, RequestContext};

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to read event payload: {0}")]
    EventRead(#[from] std::io::Error),

    #[error("Failed to parse event payload: {0}")]
    EventParse(#[from] serde_json::Error),

    #[error("Event path not set; GITHUB_EVENT_PATH is provided by the Actions runner")]
    MissingEventPath,

    #[error("Event payload has no pull_request; run this on pull_request events")]
    NotPullRequest,

    #[error("Repository owner/name not found in the payload or GITHUB_REPOSITORY")]
    MissingRepository,

    #[error("Pipeline id not set, make sure HEROKU_PIPELINE_ID is set")]
    MissingPipeline,
}

/// Read and parse the webhook payload the runner wrote to disk.
pub fn load_event(path: &Path) -> Result<EventPayload, ContextError> {
    let contents = std::fs::read_to_string(path)?;
    parse_event(&contents)
}

pub fn parse_event(json: &str) -> Result<EventPayload, ContextError> {
    Ok(serde_json::from_str(json)?)
}

/// Turn the event payload and workflow inputs into a `RequestContext`.
///
/// Returns `Ok(None)` for PRs from forks: their code is untrusted and must
/// never reach deployment credentials. That check runs before any other
/// validation so a fork run stays a quiet no-op even when config is incomplete.
#[instrument(skip_all)]
pub fn extract(
    event: &EventPayload,
    inputs: &Inputs,
) -> Result<Option<RequestContext>, ContextError> {
    let pr = event.pull_request.as_ref().ok_or(ContextError::NotPullRequest)?;

    // A deleted head repository can only belong to a fork.
    let is_fork = pr.head.repo.as_ref().map_or(true, |repo| repo.fork);
    if is_fork {
        info!("PRs from forked repos can't trigger this action");
        return Ok(None);
    }

    let (repo_owner, repo_name) = match &event.repository {
        Some(repo) => (repo.owner.login.clone(), repo.name.clone()),
        None => inputs
            .repository
            .as_deref()
            .and_then(|full| full.split_once('/'))
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
            .map(|(owner, name)| (owner.to_string(), name.to_string()))
            .ok_or(ContextError::MissingRepository)?,
    };

    let pipeline_id = inputs
        .pipeline_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ContextError::MissingPipeline)?
        .to_string();

    let context = RequestContext {
        pr_number: pr.number,
        branch_ref: pr.head.git_ref.clone(),
        commit_sha: pr.head.sha.clone(),
        is_fork,
        repo_owner,
        repo_name,
        pipeline_id,
        action: Action::parse(&inputs.action),
    };

    debug!(
        context = %serde_json::to_string(&context).unwrap_or_default(),
        "extracted request context"
    );
    Ok(Some(context))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = include_str!("../../tests/fixtures/pull_request_event.json");
    const FORK_EVENT: &str = include_str!("../../tests/fixtures/fork_pull_request_event.json");

    fn inputs(action: &str) -> Inputs {
        Inputs {
            action: action.to_string(),
            pipeline_id: Some("pipe-1".to_string()),
            repository: None,
        }
    }

    #[test]
    fn test_extract_from_fixture() {
        let event = parse_event(EVENT).unwrap();
        let ctx = extract(&event, &inputs("create")).unwrap().unwrap();
        assert_eq!(ctx.pr_number, 7);
        assert_eq!(ctx.branch_ref, "feature/checkout");
        assert_eq!(ctx.commit_sha, "abc123");
        assert!(!ctx.is_fork);
        assert_eq!(ctx.repo_owner, "acme");
        assert_eq!(ctx.repo_name, "storefront");
        assert_eq!(ctx.pipeline_id, "pipe-1");
        assert_eq!(ctx.action, Action::Create);
    }

    #[test]
    fn test_fork_stops_early() {
        let event = parse_event(FORK_EVENT).unwrap();
        assert!(extract(&event, &inputs("create")).unwrap().is_none());
    }

    #[test]
    fn test_fork_stops_before_pipeline_check() {
        let event = parse_event(FORK_EVENT).unwrap();
        let no_pipeline = Inputs {
            action: "destroy".to_string(),
            ..Inputs::default()
        };
        assert!(extract(&event, &no_pipeline).unwrap().is_none());
    }

    #[test]
    fn test_deleted_head_repo_treated_as_fork() {
        let json = r#"{
            "pull_request": {"number": 3, "head": {"ref": "x", "sha": "y", "repo": null}},
            "repository": {"name": "r", "owner": {"login": "o"}}
        }"#;
        let event = parse_event(json).unwrap();
        assert!(extract(&event, &inputs("update")).unwrap().is_none());
    }

    #[test]
    fn test_missing_pull_request() {
        let event = parse_event(r#"{"ref": "refs/heads/main"}"#).unwrap();
        assert!(matches!(
            extract(&event, &inputs("create")),
            Err(ContextError::NotPullRequest)
        ));
    }

    #[test]
    fn test_missing_pipeline() {
        let event = parse_event(EVENT).unwrap();
        let blank = Inputs {
            action: "create".to_string(),
            pipeline_id: Some("  ".to_string()),
            repository: None,
        };
        assert!(matches!(
            extract(&event, &blank),
            Err(ContextError::MissingPipeline)
        ));
    }

    #[test]
    fn test_repository_falls_back_to_env_value() {
        let json = r#"{"pull_request": {"number": 5, "head": {"ref": "b", "sha": "s", "repo": {"fork": false}}}}"#;
        let event = parse_event(json).unwrap();
        let mut with_repo = inputs("destroy");
        with_repo.repository = Some("acme/widgets".to_string());
        let ctx = extract(&event, &with_repo).unwrap().unwrap();
        assert_eq!(ctx.repo_owner, "acme");
        assert_eq!(ctx.repo_name, "widgets");

        assert!(matches!(
            extract(&event, &inputs("destroy")),
            Err(ContextError::MissingRepository)
        ));
    }

    #[test]
    fn test_unknown_action_is_kept() {
        let event = parse_event(EVENT).unwrap();
        let ctx = extract(&event, &inputs("redeploy")).unwrap().unwrap();
        assert_eq!(ctx.action, Action::Unknown("redeploy".to_string()));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_event("{"), Err(ContextError::EventParse(_))));
    }
}
