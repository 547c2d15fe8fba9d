use std::process::Command;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

const TOKEN_ENV: &str = "BQPAGER_ACCESS_TOKEN";
const PROJECT_ENVS: [&str; 2] = ["BQPAGER_PROJECT", "GOOGLE_CLOUD_PROJECT"];

const EMPTY_TOKEN: &str = "gcloud returned an empty access token; run `gcloud auth login`";
const NO_PROJECT: &str =
    "no project id configured; pass --project or run `gcloud config set project`";
const NO_SDK: &str = "is the Cloud SDK installed?";

/// Bearer token plus the project that will run the query.
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub project_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Project ids known before discovery.
#[derive(Debug, Clone, Default)]
pub struct ProjectHint {
    /// From the command line; wins over everything.
    pub explicit: Option<String>,
    /// From the config file; used when no environment variable is set.
    pub configured: Option<String>,
}

/// Resolves the access token and project id.
///
/// Token: `BQPAGER_ACCESS_TOKEN`, else `gcloud auth print-access-token`.
/// Project: explicit hint, `BQPAGER_PROJECT`, `GOOGLE_CLOUD_PROJECT`,
/// configured hint, then the active gcloud configuration.
pub fn resolve_credentials_and_project(hint: &ProjectHint) -> Result<Credentials> {
    let access_token = resolve_access_token()?;
    info!("finished resolving credentials");

    let project_id = resolve_project_id(hint, |name| std::env::var(name).ok())?;
    info!(project_id = %project_id, "resolved project id");

    Ok(Credentials {
        access_token,
        project_id,
    })
}

fn resolve_access_token() -> Result<String> {
    if let Some(token) = non_empty(std::env::var(TOKEN_ENV).ok()) {
        debug!("using access token from {}", TOKEN_ENV);
        return Ok(token);
    }

    let output = run_gcloud(&["auth", "print-access-token"])?;
    non_empty(Some(output)).ok_or_else(|| Error::Auth(EMPTY_TOKEN.to_string()))
}

fn resolve_project_id(
    hint: &ProjectHint,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(project) = non_empty(hint.explicit.clone()) {
        return Ok(project);
    }
    for name in PROJECT_ENVS {
        if let Some(project) = non_empty(env(name)) {
            debug!("using project from {}", name);
            return Ok(project);
        }
    }
    if let Some(project) = non_empty(hint.configured.clone()) {
        return Ok(project);
    }

    let output = run_gcloud(&["-q", "config", "list", "core/project", "--format=json"])?;
    let project = parse_gcloud_project(&output)?;
    info!("finished retrieving project id from gcloud");
    Ok(project)
}

#[derive(Deserialize)]
struct GcloudConfig {
    #[serde(default)]
    core: Option<GcloudCore>,
}

#[derive(Deserialize)]
struct GcloudCore {
    #[serde(default)]
    project: Option<String>,
}

/// Extracts `core.project` from `gcloud config list --format=json` output.
pub fn parse_gcloud_project(json: &str) -> Result<String> {
    let config: GcloudConfig = serde_json::from_str(json)?;
    config
        .core
        .and_then(|core| non_empty(core.project))
        .ok_or_else(|| Error::Auth(NO_PROJECT.to_string()))
}

fn run_gcloud(args: &[&str]) -> Result<String> {
    let output = match Command::new("gcloud").args(args).output() {
        Ok(output) => output,
        Err(err) => {
            let message = format!("failed to run gcloud ({}); {}", err, NO_SDK);
            return Err(Error::Auth(message));
        }
    };
    if !output.status.success() {
        return Err(Error::Auth(format!(
            "gcloud {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
