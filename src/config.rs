use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://issues.redhat.com/";
pub const DEFAULT_PROJECTS: &[&str] = &["PF", "UXDENG"];
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1000);

const TOKEN_VAR: &str = "JIRA_PAT";
const BASE_URL_VAR: &str = "JIRA_BASE_URL";
const AFFECTED_VERSION_VAR: &str = "AFFECTED_VERSION";
const PROJECTS_VAR: &str = "JIRA_PROJECTS";
const OUTPUT_DIR_VAR: &str = "REPORT_OUTPUT_DIR";
const REQUEST_DELAY_VAR: &str = "JIRA_REQUEST_DELAY_MS";

/// Runtime settings, read from the environment.
#[derive(Debug)]
pub struct Config {
    /// Jira instance root. Always ends with a `/` so that relative API paths
    /// join below it.
    pub base_url: Url,
    pub token: SecretString,
    /// Explicit version filter; the current quarter is used when unset.
    pub affected_version: Option<String>,
    pub projects: Vec<String>,
    pub output_dir: PathBuf,
    /// Pause taken before every comment request.
    pub request_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var(TOKEN_VAR).ok_or(ConfigurationError::Missing(TOKEN_VAR))?;
        let base_url = parse_base_url(&var(BASE_URL_VAR).unwrap_or(DEFAULT_BASE_URL.into()))?;
        let projects = match var(PROJECTS_VAR) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_PROJECTS.iter().map(|p| p.to_string()).collect(),
        };
        let request_delay = match var(REQUEST_DELAY_VAR) {
            Some(ms) => Duration::from_millis(ms.trim().parse().map_err(|_| {
                ConfigurationError::InvalidValue {
                    var: REQUEST_DELAY_VAR,
                    value: ms.clone(),
                }
            })?),
            None => DEFAULT_REQUEST_DELAY,
        };

        Ok(Config {
            base_url,
            token: token.into(),
            affected_version: var(AFFECTED_VERSION_VAR).map(|v| v.trim().to_string()),
            projects,
            output_dir: var(OUTPUT_DIR_VAR).map_or_else(|| PathBuf::from("."), PathBuf::from),
            request_delay,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigurationError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigurationError::InvalidUrl {
        value: raw.to_string(),
        error: e,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Clone, Debug)]
pub enum ConfigurationError {
    Missing(&'static str),
    InvalidUrl { value: String, error: url::ParseError },
    InvalidValue { var: &'static str, value: String },
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::Missing(var) => {
                write!(f, "Missing required environment variable: {var}")
            }
            ConfigurationError::InvalidUrl { value, error } => {
                write!(f, "Invalid {BASE_URL_VAR} `{value}`: {error}")
            }
            ConfigurationError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {var}: `{value}`")
            }
        }
    }
}
