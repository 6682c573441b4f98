use std::time::Duration;

use crate::error::{GitlabError, Result};

/// Default REST API prefix appended to the base URL.
pub const DEFAULT_API_PATH: &str = "/api/v4";

/// Connection settings shared by every call made through a [`crate::Gitlab`].
///
/// `base_url` and `api_path` are normalized again when the client is built,
/// so fields assigned directly behave the same as the builder setters.
///
/// ```
/// use std::time::Duration;
/// use gitlab_client::GitlabConfig;
///
/// let config = GitlabConfig::new("https://gitlab.example.com/", "glpat-xxxx")
///     .timeout(Duration::from_secs(30));
/// assert_eq!(config.base_url, "https://gitlab.example.com");
/// assert_eq!(config.api_path, "/api/v4");
/// ```
#[derive(Debug, Clone)]
pub struct GitlabConfig {
    pub base_url: String,
    pub api_path: String,
    pub token: String,
    /// Accept invalid TLS certificates. Exposes the client to MITM attacks.
    pub skip_cert_verify: bool,
    /// Default per-request deadline. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl GitlabConfig {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            token: token.to_string(),
            skip_cert_verify: false,
            timeout: None,
        }
    }

    pub fn api_path(mut self, api_path: &str) -> Self {
        self.api_path = normalize_api_path(api_path);
        self
    }

    pub fn skip_cert_verify(mut self, skip: bool) -> Self {
        self.skip_cert_verify = skip;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a configuration from the environment.
    ///
    /// * `GITLAB_BASE_URL` – required
    /// * `GITLAB_TOKEN` – required
    /// * `GITLAB_API_PATH` – defaults to `/api/v4`
    /// * `GITLAB_SKIP_CERT_CHECK` – `true` or `1` disables certificate checks
    /// * `GITLAB_TIMEOUT_SECS` – default request timeout in seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("GITLAB_BASE_URL")
            .ok_or_else(|| GitlabError::InvalidOption("GITLAB_BASE_URL is not set".into()))?;
        let token = lookup("GITLAB_TOKEN")
            .ok_or_else(|| GitlabError::InvalidOption("GITLAB_TOKEN is not set".into()))?;

        let mut config = Self::new(&base_url, &token);
        if let Some(path) = lookup("GITLAB_API_PATH") {
            config = config.api_path(&path);
        }
        if let Some(flag) = lookup("GITLAB_SKIP_CERT_CHECK") {
            config.skip_cert_verify = matches!(flag.trim(), "1" | "true" | "TRUE" | "True");
        }
        if let Some(secs) = lookup("GITLAB_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                GitlabError::InvalidOption(format!("Invalid GITLAB_TIMEOUT_SECS '{secs}'"))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

pub(crate) fn normalize_api_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn api_path_is_normalized() {
        let c = GitlabConfig::new("https://git.example.com", "t").api_path("api/v3/");
        assert_eq!(c.api_path, "/api/v3");
        let c = GitlabConfig::new("https://git.example.com", "t").api_path("");
        assert_eq!(c.api_path, "");
    }

    #[test]
    fn from_env_reads_all_settings() {
        let c = GitlabConfig::from_lookup(lookup(&[
            ("GITLAB_BASE_URL", "https://git.example.com/"),
            ("GITLAB_TOKEN", "secret"),
            ("GITLAB_API_PATH", "/api/v4"),
            ("GITLAB_SKIP_CERT_CHECK", "1"),
            ("GITLAB_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(c.base_url, "https://git.example.com");
        assert_eq!(c.token, "secret");
        assert!(c.skip_cert_verify);
        assert_eq!(c.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn from_env_requires_base_url_and_token() {
        let err = GitlabConfig::from_lookup(lookup(&[("GITLAB_TOKEN", "x")])).unwrap_err();
        assert!(err.to_string().contains("GITLAB_BASE_URL"));

        let err = GitlabConfig::from_lookup(lookup(&[("GITLAB_BASE_URL", "http://h")]))
            .unwrap_err();
        assert!(err.to_string().contains("GITLAB_TOKEN"));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let err = GitlabConfig::from_lookup(lookup(&[
            ("GITLAB_BASE_URL", "http://h"),
            ("GITLAB_TOKEN", "x"),
            ("GITLAB_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, GitlabError::InvalidOption(_)));
    }
}
