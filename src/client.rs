use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{normalize_api_path, GitlabConfig};
use crate::error::{GitlabError, Result};
use crate::models::*;
use crate::options::{ListJobsOptions, ListPipelinesOptions};
use crate::resource::{self, QueryMode};

/// GitLab personal/project access token header.
const TOKEN_HEADER: &str = "private-token";

// ---------------------------------------------------------------------------
// Request execution
// ---------------------------------------------------------------------------

/// Shared transport, prefix and per-request settings.
#[derive(Clone)]
struct BaseClient {
    root: String,
    http: Client,
    timeout: Option<Duration>,
}

impl BaseClient {
    fn new(config: &GitlabConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|e| GitlabError::InvalidToken(e.to_string()))?;
        token.set_sensitive(true);
        headers.insert(HeaderName::from_static(TOKEN_HEADER), token);

        if config.skip_cert_verify {
            warn!(
                base_url = %config.base_url,
                "certificate verification disabled; connections are open to MITM attacks"
            );
        }

        let http = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.skip_cert_verify)
            .build()?;

        let root = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            normalize_api_path(&config.api_path)
        );
        Url::parse(&root)?;

        Ok(Self {
            root,
            http,
            timeout: config.timeout,
        })
    }

    /// Substitute path parameters (percent-encoded) and join onto the API root.
    fn resource_url(&self, template: &str, params: &[(&str, &str)]) -> Result<Url> {
        if let Some((token, value)) = params
            .iter()
            .find(|(_, value)| !resource::is_path_value_allowed(value))
        {
            return Err(GitlabError::InvalidPathValue {
                token: token.to_string(),
                value: value.to_string(),
            });
        }

        let encoded: Vec<(&str, String)> = params
            .iter()
            .map(|(token, value)| (*token, resource::encode_path_value(value)))
            .collect();
        let encoded: Vec<(&str, &str)> = encoded.iter().map(|(t, v)| (*t, v.as_str())).collect();

        let path = resource::resolve_template(template, &encoded);
        if let Some(token) = resource::unresolved_placeholder(&path) {
            return Err(GitlabError::UnresolvedPlaceholder {
                template: template.to_string(),
                token: token.to_string(),
            });
        }
        Ok(Url::parse(&format!("{}{path}", self.root))?)
    }

    fn resource_url_with_query(
        &self,
        template: &str,
        params: &[(&str, &str)],
        query: &[(String, String)],
        mode: QueryMode,
    ) -> Result<Url> {
        let mut url = self.resource_url(template, params)?;
        resource::merge_query(&mut url, query, mode);
        Ok(url)
    }

    /// Send the request and return the raw body of a successful response.
    fn execute(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method.clone(), url.as_str());
        if method == Method::POST || method == Method::PUT {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        debug!(%method, %url, status, "received response");

        if status >= 400 {
            let body = response.text()?;
            return Err(GitlabError::Response { status, body });
        }
        Ok(response.bytes()?.to_vec())
    }

    // ---- convenience wrappers for common HTTP verbs -----------------------

    fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        decode(&self.execute(Method::GET, url, None)?)
    }

    fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = serde_json::to_vec(body).map_err(GitlabError::Encode)?;
        decode(&self.execute(method, url, Some(encoded))?)
    }

    fn delete(&self, url: Url) -> Result<()> {
        self.execute(Method::DELETE, url, None)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(GitlabError::Decode)
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Main entry point for interacting with the GitLab API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// ```no_run
/// use gitlab_client::{Gitlab, GitlabConfig, ListPipelinesOptions};
///
/// let gitlab = Gitlab::new(GitlabConfig::new("https://gitlab.example.com", "glpat-xxxx")).unwrap();
/// let pipelines = gitlab
///     .pipelines()
///     .list("42", &ListPipelinesOptions::new().status("failed"))
///     .unwrap();
/// for p in &pipelines {
///     println!("{} {} {}", p.id, p.git_ref, p.status);
/// }
/// ```
#[derive(Clone)]
pub struct Gitlab {
    base: BaseClient,
}

impl Gitlab {
    /// Create a new client.
    ///
    /// * `config` – base URL, API path, token and transport settings; fixed
    ///   for the lifetime of the client
    ///
    /// Fails if the token is not a valid header value, the base URL does not
    /// parse, or the TLS backend cannot be initialised.
    pub fn new(config: GitlabConfig) -> Result<Self> {
        Ok(Self {
            base: BaseClient::new(&config)?,
        })
    }

    /// A handle whose requests each carry `timeout` as their deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut base = self.base.clone();
        base.timeout = Some(timeout);
        Self { base }
    }

    /// Resolve a resource template against this client's base URL and API path.
    ///
    /// Fails with [`GitlabError::UnresolvedPlaceholder`] if a `:token` is left.
    pub fn resource_url(&self, template: &str, params: &[(&str, &str)]) -> Result<Url> {
        self.base.resource_url(template, params)
    }

    /// [`Gitlab::resource_url`] followed by a query merge.
    pub fn resource_url_with_query(
        &self,
        template: &str,
        params: &[(&str, &str)],
        query: &[(String, String)],
        mode: QueryMode,
    ) -> Result<Url> {
        self.base
            .resource_url_with_query(template, params, query, mode)
    }

    // -- sub-client accessors ------------------------------------------------

    pub fn groups(&self) -> GroupsClient<'_> {
        GroupsClient { base: &self.base }
    }

    pub fn hooks(&self) -> HooksClient<'_> {
        HooksClient { base: &self.base }
    }

    pub fn jobs(&self) -> JobsClient<'_> {
        JobsClient { base: &self.base }
    }

    pub fn pipelines(&self) -> PipelinesClient<'_> {
        PipelinesClient { base: &self.base }
    }
}

// ===========================================================================
// Sub-clients
// ===========================================================================

// ---- Groups ---------------------------------------------------------------

pub struct GroupsClient<'a> {
    base: &'a BaseClient,
}

impl GroupsClient<'_> {
    /// List groups visible to the authenticated user.
    pub fn list(&self) -> Result<Vec<Group>> {
        self.base.get(self.base.resource_url(resource::GROUPS, &[])?)
    }

    /// Search groups whose name or path contains `search`.
    pub fn search(&self, search: &str) -> Result<Vec<Group>> {
        let url = self.base.resource_url_with_query(
            resource::GROUPS,
            &[],
            &[("search".into(), search.into())],
            QueryMode::Set,
        )?;
        self.base.get(url)
    }

    /// Create a group owned by the authenticated user.
    pub fn create(&self, group: &CreateGroup) -> Result<Group> {
        let url = self.base.resource_url(resource::GROUPS, &[])?;
        self.base.send_json(Method::POST, url, group)
    }
}

// ---- Hooks ----------------------------------------------------------------

pub struct HooksClient<'a> {
    base: &'a BaseClient,
}

#[derive(Serialize)]
struct HookBody<'a> {
    url: &'a str,
    #[serde(flatten)]
    flags: &'a HookFlags,
}

/// The three-flag form accepted by older callers.
#[derive(Serialize)]
struct SimpleHookBody<'a> {
    url: &'a str,
    push_events: bool,
    issues_events: bool,
    merge_requests_events: bool,
}

impl HooksClient<'_> {
    /// List hooks of a project.
    pub fn list(&self, project_id: &str) -> Result<Vec<Hook>> {
        let url = self
            .base
            .resource_url(resource::PROJECT_HOOKS, &[(":id", project_id)])?;
        self.base.get(url)
    }

    /// Get a single project hook.
    pub fn get(&self, project_id: &str, hook_id: u64) -> Result<Hook> {
        self.base.get(self.hook_url(project_id, hook_id)?)
    }

    /// Add a hook with the full set of event flags.
    ///
    /// [`HookFlags::default()`] enables push events and SSL verification.
    pub fn add(&self, project_id: &str, hook_url: &str, flags: &HookFlags) -> Result<Hook> {
        let url = self
            .base
            .resource_url(resource::PROJECT_HOOKS, &[(":id", project_id)])?;
        let body = HookBody {
            url: hook_url,
            flags,
        };
        self.base.send_json(Method::POST, url, &body)
    }

    /// Add a hook triggered by push, issue and merge request events only.
    pub fn add_simple(
        &self,
        project_id: &str,
        hook_url: &str,
        push_events: bool,
        issues_events: bool,
        merge_requests_events: bool,
    ) -> Result<Hook> {
        let url = self
            .base
            .resource_url(resource::PROJECT_HOOKS, &[(":id", project_id)])?;
        let body = SimpleHookBody {
            url: hook_url,
            push_events,
            issues_events,
            merge_requests_events,
        };
        self.base.send_json(Method::POST, url, &body)
    }

    /// Replace the URL and event flags of an existing hook.
    pub fn edit(
        &self,
        project_id: &str,
        hook_id: u64,
        hook_url: &str,
        flags: &HookFlags,
    ) -> Result<Hook> {
        let body = HookBody {
            url: hook_url,
            flags,
        };
        self.base
            .send_json(Method::PUT, self.hook_url(project_id, hook_id)?, &body)
    }

    /// Edit a hook using the three-flag form.
    pub fn edit_simple(
        &self,
        project_id: &str,
        hook_id: u64,
        hook_url: &str,
        push_events: bool,
        issues_events: bool,
        merge_requests_events: bool,
    ) -> Result<Hook> {
        let body = SimpleHookBody {
            url: hook_url,
            push_events,
            issues_events,
            merge_requests_events,
        };
        self.base
            .send_json(Method::PUT, self.hook_url(project_id, hook_id)?, &body)
    }

    /// Remove a hook from a project.
    pub fn remove(&self, project_id: &str, hook_id: u64) -> Result<()> {
        self.base.delete(self.hook_url(project_id, hook_id)?)
    }

    fn hook_url(&self, project_id: &str, hook_id: u64) -> Result<Url> {
        let hook_id = hook_id.to_string();
        self.base.resource_url(
            resource::PROJECT_HOOK,
            &[(":id", project_id), (":hook_id", &hook_id)],
        )
    }
}

// ---- Jobs -----------------------------------------------------------------

pub struct JobsClient<'a> {
    base: &'a BaseClient,
}

impl JobsClient<'_> {
    /// List the jobs of a pipeline, optionally restricted to some scopes.
    pub fn list(
        &self,
        project_id: &str,
        pipeline_id: u64,
        opts: &ListJobsOptions,
    ) -> Result<Vec<Job>> {
        let query = opts.to_query()?;
        let pipeline_id = pipeline_id.to_string();
        let url = self.base.resource_url_with_query(
            resource::PIPELINE_JOBS,
            &[(":id", project_id), (":pipeline_id", &pipeline_id)],
            &query,
            QueryMode::Add,
        )?;
        self.base.get(url)
    }
}

// ---- Pipelines ------------------------------------------------------------

pub struct PipelinesClient<'a> {
    base: &'a BaseClient,
}

impl PipelinesClient<'_> {
    /// Create a pipeline for `git_ref`.
    pub fn create(&self, project_id: &str, git_ref: &str) -> Result<Pipeline> {
        let url = self.base.resource_url_with_query(
            resource::PIPELINE_CREATE,
            &[(":id", project_id)],
            &[("ref".into(), git_ref.into())],
            QueryMode::Set,
        )?;
        decode(&self.base.execute(Method::POST, url, None)?)
    }

    /// List pipelines of a project. Options are validated before sending.
    pub fn list(
        &self,
        project_id: &str,
        opts: &ListPipelinesOptions,
    ) -> Result<Vec<PipelineBrief>> {
        let query = opts.to_query()?;
        let url = self.base.resource_url_with_query(
            resource::PIPELINES,
            &[(":id", project_id)],
            &query,
            QueryMode::Set,
        )?;
        self.base.get(url)
    }

    /// Get a single pipeline.
    pub fn get(&self, project_id: &str, pipeline_id: u64) -> Result<Pipeline> {
        let pipeline_id = pipeline_id.to_string();
        let url = self.base.resource_url(
            resource::PIPELINE,
            &[(":id", project_id), (":pipeline_id", &pipeline_id)],
        )?;
        self.base.get(url)
    }
}
