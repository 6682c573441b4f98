//! Query option bundles for list endpoints.
//!
//! Options are checked against the allowed-value tables below and flattened
//! into query pairs before any request is sent.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{GitlabError, Result};

pub const PIPELINE_SCOPES: &[&str] = &["running", "pending", "finished", "branches", "tags"];
pub const PIPELINE_STATUSES: &[&str] =
    &["running", "pending", "success", "failed", "canceled", "skipped"];
pub const PIPELINE_ORDER_BY: &[&str] = &["id", "status", "ref", "user_id"];
pub const SORT_DIRECTIONS: &[&str] = &["asc", "desc"];

pub const MAX_PER_PAGE: i32 = 100;

type Query = Vec<(String, String)>;

fn check_allowed(name: &str, value: &Option<String>, allowed: &[&str]) -> Result<()> {
    match value {
        Some(v) if !allowed.contains(&v.as_str()) => Err(GitlabError::InvalidOption(format!(
            "Invalid {name} '{v}'"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page number and page size. Zero means "server default" and is not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub page: i32,
    pub per_page: i32,
}

impl Pagination {
    pub fn new(page: i32, per_page: i32) -> Self {
        Self { page, per_page }
    }

    pub fn check(&self) -> Result<()> {
        if self.page < 0 {
            return Err(GitlabError::InvalidOption(format!(
                "Invalid page '{}'",
                self.page
            )));
        }
        if !(0..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(GitlabError::InvalidOption(format!(
                "Invalid per_page '{}'",
                self.per_page
            )));
        }
        Ok(())
    }

    fn push_query(&self, query: &mut Query) {
        if self.page > 0 {
            query.push(("page".into(), self.page.to_string()));
        }
        if self.per_page > 0 {
            query.push(("per_page".into(), self.per_page.to_string()));
        }
    }
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Filters for `GET /projects/:id/pipelines`.
///
/// ```
/// use gitlab_client::ListPipelinesOptions;
///
/// let opts = ListPipelinesOptions::new()
///     .status("failed")
///     .git_ref("main")
///     .order_by("id")
///     .sort("desc")
///     .per_page(50);
/// let query = opts.to_query().unwrap();
/// assert!(query.contains(&("status".to_string(), "failed".to_string())));
///
/// assert!(ListPipelinesOptions::new().status("exploded").to_query().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListPipelinesOptions {
    pub scope: Option<String>,
    pub status: Option<String>,
    pub git_ref: Option<String>,
    pub yaml_errors: bool,
    pub name: Option<String>,
    pub username: Option<String>,
    pub order_by: Option<String>,
    pub sort: Option<String>,
    pub pagination: Pagination,
}

impl ListPipelinesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn git_ref(mut self, git_ref: &str) -> Self {
        self.git_ref = Some(git_ref.to_string());
        self
    }

    pub fn yaml_errors(mut self, yaml_errors: bool) -> Self {
        self.yaml_errors = yaml_errors;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn order_by(mut self, order_by: &str) -> Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    pub fn sort(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn page(mut self, page: i32) -> Self {
        self.pagination.page = page;
        self
    }

    pub fn per_page(mut self, per_page: i32) -> Self {
        self.pagination.per_page = per_page;
        self
    }

    pub fn check(&self) -> Result<()> {
        check_allowed("scope", &self.scope, PIPELINE_SCOPES)?;
        check_allowed("status", &self.status, PIPELINE_STATUSES)?;
        check_allowed("order_by", &self.order_by, PIPELINE_ORDER_BY)?;
        check_allowed("sort", &self.sort, SORT_DIRECTIONS)?;
        self.pagination.check()
    }

    /// Validate and flatten into query pairs. Each key appears at most once.
    pub fn to_query(&self) -> Result<Vec<(String, String)>> {
        self.check()?;

        let mut query = Query::new();
        let optional = [
            ("scope", &self.scope),
            ("status", &self.status),
            ("ref", &self.git_ref),
            ("name", &self.name),
            ("username", &self.username),
            ("order_by", &self.order_by),
            ("sort", &self.sort),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                query.push((key.into(), v.clone()));
            }
        }
        if self.yaml_errors {
            query.push(("yaml_errors".into(), "true".into()));
        }
        self.pagination.push_query(&mut query);
        Ok(query)
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobScope {
    Created,
    Pending,
    Running,
    Failed,
    Success,
    Canceled,
    Skipped,
    Manual,
}

impl JobScope {
    pub const ALL: [JobScope; 8] = [
        JobScope::Created,
        JobScope::Pending,
        JobScope::Running,
        JobScope::Failed,
        JobScope::Success,
        JobScope::Canceled,
        JobScope::Skipped,
        JobScope::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobScope::Created => "created",
            JobScope::Pending => "pending",
            JobScope::Running => "running",
            JobScope::Failed => "failed",
            JobScope::Success => "success",
            JobScope::Canceled => "canceled",
            JobScope::Skipped => "skipped",
            JobScope::Manual => "manual",
        }
    }
}

impl fmt::Display for JobScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobScope {
    type Err = GitlabError;

    fn from_str(s: &str) -> Result<Self> {
        JobScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| GitlabError::InvalidOption(format!("Invalid job scope '{s}'")))
    }
}

/// Filters for `GET /projects/:id/pipelines/:pipeline_id/jobs`.
///
/// Each scope becomes its own `scope[]` parameter.
#[derive(Debug, Clone, Default)]
pub struct ListJobsOptions {
    scopes: BTreeSet<JobScope>,
    pub pagination: Pagination,
}

impl ListJobsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: JobScope) -> Self {
        self.scopes.insert(scope);
        self
    }

    pub fn add_scopes(&mut self, scopes: impl IntoIterator<Item = JobScope>) {
        self.scopes.extend(scopes);
    }

    pub fn scopes(&self) -> impl Iterator<Item = JobScope> + '_ {
        self.scopes.iter().copied()
    }

    pub fn page(mut self, page: i32) -> Self {
        self.pagination.page = page;
        self
    }

    pub fn per_page(mut self, per_page: i32) -> Self {
        self.pagination.per_page = per_page;
        self
    }

    /// Validate and flatten into query pairs; `scope[]` may repeat.
    pub fn to_query(&self) -> Result<Vec<(String, String)>> {
        self.pagination.check()?;

        let mut query: Query = self
            .scopes
            .iter()
            .map(|s| ("scope[]".to_string(), s.as_str().to_string()))
            .collect();
        self.pagination.push_query(&mut query);
        Ok(query)
    }
}
