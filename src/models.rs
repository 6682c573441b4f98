use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Users and commits (embedded in pipelines and jobs)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    pub state: Option<String>,
    pub avatar_url: Option<String>,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub id: String,
    pub short_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub parent_id: Option<u64>,
    pub full_path: Option<String>,
    pub web_url: Option<String>,
}

/// Body of `POST /groups`.
///
/// ```
/// use gitlab_client::CreateGroup;
///
/// let group = CreateGroup::new("ws8000", "ws8000")
///     .parent_id(35)
///     .visibility("internal");
/// assert_eq!(group.parent_id, Some(35));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CreateGroup {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

impl CreateGroup {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            description: None,
            visibility: None,
            parent_id: None,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn visibility(mut self, visibility: &str) -> Self {
        self.visibility = Some(visibility.to_string());
        self
    }

    pub fn parent_id(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Events a project hook fires on.
///
/// Flags missing from a server record decode as `false`; [`HookFlags::default`]
/// is the starting point for new hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookFlags {
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub issues_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub note_events: bool,
    #[serde(default)]
    pub job_events: bool,
    #[serde(default)]
    pub pipeline_events: bool,
    #[serde(default)]
    pub wiki_page_events: bool,
    #[serde(default)]
    pub enable_ssl_verification: bool,
}

impl Default for HookFlags {
    /// Push events and SSL verification on, everything else off.
    fn default() -> Self {
        Self {
            push_events: true,
            issues_events: false,
            merge_requests_events: false,
            tag_push_events: false,
            note_events: false,
            job_events: false,
            pipeline_events: false,
            wiki_page_events: false,
            enable_ssl_verification: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hook {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    pub project_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub flags: HookFlags,
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Pipeline summary as returned by the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBrief {
    pub id: u64,
    #[serde(default)]
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub status: String,
}

impl PipelineBrief {
    /// A pipeline is finished once it has a status that is neither
    /// `running` nor `pending`.
    pub fn finished(&self) -> bool {
        !self.status.is_empty() && self.status != "running" && self.status != "pending"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(flatten)]
    pub brief: PipelineBrief,
    pub before_sha: Option<String>,
    #[serde(default)]
    pub tag: bool,
    pub user: Option<User>,
    pub web_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub committed_at: Option<DateTime<Utc>>,
    /// Seconds.
    pub duration: Option<i64>,
}

impl Pipeline {
    pub fn id(&self) -> u64 {
        self.brief.id
    }

    pub fn status(&self) -> &str {
        &self.brief.status
    }

    pub fn finished(&self) -> bool {
        self.brief.finished()
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub tag: bool,
    pub commit: Option<Commit>,
    pub pipeline: Option<PipelineBrief>,
    pub user: Option<User>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
