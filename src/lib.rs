//! GitLab REST API client library for Rust.
//!
//! A blocking client for the groups, project hooks, pipeline jobs and
//! pipelines endpoints of the [GitLab API](https://docs.gitlab.com/ee/api/).
//! Every call is a single round trip: resolve the resource URL, send the
//! request with the `PRIVATE-TOKEN` header, decode the JSON body.
//!
//! # Quick Start
//!
//! ```no_run
//! use gitlab_client::{Gitlab, GitlabConfig};
//!
//! let gitlab = Gitlab::new(GitlabConfig::new("https://gitlab.example.com", "glpat-xxxx")).unwrap();
//!
//! let pipeline = gitlab.pipelines().create("42", "main").unwrap();
//! println!("pipeline {} is {}", pipeline.id(), pipeline.status());
//!
//! match gitlab.pipelines().get("42", 9999) {
//!     Err(e) if e.is_not_found() => println!("no such pipeline"),
//!     other => println!("{other:?}"),
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod options;
pub mod resource;

// Re-export the main public types at the crate root for convenience.
pub use client::{Gitlab, GroupsClient, HooksClient, JobsClient, PipelinesClient};
pub use config::GitlabConfig;
pub use error::{GitlabError, Result};
pub use models::{
    Commit, CreateGroup, Group, Hook, HookFlags, Job, Pipeline, PipelineBrief, User,
};
pub use options::{JobScope, ListJobsOptions, ListPipelinesOptions, Pagination};
pub use resource::QueryMode;
